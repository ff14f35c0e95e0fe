//! Error types for uidesc operations.
//!
//! Markup problems are never errors: they are diagnostics stored on the
//! parsed document. The types here cover misuse of the index lifecycle,
//! unknown document ids, configuration loading and I/O.

use std::io;

use thiserror::Error;

use crate::{config::ConfigError, index::DocumentId};

/// Violations of the bind/unbind lifecycle of the declaration index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("document {0} is already bound with different content")]
    AlreadyBound(DocumentId),

    #[error("document {0} is not bound")]
    NotBound(DocumentId),
}

/// The main error type for uidesc operations.
#[derive(Debug, Error)]
pub enum UidescError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
