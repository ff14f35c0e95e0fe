//! # uidesc-core
//!
//! Shared vocabulary for the uidesc crates: interned identifiers, the schema
//! contract consumed by parsing, binding and navigation, and the builtin
//! baseline schema for the UI layout dialect.

pub mod builtin;
pub mod identifier;
pub mod schema;
