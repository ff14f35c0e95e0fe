//! Diagnostics for the scanner, the parser and structural validation.
//!
//! Nothing in this crate fails on malformed markup. Problems are recorded as
//! [`Diagnostic`] values, in scan order, and a best-effort tree is always
//! produced so downstream features keep working on partially invalid
//! documents.
//!
//! # Example
//!
//! ```
//! # use uidesc_parser::error::{Diagnostic, ErrorCode, Severity};
//! # use uidesc_parser::Span;
//!
//! let diag = Diagnostic::message("unknown element `Bogus`")
//!     .with_code(ErrorCode::E200)
//!     .with_span(Span::new(12..17))
//!     .with_help("check the spelling against the parent's content model");
//!
//! assert_eq!(diag.severity(), Severity::Message);
//! assert_eq!(diag.start(), 12);
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use severity::Severity;
