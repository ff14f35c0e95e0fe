//! # uidesc parser
//!
//! Scanner, parser and selector parser for the uidesc layout markup.
//!
//! Parsing turns raw text into a [`Document`]: an arena of [`Element`]s typed
//! against a [`SchemaRegistry`](uidesc_core::schema::SchemaRegistry), plus
//! every diagnostic found on the way. Parsing never fails; malformed markup
//! produces diagnostics and a best-effort tree.
//!
//! ## Usage
//!
//! ```
//! use uidesc_core::builtin::{layout_schema, LAYOUT_FILE_TYPE};
//! use uidesc_parser::parse;
//!
//! let schema = layout_schema();
//! let root_type = schema.type_by_name(LAYOUT_FILE_TYPE);
//! let doc = parse("Main", r#"<Frame name="X"><Bogus/></Frame>"#, &schema, root_type);
//!
//! assert_eq!(doc.diagnostics().len(), 1);
//! assert!(doc.diagnostics()[0].severity().is_message());
//! ```

pub mod document;
pub mod error;
mod parser;
#[cfg(test)]
mod parser_tests;
pub mod scanner;
pub mod selector;
mod span;
pub mod token;
mod validate;

pub use document::{Attribute, Document, Element, ElementId};
pub use parser::parse;
pub use scanner::tokenize;
pub use span::Span;
