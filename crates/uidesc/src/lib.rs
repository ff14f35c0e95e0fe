//! uidesc - language intelligence for a UI layout markup.
//!
//! Layout files declare frames, animations and state groups in an XML-like
//! markup. Declarations are merged across files: a frame may inherit the
//! content of a template (`template="File/Path"`) and a file may reopen a
//! top-level frame of another file (`file="Other"`). This crate keeps the
//! declarations of every open document in a [`DescIndex`](index::DescIndex),
//! materializes the effective hierarchy of a frame on demand
//! ([`UiBuilder`](hierarchy::UiBuilder)) and resolves path selectors such as
//! `$parent/$ancestor[@type=Button]` against it
//! ([`UiNavigator`](hierarchy::UiNavigator)).
//!
//! [`Workspace`] ties these together with the parser from `uidesc-parser`.
//!
//! ```
//! use uidesc::{Workspace, hierarchy::UiTree};
//!
//! let mut workspace = Workspace::with_defaults();
//! workspace
//!     .open(
//!         "GameUI.xml",
//!         r#"<Frame type="Button" name="Ok"><Frame name="Inner"><Frame name="Title"/></Frame></Frame>"#,
//!     )
//!     .unwrap();
//!
//! let title = workspace.lookup("GameUI/Ok/Inner/Title").unwrap();
//! let mut tree = UiTree::new();
//! let selection = workspace
//!     .resolve(&mut tree, title, "$parent/$ancestor[@type=Button]")
//!     .unwrap();
//! assert_eq!(tree.path_string(selection.target().unwrap()), "Ok");
//! ```

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod index;

mod workspace;

pub use uidesc_core::{builtin, identifier, schema};
pub use uidesc_parser::{Document, ElementId, error::Diagnostic, selector};

pub use error::{IndexError, UidescError};
pub use workspace::Workspace;
