//! Effective UI hierarchies.
//!
//! The declaration index stores what each file declares. A hierarchy is what
//! a frame actually ends up containing once templates and cross-file
//! extensions are merged in. [`UiBuilder`] materializes that hierarchy into a
//! [`UiTree`] lazily, one branch at a time, and [`UiNavigator`] resolves
//! selector fragments against it.

mod builder;
mod navigator;
mod tree;

use indexmap::IndexMap;
use uidesc_parser::Document;

pub use builder::UiBuilder;
pub use navigator::{Selection, UiNavigator};
pub use tree::{UiNode, UiNodeId, UiNodeKind, UiTree};

use crate::index::DocumentId;

/// Read access to parsed documents by id.
pub trait DocumentSource {
    fn document(&self, id: DocumentId) -> Option<&Document>;
}

impl DocumentSource for IndexMap<DocumentId, Document> {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.get(&id)
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use indexmap::IndexMap;
    use uidesc_core::{
        builtin::{LAYOUT_FILE_TYPE, layout_schema},
        schema::SchemaRegistry,
    };
    use uidesc_parser::{Document, parse};

    use super::UiBuilder;
    use crate::{
        config::BuilderConfig,
        index::{DescIndex, DocumentId, NamespaceId},
    };

    /// Parsed and bound documents over the builtin schema.
    pub(crate) struct Fixture {
        pub(crate) schema: SchemaRegistry,
        pub(crate) docs: IndexMap<DocumentId, Document>,
        pub(crate) index: DescIndex,
        pub(crate) config: BuilderConfig,
    }

    impl Fixture {
        pub(crate) fn new() -> Self {
            Self {
                schema: layout_schema(),
                docs: IndexMap::new(),
                index: DescIndex::default(),
                config: BuilderConfig::default(),
            }
        }

        pub(crate) fn with(files: &[(&str, &str)]) -> Self {
            let mut fixture = Self::new();
            for (name, text) in files {
                fixture.add(name, text);
            }
            fixture
        }

        pub(crate) fn add(&mut self, name: &str, text: &str) -> DocumentId {
            let root_type = self.schema.type_by_name(LAYOUT_FILE_TYPE);
            let document = parse(name, text, &self.schema, root_type);
            let id = DocumentId::new(self.docs.len() as u32);
            self.index.bind(id, &document, &self.schema).unwrap();
            self.docs.insert(id, document);
            id
        }

        pub(crate) fn ns(&self, path: &str) -> NamespaceId {
            self.index
                .lookup_path(path)
                .unwrap_or_else(|| panic!("no namespace entry at {path}"))
        }

        pub(crate) fn builder(&self) -> UiBuilder<'_, IndexMap<DocumentId, Document>> {
            UiBuilder::new(&self.index, &self.docs, &self.schema, &self.config)
        }
    }
}
