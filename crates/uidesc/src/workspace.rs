use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info, warn};
use uidesc_core::{
    builtin::layout_schema,
    schema::{SchemaRegistry, TypeId},
};
use uidesc_parser::{Document, error::Diagnostic, parse, selector::parse_selector};

use crate::{
    config::WorkspaceConfig,
    error::UidescError,
    hierarchy::{DocumentSource, Selection, UiBuilder, UiNavigator, UiTree},
    index::{DescIndex, DocumentId, NamespaceId},
};

/// Open documents, their declaration index and the schema they are typed
/// against.
///
/// All mutation goes through `&mut Workspace`; builders and navigators
/// borrow it shared, so no query can overlap a bind or unbind.
///
/// # Examples
///
/// ```
/// use uidesc::{Workspace, hierarchy::UiTree};
///
/// let mut workspace = Workspace::with_defaults();
/// workspace
///     .open("GameUI.xml", r#"<Frame name="Main"><Frame name="Title"/></Frame>"#)
///     .unwrap();
///
/// let main = workspace.lookup("GameUI/Main").unwrap();
/// let mut tree = UiTree::new();
/// let selection = workspace.resolve(&mut tree, main, "Title").unwrap();
/// assert_eq!(tree.path_string(selection.target().unwrap()), "Main/Title");
/// ```
pub struct Workspace {
    schema: SchemaRegistry,
    config: WorkspaceConfig,
    root_type: Option<TypeId>,
    documents: IndexMap<DocumentId, Document>,
    paths: IndexMap<DocumentId, PathBuf>,
    next_id: u32,
    index: DescIndex,
}

impl Workspace {
    pub fn new(schema: SchemaRegistry, config: WorkspaceConfig) -> Self {
        let root_type = schema.type_by_name(config.root_type());
        if root_type.is_none() {
            warn!(
                root_type = config.root_type();
                "Root type not found in schema, top-level elements stay untyped"
            );
        }
        let index = DescIndex::new(config.index().clone());
        Self {
            schema,
            config,
            root_type,
            documents: IndexMap::new(),
            paths: IndexMap::new(),
            next_id: 0,
            index,
        }
    }

    /// Workspace over the builtin layout schema with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(layout_schema(), WorkspaceConfig::default())
    }

    /// Parses and binds `text`. The document is named after the file stem
    /// of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UidescError::Index`] if binding fails.
    pub fn open(
        &mut self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<DocumentId, UidescError> {
        let path = path.as_ref();
        let name = document_name(path);
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;

        let document = parse(name.as_str(), text, &self.schema, self.root_type);
        self.index.bind(id, &document, &self.schema)?;
        info!(
            doc:% = id,
            name = name.as_str(),
            diagnostics = document.diagnostics().len();
            "Document opened"
        );

        self.documents.insert(id, document);
        self.paths.insert(id, path.to_path_buf());
        Ok(id)
    }

    /// Reads `path` from disk and [`open`](Self::open)s it.
    ///
    /// # Errors
    ///
    /// Returns [`UidescError::Io`] if the file cannot be read.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<DocumentId, UidescError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        self.open(path, text)
    }

    /// Replaces the text of an open document: unbind, reparse, bind.
    ///
    /// # Errors
    ///
    /// Returns [`UidescError::UnknownDocument`] if `id` is not open.
    pub fn update(&mut self, id: DocumentId, text: impl Into<String>) -> Result<(), UidescError> {
        let name = self
            .documents
            .get(&id)
            .ok_or(UidescError::UnknownDocument(id))?
            .name()
            .to_string();

        self.index.unbind(id)?;
        let document = parse(name, text, &self.schema, self.root_type);
        self.index.bind(id, &document, &self.schema)?;
        debug!(doc:% = id, diagnostics = document.diagnostics().len(); "Document updated");

        self.documents.insert(id, document);
        Ok(())
    }

    /// Unbinds and forgets a document, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`UidescError::UnknownDocument`] if `id` is not open.
    pub fn close(&mut self, id: DocumentId) -> Result<Document, UidescError> {
        let document = self
            .documents
            .shift_remove(&id)
            .ok_or(UidescError::UnknownDocument(id))?;
        self.paths.shift_remove(&id);
        self.index.unbind(id)?;
        info!(doc:% = id, name = document.name(); "Document closed");
        Ok(document)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents.iter().map(|(id, document)| (*id, document))
    }

    /// Diagnostics of an open document, in scan order.
    pub fn diagnostics(&self, id: DocumentId) -> Option<&[Diagnostic]> {
        self.document(id).map(Document::diagnostics)
    }

    pub fn path(&self, id: DocumentId) -> Option<&Path> {
        self.paths.get(&id).map(PathBuf::as_path)
    }

    pub fn index(&self) -> &DescIndex {
        &self.index
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn builder(&self) -> UiBuilder<'_, Self> {
        UiBuilder::new(&self.index, self, &self.schema, self.config.builder())
    }

    pub fn navigator(&self) -> UiNavigator<'_, Self> {
        UiNavigator::new(self.builder())
    }

    /// Namespace entry at a `/`-delimited path such as `GameUI/Main/Title`.
    pub fn lookup(&self, path: &str) -> Option<NamespaceId> {
        self.index.lookup_path(path)
    }

    /// Builds the node for `desc` into `tree` and resolves `selector`
    /// against it.
    ///
    /// # Errors
    ///
    /// Returns the selector parse diagnostic if `selector` is malformed.
    /// Resolution misses are reported through the returned [`Selection`].
    pub fn resolve(
        &self,
        tree: &mut UiTree,
        desc: NamespaceId,
        selector: &str,
    ) -> Result<Selection, Diagnostic> {
        let fragments = parse_selector(selector)?;
        let navigator = self.navigator();
        let selection = match navigator.builder().build_node_from_desc(tree, desc) {
            Some(node) => navigator.resolve_selection(tree, node, &fragments),
            None => Selection::unresolved(fragments.len()),
        };
        debug!(
            selector = selector,
            resolved = selection.chain().len(),
            expected = selection.expected();
            "Selector resolved"
        );
        Ok(selection)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DocumentSource for Workspace {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }
}

/// File stem of `path`, or the whole path when it has none.
fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
