//! The declaration index.
//!
//! [`DescIndex`] keeps one namespace tree for every bound document:
//!
//! ```text
//! (root)
//! ├── GameUI            file entry, one per document name
//! │   ├── Main          frame
//! │   │   ├── Title     frame
//! │   │   └── FadeIn    animation
//! │   └── Button_0      anonymous frame
//! └── Base
//!     └── Shared
//! ```
//!
//! Entries with the same name in the same scope are merged: the entry
//! collects every element declaring it. Next to the tree the index keeps
//! four reverse lookups (template references, file-extension references,
//! constants and handles) and a [`DocumentState`] per bound document that
//! records exactly what binding added.

mod namespace;
mod state;
mod xref;

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use uidesc_core::{
    identifier::Id,
    schema::{NodeKind, SchemaRegistry, ValueKind},
};
use uidesc_parser::{Document, Element, ElementId};

pub use namespace::{DescNamespace, NamespaceId, NamespaceKind};
pub use state::DocumentState;
pub use xref::{RefSet, XRefItem, XRefKind, XRefMap};

use crate::{config::IndexConfig, error::IndexError};

/// Identifier of an open document, assigned by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u32);

impl DocumentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element of a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclRef {
    doc: DocumentId,
    element: ElementId,
}

impl DeclRef {
    pub fn new(doc: DocumentId, element: ElementId) -> Self {
        Self { doc, element }
    }

    pub fn doc(&self) -> DocumentId {
        self.doc
    }

    pub fn element(&self) -> ElementId {
        self.element
    }
}

/// What a walk below a declaration may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkMode {
    /// Frames and file scopes: nested declarations get namespace entries.
    Declarations,
    /// Animations and state groups: only constants and handles.
    CrossRefsOnly,
}

/// Inputs shared by every step of one `bind`.
struct BindContext<'a> {
    doc: DocumentId,
    document: &'a Document,
    schema: &'a SchemaRegistry,
}

/// Namespace tree plus reverse indices over all bound documents.
#[derive(Debug, Clone)]
pub struct DescIndex {
    config: IndexConfig,
    namespaces: Vec<Option<DescNamespace>>,
    free: Vec<NamespaceId>,
    template_refs: IndexMap<String, RefSet>,
    file_refs: IndexMap<String, IndexMap<String, RefSet>>,
    constants: XRefMap,
    handles: XRefMap,
    documents: IndexMap<DocumentId, DocumentState>,
}

impl Default for DescIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl DescIndex {
    pub fn new(config: IndexConfig) -> Self {
        let root = DescNamespace::new(NamespaceKind::Root, Id::new(""), None);
        Self {
            config,
            namespaces: vec![Some(root)],
            free: Vec::new(),
            template_refs: IndexMap::new(),
            file_refs: IndexMap::new(),
            constants: XRefMap::new(XRefKind::Constant),
            handles: XRefMap::new(XRefKind::Handle),
            documents: IndexMap::new(),
        }
    }

    /// Drops every binding, leaving an empty root.
    pub fn clear(&mut self) {
        debug!(documents = self.documents.len(); "Clearing declaration index");
        *self = Self::new(self.config.clone());
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Adds every declaration of `document` to the index and returns the
    /// document's file-scope entry.
    ///
    /// Binding a document again with the same text changes nothing.
    ///
    /// # Errors
    ///
    /// [`IndexError::AlreadyBound`] if `doc` is bound with different text;
    /// unbind it first.
    pub fn bind(
        &mut self,
        doc: DocumentId,
        document: &Document,
        schema: &SchemaRegistry,
    ) -> Result<NamespaceId, IndexError> {
        if let Some(state) = self.documents.get(&doc) {
            if state.text() == document.text() {
                trace!(doc:% = doc; "Document already bound with identical text");
                return Ok(state.file_namespace());
            }
            return Err(IndexError::AlreadyBound(doc));
        }

        let file_ns = self.get_or_create_child(
            NamespaceId::new(0),
            Id::new(document.name()),
            NamespaceKind::File,
        );
        self.add_decl(file_ns, DeclRef::new(doc, ElementId::ROOT));

        let cx = BindContext {
            doc,
            document,
            schema,
        };
        let mut state = DocumentState::new(file_ns, document.text());
        if let Some(top) = document.declared() {
            self.bind_element(&cx, &mut state, top, file_ns, WalkMode::Declarations);
        }

        debug!(
            doc:% = doc,
            document = document.name(),
            bindings = state.bindings.len(),
            template_refs = state.template_refs.len(),
            file_refs = state.file_refs.len(),
            constants = state.constants.len(),
            handles = state.handles.len();
            "Document bound"
        );
        self.documents.insert(doc, state);
        Ok(file_ns)
    }

    fn bind_element(
        &mut self,
        cx: &BindContext<'_>,
        state: &mut DocumentState,
        id: ElementId,
        scope: NamespaceId,
        mode: WalkMode,
    ) {
        let element = cx.document.element(id);
        match element.kind(cx.schema) {
            NodeKind::Constant => {
                if let Some(name) = element.attribute_value("name") {
                    trace!(name = name; "Constant registered");
                    self.constants.insert(name, DeclRef::new(cx.doc, id));
                    state.constants.push((name.to_string(), id));
                }
            }
            NodeKind::FrameProperty => {
                if let Some(name) = handle_name(element, cx.schema) {
                    trace!(name = name; "Handle registered");
                    self.handles.insert(name, DeclRef::new(cx.doc, id));
                    state.handles.push((name.to_string(), id));
                }
            }
            kind @ (NodeKind::Frame | NodeKind::Animation | NodeKind::StateGroup)
                if mode == WalkMode::Declarations =>
            {
                let Some(ns) = self.declare(cx, state, id, scope, kind) else {
                    return;
                };
                let child_mode = if kind == NodeKind::Frame {
                    WalkMode::Declarations
                } else {
                    WalkMode::CrossRefsOnly
                };
                for child in element.children() {
                    self.bind_element(cx, state, *child, ns, child_mode);
                }
            }
            NodeKind::Frame | NodeKind::Animation | NodeKind::StateGroup | NodeKind::Other => {
                for child in element.children() {
                    self.bind_element(cx, state, *child, scope, mode);
                }
            }
        }
    }

    /// Binds one declaration-bearing element under `scope`.
    fn declare(
        &mut self,
        cx: &BindContext<'_>,
        state: &mut DocumentState,
        id: ElementId,
        scope: NamespaceId,
        kind: NodeKind,
    ) -> Option<NamespaceId> {
        let element = cx.document.element(id);
        let name = match element.attribute_value("name") {
            Some(name) => Id::new(name),
            None => self.anonymous_name(element, scope)?,
        };
        let ns_kind = NamespaceKind::from_node_kind(kind)?;

        let ns = self.get_or_create_child(scope, name, ns_kind);
        self.add_decl(ns, DeclRef::new(cx.doc, id));
        state.bindings.insert(id, ns);

        if let Some(file) = element.attribute_value("file") {
            let relative = self.relative_name(ns);
            trace!(file = file, relative = relative.as_str(); "File extension registered");
            self.file_refs
                .entry(file.to_string())
                .or_default()
                .entry(relative.clone())
                .or_default()
                .acquire(ns);
            state.file_refs.push((file.to_string(), relative, ns));
        }
        if let Some(template) = element.attribute_value("template") {
            trace!(template = template; "Template reference registered");
            self.template_refs
                .entry(template.to_string())
                .or_default()
                .acquire(ns);
            state.template_refs.push((template.to_string(), ns));
        }
        Some(ns)
    }

    /// First `{type}_{i}` not yet used in `scope`, within the configured
    /// number of candidates.
    fn anonymous_name(&self, element: &Element, scope: NamespaceId) -> Option<Id> {
        let prefix = element
            .attribute_value("type")
            .or_else(|| element.tag())
            .unwrap_or_default();
        let scope_ns = self.namespace(scope);
        let limit = self.config.anonymous_name_limit();

        let found = (0..limit)
            .map(|idx| Id::anonymous(prefix, idx))
            .find(|candidate| scope_ns.child(*candidate).is_none());
        if found.is_none() {
            warn!(
                prefix = prefix,
                limit = limit,
                start = element.start();
                "No free anonymous name, declaration left out of the index"
            );
        }
        found
    }

    /// Removes everything `doc` added to the index.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotBound`] if `doc` is not bound.
    pub fn unbind(&mut self, doc: DocumentId) -> Result<(), IndexError> {
        let state = self
            .documents
            .shift_remove(&doc)
            .ok_or(IndexError::NotBound(doc))?;

        for (name, element) in &state.constants {
            self.constants.remove(name, DeclRef::new(doc, *element));
        }
        for (name, element) in &state.handles {
            self.handles.remove(name, DeclRef::new(doc, *element));
        }

        for (template, ns) in &state.template_refs {
            if let Some(set) = self.template_refs.get_mut(template) {
                set.release(*ns);
                if set.is_empty() {
                    self.template_refs.shift_remove(template);
                }
            }
        }
        for (file, relative, ns) in &state.file_refs {
            if let Some(by_name) = self.file_refs.get_mut(file) {
                if let Some(set) = by_name.get_mut(relative) {
                    set.release(*ns);
                    if set.is_empty() {
                        by_name.shift_remove(relative);
                    }
                }
                if by_name.is_empty() {
                    self.file_refs.shift_remove(file);
                }
            }
        }

        // Deepest bindings first, so children are gone before their parents
        // are considered for pruning.
        for (element, ns) in state.bindings.iter().rev() {
            self.remove_decl(*ns, DeclRef::new(doc, *element));
            self.prune(*ns);
        }

        let file_ns = state.file_namespace();
        self.remove_decl(file_ns, DeclRef::new(doc, ElementId::ROOT));
        if self.namespace(file_ns).is_orphan() {
            self.release(file_ns);
        }

        debug!(doc:% = doc, bindings = state.bindings.len(); "Document unbound");
        Ok(())
    }

    pub fn is_bound(&self, doc: DocumentId) -> bool {
        self.documents.contains_key(&doc)
    }

    pub fn document_state(&self, doc: DocumentId) -> Option<&DocumentState> {
        self.documents.get(&doc)
    }

    /// Bound documents in binding order.
    pub fn bound_documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    // ========================================================================
    // Tree maintenance
    // ========================================================================

    fn get_or_create_child(
        &mut self,
        parent: NamespaceId,
        name: Id,
        kind: NamespaceKind,
    ) -> NamespaceId {
        if let Some(existing) = self.namespace(parent).child(name) {
            if self.namespace(existing).kind == NamespaceKind::Undeclared {
                self.namespace_mut(existing).kind = kind;
            }
            return existing;
        }

        let entry = DescNamespace::new(kind, name, Some(parent));
        let id = match self.free.pop() {
            Some(id) => {
                self.namespaces[id.index()] = Some(entry);
                id
            }
            None => {
                self.namespaces.push(Some(entry));
                NamespaceId::new(self.namespaces.len() - 1)
            }
        };
        self.namespace_mut(parent).children.insert(name, id);
        id
    }

    fn add_decl(&mut self, ns: NamespaceId, decl: DeclRef) {
        self.namespace_mut(ns).decls.insert(decl);
    }

    /// Drops one declaration of `ns`. An entry left without declarations
    /// but with children turns `Undeclared` until a new declaration claims
    /// it again.
    fn remove_decl(&mut self, ns: NamespaceId, decl: DeclRef) {
        let entry = self.namespace_mut(ns);
        entry.decls.shift_remove(&decl);
        if entry.decls.is_empty() && !entry.kind.is_scope() && !entry.children.is_empty() {
            entry.kind = NamespaceKind::Undeclared;
        }
    }

    /// Removes `ns` and then each ancestor left without declarations and
    /// children, stopping at file and root entries.
    fn prune(&mut self, ns: NamespaceId) {
        let mut current = Some(ns);
        while let Some(id) = current {
            let entry = self.namespace(id);
            if entry.kind.is_scope() || !entry.is_orphan() {
                break;
            }
            current = entry.parent;
            trace!(name:% = entry.name; "Pruning namespace entry");
            self.release(id);
        }
    }

    /// Detaches `ns` from its parent and frees its slot.
    fn release(&mut self, ns: NamespaceId) {
        let entry = self.namespaces[ns.index()].take();
        if let Some(entry) = entry {
            if let Some(parent) = entry.parent {
                if let Some(parent) = self.namespaces[parent.index()].as_mut() {
                    parent.children.shift_remove(&entry.name);
                }
            }
            self.free.push(ns);
        }
    }

    fn namespace_mut(&mut self, id: NamespaceId) -> &mut DescNamespace {
        match self.namespaces[id.index()].as_mut() {
            Some(entry) => entry,
            None => panic!("namespace {id:?} was pruned"),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn root(&self) -> NamespaceId {
        NamespaceId::new(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was pruned.
    pub fn namespace(&self, id: NamespaceId) -> &DescNamespace {
        match self.get(id) {
            Some(entry) => entry,
            None => panic!("namespace {id:?} was pruned"),
        }
    }

    pub fn get(&self, id: NamespaceId) -> Option<&DescNamespace> {
        self.namespaces.get(id.index()).and_then(Option::as_ref)
    }

    /// Number of live namespace entries, the root included.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len() - self.free.len()
    }

    pub fn child(&self, parent: NamespaceId, name: &str) -> Option<NamespaceId> {
        self.get(parent)?.child(Id::new(name))
    }

    /// Follows a `/`-delimited path from the root; the first segment names
    /// the file.
    pub fn lookup_path(&self, path: &str) -> Option<NamespaceId> {
        self.lookup_segments(self.root(), &Id::split_path(path))
    }

    pub fn lookup_segments(&self, from: NamespaceId, segments: &[Id]) -> Option<NamespaceId> {
        segments
            .iter()
            .try_fold(from, |ns, segment| self.get(ns)?.child(*segment))
    }

    /// Names from `ns` up to and excluding the root, outermost first.
    pub fn path_segments(&self, ns: NamespaceId) -> Vec<Id> {
        let mut segments = Vec::new();
        let mut current = self.get(ns);
        while let Some(entry) = current.filter(|e| e.kind != NamespaceKind::Root) {
            segments.push(entry.name);
            current = entry.parent.and_then(|parent| self.get(parent));
        }
        segments.reverse();
        segments
    }

    /// Full path from the root, e.g. `GameUI/Main/Title`.
    pub fn full_name(&self, ns: NamespaceId) -> String {
        Id::join_path(&self.path_segments(ns))
    }

    /// Path below the owning file entry, e.g. `Main/Title`.
    pub fn relative_name(&self, ns: NamespaceId) -> String {
        let segments = self.path_segments(ns);
        Id::join_path(segments.get(1..).unwrap_or_default())
    }

    /// The file entry `ns` belongs to.
    pub fn owning_file(&self, ns: NamespaceId) -> Option<NamespaceId> {
        let mut current = Some(ns);
        while let Some(id) = current {
            let entry = self.get(id)?;
            if entry.kind == NamespaceKind::File {
                return Some(id);
            }
            current = entry.parent;
        }
        None
    }

    /// Entries whose declarations reference `template`.
    pub fn template_refs(&self, template: &str) -> Option<&RefSet> {
        self.template_refs.get(template)
    }

    /// All template reference keys.
    pub fn template_keys(&self) -> impl Iterator<Item = &str> {
        self.template_refs.keys().map(String::as_str)
    }

    /// Entries declaring themselves extensions of `relative` in `file`.
    pub fn file_refs(&self, file: &str, relative: &str) -> Option<&RefSet> {
        self.file_refs.get(file)?.get(relative)
    }

    /// All `(file, relative name)` file-extension keys.
    pub fn file_ref_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.file_refs.iter().flat_map(|(file, by_name)| {
            by_name
                .keys()
                .map(move |relative| (file.as_str(), relative.as_str()))
        })
    }

    /// Extensions of `ns`, looked up by its owning file name and relative name.
    pub fn extensions_of(&self, ns: NamespaceId) -> impl Iterator<Item = NamespaceId> + '_ {
        let set = self.owning_file(ns).and_then(|file| {
            let file = self.namespace(file).name().as_string();
            self.file_refs(&file, &self.relative_name(ns))
        });
        set.into_iter()
            .flat_map(RefSet::iter)
            .filter(move |ext| *ext != ns)
    }

    pub fn constants(&self) -> &XRefMap {
        &self.constants
    }

    pub fn handles(&self) -> &XRefMap {
        &self.handles
    }

    /// Nearest namespace entry bound to `element` or one of its ancestors,
    /// optionally restricted to `kind`.
    ///
    /// Returns `None` when `doc` is not bound.
    pub fn resolve_element_desc(
        &self,
        doc: DocumentId,
        document: &Document,
        element: ElementId,
        kind: Option<NamespaceKind>,
    ) -> Option<NamespaceId> {
        let state = self.documents.get(&doc)?;
        let matches = |ns: NamespaceId| kind.is_none_or(|kind| self.namespace(ns).kind() == kind);

        for id in document.ancestors(element) {
            if id == ElementId::ROOT {
                let file = state.file_namespace();
                return matches(file).then_some(file);
            }
            if let Some(ns) = state.binding(id).filter(|ns| matches(*ns)) {
                return Some(ns);
            }
        }
        None
    }
}

/// Name of a handle declared by a frame property, if its `val` attribute is
/// handle-typed.
fn handle_name<'a>(element: &'a Element, schema: &SchemaRegistry) -> Option<&'a str> {
    let ty = schema.complex_type(element.ty()?);
    let val = ty.attribute("val")?;
    if val.value_type().kind() != ValueKind::Handle {
        return None;
    }
    element.attribute_value("val").filter(|name| !name.is_empty())
}
