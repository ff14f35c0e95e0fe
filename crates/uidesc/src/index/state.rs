//! Per-document binding records.

use indexmap::IndexMap;
use uidesc_parser::ElementId;

use super::NamespaceId;

/// Everything one `bind` call added to the index, so `unbind` can undo it
/// without re-deriving anything from the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    file_namespace: NamespaceId,
    text: String,
    pub(crate) bindings: IndexMap<ElementId, NamespaceId>,
    pub(crate) template_refs: Vec<(String, NamespaceId)>,
    /// `(file, relative name, namespace)`
    pub(crate) file_refs: Vec<(String, String, NamespaceId)>,
    pub(crate) constants: Vec<(String, ElementId)>,
    pub(crate) handles: Vec<(String, ElementId)>,
}

impl DocumentState {
    pub(crate) fn new(file_namespace: NamespaceId, text: &str) -> Self {
        Self {
            file_namespace,
            text: text.to_string(),
            bindings: IndexMap::new(),
            template_refs: Vec::new(),
            file_refs: Vec::new(),
            constants: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// The file-scope entry named after the document.
    pub fn file_namespace(&self) -> NamespaceId {
        self.file_namespace
    }

    /// Source text the document was bound with.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Namespace entry an element was bound to.
    pub fn binding(&self, element: ElementId) -> Option<NamespaceId> {
        self.bindings.get(&element).copied()
    }

    /// Element bindings in binding order.
    pub fn bindings(&self) -> impl Iterator<Item = (ElementId, NamespaceId)> + '_ {
        self.bindings.iter().map(|(element, ns)| (*element, *ns))
    }

    pub fn template_refs(&self) -> &[(String, NamespaceId)] {
        &self.template_refs
    }

    pub fn file_refs(&self) -> &[(String, String, NamespaceId)] {
        &self.file_refs
    }

    pub fn constants(&self) -> &[(String, ElementId)] {
        &self.constants
    }

    pub fn handles(&self) -> &[(String, ElementId)] {
        &self.handles
    }
}
