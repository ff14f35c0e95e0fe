//! Parsed documents and their element arena.
//!
//! A [`Document`] owns its source text, every [`Element`] of its tree and the
//! diagnostics produced while parsing it. Elements are addressed by
//! [`ElementId`]; index `0` is the synthetic document root, which has no tag
//! and spans the whole text.

use indexmap::IndexMap;
use uidesc_core::schema::{ElementDefId, NodeKind, SchemaRegistry, TypeId};

use crate::{error::Diagnostic, span::Span};

/// Index of an [`Element`] inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    /// The synthetic document root.
    pub const ROOT: ElementId = ElementId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One attribute of an element, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) name: String,
    pub(crate) name_span: Span,
    pub(crate) value: Option<String>,
    pub(crate) value_span: Option<Span>,
}

impl Attribute {
    /// Attribute name with its original casing.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_span(&self) -> Span {
        self.name_span
    }

    /// Value without its surrounding quotes; `None` for a bare attribute.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Span of the value token, quotes included.
    pub fn value_span(&self) -> Option<Span> {
        self.value_span
    }
}

/// A node of the parsed element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) tag: Option<String>,
    pub(crate) tag_span: Option<Span>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) start_tag_end: Option<usize>,
    pub(crate) end_tag_start: Option<usize>,
    pub(crate) closed: bool,
    pub(crate) self_closed: bool,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    /// Keyed by lower-cased attribute name.
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) ty: Option<TypeId>,
    pub(crate) def: Option<ElementDefId>,
    pub(crate) alternation_failed: bool,
}

impl Element {
    pub(crate) fn new(start: usize, end: usize, parent: Option<ElementId>) -> Self {
        Self {
            tag: None,
            tag_span: None,
            start,
            end,
            start_tag_end: None,
            end_tag_start: None,
            closed: false,
            self_closed: false,
            parent,
            children: Vec::new(),
            attributes: IndexMap::new(),
            ty: None,
            def: None,
            alternation_failed: false,
        }
    }

    /// Tag name; `None` for the document root and for `<` without a name.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn tag_span(&self) -> Option<Span> {
        self.tag_span
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.start..self.end)
    }

    /// Offset where the element's content begins.
    pub fn start_tag_end(&self) -> usize {
        self.start_tag_end.unwrap_or(self.end)
    }

    /// Offset of the `</` of a matching end tag, if one was seen.
    pub fn end_tag_start(&self) -> Option<usize> {
        self.end_tag_start
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_self_closed(&self) -> bool {
        self.self_closed
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Looks up an attribute by name, case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.attributes.get(&name.to_ascii_lowercase())
        } else {
            self.attributes.get(name)
        }
    }

    /// Unquoted value of an attribute, if present and valued.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Attribute::value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attributes in source order, keyed by lower-cased name.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(key, attr)| (key.as_str(), attr))
    }

    /// Schema type assigned while parsing.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    /// Expected-child descriptor matched under the parent.
    pub fn def(&self) -> Option<ElementDefId> {
        self.def
    }

    /// `true` when the `type=` value named no known alternative.
    pub fn alternation_failed(&self) -> bool {
        self.alternation_failed
    }

    /// Node kind from the matched element definition, `Other` when unmatched.
    pub fn kind(&self, schema: &SchemaRegistry) -> NodeKind {
        self.def
            .map_or(NodeKind::Other, |def| schema.element_def(def).kind())
    }
}

/// One parsed file.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    text: String,
    elements: Vec<Element>,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub(crate) fn new(
        name: String,
        text: String,
        elements: Vec<Element>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            name,
            text,
            elements,
            diagnostics,
        }
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    /// Declaration name, usually the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn root(&self) -> ElementId {
        ElementId::ROOT
    }

    /// The first top-level element, if any.
    pub fn declared(&self) -> Option<ElementId> {
        self.element(ElementId::ROOT).children.first().copied()
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Number of elements, the synthetic root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    /// Every element in document order, root first.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(idx, element)| (ElementId::new(idx), element))
    }

    /// `id` followed by its ancestors up to and including the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), |id| self.get(*id).and_then(Element::parent))
    }

    /// Deepest non-root element whose span contains `offset`.
    pub fn element_at(&self, offset: usize) -> Option<ElementId> {
        let mut current = ElementId::ROOT;
        'descend: loop {
            for child in self.element(current).children() {
                let element = self.element(*child);
                if element.start <= offset && offset < element.end {
                    current = *child;
                    continue 'descend;
                }
            }
            break;
        }
        (current != ElementId::ROOT).then_some(current)
    }
}
