//! Tree builder over the [`Scanner`] token stream.
//!
//! The parser keeps a `current` cursor into the element arena; start tags
//! push a child of `current`, end tags pop back to the parent. Every element
//! is typed against its parent's expected-children table as soon as its tag
//! name is known, and elements whose type depends on `type=` are re-typed
//! when their start tag closes.
//!
//! Malformed input never aborts the parse. The recovery rules are:
//!
//! - an end tag with no open element is ignored;
//! - an end tag naming the parent of `current` closes `current` at the
//!   `</` offset ("missing end tag") and then closes the parent;
//! - any other mismatching end tag is reported and leaves the tree as is;
//! - elements still open at the end of input are closed at the text length;
//! - a second top-level element is reported once, the first one stays the
//!   document's declaration.

use log::{debug, trace};
use uidesc_core::schema::{SchemaRegistry, TypeId};

use crate::{
    document::{Attribute, Document, Element, ElementId},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    scanner::Scanner,
    span::Span,
    token::{Token, TokenKind},
    validate,
};

/// Parses `text` into a [`Document`] named `name`.
///
/// `root_type` is the complex type whose children table types the top-level
/// element; with `None` the whole tree stays untyped.
///
/// # Examples
///
/// ```
/// use uidesc_core::builtin::{layout_schema, LAYOUT_FILE_TYPE};
/// use uidesc_parser::parse;
///
/// let schema = layout_schema();
/// let root_type = schema.type_by_name(LAYOUT_FILE_TYPE);
/// let doc = parse("Main", r#"<Frame type="Button" name="btn"/>"#, &schema, root_type);
///
/// let btn = doc.declared().unwrap();
/// assert_eq!(doc.element(btn).attribute_value("name"), Some("btn"));
/// assert!(doc.diagnostics().is_empty());
/// ```
pub fn parse(
    name: impl Into<String>,
    text: impl Into<String>,
    schema: &SchemaRegistry,
    root_type: Option<TypeId>,
) -> Document {
    let name = name.into();
    let text = text.into();

    let (elements, mut diagnostics) = Parser::new(&text, schema, root_type).run();
    let mut document = Document::new(name, text, elements, Vec::new());
    diagnostics.extend(validate::validate(&document, schema));

    debug!(
        document = document.name(),
        elements = document.len(),
        diagnostics = diagnostics.len();
        "Document parsed"
    );
    document.set_diagnostics(diagnostics.finish());
    document
}

struct Parser<'a> {
    text: &'a str,
    schema: &'a SchemaRegistry,
    scanner: Scanner<'a>,
    elements: Vec<Element>,
    current: ElementId,
    /// Lower-cased key of the attribute awaiting a value.
    pending_attribute: Option<String>,
    end_tag_open: usize,
    /// Element matched by the last end tag name, closed by the next `>`.
    end_tag_target: Option<ElementId>,
    reported_multiple_roots: bool,
    diagnostics: DiagnosticCollector,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, schema: &'a SchemaRegistry, root_type: Option<TypeId>) -> Self {
        let mut root = Element::new(0, text.len(), None);
        root.start_tag_end = Some(0);
        root.closed = true;
        root.ty = root_type;

        Self {
            text,
            schema,
            scanner: Scanner::new(text),
            elements: vec![root],
            current: ElementId::ROOT,
            pending_attribute: None,
            end_tag_open: 0,
            end_tag_target: None,
            reported_multiple_roots: false,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn run(mut self) -> (Vec<Element>, DiagnosticCollector) {
        loop {
            let token = self.scanner.scan();
            if let Some(diagnostic) = self.scanner.take_diagnostic() {
                self.diagnostics.emit(diagnostic);
            }
            match token.kind() {
                TokenKind::Eos => {
                    self.finish();
                    break;
                }
                kind => self.step(kind, token),
            }
        }
        (self.elements, self.diagnostics)
    }

    fn step(&mut self, kind: TokenKind, token: Token) {
        match kind {
            TokenKind::StartTagOpen => self.open_element(token),
            TokenKind::StartTag => self.name_element(token),
            TokenKind::AttributeName => self.add_attribute(token),
            TokenKind::AttributeValue => self.set_attribute_value(token),
            TokenKind::StartTagClose => {
                if self.in_start_tag() {
                    self.close_start_tag(token.end());
                }
            }
            TokenKind::StartTagSelfClose => {
                if self.in_start_tag() {
                    self.close_start_tag(token.end());
                    let id = self.current;
                    let element = self.element_mut(id);
                    element.end = token.end();
                    element.closed = true;
                    element.self_closed = true;
                    let parent = element.parent.unwrap_or(ElementId::ROOT);
                    self.current = parent;
                }
            }
            TokenKind::EndTagOpen => {
                self.end_tag_target = None;
                if self.in_start_tag() {
                    self.close_start_tag(token.start());
                }
                self.end_tag_open = token.start();
            }
            TokenKind::EndTag => self.match_end_tag(token),
            TokenKind::EndTagClose => {
                if let Some(target) = self.end_tag_target.take() {
                    let element = self.element_mut(target);
                    element.end = token.end();
                    element.closed = true;
                    let parent = element.parent.unwrap_or(ElementId::ROOT);
                    self.current = parent;
                }
            }
            TokenKind::DelimiterAssign
            | TokenKind::Content
            | TokenKind::StartCommentTag
            | TokenKind::Comment
            | TokenKind::EndCommentTag
            | TokenKind::StartDoctypeTag
            | TokenKind::Doctype
            | TokenKind::EndDoctypeTag
            | TokenKind::Whitespace
            | TokenKind::Unknown
            | TokenKind::Eos => {}
        }
    }

    fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.index()]
    }

    /// `current` is a real element whose start tag has not been closed yet.
    fn in_start_tag(&self) -> bool {
        self.current != ElementId::ROOT && self.element(self.current).start_tag_end.is_none()
    }

    fn open_element(&mut self, token: Token) {
        self.end_tag_target = None;
        self.pending_attribute = None;
        if self.in_start_tag() {
            // Start tag interrupted by a new `<`.
            self.close_start_tag(token.start());
        }

        let parent = self.current;
        if parent == ElementId::ROOT && !self.element(parent).children.is_empty() {
            if !self.reported_multiple_roots {
                self.reported_multiple_roots = true;
                self.diagnostics.emit(
                    Diagnostic::error("a document must have a single top-level element")
                        .with_code(ErrorCode::E104)
                        .with_span(token.span())
                        .with_help("only the first top-level element is indexed"),
                );
            }
        }

        let id = ElementId::new(self.elements.len());
        self.elements
            .push(Element::new(token.start(), self.text.len(), Some(parent)));
        self.element_mut(parent).children.push(id);
        self.current = id;
    }

    fn name_element(&mut self, token: Token) {
        let id = self.current;
        if id == ElementId::ROOT {
            return;
        }
        let schema = self.schema;
        let tag = token.text(self.text);
        let parent_ty = self
            .element(id)
            .parent
            .and_then(|parent| self.element(parent).ty);

        let element = self.element_mut(id);
        element.tag = Some(tag.to_string());
        element.tag_span = Some(token.span());

        let Some(parent_ty) = parent_ty else {
            return;
        };
        let parent_type = schema.complex_type(parent_ty);
        match parent_type.child(tag) {
            Some(def) => {
                let ty = schema.element_def(def).ty();
                let element = self.element_mut(id);
                element.def = Some(def);
                element.ty = Some(ty);
            }
            None if parent_type.allows_extra_children() => {}
            None => {
                trace!(tag = tag, parent = parent_type.name(); "Unknown child element");
                self.diagnostics.emit(
                    Diagnostic::message(format!(
                        "unknown element `{tag}` in `{}`",
                        parent_type.name()
                    ))
                    .with_code(ErrorCode::E200)
                    .with_span(token.span()),
                );
            }
        }
    }

    fn add_attribute(&mut self, token: Token) {
        self.pending_attribute = None;
        if !self.in_start_tag() {
            return;
        }
        let name = token.text(self.text);
        let key = name.to_ascii_lowercase();
        let id = self.current;

        if self.element(id).attributes.contains_key(&key) {
            self.diagnostics.emit(
                Diagnostic::warning(format!("duplicate attribute `{name}`"))
                    .with_code(ErrorCode::E105)
                    .with_span(token.span())
                    .with_help("the first occurrence is used"),
            );
            return;
        }

        self.element_mut(id).attributes.insert(
            key.clone(),
            Attribute {
                name: name.to_string(),
                name_span: token.span(),
                value: None,
                value_span: None,
            },
        );
        self.pending_attribute = Some(key);
    }

    fn set_attribute_value(&mut self, token: Token) {
        let Some(key) = self.pending_attribute.take() else {
            return;
        };
        let id = self.current;
        let raw = token.text(self.text);
        if let Some(attribute) = self.element_mut(id).attributes.get_mut(&key) {
            attribute.value = Some(unquote(raw).to_string());
            attribute.value_span = Some(token.span());
        }
    }

    fn close_start_tag(&mut self, offset: usize) {
        let id = self.current;
        self.pending_attribute = None;
        self.element_mut(id).start_tag_end = Some(offset);
        self.resolve_alternation(id);
    }

    /// Re-types an element whose concrete type depends on `type=`.
    fn resolve_alternation(&mut self, id: ElementId) {
        let schema = self.schema;
        let element = self.element(id);
        if element.alternation_failed {
            return;
        }
        let Some(def) = element.def.map(|def| schema.element_def(def)) else {
            return;
        };
        if !def.has_alternation() {
            return;
        }
        // Without `type=` the default type applies.
        let Some(attribute) = element.attribute("type") else {
            return;
        };
        let value = attribute.value().unwrap_or_default();

        match def.alternative(value) {
            Some(ty) => self.element_mut(id).ty = Some(ty),
            None => {
                let span = attribute.value_span.unwrap_or(attribute.name_span);
                let message = format!("unknown type `{value}` for `{}`", def.name());
                self.element_mut(id).alternation_failed = true;
                self.diagnostics.emit(
                    Diagnostic::warning(message)
                        .with_code(ErrorCode::E201)
                        .with_span(span),
                );
            }
        }
    }

    fn match_end_tag(&mut self, token: Token) {
        let cur = self.current;
        if cur == ElementId::ROOT {
            return;
        }
        let name = token.text(self.text);
        let open = self.end_tag_open;

        if self.element(cur).tag() == Some(name) {
            self.element_mut(cur).end_tag_start = Some(open);
            self.end_tag_target = Some(cur);
            return;
        }

        let parent = self.element(cur).parent.filter(|p| *p != ElementId::ROOT);
        if let Some(parent) = parent.filter(|p| self.element(*p).tag() == Some(name)) {
            let element = self.element(cur);
            let span = element
                .tag_span
                .unwrap_or_else(|| Span::new(element.start..element.start));
            let message = format!("missing end tag for `{}`", element.tag().unwrap_or_default());
            self.diagnostics.emit(
                Diagnostic::error(message)
                    .with_code(ErrorCode::E101)
                    .with_span(span),
            );
            let element = self.element_mut(cur);
            element.end = open;
            element.closed = false;

            self.current = parent;
            self.element_mut(parent).end_tag_start = Some(open);
            self.end_tag_target = Some(parent);
            return;
        }

        let expected = self.element(cur).tag().unwrap_or_default();
        let diagnostic = Diagnostic::error(format!(
            "end tag mismatch: expected `</{expected}>`, found `</{name}>`"
        ))
        .with_code(ErrorCode::E100)
        .with_span(token.span());
        self.diagnostics.emit(diagnostic);
    }

    /// Closes every element still open at the end of input.
    fn finish(&mut self) {
        let len = self.text.len();
        let mut id = self.current;
        while id != ElementId::ROOT {
            if self.element(id).start_tag_end.is_none() {
                self.element_mut(id).start_tag_end = Some(len);
                self.resolve_alternation(id);
            }

            let element = self.element(id);
            let tag = element.tag().unwrap_or_default();
            let span = element
                .tag_span
                .unwrap_or_else(|| Span::new(element.start..element.start));
            let diagnostic = if element.end_tag_start.is_some() {
                Diagnostic::error(format!("end tag for `{tag}` not appropriately closed"))
                    .with_code(ErrorCode::E103)
                    .with_help("add `>` to finish the end tag")
            } else {
                Diagnostic::error(format!("expected end tag `</{tag}>`")).with_code(ErrorCode::E102)
            };
            self.diagnostics.emit(diagnostic.with_span(span));

            let element = self.element_mut(id);
            element.end = len;
            element.closed = false;
            id = element.parent.unwrap_or(ElementId::ROOT);
        }
        self.current = ElementId::ROOT;
    }
}

/// Strips matching surrounding quotes; an unterminated value loses only its
/// opening quote.
fn unquote(raw: &str) -> &str {
    let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return raw;
    };
    let inner = &raw[1..];
    inner.strip_suffix(quote).unwrap_or(inner)
}
