//! Unit tests for tree building, error recovery and schema typing.

use uidesc_core::{
    builtin::{LAYOUT_FILE_TYPE, layout_schema},
    schema::{NodeKind, SchemaRegistry},
};

use crate::{
    document::{Document, ElementId},
    error::{ErrorCode, Severity},
    parse,
};

/// Parses `text` against the builtin layout schema.
fn parse_layout(text: &str) -> (Document, SchemaRegistry) {
    let schema = layout_schema();
    let root_type = schema.type_by_name(LAYOUT_FILE_TYPE);
    let doc = parse("Test", text, &schema, root_type);
    (doc, schema)
}

/// Error codes of all diagnostics, in order.
fn codes(doc: &Document) -> Vec<Option<ErrorCode>> {
    doc.diagnostics().iter().map(|d| d.code()).collect()
}

fn child(doc: &Document, parent: ElementId, idx: usize) -> ElementId {
    doc.element(parent).children()[idx]
}

#[test]
fn test_button_with_animation() {
    let text = r#"<Frame type="Button" name="btn"><Animation name="A1"/></Frame>"#;
    let (doc, schema) = parse_layout(text);

    assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());

    let btn = doc.declared().unwrap();
    let frame = doc.element(btn);
    assert_eq!(frame.tag(), Some("Frame"));
    assert_eq!(frame.kind(&schema), NodeKind::Frame);
    assert_eq!(frame.ty(), schema.type_by_name("CButtonDesc"));
    assert!(frame.is_closed());
    assert_eq!(frame.end(), text.len());

    let anim = child(&doc, btn, 0);
    let animation = doc.element(anim);
    assert_eq!(animation.kind(&schema), NodeKind::Animation);
    assert!(animation.is_self_closed());
    assert!(animation.children().is_empty());
    assert_eq!(animation.parent(), Some(btn));
}

#[test]
fn test_unknown_child_is_kept_untyped() {
    let (doc, _) = parse_layout(r#"<Frame name="X"><Bogus/></Frame>"#);

    let diagnostics = doc.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Message);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E200));
    assert!(diagnostics[0].text().contains("Bogus"));

    let x = doc.declared().unwrap();
    let bogus = doc.element(child(&doc, x, 0));
    assert_eq!(bogus.tag(), Some("Bogus"));
    assert!(bogus.ty().is_none());
    assert!(bogus.def().is_none());
}

#[test]
fn test_end_tag_of_parent_closes_current() {
    let text = r#"<Frame name="a"><Animation name="b"></Frame>"#;
    let (doc, _) = parse_layout(text);

    assert_eq!(codes(&doc), [Some(ErrorCode::E101)]);

    let a = doc.declared().unwrap();
    let b = doc.element(child(&doc, a, 0));
    assert_eq!(b.end(), text.find("</Frame>").unwrap());
    assert!(!b.is_closed());

    let frame = doc.element(a);
    assert!(frame.is_closed());
    assert_eq!(frame.end(), text.len());
    assert_eq!(frame.end_tag_start(), text.find("</Frame>"));
}

#[test]
fn test_end_tag_mismatch_keeps_position() {
    let text = r#"<Frame name="a"></Bogus><Animation name="b"/></Frame>"#;
    let (doc, _) = parse_layout(text);

    assert_eq!(codes(&doc), [Some(ErrorCode::E100)]);
    let a = doc.declared().unwrap();
    assert_eq!(doc.element(a).children().len(), 1);
    assert!(doc.element(a).is_closed());
}

#[test]
fn test_stray_end_tag_is_ignored() {
    let (doc, _) = parse_layout(r#"</Frame><Frame name="a"/>"#);
    assert!(doc.diagnostics().is_empty());
    assert_eq!(doc.element(ElementId::ROOT).children().len(), 1);
}

#[test]
fn test_unclosed_elements_at_end_of_input() {
    let text = r#"<Frame name="a"><Animation name="b">"#;
    let (doc, _) = parse_layout(text);

    assert_eq!(codes(&doc), [Some(ErrorCode::E102), Some(ErrorCode::E102)]);
    assert!(doc.diagnostics()[0].text().contains("Animation"));
    assert!(doc.diagnostics()[1].text().contains("Frame"));

    for (id, element) in doc.elements().skip(1) {
        assert_eq!(element.end(), text.len(), "{id:?}");
        assert!(!element.is_closed());
    }
}

#[test]
fn test_end_tag_not_appropriately_closed() {
    let text = r#"<Frame name="a"></Frame"#;
    let (doc, _) = parse_layout(text);

    assert_eq!(codes(&doc), [Some(ErrorCode::E103)]);
    let a = doc.element(doc.declared().unwrap());
    assert_eq!(a.end(), text.len());
    assert_eq!(a.end_tag_start(), Some(16));
}

#[test]
fn test_multiple_top_level_reported_once() {
    let (doc, _) = parse_layout(r#"<Frame name="a"/><Frame name="b"/><Frame name="c"/>"#);

    assert_eq!(codes(&doc), [Some(ErrorCode::E104)]);
    let first = doc.declared().unwrap();
    assert_eq!(doc.element(first).attribute_value("name"), Some("a"));
}

#[test]
fn test_unknown_type_alternative() {
    let (doc, schema) = parse_layout(r#"<Frame type="Slider" name="s"/>"#);

    assert_eq!(codes(&doc), [Some(ErrorCode::E201)]);
    let s = doc.element(doc.declared().unwrap());
    assert!(s.alternation_failed());
    assert_eq!(s.ty(), schema.type_by_name("CFrameDesc"));
}

#[test]
fn test_attribute_names_fold_case() {
    let (doc, schema) = parse_layout(r#"<Frame NAME="x" Type='button'/>"#);

    assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());
    let x = doc.element(doc.declared().unwrap());
    assert_eq!(x.attribute_value("name"), Some("x"));
    assert_eq!(x.attribute("Name").unwrap().name(), "NAME");
    assert_eq!(x.ty(), schema.type_by_name("CButtonDesc"));
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (doc, _) = parse_layout(r#"<Frame name="a" name="b"/>"#);

    assert_eq!(codes(&doc), [Some(ErrorCode::E105)]);
    let a = doc.element(doc.declared().unwrap());
    assert_eq!(a.attribute_value("name"), Some("a"));
}

#[test]
fn test_schema_attribute_validation() {
    let (doc, _) = parse_layout(r#"<Frame name="a" bogus="1"><Width/></Frame>"#);

    let diagnostics = doc.diagnostics();
    assert_eq!(codes(&doc), [Some(ErrorCode::E203), Some(ErrorCode::E202)]);
    assert!(diagnostics[0].severity().is_warning());
    assert_eq!(diagnostics[0].span().slice(doc.text()), "bogus");
    assert!(diagnostics[1].severity().is_error());
    assert!(diagnostics[1].text().contains("`val`"));
}

#[test]
fn test_start_tag_closed_by_next_tag() {
    let text = r#"<Frame name="a" <Animation name="b"/></Frame>"#;
    let (doc, _) = parse_layout(text);

    assert_eq!(codes(&doc), [Some(ErrorCode::E005)]);
    let a = doc.declared().unwrap();
    let frame = doc.element(a);
    assert_eq!(frame.start_tag_end(), text.find("<Animation").unwrap());
    assert_eq!(frame.attribute_value("name"), Some("a"));
    assert_eq!(frame.children().len(), 1);
}

#[test]
fn test_untyped_without_root_type() {
    let schema = layout_schema();
    let doc = parse("Plain", r#"<Frame name="a"><Anything/></Frame>"#, &schema, None);

    assert!(doc.diagnostics().is_empty());
    for (_, element) in doc.elements() {
        assert!(element.ty().is_none());
    }
}

#[test]
fn test_element_at() {
    let text = r#"<Frame name="a"><Animation name="b"/></Frame>"#;
    let (doc, _) = parse_layout(text);
    let a = doc.declared().unwrap();
    let b = child(&doc, a, 0);

    assert_eq!(doc.element_at(2), Some(a));
    assert_eq!(doc.element_at(text.find("Animation").unwrap()), Some(b));
    assert_eq!(doc.element_at(text.len()), None);
}

#[test]
fn test_ancestors() {
    let (doc, _) =
        parse_layout(r#"<Frame name="a"><Frame name="b"><Width val="1"/></Frame></Frame>"#);
    let a = doc.declared().unwrap();
    let b = child(&doc, a, 0);
    let width = child(&doc, b, 0);

    let chain: Vec<_> = doc.ancestors(width).collect();
    assert_eq!(chain, [width, b, a, ElementId::ROOT]);
}

mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Layout-like markup assembled from well-formed and broken pieces.
    fn layout_markup_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-z]{1,4}".prop_map(|name| format!(r#"<Frame name="{name}">"#)),
                Just("</Frame>".to_string()),
                Just(r#"<Frame type="Button">"#.to_string()),
                Just(r#"<Animation name="a"/>"#.to_string()),
                Just(r#"<StateGroup name="s">"#.to_string()),
                Just("</StateGroup>".to_string()),
                Just(r#"<Width val="10"/>"#.to_string()),
                Just("<Frame ".to_string()),
                Just("</Frame".to_string()),
                Just(">".to_string()),
                Just("/>".to_string()),
                Just("<!-- note -->".to_string()),
                Just("text ".to_string()),
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every element satisfies `start <= start_tag_end <= end` and nests
    /// inside its parent.
    fn check_element_offsets(text: &str) -> Result<(), TestCaseError> {
        let (doc, _) = parse_layout(text);
        for (id, element) in doc.elements() {
            prop_assert!(element.start() <= element.start_tag_end(), "{:?}", id);
            prop_assert!(element.start_tag_end() <= element.end(), "{:?}", id);
            prop_assert!(element.end() <= text.len());
            if element.is_self_closed() {
                prop_assert_eq!(element.start_tag_end(), element.end());
            }
            if let Some(parent) = element.parent() {
                let parent = doc.element(parent);
                prop_assert!(parent.start() <= element.start());
                prop_assert!(element.end() <= parent.end());
            }
        }
        Ok(())
    }

    /// Diagnostic spans stay inside the text.
    fn check_diagnostic_spans(text: &str) -> Result<(), TestCaseError> {
        let (doc, _) = parse_layout(text);
        for diagnostic in doc.diagnostics() {
            prop_assert!(diagnostic.start() <= diagnostic.end());
            prop_assert!(diagnostic.end() <= text.len());
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn element_offsets_hold(text in layout_markup_strategy()) {
            check_element_offsets(&text)?;
        }

        #[test]
        fn element_offsets_hold_for_arbitrary_text(text in any::<String>()) {
            check_element_offsets(&text)?;
        }

        #[test]
        fn diagnostic_spans_in_bounds(text in layout_markup_strategy()) {
            check_diagnostic_spans(&text)?;
        }
    }
}
