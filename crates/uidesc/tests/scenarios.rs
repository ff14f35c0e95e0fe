//! End-to-end scenarios over the workspace: parse, bind, build, navigate.

use uidesc::{
    Workspace,
    hierarchy::{UiNodeKind, UiTree},
    index::NamespaceKind,
    selector::parse_selector,
};

#[test]
fn test_button_with_animation_binds_frame_and_animation() {
    let mut workspace = Workspace::with_defaults();
    let id = workspace
        .open(
            "GameUI.xml",
            r#"<Frame type="Button" name="btn"><Animation name="A1"/></Frame>"#,
        )
        .unwrap();

    let document = workspace.document(id).unwrap();
    assert!(document.diagnostics().is_empty(), "{:?}", document.diagnostics());
    let btn_el = document.declared().unwrap();
    let a1_el = document.element(btn_el).children()[0];
    assert!(document.element(a1_el).children().is_empty());
    assert_eq!(document.ancestors(a1_el).count(), 3);

    let index = workspace.index();
    let file = index.lookup_path("GameUI").unwrap();
    let btn = index.child(file, "btn").unwrap();
    assert_eq!(index.namespace(btn).kind(), NamespaceKind::Frame);
    let a1 = index.child(btn, "A1").unwrap();
    assert_eq!(index.namespace(a1).kind(), NamespaceKind::Animation);
}

#[test]
fn test_unknown_child_is_reported_and_kept() {
    let mut workspace = Workspace::with_defaults();
    let id = workspace
        .open("GameUI.xml", r#"<Frame name="X"><Bogus/></Frame>"#)
        .unwrap();

    let diagnostics = workspace.diagnostics(id).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].severity().is_message());
    assert!(diagnostics[0].text().contains("Bogus"));

    let document = workspace.document(id).unwrap();
    let frame = document.declared().unwrap();
    let bogus = document.element(frame).children()[0];
    assert_eq!(document.element(bogus).tag(), Some("Bogus"));
    assert!(document.element(bogus).ty().is_none());
}

#[test]
fn test_extensions_from_two_files_merge_into_base() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open("Base.xml", r#"<Frame name="Shared"><Frame name="Own"/></Frame>"#)
        .unwrap();
    workspace
        .open(
            "First.xml",
            r#"<Frame name="Shared" file="Base"><Frame name="FromFirst"/></Frame>"#,
        )
        .unwrap();
    workspace
        .open(
            "Second.xml",
            r#"<Frame name="Shared" file="Base"><Frame name="FromSecond"/></Frame>"#,
        )
        .unwrap();

    let shared = workspace.lookup("Base/Shared").unwrap();
    let mut tree = UiTree::new();
    for child in ["Own", "FromFirst", "FromSecond"] {
        let selection = workspace.resolve(&mut tree, shared, child).unwrap();
        let target = selection
            .target()
            .unwrap_or_else(|| panic!("{child} should resolve"));
        assert_eq!(tree.path_string(target), format!("Shared/{child}"));
    }

    // An extension's own entry resolves into the same merged hierarchy.
    let from_first = workspace.lookup("First/Shared/FromFirst").unwrap();
    let selection = workspace
        .resolve(&mut tree, from_first, "$parent/FromSecond")
        .unwrap();
    assert!(selection.is_valid());
}

#[test]
fn test_parent_then_typed_ancestor() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open(
            "GameUI.xml",
            r#"<Desc>
    <Frame type="Button" name="Ok">
        <Frame name="Inner"><Frame name="Title"/></Frame>
    </Frame>
    <Frame name="Plain">
        <Frame name="Inner"><Frame name="Title"/></Frame>
    </Frame>
</Desc>"#,
        )
        .unwrap();
    let selector = "$parent/$ancestor[@type=Button]";
    let mut tree = UiTree::new();

    let title = workspace.lookup("GameUI/Ok/Inner/Title").unwrap();
    let selection = workspace.resolve(&mut tree, title, selector).unwrap();
    assert!(selection.is_valid());
    assert_eq!(tree.path_string(selection.target().unwrap()), "Ok");

    let title = workspace.lookup("GameUI/Plain/Inner/Title").unwrap();
    let selection = workspace.resolve(&mut tree, title, selector).unwrap();
    assert!(!selection.is_valid());
    assert_eq!(selection.target(), None);
    assert_eq!(selection.chain().len(), 1);
}

#[test]
fn test_unbinding_sole_template_user_removes_reference_key() {
    let mut workspace = Workspace::with_defaults();
    let templates = workspace
        .open(
            "Templates.xml",
            r#"<Frame name="Base"><Frame name="Label"/></Frame>"#,
        )
        .unwrap();
    let user = workspace
        .open(
            "GameUI.xml",
            r#"<Frame name="Main" template="Templates/Base"/>"#,
        )
        .unwrap();

    let refs = workspace.index().template_refs("Templates/Base").unwrap();
    assert_eq!(refs.len(), 1);

    workspace.close(user).unwrap();
    assert!(workspace.index().template_refs("Templates/Base").is_none());
    assert_eq!(workspace.index().template_keys().count(), 0);

    workspace.close(templates).unwrap();
    assert_eq!(workspace.index().namespace_count(), 1);
}

#[test]
fn test_direct_declaration_precedes_template() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open(
            "Templates.xml",
            r#"<Frame name="Base"><Frame name="Label" type="Label"/><Frame name="Icon"/></Frame>"#,
        )
        .unwrap();
    workspace
        .open(
            "GameUI.xml",
            r#"<Frame name="Main" template="Templates/Base"><Frame name="Label" type="Button"/></Frame>"#,
        )
        .unwrap();

    let main = workspace.lookup("GameUI/Main").unwrap();
    let mut tree = UiTree::new();
    let label = workspace.resolve(&mut tree, main, "Label").unwrap().target().unwrap();

    assert_eq!(
        tree.node(label).primary_desc(),
        workspace.lookup("GameUI/Main/Label")
    );
    let builder = workspace.builder();
    assert_eq!(
        builder.effective_type_name(&tree, label).as_deref(),
        Some("Frame:Button")
    );

    // Template-only children are still reachable.
    let icon = workspace.resolve(&mut tree, main, "Icon").unwrap();
    assert!(icon.is_valid());
}

#[test]
fn test_missing_template_target_is_ignored() {
    let mut workspace = Workspace::with_defaults();
    let templates = workspace
        .open("Templates.xml", r#"<Frame name="Base"><Frame name="Icon"/></Frame>"#)
        .unwrap();
    workspace
        .open(
            "GameUI.xml",
            r#"<Frame name="Main" template="Templates/Base"><Frame name="Title"/></Frame>"#,
        )
        .unwrap();
    workspace.close(templates).unwrap();

    let main = workspace.lookup("GameUI/Main").unwrap();
    let mut tree = UiTree::new();
    assert!(workspace.resolve(&mut tree, main, "Title").unwrap().is_valid());
    assert!(!workspace.resolve(&mut tree, main, "Icon").unwrap().is_valid());
}

#[test]
fn test_selection_twice_reuses_expansion() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open(
            "GameUI.xml",
            r#"<Frame name="Main"><Frame name="Body"><Frame name="Row"><Frame name="Cell"/></Frame></Frame><Frame name="Footer"/></Frame>"#,
        )
        .unwrap();
    let main = workspace.lookup("GameUI/Main").unwrap();
    let navigator = workspace.navigator();
    let fragments = parse_selector("Body/Row/Cell/$parent").unwrap();

    let mut tree = UiTree::new();
    let root = navigator.builder().create_root(&mut tree, main).unwrap();
    assert!(!tree.node(root).is_built());

    let first = navigator.resolve_selection(&mut tree, root, &fragments);
    let nodes = tree.len();
    for node in [root, first.chain()[0], first.chain()[1]] {
        assert!(tree.node(node).is_built());
    }

    let second = navigator.resolve_selection(&mut tree, root, &fragments);
    assert_eq!(first, second);
    assert_eq!(tree.len(), nodes);
    assert_eq!(tree.path_string(second.target().unwrap()), "Main/Body/Row");
}

#[test]
fn test_closing_last_declarer_prunes_nested_entries() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open("GameUI.xml", r#"<Frame name="Main"><Frame name="Keep"/></Frame>"#)
        .unwrap();
    let deep = workspace
        .open(
            "GameUI.SC2Layout",
            r#"<Frame name="Main"><Frame name="A"><Frame name="B"><Frame name="C"/></Frame></Frame></Frame>"#,
        )
        .unwrap();
    assert!(workspace.lookup("GameUI/Main/A/B/C").is_some());

    workspace.close(deep).unwrap();
    assert!(workspace.lookup("GameUI/Main/A").is_none());
    assert!(workspace.lookup("GameUI/Main/Keep").is_some());
}

#[test]
fn test_handle_resolves_across_documents() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open(
            "Hud.xml",
            r#"<Frame name="Hud"><Frame name="Minimap"><Handle val="MinimapHandle"/><Frame name="Ping"/></Frame></Frame>"#,
        )
        .unwrap();
    workspace
        .open("GameUI.xml", r#"<Frame name="Main"/>"#)
        .unwrap();

    let main = workspace.lookup("GameUI/Main").unwrap();
    let mut tree = UiTree::new();
    let selection = workspace
        .resolve(&mut tree, main, "$MinimapHandle/Ping")
        .unwrap();
    assert!(selection.is_valid());
    assert_eq!(
        tree.path_string(selection.target().unwrap()),
        "Hud/Minimap/Ping"
    );
}

#[test]
fn test_children_by_kind() {
    let mut workspace = Workspace::with_defaults();
    workspace
        .open(
            "GameUI.xml",
            r#"<Frame name="Main"><Frame name="A"/><Animation name="Fade"/><StateGroup name="Mode"/><Frame name="B"/></Frame>"#,
        )
        .unwrap();
    let main = workspace.lookup("GameUI/Main").unwrap();
    let navigator = workspace.navigator();
    let mut tree = UiTree::new();
    let root = navigator.builder().create_root(&mut tree, main).unwrap();

    assert_eq!(navigator.children_of_kind(&mut tree, root, UiNodeKind::Frame).len(), 2);
    assert_eq!(navigator.children_of_kind(&mut tree, root, UiNodeKind::Animation).len(), 1);
    assert_eq!(navigator.children_of_kind(&mut tree, root, UiNodeKind::StateGroup).len(), 1);
    assert!(navigator.resolve_child(&mut tree, root, "Fade").is_some());
}
