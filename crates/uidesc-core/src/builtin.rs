//! Baseline schema for the UI layout dialect.
//!
//! This is the schema used when a host does not supply its own registry. It
//! covers the declaration-bearing elements (`Frame`, `Animation`,
//! `StateGroup`), constants, and the common frame properties, including the
//! `Handle` property whose `val` attribute is handle-typed.

use crate::schema::{
    AttributeDef, ElementDef, ElementDefId, FrameType, NodeKind, SchemaError, SchemaRegistry,
    TypeId, ValueKind, ValueType,
};

/// Name of the complex type whose children table is used for the document root.
pub const LAYOUT_FILE_TYPE: &str = "LayoutFile";

/// Builtin frame types with their class chains, most derived first.
const FRAME_TYPES: &[(&str, &[&str])] = &[
    ("Frame", &["CFrame"]),
    ("Control", &["CControl", "CFrame"]),
    ("Button", &["CButton", "CControl", "CFrame"]),
    ("CheckBox", &["CCheckBox", "CButton", "CControl", "CFrame"]),
    ("Label", &["CLabel", "CFrame"]),
    ("Image", &["CImage", "CFrame"]),
];

/// Frame properties shared by every frame type: `(tag, attribute, value kind)`.
const FRAME_PROPERTIES: &[(&str, &str, ValueKind)] = &[
    ("Width", "val", ValueKind::Number),
    ("Height", "val", ValueKind::Number),
    ("Visible", "val", ValueKind::Boolean),
    ("Alpha", "val", ValueKind::Number),
    ("Texture", "val", ValueKind::Path),
    ("Text", "val", ValueKind::String),
    ("Style", "val", ValueKind::String),
    ("Color", "val", ValueKind::Color),
    ("Handle", "val", ValueKind::Handle),
];

/// Builds the baseline layout schema.
///
/// # Examples
///
/// ```
/// use uidesc_core::builtin::{layout_schema, LAYOUT_FILE_TYPE};
///
/// let schema = layout_schema();
/// let root = schema.type_by_name(LAYOUT_FILE_TYPE).unwrap();
/// assert!(schema.complex_type(root).child("Frame").is_some());
/// assert!(schema.frame_type("Button").unwrap().has_class("CControl"));
/// ```
pub fn layout_schema() -> SchemaRegistry {
    build().expect("builtin schema names are unique")
}

fn build() -> Result<SchemaRegistry, SchemaError> {
    let mut b = SchemaRegistry::builder();

    let string = ValueType::new("string", ValueKind::String);
    let path = ValueType::new("path", ValueKind::Path);
    let number = ValueType::new("number", ValueKind::Number);
    let anchor_side = ValueType::new("anchorSide", ValueKind::Enum);

    let file_ty = b.declare_type(LAYOUT_FILE_TYPE)?;
    let desc_ty = b.declare_type("Desc")?;
    let constant_ty = b.declare_type("CConstant")?;
    let anchor_ty = b.declare_type("CAnchor")?;
    let animation_ty = b.declare_type("CAnimationDesc")?;
    let event_ty = b.declare_type("CAnimationEvent")?;
    let controller_ty = b.declare_type("CAnimationController")?;
    let state_group_ty = b.declare_type("CStateGroupDesc")?;
    let state_ty = b.declare_type("CState")?;

    let frame_ty = b.declare_type("CFrameDesc")?;
    let mut frame_variants: Vec<(&str, TypeId)> = Vec::with_capacity(FRAME_TYPES.len());
    for (name, classes) in FRAME_TYPES {
        let ty = if *name == "Frame" {
            frame_ty
        } else {
            b.declare_type(format!("C{name}Desc"))?
        };
        frame_variants.push((*name, ty));
        b.frame_type(FrameType::new(*name, classes.iter().copied()))?;
    }

    let frame_def = ElementDef::new("Frame", frame_ty, NodeKind::Frame).with_alternation(
        frame_variants
            .iter()
            .map(|(name, ty)| (name.to_string(), *ty)),
    );

    // Constants.
    b.attribute(constant_ty, AttributeDef::new("name", string.clone()).required());
    b.attribute(constant_ty, AttributeDef::new("val", string.clone()).required());

    // Document root and `Desc` container.
    b.child(file_ty, ElementDef::new("Desc", desc_ty, NodeKind::Other));
    let frame_def = b.child(file_ty, frame_def);
    b.share_child(desc_ty, frame_def);
    let constant_def = b.child(
        desc_ty,
        ElementDef::new("Constant", constant_ty, NodeKind::Constant),
    );

    // Anchors.
    b.attribute(anchor_ty, AttributeDef::new("side", anchor_side.clone()).required());
    b.attribute(anchor_ty, AttributeDef::new("relative", path.clone()));
    b.attribute(anchor_ty, AttributeDef::new("pos", anchor_side));
    b.attribute(anchor_ty, AttributeDef::new("offset", number.clone()));

    // Animations and state groups.
    b.attribute(animation_ty, AttributeDef::new("name", string.clone()));
    b.attribute(event_ty, AttributeDef::new("event", string.clone()).required());
    b.attribute(event_ty, AttributeDef::new("action", string.clone()));
    b.attribute(event_ty, AttributeDef::new("frame", path.clone()));
    b.attribute(controller_ty, AttributeDef::new("type", string.clone()).required());
    b.attribute(controller_ty, AttributeDef::new("frame", path.clone()));
    b.allow_extra_children(controller_ty);
    b.allow_extra_attributes(controller_ty);
    b.child(animation_ty, ElementDef::new("Event", event_ty, NodeKind::Other));
    b.child(animation_ty, ElementDef::new("Controller", controller_ty, NodeKind::Other));

    b.attribute(state_group_ty, AttributeDef::new("name", string.clone()));
    b.attribute(state_ty, AttributeDef::new("name", string.clone()).required());
    b.allow_extra_children(state_ty);
    b.child(state_group_ty, ElementDef::new("State", state_ty, NodeKind::Other));
    b.child(state_group_ty, ElementDef::new("DefaultState", state_ty, NodeKind::Other));

    let animation_def = ElementDef::new("Animation", animation_ty, NodeKind::Animation);
    let state_group_def = ElementDef::new("StateGroup", state_group_ty, NodeKind::StateGroup);
    let anchor_def = ElementDef::new("Anchor", anchor_ty, NodeKind::FrameProperty);

    // Frame property types, one per value kind.
    let mut property_defs = Vec::with_capacity(FRAME_PROPERTIES.len());
    for (tag, attribute, kind) in FRAME_PROPERTIES {
        let ty = b.declare_type(format!("CFrameProperty{tag}"))?;
        b.attribute(
            ty,
            AttributeDef::new(*attribute, ValueType::new(format!("{tag}Value"), *kind)).required(),
        );
        property_defs.push(ElementDef::new(*tag, ty, NodeKind::FrameProperty));
    }

    // Every frame variant shares the same content model.
    let mut shared: Option<Vec<ElementDefId>> = None;
    for (_, ty) in &frame_variants {
        let ty = *ty;
        b.attribute(ty, AttributeDef::new("name", string.clone()));
        b.attribute(ty, AttributeDef::new("type", string.clone()));
        b.attribute(ty, AttributeDef::new("template", path.clone()));
        b.attribute(ty, AttributeDef::new("file", string.clone()));
        b.share_child(ty, frame_def);
        b.share_child(ty, constant_def);
        match shared.clone() {
            Some(defs) => {
                for def in defs {
                    b.share_child(ty, def);
                }
            }
            None => {
                let mut defs = vec![
                    b.child(ty, animation_def.clone()),
                    b.child(ty, state_group_def.clone()),
                    b.child(ty, anchor_def.clone()),
                ];
                for def in &property_defs {
                    defs.push(b.child(ty, def.clone()));
                }
                shared = Some(defs);
            }
        }
    }

    // Animations and state groups may carry frame properties (handles
    // included) and constants.
    if let Some(defs) = &shared {
        for def in defs.iter().skip(3) {
            b.share_child(animation_ty, *def);
            b.share_child(state_group_ty, *def);
        }
    }
    b.share_child(animation_ty, constant_def);
    b.share_child(state_group_ty, constant_def);

    Ok(b.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_file_accepts_desc_and_frame() {
        let schema = layout_schema();
        let root = schema.type_by_name(LAYOUT_FILE_TYPE).unwrap();
        let root_ty = schema.complex_type(root);

        let desc = root_ty.child("Desc").unwrap();
        assert_eq!(schema.element_def(desc).kind(), NodeKind::Other);

        let frame = root_ty.child("Frame").unwrap();
        assert_eq!(schema.element_def(frame).kind(), NodeKind::Frame);
        assert!(schema.element_def(frame).has_alternation());
    }

    #[test]
    fn test_frame_alternation_covers_builtin_frame_types() {
        let schema = layout_schema();
        let root = schema.type_by_name(LAYOUT_FILE_TYPE).unwrap();
        let frame = schema.complex_type(root).child("Frame").unwrap();
        let def = schema.element_def(frame);

        for (name, _) in FRAME_TYPES {
            let ty = def.alternative(name).unwrap();
            let complex = schema.complex_type(ty);
            assert!(complex.child("Frame").is_some(), "{name} should nest frames");
            assert!(complex.child("Animation").is_some());
            assert!(complex.attribute("template").is_some());
        }
    }

    #[test]
    fn test_handle_property_is_handle_typed() {
        let schema = layout_schema();
        let frame_ty = schema.type_by_name("CFrameDesc").unwrap();
        let handle = schema.complex_type(frame_ty).child("Handle").unwrap();
        let def = schema.element_def(handle);
        assert_eq!(def.kind(), NodeKind::FrameProperty);

        let val = schema.complex_type(def.ty()).attribute("val").unwrap();
        assert_eq!(val.value_type().kind(), ValueKind::Handle);
        assert!(val.is_required());
    }

    #[test]
    fn test_animation_accepts_handles() {
        let schema = layout_schema();
        let animation = schema.type_by_name("CAnimationDesc").unwrap();
        assert!(schema.complex_type(animation).child("Handle").is_some());
        assert!(schema.complex_type(animation).child("Constant").is_some());
        assert!(schema.complex_type(animation).child("Event").is_some());
    }

    #[test]
    fn test_frame_types_registered() {
        let schema = layout_schema();
        let checkbox = schema.frame_type("CheckBox").unwrap();
        assert_eq!(checkbox.class_name(), "CCheckBox");
        assert!(checkbox.has_class("CButton"));
        assert!(schema.frame_type("Slider").is_none());
    }
}
