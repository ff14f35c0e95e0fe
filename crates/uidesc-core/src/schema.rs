//! Schema contract consumed by the parser, the index and the navigator.
//!
//! The registry answers three kinds of questions:
//!
//! - which child elements a complex type accepts, and what [`NodeKind`] each
//!   of them has (drives parsing and binding);
//! - which attributes a complex type declares (drives structural validation
//!   and handle detection);
//! - which frame classes a frame type belongs to (drives `oftype=` ancestor
//!   matching).
//!
//! Types and element definitions live in flat tables addressed by
//! [`TypeId`] and [`ElementDefId`], so recursive content models (a `Frame`
//! accepting `Frame` children) are plain indices. Registries are assembled
//! with [`SchemaBuilder`].

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

/// Index of a [`ComplexType`] in a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Index of an [`ElementDef`] in a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementDefId(u32);

/// Builtin classification of simple attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Enum,
    Handle,
    Color,
    Number,
    Boolean,
    Path,
    Other,
}

/// A named simple type together with its builtin classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueType {
    name: String,
    kind: ValueKind,
}

impl ValueType {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// Descriptor of one declared attribute of a complex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    name: String,
    value_type: ValueType,
    required: bool,
    default: Option<String>,
}

impl AttributeDef {
    /// Creates an optional attribute without default.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            default: None,
        }
    }

    /// Marks the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Role an element plays for binding and nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Frame,
    Animation,
    StateGroup,
    Constant,
    FrameProperty,
    Other,
}

impl NodeKind {
    /// Returns `true` for kinds that declare a name in the namespace tree.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::Frame | NodeKind::Animation | NodeKind::StateGroup
        )
    }
}

/// Expected-child descriptor: what a tag means under a given parent type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    name: String,
    ty: TypeId,
    kind: NodeKind,
    alternation: Option<IndexMap<String, TypeId>>,
}

impl ElementDef {
    pub fn new(name: impl Into<String>, ty: TypeId, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            alternation: None,
        }
    }

    /// Declares that the concrete type depends on the element's `type=`
    /// attribute. Keys are matched case-insensitively.
    pub fn with_alternation(
        mut self,
        alternatives: impl IntoIterator<Item = (String, TypeId)>,
    ) -> Self {
        self.alternation = Some(
            alternatives
                .into_iter()
                .map(|(key, ty)| (key.to_ascii_lowercase(), ty))
                .collect(),
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default type, used when no alternation applies.
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn has_alternation(&self) -> bool {
        self.alternation.is_some()
    }

    /// Resolves the concrete type for a `type=` attribute value.
    pub fn alternative(&self, type_value: &str) -> Option<TypeId> {
        self.alternation
            .as_ref()?
            .get(&type_value.to_ascii_lowercase())
            .copied()
    }
}

/// A complex type: attribute table plus expected-children table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    name: String,
    attributes: IndexMap<String, AttributeDef>,
    children: IndexMap<String, ElementDefId>,
    allow_extra_attributes: bool,
    allow_extra_children: bool,
    indeterminate: IndexMap<String, ValueType>,
}

impl ComplexType {
    fn new(name: String) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            children: IndexMap::new(),
            allow_extra_attributes: false,
            allow_extra_children: false,
            indeterminate: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a declared attribute, case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(&name.to_ascii_lowercase())
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.values()
    }

    /// Looks up the expected-child descriptor for `tag`.
    pub fn child(&self, tag: &str) -> Option<ElementDefId> {
        self.children.get(tag).copied()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, ElementDefId)> {
        self.children.iter().map(|(tag, id)| (tag.as_str(), *id))
    }

    pub fn allows_extra_attributes(&self) -> bool {
        self.allow_extra_attributes
    }

    pub fn allows_extra_children(&self) -> bool {
        self.allow_extra_children
    }

    /// Schema-extension attribute slots, matched positionally against
    /// attributes that match no static declaration.
    pub fn indeterminate(&self) -> impl Iterator<Item = (&str, &ValueType)> {
        self.indeterminate.iter().map(|(key, ty)| (key.as_str(), ty))
    }

    pub fn indeterminate_len(&self) -> usize {
        self.indeterminate.len()
    }
}

/// A frame type and the chain of frame classes it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameType {
    name: String,
    classes: Vec<String>,
}

impl FrameType {
    /// `classes` is the class chain, most derived first.
    pub fn new(
        name: impl Into<String>,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The most derived class, or the type name when no class is known.
    pub fn class_name(&self) -> &str {
        self.classes.first().map_or(self.name.as_str(), String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Errors raised while assembling a schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("complex type `{0}` is declared twice")]
    DuplicateType(String),

    #[error("frame type `{0}` is declared twice")]
    DuplicateFrameType(String),
}

/// Immutable schema consulted by every phase.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: Vec<ComplexType>,
    type_names: HashMap<String, TypeId>,
    elements: Vec<ElementDef>,
    frame_types: IndexMap<String, FrameType>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    pub fn complex_type(&self, id: TypeId) -> &ComplexType {
        &self.types[id.0 as usize]
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    pub fn element_def(&self, id: ElementDefId) -> &ElementDef {
        &self.elements[id.0 as usize]
    }

    pub fn frame_type(&self, name: &str) -> Option<&FrameType> {
        self.frame_types.get(name)
    }

    pub fn frame_types(&self) -> impl Iterator<Item = &FrameType> {
        self.frame_types.values()
    }
}

/// Two-phase builder: declare types, then fill their tables.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    registry: SchemaRegistry,
}

impl SchemaBuilder {
    /// Declares a new, empty complex type.
    pub fn declare_type(&mut self, name: impl Into<String>) -> Result<TypeId, SchemaError> {
        let name = name.into();
        if self.registry.type_names.contains_key(&name) {
            return Err(SchemaError::DuplicateType(name));
        }
        let id = TypeId(self.registry.types.len() as u32);
        self.registry.type_names.insert(name.clone(), id);
        self.registry.types.push(ComplexType::new(name));
        Ok(id)
    }

    pub fn attribute(&mut self, ty: TypeId, attribute: AttributeDef) -> &mut Self {
        let key = attribute.name().to_ascii_lowercase();
        self.type_mut(ty).attributes.insert(key, attribute);
        self
    }

    pub fn indeterminate(
        &mut self,
        ty: TypeId,
        key: impl Into<String>,
        value_type: ValueType,
    ) -> &mut Self {
        self.type_mut(ty).indeterminate.insert(key.into(), value_type);
        self
    }

    pub fn allow_extra_attributes(&mut self, ty: TypeId) -> &mut Self {
        self.type_mut(ty).allow_extra_attributes = true;
        self
    }

    pub fn allow_extra_children(&mut self, ty: TypeId) -> &mut Self {
        self.type_mut(ty).allow_extra_children = true;
        self
    }

    /// Registers `def` as an expected child of `parent`, keyed by its name.
    pub fn child(&mut self, parent: TypeId, def: ElementDef) -> ElementDefId {
        let id = ElementDefId(self.registry.elements.len() as u32);
        let tag = def.name().to_string();
        self.registry.elements.push(def);
        self.type_mut(parent).children.insert(tag, id);
        id
    }

    /// Registers an already created element definition under another parent.
    pub fn share_child(&mut self, parent: TypeId, def: ElementDefId) -> &mut Self {
        let tag = self.registry.elements[def.0 as usize].name().to_string();
        self.type_mut(parent).children.insert(tag, def);
        self
    }

    pub fn frame_type(&mut self, frame_type: FrameType) -> Result<&mut Self, SchemaError> {
        let name = frame_type.name().to_string();
        if self.registry.frame_types.contains_key(&name) {
            return Err(SchemaError::DuplicateFrameType(name));
        }
        self.registry.frame_types.insert(name, frame_type);
        Ok(self)
    }

    pub fn build(self) -> SchemaRegistry {
        debug!(
            types = self.registry.types.len(),
            elements = self.registry.elements.len(),
            frame_types = self.registry.frame_types.len();
            "Schema assembled"
        );
        self.registry
    }

    fn type_mut(&mut self, id: TypeId) -> &mut ComplexType {
        &mut self.registry.types[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> ValueType {
        ValueType::new("string", ValueKind::String)
    }

    #[test]
    fn test_declare_and_lookup_type() {
        let mut builder = SchemaRegistry::builder();
        let desc = builder.declare_type("Desc").unwrap();
        let frame = builder.declare_type("CFrameDesc").unwrap();
        builder.attribute(frame, AttributeDef::new("Name", string()));
        let def = builder.child(desc, ElementDef::new("Frame", frame, NodeKind::Frame));
        let schema = builder.build();

        assert_eq!(schema.type_by_name("Desc"), Some(desc));
        assert_eq!(schema.complex_type(desc).child("Frame"), Some(def));
        assert!(schema.complex_type(frame).attribute("name").is_some());
        assert!(schema.complex_type(frame).attribute("NAME").is_some());
        assert_eq!(schema.element_def(def).kind(), NodeKind::Frame);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut builder = SchemaRegistry::builder();
        builder.declare_type("Desc").unwrap();
        assert_eq!(
            builder.declare_type("Desc"),
            Err(SchemaError::DuplicateType("Desc".to_string()))
        );
    }

    #[test]
    fn test_recursive_content_model() {
        let mut builder = SchemaRegistry::builder();
        let frame = builder.declare_type("CFrameDesc").unwrap();
        let def = builder.child(frame, ElementDef::new("Frame", frame, NodeKind::Frame));
        let schema = builder.build();

        let nested = schema.complex_type(frame).child("Frame").unwrap();
        assert_eq!(nested, def);
        assert_eq!(schema.element_def(nested).ty(), frame);
    }

    #[test]
    fn test_alternation_is_case_insensitive() {
        let mut builder = SchemaRegistry::builder();
        let frame = builder.declare_type("CFrameDesc").unwrap();
        let button = builder.declare_type("CButtonDesc").unwrap();
        let def = ElementDef::new("Frame", frame, NodeKind::Frame)
            .with_alternation([("Button".to_string(), button)]);

        assert!(def.has_alternation());
        assert_eq!(def.alternative("button"), Some(button));
        assert_eq!(def.alternative("BUTTON"), Some(button));
        assert_eq!(def.alternative("Label"), None);
    }

    #[test]
    fn test_frame_type_classes() {
        let ft = FrameType::new("Button", ["CButton", "CControl", "CFrame"]);
        assert_eq!(ft.class_name(), "CButton");
        assert!(ft.has_class("CControl"));
        assert!(!ft.has_class("CLabel"));

        let bare = FrameType::new("Custom", Vec::<String>::new());
        assert_eq!(bare.class_name(), "Custom");
    }

    #[test]
    fn test_node_kind_is_declaration() {
        assert!(NodeKind::Frame.is_declaration());
        assert!(NodeKind::Animation.is_declaration());
        assert!(NodeKind::StateGroup.is_declaration());
        assert!(!NodeKind::Constant.is_declaration());
        assert!(!NodeKind::FrameProperty.is_declaration());
        assert!(!NodeKind::Other.is_declaration());
    }
}
