//! Namespace tree entries.

use indexmap::{IndexMap, IndexSet};
use uidesc_core::{identifier::Id, schema::NodeKind};

use super::DeclRef;

/// Index of a [`DescNamespace`] in a [`DescIndex`](super::DescIndex).
///
/// Ids of pruned entries are recycled, so an id is only meaningful until the
/// next mutation of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Role of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    Root,
    /// One per document declaration name.
    File,
    Frame,
    Animation,
    StateGroup,
    /// Entry kept alive only by its children.
    Undeclared,
}

impl NamespaceKind {
    /// Namespace kind for a declaration-bearing node kind.
    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Frame => Some(NamespaceKind::Frame),
            NodeKind::Animation => Some(NamespaceKind::Animation),
            NodeKind::StateGroup => Some(NamespaceKind::StateGroup),
            NodeKind::Constant | NodeKind::FrameProperty | NodeKind::Other => None,
        }
    }

    /// Root and file entries are never pruned.
    pub fn is_scope(&self) -> bool {
        matches!(self, NamespaceKind::Root | NamespaceKind::File)
    }
}

/// One name within a scope, with every declaration contributing to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescNamespace {
    pub(crate) kind: NamespaceKind,
    pub(crate) name: Id,
    pub(crate) parent: Option<NamespaceId>,
    pub(crate) children: IndexMap<Id, NamespaceId>,
    pub(crate) decls: IndexSet<DeclRef>,
}

impl DescNamespace {
    pub(crate) fn new(kind: NamespaceKind, name: Id, parent: Option<NamespaceId>) -> Self {
        Self {
            kind,
            name,
            parent,
            children: IndexMap::new(),
            decls: IndexSet::new(),
        }
    }

    pub fn kind(&self) -> NamespaceKind {
        self.kind
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn child(&self, name: Id) -> Option<NamespaceId> {
        self.children.get(&name).copied()
    }

    /// Children in first-declaration order.
    pub fn children(&self) -> impl Iterator<Item = (Id, NamespaceId)> + '_ {
        self.children.iter().map(|(name, id)| (*name, *id))
    }

    /// Declarations in binding order.
    pub fn decls(&self) -> impl Iterator<Item = DeclRef> + '_ {
        self.decls.iter().copied()
    }

    /// The first declaration, which carries `template=` and `type=`.
    pub fn first_decl(&self) -> Option<DeclRef> {
        self.decls.first().copied()
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// No declarations and no children.
    pub fn is_orphan(&self) -> bool {
        self.decls.is_empty() && self.children.is_empty()
    }
}
