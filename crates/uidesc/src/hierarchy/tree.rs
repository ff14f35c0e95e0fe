//! Materialized hierarchy nodes.

use std::cell::OnceCell;

use indexmap::{IndexMap, IndexSet};
use uidesc_core::identifier::Id;

use crate::index::{DeclRef, NamespaceId, NamespaceKind};

/// Index of a [`UiNode`] in a [`UiTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UiNodeId(u32);

impl UiNodeId {
    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// What a materialized node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiNodeKind {
    Root,
    Frame,
    Animation,
    StateGroup,
    Other,
}

impl From<NamespaceKind> for UiNodeKind {
    fn from(kind: NamespaceKind) -> Self {
        match kind {
            NamespaceKind::Root | NamespaceKind::File => UiNodeKind::Root,
            NamespaceKind::Frame => UiNodeKind::Frame,
            NamespaceKind::Animation => UiNodeKind::Animation,
            NamespaceKind::StateGroup => UiNodeKind::StateGroup,
            NamespaceKind::Undeclared => UiNodeKind::Other,
        }
    }
}

/// One node of the effective hierarchy.
#[derive(Debug, Clone)]
pub struct UiNode {
    name: Id,
    kind: UiNodeKind,
    parent: Option<UiNodeId>,
    children: IndexMap<Id, UiNodeId>,
    /// Contributing namespace entries, highest precedence first.
    pub(crate) descs: IndexSet<NamespaceId>,
    pub(crate) build: bool,
    pub(crate) raw_children: OnceCell<Vec<DeclRef>>,
}

impl UiNode {
    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> UiNodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<UiNodeId> {
        self.parent
    }

    pub fn child(&self, name: Id) -> Option<UiNodeId> {
        self.children.get(&name).copied()
    }

    pub fn children(&self) -> impl Iterator<Item = (Id, UiNodeId)> + '_ {
        self.children.iter().map(|(name, id)| (*name, *id))
    }

    /// Contributing namespace entries. The first one wins attribute-level
    /// lookups.
    pub fn descs(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.descs.iter().copied()
    }

    pub fn primary_desc(&self) -> Option<NamespaceId> {
        self.descs.first().copied()
    }

    /// `true` once every immediate child has been materialized.
    pub fn is_built(&self) -> bool {
        self.build
    }
}

/// Arena of materialized nodes. May hold several roots.
///
/// Trees are snapshots: any bind or unbind of a contributing document
/// invalidates them.
#[derive(Debug, Clone, Default)]
pub struct UiTree {
    nodes: Vec<UiNode>,
}

impl UiTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: UiNodeId) -> &UiNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: UiNodeId) -> Option<&UiNode> {
        self.nodes.get(id.index())
    }

    pub fn child(&self, parent: UiNodeId, name: &str) -> Option<UiNodeId> {
        self.get(parent)?.child(Id::new(name))
    }

    /// Names from the node's root down to the node, root included.
    pub fn path(&self, id: UiNodeId) -> Vec<Id> {
        let mut path: Vec<Id> =
            std::iter::successors(Some(id), |id| self.get(*id).and_then(UiNode::parent))
                .map(|id| self.node(id).name)
                .collect();
        path.reverse();
        path
    }

    /// `/`-joined [`path`](Self::path).
    pub fn path_string(&self, id: UiNodeId) -> String {
        Id::join_path(&self.path(id))
    }

    pub(crate) fn add_root(&mut self, name: Id, kind: UiNodeKind, desc: NamespaceId) -> UiNodeId {
        self.push(name, kind, None, desc)
    }

    /// Returns the child called `name`, creating it when missing.
    pub(crate) fn get_or_add_child(
        &mut self,
        parent: UiNodeId,
        name: Id,
        kind: UiNodeKind,
        desc: NamespaceId,
    ) -> UiNodeId {
        if let Some(existing) = self.node(parent).child(name) {
            let descs = &mut self.node_mut(existing).descs;
            if !descs.contains(&desc) {
                descs.shift_insert(0, desc);
            }
            return existing;
        }
        let id = self.push(name, kind, Some(parent), desc);
        self.node_mut(parent).children.insert(name, id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: UiNodeId) -> &mut UiNode {
        &mut self.nodes[id.index()]
    }

    fn push(
        &mut self,
        name: Id,
        kind: UiNodeKind,
        parent: Option<UiNodeId>,
        desc: NamespaceId,
    ) -> UiNodeId {
        let id = UiNodeId(self.nodes.len() as u32);
        self.nodes.push(UiNode {
            name,
            kind,
            parent,
            children: IndexMap::new(),
            descs: IndexSet::from([desc]),
            build: false,
            raw_children: OnceCell::new(),
        });
        id
    }
}
