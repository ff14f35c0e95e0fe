//! Selector resolution over materialized hierarchies.

use log::trace;
use uidesc_parser::selector::{AncestorPredicate, SelectorFragment};

use super::{
    DocumentSource, UiBuilder,
    tree::{UiNodeId, UiNodeKind, UiTree},
};

/// Outcome of resolving a fragment sequence.
///
/// `chain` holds one node per resolved fragment and stops at the first
/// fragment that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    chain: Vec<UiNodeId>,
    expected: usize,
}

impl Selection {
    /// A selection whose start node could not be built.
    pub(crate) fn unresolved(expected: usize) -> Self {
        Self {
            chain: Vec::new(),
            expected,
        }
    }

    pub fn chain(&self) -> &[UiNodeId] {
        &self.chain
    }

    /// Number of fragments that were resolved against.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// `true` when every fragment resolved.
    pub fn is_valid(&self) -> bool {
        self.chain.len() == self.expected
    }

    /// Final node of a fully resolved selection.
    pub fn target(&self) -> Option<UiNodeId> {
        if self.is_valid() {
            self.chain.last().copied()
        } else {
            None
        }
    }

    /// Deepest node reached, even when resolution stopped early.
    pub fn deepest(&self) -> Option<UiNodeId> {
        self.chain.last().copied()
    }
}

/// Resolves selector fragments against a [`UiTree`], expanding nodes
/// through its [`UiBuilder`] where needed.
pub struct UiNavigator<'a, D: ?Sized> {
    builder: UiBuilder<'a, D>,
}

impl<'a, D: DocumentSource + ?Sized> UiNavigator<'a, D> {
    pub fn new(builder: UiBuilder<'a, D>) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &UiBuilder<'a, D> {
        &self.builder
    }

    /// Resolves a single fragment starting from `node`.
    ///
    /// `Identifier` only looks at already materialized children; use
    /// [`resolve_selection`](Self::resolve_selection) or
    /// [`resolve_child`](Self::resolve_child) to expand on demand.
    pub fn resolve_selector_fragment(
        &self,
        tree: &mut UiTree,
        node: UiNodeId,
        fragment: &SelectorFragment,
    ) -> Option<UiNodeId> {
        match fragment {
            SelectorFragment::Ancestor(None) | SelectorFragment::Parent => tree.node(node).parent(),
            SelectorFragment::Ancestor(Some(predicate)) => {
                self.resolve_ancestor(tree, node, predicate)
            }
            SelectorFragment::This => Some(node),
            // Offsets are not resolved; the node stands in for its sibling.
            SelectorFragment::Sibling(_) => Some(node),
            SelectorFragment::Identifier(name) => tree.child(node, name),
            SelectorFragment::Custom(name) => self.resolve_handle(tree, name),
            SelectorFragment::Layer | SelectorFragment::Root => None,
        }
    }

    fn resolve_ancestor(
        &self,
        tree: &UiTree,
        node: UiNodeId,
        predicate: &AncestorPredicate,
    ) -> Option<UiNodeId> {
        let mut ancestors =
            std::iter::successors(tree.node(node).parent(), |id| tree.node(*id).parent());

        match predicate {
            AncestorPredicate::Name(name) => {
                ancestors.find(|id| tree.node(*id).name() == name.as_str())
            }
            AncestorPredicate::Type(name) => {
                let wanted = format!("Frame:{name}");
                ancestors.find(|id| {
                    self.builder
                        .effective_type_name(tree, *id)
                        .is_some_and(|ty| ty == wanted)
                })
            }
            AncestorPredicate::OfType(name) => {
                let Some(frame_type) = self.builder.schema().frame_type(name) else {
                    trace!(frame_type = name.as_str(); "Unknown frame type in ancestor predicate");
                    return None;
                };
                let class = frame_type.class_name();
                ancestors.find(|id| {
                    self.builder
                        .frame_type(tree, *id)
                        .is_some_and(|ty| ty.has_class(class))
                })
            }
        }
    }

    /// Builds a fresh node for the declaration holding the handle `name`.
    fn resolve_handle(&self, tree: &mut UiTree, name: &str) -> Option<UiNodeId> {
        let index = self.builder.index();
        let Some(decl) = index.handles().get(name).and_then(|item| item.first_decl()) else {
            trace!(handle = name; "Unknown handle");
            return None;
        };
        let document = self.builder.documents().document(decl.doc())?;
        let desc = index.resolve_element_desc(decl.doc(), document, decl.element(), None)?;
        self.builder.build_node_from_desc(tree, desc)
    }

    /// Resolves `fragments` one after another starting from `node`.
    ///
    /// Before an `Identifier` step the current node is expanded one level
    /// unless it is already built. Resolution stops at the first fragment
    /// that does not resolve.
    pub fn resolve_selection(
        &self,
        tree: &mut UiTree,
        node: UiNodeId,
        fragments: &[SelectorFragment],
    ) -> Selection {
        let mut chain = Vec::with_capacity(fragments.len());
        let mut current = node;
        for fragment in fragments {
            if matches!(fragment, SelectorFragment::Identifier(_))
                && !tree.node(current).is_built()
            {
                self.builder.expand_level(tree, current);
            }
            match self.resolve_selector_fragment(tree, current, fragment) {
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => {
                    trace!(
                        fragment:% = fragment,
                        resolved = chain.len();
                        "Selector fragment did not resolve"
                    );
                    break;
                }
            }
        }
        Selection {
            chain,
            expected: fragments.len(),
        }
    }

    /// Child `name` of `node`, expanding `node` first if needed.
    pub fn resolve_child(&self, tree: &mut UiTree, node: UiNodeId, name: &str) -> Option<UiNodeId> {
        if !tree.node(node).is_built() {
            self.builder.expand_level(tree, node);
        }
        tree.child(node, name)
    }

    /// Children of `node` with the given kind, expanding `node` first if
    /// needed.
    pub fn children_of_kind(
        &self,
        tree: &mut UiTree,
        node: UiNodeId,
        kind: UiNodeKind,
    ) -> Vec<UiNodeId> {
        if !tree.node(node).is_built() {
            self.builder.expand_level(tree, node);
        }
        tree.node(node)
            .children()
            .map(|(_, id)| id)
            .filter(|id| tree.node(*id).kind() == kind)
            .collect()
    }
}
