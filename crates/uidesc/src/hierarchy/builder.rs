//! Materialization of effective hierarchies from the declaration index.
//!
//! A node's contributors are its own namespace entries closed under two
//! relations: the entries extending it from other files (`file=`) and the
//! entry its first declaration names as template (`template=`). Contributors
//! are kept in precedence order, extensions first and templates last, so the
//! first contributor answers attribute-level lookups.

use indexmap::IndexSet;
use log::{debug, trace, warn};
use uidesc_core::{
    identifier::Id,
    schema::{FrameType, SchemaRegistry},
};
use uidesc_parser::Element;

use super::{
    DocumentSource,
    tree::{UiNodeId, UiNodeKind, UiTree},
};
use crate::{
    config::BuilderConfig,
    index::{DeclRef, DescIndex, NamespaceId, NamespaceKind},
};

/// Builds [`UiTree`] nodes from the declaration index.
///
/// The builder itself holds no state; everything it materializes goes into
/// the tree passed to each call.
pub struct UiBuilder<'a, D: ?Sized> {
    index: &'a DescIndex,
    docs: &'a D,
    schema: &'a SchemaRegistry,
    config: &'a BuilderConfig,
}

impl<'a, D: DocumentSource + ?Sized> UiBuilder<'a, D> {
    pub fn new(
        index: &'a DescIndex,
        docs: &'a D,
        schema: &'a SchemaRegistry,
        config: &'a BuilderConfig,
    ) -> Self {
        Self {
            index,
            docs,
            schema,
            config,
        }
    }

    pub fn index(&self) -> &'a DescIndex {
        self.index
    }

    pub fn documents(&self) -> &'a D {
        self.docs
    }

    pub fn schema(&self) -> &'a SchemaRegistry {
        self.schema
    }

    /// Adds an unexpanded root node for `desc`. `None` if the entry was pruned.
    pub fn create_root(&self, tree: &mut UiTree, desc: NamespaceId) -> Option<UiNodeId> {
        let entry = self.index.get(desc)?;
        Some(tree.add_root(entry.name(), entry.kind().into(), desc))
    }

    /// Materializes the hierarchy below `node`.
    ///
    /// With `path == None` the whole subtree is built, except below nodes
    /// sharing a contributor with one of their ancestors: those come from a
    /// template that refers back to the ancestor and are left unexpanded
    /// until expanded on their own. With a non-empty path only the branch
    /// matching the path is materialized, and the node at the end of the
    /// path gets its immediate children. Only nodes whose children were
    /// materialized without a name filter are marked built.
    pub fn expand(&self, tree: &mut UiTree, node: UiNodeId, path: Option<&[Id]>) {
        self.expand_at(tree, node, path, 0, &mut Vec::new());
    }

    /// Materializes the immediate children of `node`.
    pub fn expand_level(&self, tree: &mut UiTree, node: UiNodeId) {
        self.expand_at(tree, node, Some(&[]), 0, &mut Vec::new());
    }

    fn expand_at(
        &self,
        tree: &mut UiTree,
        node: UiNodeId,
        path: Option<&[Id]>,
        depth: usize,
        lineage: &mut Vec<NamespaceId>,
    ) {
        if depth > self.config.max_depth() {
            warn!(
                node:% = tree.path_string(node),
                max_depth = self.config.max_depth();
                "Hierarchy expansion depth limit reached"
            );
            return;
        }

        let head = path.and_then(|path| path.first()).copied();
        if !tree.node(node).is_built() {
            self.close_contributors(tree, node);
            if path.is_none() && shares_contributor(tree, node, lineage) {
                trace!(
                    node:% = tree.path_string(node);
                    "Recursive template use left unexpanded"
                );
                return;
            }
            self.materialize(tree, node, head);
            if head.is_none() {
                tree.node_mut(node).build = true;
            }
        }

        match (path, head) {
            (Some(path), Some(head)) => {
                if let Some(child) = tree.node(node).child(head) {
                    self.expand_at(tree, child, Some(&path[1..]), depth + 1, lineage);
                }
            }
            (Some(_), None) => {}
            (None, _) => {
                let mark = lineage.len();
                lineage.extend(tree.node(node).descs());
                let children: Vec<UiNodeId> =
                    tree.node(node).children().map(|(_, id)| id).collect();
                for child in children {
                    self.expand_at(tree, child, None, depth + 1, lineage);
                }
                lineage.truncate(mark);
            }
        }
    }

    /// Replaces the node's contributors with their closure under extensions
    /// and templates.
    fn close_contributors(&self, tree: &mut UiTree, node: UiNodeId) {
        let mut visited = IndexSet::new();
        let mut closed = IndexSet::new();
        let descs: Vec<NamespaceId> = tree.node(node).descs().collect();
        for desc in descs {
            self.collect_contributors(desc, &mut visited, &mut closed);
        }
        tree.node_mut(node).descs = closed;
    }

    fn collect_contributors(
        &self,
        desc: NamespaceId,
        visited: &mut IndexSet<NamespaceId>,
        out: &mut IndexSet<NamespaceId>,
    ) {
        if self.index.get(desc).is_none() || !visited.insert(desc) {
            return;
        }
        let extensions: Vec<NamespaceId> = self.index.extensions_of(desc).collect();
        for extension in extensions {
            self.collect_contributors(extension, visited, out);
        }
        out.insert(desc);
        if let Some(template) = self.template_of(desc) {
            self.collect_contributors(template, visited, out);
        }
    }

    /// Creates child nodes for every child entry of every contributor,
    /// lowest precedence first, so that each child's `descs` ends up in
    /// precedence order.
    fn materialize(&self, tree: &mut UiTree, node: UiNodeId, head: Option<Id>) {
        let contributors: Vec<NamespaceId> = tree.node(node).descs().collect();
        for desc in contributors.into_iter().rev() {
            let Some(entry) = self.index.get(desc) else {
                continue;
            };
            for (name, child) in entry.children() {
                if head.is_some_and(|head| head != name) {
                    continue;
                }
                let kind = self.index.namespace(child).kind().into();
                tree.get_or_add_child(node, name, kind, child);
            }
        }
    }

    /// Entry named by the `template=` attribute of `desc`'s first declaration.
    fn template_of(&self, desc: NamespaceId) -> Option<NamespaceId> {
        let template = self
            .first_element(desc)?
            .attribute_value("template")
            .filter(|path| !Id::split_path(path).is_empty())?;
        let found = self.index.lookup_path(template);
        if found.is_none() {
            trace!(template = template; "Template path not found");
        }
        found
    }

    /// Finds the hierarchy root `desc` really belongs to and the path from
    /// that root down to `desc`.
    ///
    /// A top-level declaration carrying `file=X` (with `X` another file)
    /// reopens `X`'s top-level entry of the same name, so its hierarchy is
    /// rooted there. Returns `None` when such a target does not exist.
    pub fn determine_context_of_desc(&self, desc: NamespaceId) -> Option<(NamespaceId, Vec<Id>)> {
        let mut visited = IndexSet::new();
        let mut current = desc;
        let mut residual: Vec<Id> = Vec::new();

        loop {
            if !visited.insert(current) {
                debug!(desc:% = self.index.full_name(desc); "Cyclic file override");
                return None;
            }
            self.index.get(current)?;

            // [file, top, rest..]
            let segments = self.index.path_segments(current);
            if segments.len() < 2 {
                return Some((current, residual));
            }
            let (file, top) = (segments[0], segments[1]);
            residual.splice(0..0, segments[2..].iter().copied());
            let top_ns = self.index.lookup_segments(self.index.root(), &[file, top])?;

            let target_file = self
                .first_element(top_ns)
                .and_then(|element| element.attribute_value("file"))
                .filter(|target| !target.is_empty() && file != *target);
            match target_file {
                Some(target) => {
                    let target_ns = self
                        .index
                        .lookup_segments(self.index.root(), &[Id::new(target), top]);
                    match target_ns {
                        Some(target_ns) => current = target_ns,
                        None => {
                            debug!(
                                desc:% = self.index.full_name(desc),
                                target = target;
                                "Override target not found"
                            );
                            return None;
                        }
                    }
                }
                None => return Some((top_ns, residual)),
            }
        }
    }

    /// Builds the hierarchy `desc` belongs to, just deep enough to reach
    /// `desc`, and returns its node.
    pub fn build_node_from_desc(&self, tree: &mut UiTree, desc: NamespaceId) -> Option<UiNodeId> {
        let (root_desc, path) = self.determine_context_of_desc(desc)?;
        let root = self.create_root(tree, root_desc)?;
        self.expand(tree, root, Some(&path));

        let node = path
            .iter()
            .try_fold(root, |node, segment| tree.node(node).child(*segment));
        if node.is_none() {
            debug!(desc:% = self.index.full_name(desc); "Expansion did not reach declaration");
        }
        node
    }

    /// Raw child elements of every declaration contributing to `node`.
    ///
    /// Cached on first use; call after the node was expanded.
    pub fn raw_children<'t>(&self, tree: &'t UiTree, node: UiNodeId) -> &'t [DeclRef] {
        let node = tree.node(node);
        node.raw_children.get_or_init(|| {
            let mut children = Vec::new();
            for desc in node.descs() {
                let Some(entry) = self.index.get(desc) else {
                    continue;
                };
                for decl in entry.decls() {
                    if let Some(element) = self.element(decl) {
                        children.extend(
                            element
                                .children()
                                .iter()
                                .map(|child| DeclRef::new(decl.doc(), *child)),
                        );
                    }
                }
            }
            children
        })
    }

    /// `{tag}:{type}` of the first contributor declaring a `type=`, e.g.
    /// `Frame:Button`.
    pub fn effective_type_name(&self, tree: &UiTree, node: UiNodeId) -> Option<String> {
        tree.node(node).descs().find_map(|desc| {
            let element = self.first_element(desc)?;
            let ty = element.attribute_value("type")?;
            Some(format!("{}:{ty}", element.tag()?))
        })
    }

    /// Frame type of a frame node; plain `Frame` when no contributor sets a
    /// `type=`.
    pub fn frame_type(&self, tree: &UiTree, node: UiNodeId) -> Option<&'a FrameType> {
        let node = tree.node(node);
        if node.kind() != UiNodeKind::Frame {
            return None;
        }
        let name = node
            .descs()
            .find_map(|desc| self.first_element(desc)?.attribute_value("type"))
            .unwrap_or("Frame");
        self.schema.frame_type(name)
    }

    /// Element behind a declaration reference.
    pub fn element(&self, decl: DeclRef) -> Option<&'a Element> {
        self.docs.document(decl.doc())?.get(decl.element())
    }

    fn first_element(&self, desc: NamespaceId) -> Option<&'a Element> {
        let entry = self.index.get(desc)?;
        if entry.kind() == NamespaceKind::Root {
            return None;
        }
        self.element(entry.first_decl()?)
    }
}

/// `true` when a contributor of `node` also contributes to a node on
/// `lineage`.
fn shares_contributor(tree: &UiTree, node: UiNodeId, lineage: &[NamespaceId]) -> bool {
    tree.node(node).descs().any(|desc| lineage.contains(&desc))
}
