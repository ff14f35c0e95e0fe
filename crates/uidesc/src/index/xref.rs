//! Cross-reference maps (constants, handles) and reverse-index sets.

use indexmap::{IndexMap, IndexSet};

use super::{DeclRef, NamespaceId};

/// What a [`XRefMap`] collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XRefKind {
    /// `<Constant name=...>` declarations.
    Constant,
    /// Frame properties whose `val` is handle-typed.
    Handle,
}

/// A named cross-reference and the elements declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XRefItem {
    kind: XRefKind,
    name: String,
    decls: IndexSet<DeclRef>,
}

impl XRefItem {
    pub fn kind(&self) -> XRefKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decls(&self) -> impl Iterator<Item = DeclRef> + '_ {
        self.decls.iter().copied()
    }

    pub fn first_decl(&self) -> Option<DeclRef> {
        self.decls.first().copied()
    }
}

/// Name → [`XRefItem`] map. Items without declarations are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XRefMap {
    kind: XRefKind,
    items: IndexMap<String, XRefItem>,
}

impl XRefMap {
    pub fn new(kind: XRefKind) -> Self {
        Self {
            kind,
            items: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> XRefKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&XRefItem> {
        self.items.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &XRefItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, decl: DeclRef) {
        let kind = self.kind;
        self.items
            .entry(name.to_string())
            .or_insert_with(|| XRefItem {
                kind,
                name: name.to_string(),
                decls: IndexSet::new(),
            })
            .decls
            .insert(decl);
    }

    pub(crate) fn remove(&mut self, name: &str, decl: DeclRef) {
        if let Some(item) = self.items.get_mut(name) {
            item.decls.shift_remove(&decl);
            if item.decls.is_empty() {
                self.items.shift_remove(name);
            }
        }
    }
}

/// Namespace entries registered under one reverse-index key.
///
/// Each entry counts its registrations, so two elements merged into one
/// namespace that both register the same key need two releases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSet {
    entries: IndexMap<NamespaceId, u32>,
}

impl RefSet {
    pub fn contains(&self, id: NamespaceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of distinct namespace entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn acquire(&mut self, id: NamespaceId) {
        *self.entries.entry(id).or_insert(0) += 1;
    }

    /// Returns `false` when `id` was not registered.
    pub(crate) fn release(&mut self, id: NamespaceId) -> bool {
        let Some(count) = self.entries.get_mut(&id) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.entries.shift_remove(&id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use uidesc_parser::ElementId;

    use super::*;
    use crate::index::DocumentId;

    fn decl(doc: u32) -> DeclRef {
        DeclRef::new(DocumentId::new(doc), ElementId::ROOT)
    }

    #[test]
    fn test_xref_map_removes_empty_items() {
        let mut map = XRefMap::new(XRefKind::Constant);
        map.insert("Pad", decl(1));
        map.insert("Pad", decl(2));
        assert_eq!(map.get("Pad").unwrap().decls().count(), 2);

        map.remove("Pad", decl(1));
        assert_eq!(map.get("Pad").unwrap().first_decl(), Some(decl(2)));

        map.remove("Pad", decl(2));
        assert!(map.get("Pad").is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_xref_map_remove_unknown_is_noop() {
        let mut map = XRefMap::new(XRefKind::Handle);
        map.remove("Missing", decl(1));
        assert!(map.is_empty());
    }

    #[test]
    fn test_ref_set_counts_registrations() {
        let mut set = RefSet::default();
        let id = NamespaceId::new(3);
        set.acquire(id);
        set.acquire(id);
        assert_eq!(set.len(), 1);

        assert!(set.release(id));
        assert!(set.contains(id));
        assert!(set.release(id));
        assert!(set.is_empty());
        assert!(!set.release(id));
    }
}
