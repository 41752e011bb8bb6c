//! Arena-backed tree for the foldered navigation views.
//!
//! Nodes hold either the synthetic root, a folder, or an item; children
//! are owned by their parent, parent links are plain indices. Trees are
//! rebuilt wholesale on every data refresh, so there is no incremental
//! mutation contract beyond insert/remove of whole subtrees.

use std::collections::HashMap;

use super::{Folder, Item};

/// Handle to a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a tree node carries.
#[derive(Debug, Clone)]
pub enum NodeKind<T> {
    Root,
    Folder(Folder),
    Item(T),
}

impl<T: Item> NodeKind<T> {
    /// Identifier used by `find`/`remove`. The root has none.
    pub fn id(&self) -> &str {
        match self {
            NodeKind::Root => "",
            NodeKind::Folder(folder) => folder.id(),
            NodeKind::Item(item) => item.id(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            NodeKind::Root => String::new(),
            NodeKind::Folder(folder) => folder.title(),
            NodeKind::Item(item) => item.title(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder(_))
    }
}

/// A single tree node.
///
/// Invariant: `depth == parent.depth + 1`; the root sits at depth -1 so
/// its direct children render at depth 0.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    pub kind: NodeKind<T>,
    pub depth: i32,
    pub parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub collapsed: bool,
}

impl<T> TreeNode<T> {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Tree owning a synthetic root plus all inserted nodes.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    // Slab storage: removed subtrees leave vacant slots.
    nodes: Vec<Option<TreeNode<T>>>,
    root: NodeId,
}

impl<T: Item> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> Tree<T> {
    pub fn new() -> Self {
        let root = TreeNode {
            kind: NodeKind::Root,
            depth: -1,
            parent: None,
            children: Vec::new(),
            collapsed: false,
        };
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<T>> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Insert a node under `parent`, appending to its child list.
    ///
    /// Returns `None` when `parent` no longer exists.
    pub fn insert(&mut self, parent: NodeId, kind: NodeKind<T>) -> Option<NodeId> {
        let depth = self.get(parent)?.depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(TreeNode {
            kind,
            depth,
            parent: Some(parent),
            children: Vec::new(),
            collapsed: false,
        }));
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        Some(id)
    }

    /// Insert under the parent whose item id is `parent_id`.
    pub fn insert_under(&mut self, parent_id: &str, kind: NodeKind<T>) -> Option<NodeId> {
        let parent = self.find(parent_id)?;
        self.insert(parent, kind)
    }

    /// Point lookup by item id: linear scan over pre-order traversal.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.pre_order()
            .find(|&node_id| self.get(node_id).map(|n| n.kind.id()) == Some(id))
    }

    /// Remove the node with the given item id and its whole subtree.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(node_id) = self.find(id) else {
            return false;
        };
        if node_id == self.root {
            return false;
        }
        // Detach from the parent first, then vacate the subtree slots.
        if let Some(parent) = self.get(node_id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|&c| c != node_id);
            }
        }
        let subtree: Vec<NodeId> = self.post_order_from(node_id).collect();
        for NodeId(slot) in subtree {
            self.nodes[slot] = None;
        }
        true
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-order traversal starting at the root. Lazy and restartable;
    /// each call yields a fresh iterator over the current tree.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
            skip_collapsed: false,
        }
    }

    /// Pre-order traversal that does not descend into collapsed nodes.
    /// This is the visible-row order the tree views render.
    pub fn visible(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
            skip_collapsed: true,
        }
    }

    /// Post-order traversal starting at the root.
    pub fn post_order(&self) -> PostOrder<'_, T> {
        self.post_order_from(self.root)
    }

    fn post_order_from(&self, start: NodeId) -> PostOrder<'_, T> {
        PostOrder {
            tree: self,
            stack: vec![(start, false)],
        }
    }
}

/// Lazy pre-order iterator over a [`Tree`].
pub struct PreOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
    skip_collapsed: bool,
}

impl<T: Item> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let id = self.stack.pop()?;
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if !(self.skip_collapsed && node.collapsed) {
                // Children pushed in reverse so the first child pops first.
                self.stack.extend(node.children.iter().rev());
            }
            return Some(id);
        }
    }
}

/// Lazy post-order iterator over a [`Tree`].
pub struct PostOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<T: Item> Iterator for PostOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            self.stack
                .extend(node.children.iter().rev().map(|&c| (c, false)));
        }
    }
}

/// Split a folder declaration into normalized segments.
///
/// Both `/` and `.` delimit; empty segments (leading, trailing, doubled
/// delimiters) are dropped, so `/a/b/`, `a/b` and `a.b` all normalize
/// to `["a", "b"]`.
pub fn folder_segments(path: &str) -> Vec<&str> {
    path.split(['/', '.'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Build the foldered navigation tree from a flat item list.
///
/// Intermediate path segments become synthetic [`Folder`] nodes, created
/// on demand and deduplicated by cumulative path id. Items without a
/// folder declaration attach directly under the root. Insertion order of
/// the input is preserved among siblings.
pub fn build_folder_tree<T: Item>(items: Vec<T>) -> Tree<T> {
    let mut tree = Tree::new();
    let mut folders: HashMap<String, NodeId> = HashMap::new();

    for item in items {
        let mut parent = tree.root();
        if let Some(declared) = item.folder_definition() {
            let mut cumulative = String::new();
            for segment in folder_segments(declared) {
                if !cumulative.is_empty() {
                    cumulative.push('/');
                }
                cumulative.push_str(segment);
                parent = match folders.get(&cumulative) {
                    Some(&existing) => existing,
                    None => {
                        let folder = Folder {
                            name: segment.to_string(),
                            path: cumulative.clone(),
                        };
                        // Parent is always live here, folders only deepen.
                        let id = tree
                            .insert(parent, NodeKind::Folder(folder))
                            .unwrap_or(parent);
                        folders.insert(cumulative.clone(), id);
                        id
                    }
                };
            }
        }
        tree.insert(parent, NodeKind::Item(item));
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StubMapping;
    use serde_json::json;

    fn mapping(id: &str, folder: Option<&str>) -> StubMapping {
        let mut value = json!({
            "id": id,
            "request": { "method": "GET", "url": format!("/{}", id) },
            "response": { "status": 200 }
        });
        if let Some(folder) = folder {
            value["metadata"] = json!({ "folder": folder });
        }
        serde_json::from_value(value).unwrap()
    }

    fn ids<T: Item>(tree: &Tree<T>, order: impl Iterator<Item = NodeId>) -> Vec<String> {
        order
            .filter_map(|id| tree.get(id).map(|n| n.kind.id().to_string()))
            .collect()
    }

    #[test]
    fn test_new_tree_has_root_at_depth_minus_one() {
        let tree: Tree<StubMapping> = Tree::new();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.depth, -1);
        assert!(root.parent.is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_sets_depth_and_parent() {
        let mut tree: Tree<StubMapping> = Tree::new();
        let a = tree
            .insert(tree.root(), NodeKind::Item(mapping("a", None)))
            .unwrap();
        let b = tree.insert(a, NodeKind::Item(mapping("b", None))).unwrap();

        let node_a = tree.get(a).unwrap();
        let node_b = tree.get(b).unwrap();
        assert_eq!(node_a.depth, 0);
        assert_eq!(node_b.depth, 1);
        assert_eq!(node_b.parent, Some(a));
        assert_eq!(node_a.children(), &[b]);
    }

    #[test]
    fn test_find_after_insert_returns_child_of_parent() {
        let mut tree: Tree<StubMapping> = Tree::new();
        let parent = tree
            .insert(tree.root(), NodeKind::Item(mapping("parent", None)))
            .unwrap();
        tree.insert(parent, NodeKind::Item(mapping("fresh", None)))
            .unwrap();

        let found = tree.find("fresh").unwrap();
        assert_eq!(tree.get(found).unwrap().parent, Some(parent));
    }

    #[test]
    fn test_insert_under_locates_parent_by_id() {
        let mut tree: Tree<StubMapping> = Tree::new();
        tree.insert(tree.root(), NodeKind::Item(mapping("a", None)))
            .unwrap();
        let b = tree
            .insert_under("a", NodeKind::Item(mapping("b", None)))
            .unwrap();
        assert_eq!(tree.get(b).unwrap().depth, 1);
        assert!(tree.insert_under("missing", NodeKind::Item(mapping("c", None))).is_none());
    }

    #[test]
    fn test_pre_order_is_depth_first_and_restartable() {
        let tree = build_folder_tree(vec![
            mapping("m1", Some("a/b")),
            mapping("m2", Some("a")),
            mapping("m3", None),
        ]);
        let first = ids(&tree, tree.pre_order());
        assert_eq!(first, vec!["", "a", "a/b", "m1", "m2", "m3"]);
        // A second traversal starts over.
        assert_eq!(ids(&tree, tree.pre_order()), first);
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let tree = build_folder_tree(vec![mapping("m1", Some("a/b")), mapping("m2", Some("a"))]);
        assert_eq!(
            ids(&tree, tree.post_order()),
            vec!["m1", "a/b", "m2", "a", ""]
        );
    }

    #[test]
    fn test_remove_prunes_subtree() {
        let mut tree = build_folder_tree(vec![
            mapping("m1", Some("a/b")),
            mapping("m2", Some("a")),
            mapping("m3", None),
        ]);
        assert!(tree.remove("a"));
        assert_eq!(ids(&tree, tree.pre_order()), vec!["", "m3"]);
        assert!(tree.find("m1").is_none());
        assert!(!tree.remove("a"));
    }

    #[test]
    fn test_remove_root_is_rejected() {
        let mut tree = build_folder_tree(vec![mapping("m1", None)]);
        assert!(!tree.remove(""));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_folder_segments_normalization() {
        assert_eq!(folder_segments("/a/b/"), vec!["a", "b"]);
        assert_eq!(folder_segments("a/b"), vec!["a", "b"]);
        assert_eq!(folder_segments("a.b"), vec!["a", "b"]);
        assert_eq!(folder_segments("//a//b"), vec!["a", "b"]);
        assert!(folder_segments("").is_empty());
        assert!(folder_segments("/").is_empty());
    }

    #[test]
    fn test_equivalent_paths_share_folder_identity() {
        let tree = build_folder_tree(vec![
            mapping("m1", Some("/a/b/")),
            mapping("m2", Some("a.b")),
            mapping("m3", Some("a")),
        ]);
        // One "a" folder, one "a/b" folder, despite three spellings.
        let folder_count = tree
            .pre_order()
            .filter(|&id| tree.get(id).map(|n| n.kind.is_folder()).unwrap_or(false))
            .count();
        assert_eq!(folder_count, 2);

        let b = tree.find("a/b").unwrap();
        let m1 = tree.find("m1").unwrap();
        let m2 = tree.find("m2").unwrap();
        assert_eq!(tree.get(m1).unwrap().parent, Some(b));
        assert_eq!(tree.get(m2).unwrap().parent, Some(b));
    }

    #[test]
    fn test_items_without_folder_attach_under_root() {
        let tree = build_folder_tree(vec![mapping("m1", None)]);
        let m1 = tree.find("m1").unwrap();
        assert_eq!(tree.get(m1).unwrap().parent, Some(tree.root()));
        assert_eq!(tree.get(m1).unwrap().depth, 0);
    }

    #[test]
    fn test_visible_skips_collapsed_subtrees() {
        let mut tree = build_folder_tree(vec![
            mapping("m1", Some("a")),
            mapping("m2", Some("b")),
        ]);
        let a = tree.find("a").unwrap();
        tree.get_mut(a).unwrap().collapsed = true;
        let visible = ids(&tree, tree.visible());
        assert_eq!(visible, vec!["", "a", "b", "m2"]);
    }

    #[test]
    fn test_insertion_order_preserved_among_siblings() {
        let tree = build_folder_tree(vec![
            mapping("z", None),
            mapping("a", None),
            mapping("k", None),
        ]);
        let order = ids(&tree, tree.pre_order());
        assert_eq!(order, vec!["", "z", "a", "k"]);
    }
}
