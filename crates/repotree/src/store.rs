// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;
use std::path::Path;

use diagnostics::{log_debug, log_info};

use crate::error::{Error, Result};
use crate::factory::NodeFactory;
use crate::node::TreeNode;

/// Name of the invisible store root. It never appears in node paths.
pub const ROOT_NAME: &str = "root";

/// The owning collection of a tree of nodes.
///
/// A store is an explicit value created by the application and passed to
/// whatever needs it. All paths are relative to the root, whose own path is
/// the empty string.
pub struct TreeStore {
    root: TreeNode,
}

impl TreeStore {
    pub fn new() -> Self {
        Self {
            root: TreeNode::new_root(ROOT_NAME),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Resolves a node path from the root
    pub fn resolve(&self, path: &str) -> Result<TreeNode> {
        self.root.find_by_path(path)
    }

    /// Resolves a parent path, where the empty path names the root
    fn resolve_parent(&self, parent_path: &str) -> Result<TreeNode> {
        if parent_path.is_empty() {
            Ok(self.root.clone())
        } else {
            self.resolve(parent_path)
        }
    }

    /// Inserts a detached node under the node at `parent_path` ("" for the
    /// root). Returns the path of the inserted node.
    pub fn insert(&self, node: TreeNode, parent_path: &str, position: Option<usize>) -> Result<String> {
        let parent = self.resolve_parent(parent_path)?;
        self.insert_under(node, &parent, position)
    }

    /// Inserts a detached node under `parent`, which must belong to this store.
    pub fn insert_under(&self, node: TreeNode, parent: &TreeNode, position: Option<usize>) -> Result<String> {
        if !self.contains(parent) {
            return Err(Error::invalid_argument(format!(
                "{parent:?} does not belong to this store"
            )));
        }
        let node = parent.insert_child(node, position)?;
        Ok(node.path())
    }

    /// True when `node` is the root or one of its descendants
    pub fn contains(&self, node: &TreeNode) -> bool {
        let mut cursor = node.clone();
        while let Some(parent) = cursor.parent() {
            cursor = parent;
        }
        cursor.ptr_eq(&self.root)
    }

    /// Removes the node at `path`, finalizing its subtree. Returns the removed node.
    ///
    /// The empty path names no removable node and fails with `NotFound`.
    pub fn remove_at(&self, path: &str) -> Result<TreeNode> {
        let node = self.resolve(path)?;
        // Resolved nodes are below the root
        let parent = node.parent().ok_or_else(|| Error::not_found(path))?;
        let removed = parent.remove_child_at(node.index_in_parent())?;

        log_info!("Removed {path}", path: path);
        Ok(removed)
    }

    /// Replaces the node at `path` with a node freshly built by `factory` from
    /// the old node's file name and kind.
    ///
    /// The replacement keeps the old name, parent and position. It is built
    /// before the old node is removed, so a failing factory changes nothing.
    pub fn reload(&self, path: &str, factory: &dyn NodeFactory) -> Result<String> {
        let old = self.resolve(path)?;
        let file_name = old
            .file_name()
            .ok_or_else(|| Error::invalid_state(format!("{old:?} was not read from a file")))?;
        let parent = old
            .parent()
            .ok_or_else(|| Error::invalid_argument("the store root cannot be reloaded"))?;
        let position = old.index_in_parent();

        let kind = old.kind();
        let replacement = factory.create_node(&file_name, Some(kind.as_str()))?;
        replacement.set_name(&old.name())?;

        let _ = parent.remove_child_at(position)?;
        let replacement = parent.insert_child(replacement, Some(position))?;

        log_info!("Reloaded {path}", path: path);
        Ok(replacement.path())
    }

    /// Builds a node for `file_name` and inserts it under `parent_path`.
    ///
    /// `kind` names the factory to use; when `None` it is detected from the
    /// file name. Returns the path of the new node.
    pub fn load(
        &self,
        factory: &dyn NodeFactory,
        file_name: &Path,
        kind: Option<&str>,
        parent_path: &str,
        position: Option<usize>,
    ) -> Result<String> {
        let parent = self.resolve_parent(parent_path)?;
        let node = factory.create_node(file_name, kind)?;
        let path = self.insert_under(node, &parent, position)?;

        let file = file_name.display().to_string();
        log_info!("Loaded {file} at {path}", file: file.as_str(), path: path.as_str());
        Ok(path)
    }

    /// Fetches and inserts the children of a lazy node.
    ///
    /// Returns the number of inserted children; 0 when the node cannot fetch.
    pub fn fetch_more(&self, node: &TreeNode) -> Result<usize> {
        self.fetch_more_with(node, |_, _| {})
    }

    /// Like [`TreeStore::fetch_more`], calling `on_insert(parent, row)` after
    /// each child is inserted.
    pub fn fetch_more_with<F: FnMut(&TreeNode, usize)>(&self, node: &TreeNode, mut on_insert: F) -> Result<usize> {
        if !node.can_fetch_children() {
            return Ok(0);
        }

        let children = node.fetch_children()?;
        if let Err(e) = check_produced(node, &children) {
            discard_produced(node, &children);
            // Back to unfetched so the node can be retried
            node.mark_unfetched();
            return Err(e);
        }

        // Checked above, so no insert fails and every row is reported
        let count = children.len();
        for child in children {
            let row = node.child_count();
            node.insert_child(child, None)?;
            on_insert(node, row);
        }
        Ok(count)
    }

    /// Fetches lazy nodes from `path` ("" for the root) down to `depth` levels
    /// below it. Returns the number of inserted nodes.
    ///
    /// Stops at the first failing fetch; nodes fetched before it stay fetched.
    pub fn expand(&self, path: &str, depth: usize) -> Result<usize> {
        self.expand_with(path, depth, |_, e| Err(e))
    }

    /// Like [`TreeStore::expand`], handing each failed fetch to `on_error`.
    ///
    /// When `on_error` returns `Ok` the failed node is left unfetched and the
    /// expansion carries on with the remaining nodes.
    pub fn expand_with<F>(&self, path: &str, depth: usize, mut on_error: F) -> Result<usize>
    where
        F: FnMut(&TreeNode, Error) -> Result<()>,
    {
        let start = self.resolve_parent(path)?;
        let mut inserted = 0;
        let mut queue = VecDeque::from([(start, 0)]);

        while let Some((node, level)) = queue.pop_front() {
            if level >= depth {
                continue;
            }
            match self.fetch_more(&node) {
                Ok(count) => inserted += count,
                Err(e) => on_error(&node, e)?,
            }
            queue.extend(node.children().into_iter().map(|child| (child, level + 1)));
        }

        log_debug!("Expanded {path} by {depth} levels, {inserted} new nodes",
            path: path, depth: depth, inserted: inserted);
        Ok(inserted)
    }

    /// Walks up from `node` to the topmost ancestor read from the same file.
    ///
    /// Nodes without a file name, and nodes directly below the root, are
    /// their own file ancestor.
    pub fn find_file_ancestor(&self, node: &TreeNode) -> TreeNode {
        let mut current = node.clone();
        let Some(file_name) = current.file_name() else {
            return current;
        };
        while let Some(parent) = current.parent() {
            if parent.is_root() || parent.file_name().as_ref() != Some(&file_name) {
                break;
            }
            current = parent;
        }
        current
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        self.root.descendants().count()
    }
}

/// True when `candidate` is `node` or one of its ancestors
fn in_lineage(node: &TreeNode, candidate: &TreeNode) -> bool {
    let mut cursor = Some(node.clone());
    while let Some(ancestor) = cursor {
        if ancestor.ptr_eq(candidate) {
            return true;
        }
        cursor = ancestor.parent();
    }
    false
}

/// Checks that produced children can all be inserted under `node`
fn check_produced(node: &TreeNode, children: &[TreeNode]) -> Result<()> {
    for (index, child) in children.iter().enumerate() {
        if let Some(parent) = child.parent() {
            return Err(Error::invalid_state(format!(
                "produced {child:?} already has a parent: {parent:?}"
            )));
        }
        if children[..index].iter().any(|earlier| earlier.ptr_eq(child)) {
            return Err(Error::invalid_state(format!("{child:?} was produced twice")));
        }
        if in_lineage(node, child) {
            return Err(Error::invalid_state(format!(
                "cannot insert {child:?} below itself"
            )));
        }
    }
    Ok(())
}

/// Finalizes the rejected products of a fetch that belong to no tree
fn discard_produced(node: &TreeNode, children: &[TreeNode]) {
    for (index, child) in children.iter().enumerate() {
        let repeated = children[..index].iter().any(|earlier| earlier.ptr_eq(child));
        if !repeated && child.parent().is_none() && !in_lineage(node, child) {
            child.finalize();
        }
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeStore{{nodes: {}}}", self.node_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MappingSource, Value};
    use std::path::PathBuf;

    fn node(name: &str) -> TreeNode {
        TreeNode::new(name).unwrap()
    }

    #[test]
    fn test_scenario_nested_insert() {
        let store = TreeStore::new();
        assert!(store.root().is_root());
        assert_eq!(store.root().path(), "");

        assert_eq!(store.insert(node("a"), "", None).unwrap(), "a");
        assert_eq!(store.insert(node("b"), "a", None).unwrap(), "a/b");

        let b = store.resolve("a/b").unwrap();
        assert_eq!(b.name(), "b");
        assert_eq!(b.path(), "a/b");
    }

    #[test]
    fn test_insert_resolve_round_trip() {
        let store = TreeStore::new();
        store.insert(node("g"), "", None).unwrap();
        let n = node("v");
        let path = store.insert(n.clone(), "g", Some(0)).unwrap();
        assert_eq!(store.resolve(&path).unwrap(), n);
    }

    #[test]
    fn test_insert_order() {
        let store = TreeStore::new();
        store.insert(node("x"), "", Some(0)).unwrap();
        store.insert(node("y"), "", Some(0)).unwrap();
        let names: Vec<_> = store.root().children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["y", "x"]);
    }

    #[test]
    fn test_insert_under_foreign_parent() {
        let store = TreeStore::new();
        let stray = node("stray");
        let result = store.insert_under(node("a"), &stray, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(stray.child_count(), 0);
        assert!(matches!(store.insert(node("a"), "missing", None), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_remove_at() {
        let store = TreeStore::new();
        store.insert(node("a"), "", None).unwrap();
        let b = node("b");
        store.insert(b.clone(), "a", None).unwrap();

        let removed = store.remove_at("a").unwrap();
        assert!(removed.is_finalized());
        assert!(b.is_finalized());
        assert_eq!(store.root().child_count(), 0);
        assert!(matches!(store.remove_at("a"), Err(Error::NotFound(_))));
        assert!(matches!(store.remove_at(""), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_fetch_more_and_expand() {
        let store = TreeStore::new();
        let value = Value::mapping([
            ("one", Value::mapping([("leaf", Value::scalar(1i64))])),
            ("two", Value::scalar("x")),
        ]);
        store
            .insert(MappingSource::new_node("data", value).unwrap(), "", None)
            .unwrap();

        let data = store.resolve("data").unwrap();
        assert_eq!(store.fetch_more(&data).unwrap(), 2);
        assert_eq!(store.fetch_more(&data).unwrap(), 0);
        assert!(!data.can_fetch_children());

        assert_eq!(store.expand("", 3).unwrap(), 1);
        assert_eq!(store.resolve("data/one/leaf").unwrap().path(), "data/one/leaf");
        assert_eq!(store.node_count(), 4);
    }

    #[test]
    fn test_find_file_ancestor() {
        let store = TreeStore::new();
        let file = PathBuf::from("/data/a.json");
        let value = Value::mapping([("g", Value::mapping([("v", Value::scalar(1i64))]))]);
        let source = MappingSource::new(value).with_file_name(Some(file.clone()));
        let top = TreeNode::new_lazy("a.json", source)
            .unwrap()
            .with_file_name(&file);
        store.insert(top.clone(), "", None).unwrap();
        store.expand("", 3).unwrap();

        let v = store.resolve("a.json/g/v").unwrap();
        assert_eq!(store.find_file_ancestor(&v), top);
        assert_eq!(store.find_file_ancestor(&top), top);

        let plain = node("plain");
        store.insert(plain.clone(), "", None).unwrap();
        assert_eq!(store.find_file_ancestor(&plain), plain);
    }

    #[test]
    fn test_reload_requires_file() {
        let store = TreeStore::new();
        store.insert(node("a"), "", None).unwrap();
        let registry = crate::factory::FactoryRegistry::default();
        assert!(matches!(store.reload("a", &registry), Err(Error::InvalidState(_))));
        assert_eq!(store.root().child_count(), 1);
    }
}
