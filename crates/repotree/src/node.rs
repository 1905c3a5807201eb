// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use diagnostics::{log_debug, log_warn};

use crate::attributes::{AttrValue, Attributes};
use crate::error::{Error, Result};
use crate::path;

/// Kind reported by nodes that were not given one
pub const DEFAULT_KIND: &str = "node";

/// Produces the children of a lazily populated node.
///
/// A source is attached to a node when the node is constructed and is asked
/// for children at most once per fetch cycle. Produced nodes must be detached;
/// the caller inserts them.
pub trait ChildSource {
    /// Builds the children of the node at `path`.
    fn produce_children(&mut self, path: &str) -> Result<Vec<TreeNode>>;

    /// Releases resources held by the source. Called when the node is finalized.
    fn close(&mut self) {}
}

struct LazyState {
    /// Taken out while the source runs, so it may read its own node
    source: Option<Box<dyn ChildSource>>,
    fetched: bool,
}

struct NodeData {
    name: String,
    path: String,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<TreeNode>,
    kind: String,
    file_name: Option<PathBuf>,
    attributes: Attributes,
    lazy: Option<LazyState>,
    finalized: bool,
}

/// A handle to a node in a tree.
///
/// Handles are cheap to clone and compare by identity. A node owns its
/// children; the parent link is a weak back-reference.
#[derive(Clone)]
pub struct TreeNode(Rc<RefCell<NodeData>>);

/// Pre-order iterator over the descendants of a node
pub struct Descendants {
    stack: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a detached node without a child source.
    pub fn new(name: &str) -> Result<Self> {
        Self::build(name, None)
    }

    /// Creates a detached node whose children are produced on demand by `source`.
    pub fn new_lazy<S: ChildSource + 'static>(name: &str, source: S) -> Result<Self> {
        Self::build(
            name,
            Some(LazyState {
                source: Some(Box::new(source)),
                fetched: false,
            }),
        )
    }

    /// Creates the root of a store. Root names are fixed and known to be valid.
    pub(crate) fn new_root(name: &'static str) -> Self {
        Self::build_unchecked(name, None)
    }

    fn build(name: &str, lazy: Option<LazyState>) -> Result<Self> {
        path::validate_name(name)?;
        Ok(Self::build_unchecked(name, lazy))
    }

    fn build_unchecked(name: &str, lazy: Option<LazyState>) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            name: name.to_string(),
            path: String::new(),
            parent: Weak::new(),
            children: Vec::new(),
            kind: DEFAULT_KIND.to_string(),
            file_name: None,
            attributes: Attributes::new(),
            lazy,
            finalized: false,
        })))
    }

    #[must_use]
    pub fn with_kind(self, kind: &str) -> Self {
        self.0.borrow_mut().kind = kind.to_string();
        self
    }

    #[must_use]
    pub fn with_file_name<P: AsRef<Path>>(self, file_name: P) -> Self {
        self.0.borrow_mut().file_name = Some(file_name.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_attribute<V: Into<AttrValue>>(self, name: &str, value: V) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Renames the node and updates the paths of its subtree
    pub fn set_name(&self, name: &str) -> Result<()> {
        path::validate_name(name)?;
        self.0.borrow_mut().name = name.to_string();
        self.refresh_paths();
        Ok(())
    }

    /// Slash-separated names from the root. Empty for a root.
    pub fn path(&self) -> String {
        self.0.borrow().path.clone()
    }

    pub fn kind(&self) -> String {
        self.0.borrow().kind.clone()
    }

    /// The host file this node was read from, if any
    pub fn file_name(&self) -> Option<PathBuf> {
        self.0.borrow().file_name.clone()
    }

    pub fn attributes(&self) -> Attributes {
        self.0.borrow().attributes.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute<V: Into<AttrValue>>(&self, name: &str, value: V) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.into());
    }

    pub fn parent(&self) -> Option<TreeNode> {
        self.0.borrow().parent.upgrade().map(TreeNode)
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Snapshot of the children, in order
    pub fn children(&self) -> Vec<TreeNode> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child_at(&self, index: usize) -> Result<TreeNode> {
        let data = self.0.borrow();
        data.children
            .get(index)
            .cloned()
            .ok_or_else(|| Error::index_out_of_range(index, data.children.len()))
    }

    /// First direct child named `name`
    pub fn child_by_name(&self, name: &str) -> Result<TreeNode> {
        let data = self.0.borrow();
        data.children
            .iter()
            .find(|child| child.0.borrow().name == name)
            .cloned()
            .ok_or_else(|| Error::not_found(path::join(&data.path, name)))
    }

    /// Resolves a relative node path starting at this node.
    pub fn find_by_path(&self, relative: &str) -> Result<TreeNode> {
        let mut node = self.clone();
        for segment in path::segments(relative)? {
            node = node.child_by_name(segment)?;
        }
        Ok(node)
    }

    /// Position among the parent's children, 0 for a root
    pub fn index_in_parent(&self) -> usize {
        self.parent()
            .and_then(|parent| {
                parent
                    .0
                    .borrow()
                    .children
                    .iter()
                    .position(|c| c.ptr_eq(self))
            })
            .unwrap_or(0)
    }

    /// Inserts a detached node as a child at `position`, or last when `None`.
    ///
    /// Returns the inserted child.
    pub fn insert_child(&self, child: TreeNode, position: Option<usize>) -> Result<TreeNode> {
        if let Some(parent) = child.parent() {
            return Err(Error::invalid_state(format!(
                "{child:?} already has a parent: {parent:?}"
            )));
        }

        let mut cursor = Some(self.clone());
        while let Some(ancestor) = cursor {
            if ancestor.ptr_eq(&child) {
                return Err(Error::invalid_state(format!(
                    "cannot insert {child:?} below itself"
                )));
            }
            cursor = ancestor.parent();
        }

        let len = self.child_count();
        let position = position.unwrap_or(len);
        if position > len {
            return Err(Error::index_out_of_range(position, len));
        }

        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.insert(position, child.clone());
        child.refresh_paths();

        log_debug!("Inserted {path} at {position}", path: child.path().as_str(), position: position);
        Ok(child)
    }

    /// Finalizes the child at `position` with its subtree and detaches it.
    pub fn remove_child_at(&self, position: usize) -> Result<TreeNode> {
        let child = self.child_at(position)?;
        let path = child.path();

        child.finalize();
        self.0.borrow_mut().children.remove(position);
        child.detach();

        log_debug!("Removed {path} from position {position}", path: path.as_str(), position: position);
        Ok(child)
    }

    /// Finalizes and removes every child. A lazy node can fetch again afterwards.
    pub fn remove_all_children(&self) {
        let children = self.children();
        for child in &children {
            child.finalize();
        }

        {
            let mut data = self.0.borrow_mut();
            data.children.clear();
            if let Some(lazy) = data.lazy.as_mut() {
                lazy.fetched = false;
            }
        }

        for child in &children {
            child.detach();
        }
    }

    /// Lets a lazy node fetch again without touching its current children
    pub(crate) fn mark_unfetched(&self) {
        if let Some(lazy) = self.0.borrow_mut().lazy.as_mut() {
            lazy.fetched = false;
        }
    }

    /// Releases the resources of this subtree, descendants before ancestors.
    ///
    /// Finalizing the same node twice is a caller error and is only logged.
    pub fn finalize(&self) {
        let mut preorder = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.0.borrow().children.iter().cloned());
            preorder.push(node);
        }

        // Reversed pre-order visits every node after all of its descendants
        for node in preorder.iter().rev() {
            node.finalize_self();
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.0.borrow().finalized
    }

    /// True when the node was constructed with a child source
    pub fn is_lazy(&self) -> bool {
        self.0.borrow().lazy.is_some()
    }

    /// Lazy nodes always report children, fetched or not.
    pub fn has_children(&self) -> bool {
        let data = self.0.borrow();
        data.lazy.is_some() || !data.children.is_empty()
    }

    pub fn can_fetch_children(&self) -> bool {
        self.0
            .borrow()
            .lazy
            .as_ref()
            .is_some_and(|lazy| !lazy.fetched)
    }

    /// True when the children of a lazy node have been produced
    pub fn children_fetched(&self) -> bool {
        self.0.borrow().lazy.as_ref().is_some_and(|lazy| lazy.fetched)
    }

    /// Produces the children of a lazy node without inserting them.
    ///
    /// Fails with `InvalidState` when the node is not lazy or was already
    /// fetched. Errors from the source are returned unchanged and leave the
    /// node unfetched. The node is not borrowed while the source runs.
    pub fn fetch_children(&self) -> Result<Vec<TreeNode>> {
        let (path, mut source) = {
            let mut data = self.0.borrow_mut();
            let path = data.path.clone();
            let Some(lazy) = data.lazy.as_mut() else {
                return Err(Error::invalid_state(format!(
                    "node '{path}' has no child source"
                )));
            };
            if lazy.fetched {
                return Err(Error::invalid_state(format!(
                    "children of '{path}' were already fetched"
                )));
            }
            let Some(source) = lazy.source.take() else {
                return Err(Error::invalid_state(format!(
                    "children of '{path}' are being fetched"
                )));
            };
            (path, source)
        };

        let result = source.produce_children(&path);
        if let Some(lazy) = self.0.borrow_mut().lazy.as_mut() {
            lazy.source = Some(source);
            lazy.fetched = result.is_ok();
        }
        let children = result?;

        log_debug!("Fetched {count} children of {path}", count: children.len(), path: path.as_str());
        Ok(children)
    }

    /// All nodes below this one, in pre-order
    pub fn descendants(&self) -> Descendants {
        let mut stack = self.children();
        stack.reverse();
        Descendants { stack }
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &TreeNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn detach(&self) {
        self.0.borrow_mut().parent = Weak::new();
        self.refresh_paths();
    }

    fn finalize_self(&self) {
        let source = {
            let mut data = self.0.borrow_mut();
            if data.finalized {
                log_warn!("Node {path} finalized twice", path: data.path.as_str());
            }
            data.finalized = true;
            log_debug!("Finalized {path}", path: data.path.as_str());
            data.lazy.as_mut().and_then(|lazy| lazy.source.take())
        };

        if let Some(mut source) = source {
            source.close();
            if let Some(lazy) = self.0.borrow_mut().lazy.as_mut() {
                lazy.source = Some(source);
            }
        }
    }

    /// Recomputes the cached path of this node and its descendants.
    fn refresh_paths(&self) {
        let parent_path = self.parent().map(|p| p.path());
        let mut stack = vec![(self.clone(), parent_path)];

        while let Some((node, parent_path)) = stack.pop() {
            let mut data = node.0.borrow_mut();
            data.path = match parent_path {
                Some(parent_path) => path::join(&parent_path, &data.name),
                None => String::new(),
            };
            for child in &data.children {
                stack.push((child.clone(), Some(data.path.clone())));
            }
        }
    }
}

impl Iterator for Descendants {
    type Item = TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.0.borrow().children.iter().rev().cloned());
        Some(node)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for TreeNode {}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => write!(f, "<{}: {:?}>", data.kind, data.path),
            Err(_) => write!(f, "<node: (borrowed)>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Source producing fixed leaf names and counting close calls
    struct Counting {
        names: Vec<&'static str>,
        closed: Rc<Cell<usize>>,
    }

    impl ChildSource for Counting {
        fn produce_children(&mut self, _path: &str) -> Result<Vec<TreeNode>> {
            self.names.iter().map(|n| TreeNode::new(n)).collect()
        }

        fn close(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    fn root() -> TreeNode {
        TreeNode::new("root").unwrap()
    }

    #[test]
    fn test_create_rejects_bad_names() {
        assert!(matches!(TreeNode::new(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(TreeNode::new("a/b"), Err(Error::InvalidArgument(_))));
        let node = TreeNode::new("a").unwrap();
        assert_eq!(node.path(), "");
        assert!(node.is_root());
        assert_eq!(node.kind(), DEFAULT_KIND);
    }

    #[test]
    fn test_paths_follow_parents() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        let b = a.insert_child(TreeNode::new("b").unwrap(), None).unwrap();
        assert_eq!(a.path(), "a");
        assert_eq!(b.path(), "a/b");
        assert_eq!(b.parent(), Some(a.clone()));
        assert_eq!(root.find_by_path("a/b").unwrap(), b);
    }

    #[test]
    fn test_detached_subtree_paths_update_on_insert() {
        let root = root();
        let x = TreeNode::new("x").unwrap();
        let y = x.insert_child(TreeNode::new("y").unwrap(), None).unwrap();
        assert_eq!(y.path(), "y");

        let holder = root.insert_child(TreeNode::new("holder").unwrap(), None).unwrap();
        holder.insert_child(x, None).unwrap();
        assert_eq!(y.path(), "holder/x/y");
    }

    #[test]
    fn test_rename_updates_descendants() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        let b = a.insert_child(TreeNode::new("b").unwrap(), None).unwrap();
        let c = b.insert_child(TreeNode::new("c").unwrap(), None).unwrap();

        a.set_name("renamed").unwrap();
        assert_eq!(a.path(), "renamed");
        for node in a.descendants() {
            assert!(node.path().starts_with("renamed/"));
        }
        assert_eq!(c.path(), "renamed/b/c");
        assert!(matches!(a.set_name("x/y"), Err(Error::InvalidArgument(_))));
        assert_eq!(a.name(), "renamed");
    }

    #[test]
    fn test_insert_positions() {
        let root = root();
        root.insert_child(TreeNode::new("x").unwrap(), Some(0)).unwrap();
        root.insert_child(TreeNode::new("y").unwrap(), Some(0)).unwrap();
        let names: Vec<_> = root.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["y", "x"]);

        let err = root.insert_child(TreeNode::new("z").unwrap(), Some(3));
        assert!(matches!(err, Err(Error::IndexOutOfRange { index: 3, len: 2 })));
        assert_eq!(root.child_count(), 2);
    }

    #[test]
    fn test_insert_rejects_parented_and_cycles() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        let other = TreeNode::new("other").unwrap();
        assert!(matches!(
            other.insert_child(a.clone(), None),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(a.parent(), Some(root.clone()));

        let top = TreeNode::new("top").unwrap();
        let below = top.insert_child(TreeNode::new("below").unwrap(), None).unwrap();
        assert!(matches!(
            below.insert_child(top.clone(), None),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            top.insert_child(top.clone(), None),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(below.child_count(), 0);
    }

    #[test]
    fn test_child_lookup_errors() {
        let root = root();
        root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        assert!(matches!(root.child_at(1), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(root.child_by_name("b"), Err(Error::NotFound(_))));
        assert!(matches!(root.find_by_path(""), Err(Error::NotFound(_))));
        assert!(matches!(root.find_by_path("/a"), Err(Error::InvalidArgument(_))));
        assert!(matches!(root.find_by_path("a/zz"), Err(Error::NotFound(_))));
        assert_eq!(root.find_by_path("a//").unwrap().name(), "a");
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let root = root();
        let first = root.insert_child(TreeNode::new("dup").unwrap(), None).unwrap();
        root.insert_child(TreeNode::new("dup").unwrap(), None).unwrap();
        assert_eq!(root.child_by_name("dup").unwrap(), first);
    }

    #[test]
    fn test_index_in_parent() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        let b = root.insert_child(TreeNode::new("b").unwrap(), None).unwrap();
        assert_eq!(root.index_in_parent(), 0);
        assert_eq!(a.index_in_parent(), 0);
        assert_eq!(b.index_in_parent(), 1);
    }

    #[test]
    fn test_remove_finalizes_subtree() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        let b = a.insert_child(TreeNode::new("b").unwrap(), None).unwrap();
        let keep = root.insert_child(TreeNode::new("keep").unwrap(), None).unwrap();

        let removed = root.remove_child_at(0).unwrap();
        assert_eq!(removed, a);
        assert_eq!(root.child_count(), 1);
        assert!(a.is_finalized());
        assert!(b.is_finalized());
        assert!(!keep.is_finalized());
        assert!(a.is_root());
        assert_eq!(b.path(), "b");
        assert!(matches!(root.remove_child_at(1), Err(Error::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_finalize_closes_sources_bottom_up() {
        let closed = Rc::new(Cell::new(0));
        let outer = TreeNode::new_lazy(
            "outer",
            Counting {
                names: vec![],
                closed: closed.clone(),
            },
        )
        .unwrap();
        let inner = TreeNode::new_lazy(
            "inner",
            Counting {
                names: vec![],
                closed: closed.clone(),
            },
        )
        .unwrap();
        outer.insert_child(inner, None).unwrap();

        outer.finalize();
        assert_eq!(closed.get(), 2);
    }

    /// Source that reads its own node while producing and closing
    struct SelfReading {
        node: Rc<RefCell<Option<TreeNode>>>,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl ChildSource for SelfReading {
        fn produce_children(&mut self, _path: &str) -> Result<Vec<TreeNode>> {
            let node = self
                .node
                .borrow()
                .clone()
                .ok_or_else(|| Error::invalid_state("source not bound"))?;
            self.seen
                .borrow_mut()
                .push(format!("produce {} {}", node.name(), node.kind()));

            // A nested fetch of the same node is refused
            let nested = node.fetch_children();
            assert!(matches!(nested, Err(Error::InvalidState(_))));

            Ok(vec![TreeNode::new(&format!("{}-part", node.name()))?])
        }

        fn close(&mut self) {
            if let Some(node) = self.node.borrow_mut().take() {
                self.seen
                    .borrow_mut()
                    .push(format!("close {} {}", node.path(), node.is_finalized()));
            }
        }
    }

    #[test]
    fn test_source_may_read_its_own_node() {
        let handle = Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let source = SelfReading {
            node: handle.clone(),
            seen: seen.clone(),
        };
        let node = TreeNode::new_lazy("grid", source)
            .unwrap()
            .with_kind("group");
        *handle.borrow_mut() = Some(node.clone());

        let children = node.fetch_children().unwrap();
        assert_eq!(children[0].name(), "grid-part");
        assert!(node.children_fetched());
        assert!(matches!(node.fetch_children(), Err(Error::InvalidState(_))));

        node.finalize();
        assert_eq!(*seen.borrow(), vec!["produce grid group", "close  true"]);
    }

    #[test]
    fn test_lazy_fetch_cycle() {
        let closed = Rc::new(Cell::new(0));
        let root = root();
        let lazy = TreeNode::new_lazy(
            "file",
            Counting {
                names: vec!["x", "y"],
                closed: closed.clone(),
            },
        )
        .unwrap();
        let lazy = root.insert_child(lazy, None).unwrap();
        assert!(lazy.has_children());
        assert!(lazy.can_fetch_children());

        let children = lazy.fetch_children().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(TreeNode::is_root));
        for child in children {
            lazy.insert_child(child, None).unwrap();
        }
        assert!(!lazy.can_fetch_children());
        assert_eq!(lazy.child_count(), 2);
        assert_eq!(lazy.child_at(1).unwrap().path(), "file/y");

        assert!(matches!(lazy.fetch_children(), Err(Error::InvalidState(_))));

        lazy.remove_all_children();
        assert!(lazy.can_fetch_children());
        assert_eq!(lazy.child_count(), 0);
        assert!(lazy.has_children());
    }

    #[test]
    fn test_plain_nodes_do_not_fetch() {
        let node = TreeNode::new("plain").unwrap();
        assert!(!node.has_children());
        assert!(!node.can_fetch_children());
        assert!(matches!(node.fetch_children(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_descendants_preorder() {
        let root = root();
        let a = root.insert_child(TreeNode::new("a").unwrap(), None).unwrap();
        a.insert_child(TreeNode::new("a1").unwrap(), None).unwrap();
        root.insert_child(TreeNode::new("b").unwrap(), None).unwrap();
        let paths: Vec<_> = root.descendants().map(|n| n.path()).collect();
        assert_eq!(paths, vec!["a", "a/a1", "b"]);
    }

    #[test]
    fn test_descriptive_data() {
        let node = TreeNode::new("t.json")
            .unwrap()
            .with_kind("json")
            .with_file_name("/data/t.json")
            .with_attribute("size", 12i64);
        assert_eq!(node.kind(), "json");
        assert_eq!(node.file_name(), Some(PathBuf::from("/data/t.json")));
        assert_eq!(node.attribute("size"), Some(AttrValue::Int(12)));
        assert_eq!(format!("{node:?}"), "<json: \"\">");
    }
}
