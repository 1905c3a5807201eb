// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! Adapter between a [`TreeStore`] and a row-based item view.
//!
//! A view asks for row counts, children by row and parents, and expands
//! nodes through `can_fetch_more` / `fetch_more`. Every structural change
//! made through the model is reported to a [`ModelObserver`], one row at a
//! time.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::factory::NodeFactory;
use crate::node::TreeNode;
use crate::path::split_last;
use crate::store::TreeStore;

/// Receives row change notifications
pub trait ModelObserver {
    fn row_inserted(&mut self, _parent_path: &str, _row: usize) {}

    fn row_removed(&mut self, _parent_path: &str, _row: usize) {}
}

/// Observer that ignores all notifications
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ModelObserver for NoopObserver {}

/// Columns shown for each row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Kind,
    IsOpen,
    FileName,
    Path,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Name,
        Column::Kind,
        Column::IsOpen,
        Column::FileName,
        Column::Path,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Kind => "kind",
            Column::IsOpen => "is open",
            Column::FileName => "file name",
            Column::Path => "path",
        }
    }
}

/// All column values of a row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRecord {
    pub name: String,
    pub kind: String,
    /// Fetched state of lazy nodes, absent for plain nodes
    pub is_open: Option<bool>,
    pub file_name: Option<String>,
    pub path: String,
}

pub struct RepoModel<O: ModelObserver> {
    store: TreeStore,
    observer: O,
}

impl<O: ModelObserver> RepoModel<O> {
    pub fn new(store: TreeStore, observer: O) -> Self {
        Self { store, observer }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn row_count(&self, node: &TreeNode) -> usize {
        node.child_count()
    }

    pub fn child_at_row(&self, node: &TreeNode, row: usize) -> Result<TreeNode> {
        node.child_at(row)
    }

    pub fn parent_of(&self, node: &TreeNode) -> Option<TreeNode> {
        node.parent()
    }

    pub fn has_children(&self, node: &TreeNode) -> bool {
        node.has_children()
    }

    pub fn can_fetch_more(&self, node: &TreeNode) -> bool {
        node.can_fetch_children()
    }

    /// Fetches the children of `node` and inserts them one row at a time.
    pub fn fetch_more(&mut self, node: &TreeNode) -> Result<usize> {
        let observer = &mut self.observer;
        self.store
            .fetch_more_with(node, |parent, row| observer.row_inserted(&parent.path(), row))
    }

    /// Inserts a detached node under `parent_path` and reports the new row.
    pub fn insert_node(&mut self, node: TreeNode, parent_path: &str, position: Option<usize>) -> Result<String> {
        let path = self.store.insert(node, parent_path, position)?;
        self.notify_inserted(&path)?;
        Ok(path)
    }

    /// Removes the node at `path` and reports the removed row.
    pub fn remove_row(&mut self, path: &str) -> Result<TreeNode> {
        let node = self.store.resolve(path)?;
        let row = node.index_in_parent();
        let parent_path = node.parent().map(|p| p.path()).unwrap_or_default();

        let removed = self.store.remove_at(path)?;
        self.observer.row_removed(&parent_path, row);
        Ok(removed)
    }

    /// Loads a host file under `parent_path` and reports the new row.
    pub fn load(
        &mut self,
        factory: &dyn NodeFactory,
        file_name: &Path,
        kind: Option<&str>,
        parent_path: &str,
        position: Option<usize>,
    ) -> Result<String> {
        let path = self.store.load(factory, file_name, kind, parent_path, position)?;
        self.notify_inserted(&path)?;
        Ok(path)
    }

    /// Reloads the file containing the node at `path`.
    ///
    /// The node representing the whole file is replaced, reported as a
    /// removed row followed by an inserted row at the same position.
    pub fn reload_file_at(&mut self, path: &str, factory: &dyn NodeFactory) -> Result<String> {
        let node = self.store.resolve(path)?;
        let file_node = self.store.find_file_ancestor(&node);
        let file_path = file_node.path();
        let row = file_node.index_in_parent();

        let new_path = self.store.reload(&file_path, factory)?;
        let (parent_path, _) = split_last(&new_path);
        self.observer.row_removed(parent_path, row);
        self.observer.row_inserted(parent_path, row);
        Ok(new_path)
    }

    pub fn column_value(&self, node: &TreeNode, column: Column) -> String {
        match column {
            Column::Name => node.name(),
            Column::Kind => node.kind(),
            Column::IsOpen => {
                if node.is_lazy() {
                    node.children_fetched().to_string()
                } else {
                    String::new()
                }
            }
            Column::FileName => node
                .file_name()
                .map(|f| f.display().to_string())
                .unwrap_or_default(),
            Column::Path => node.path(),
        }
    }

    pub fn row_record(&self, node: &TreeNode) -> RowRecord {
        RowRecord {
            name: node.name(),
            kind: node.kind(),
            is_open: node.is_lazy().then(|| node.children_fetched()),
            file_name: node.file_name().map(|f| f.display().to_string()),
            path: node.path(),
        }
    }

    fn notify_inserted(&mut self, path: &str) -> Result<()> {
        let node = self.store.resolve(path)?;
        let (parent_path, _) = split_last(path);
        self.observer.row_inserted(parent_path, node.index_in_parent());
        Ok(())
    }
}
