// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::error::Result;
use crate::memory::Value;
use crate::node::{ChildSource, TreeNode};
use crate::path::sanitize_name;

/// Kind of nodes backed by a nested mapping or list
pub const MAPPING_KIND: &str = "mapping";
/// Kind of leaf nodes holding a single value
pub const VALUE_KIND: &str = "value";

/// Produces one child per entry of an in-memory mapping.
pub struct MappingSource {
    entries: Vec<(String, Value)>,
    file_name: Option<PathBuf>,
}

impl MappingSource {
    pub fn new(value: Value) -> Self {
        Self {
            entries: value.entries(),
            file_name: None,
        }
    }

    /// Marks produced nodes as read from `file_name`
    #[must_use]
    pub fn with_file_name(mut self, file_name: Option<PathBuf>) -> Self {
        self.file_name = file_name;
        self
    }

    /// Creates a detached lazy node for `value`.
    pub fn new_node(name: &str, value: Value) -> Result<TreeNode> {
        Self::node_for(name, value, None)
    }

    fn node_for(key: &str, value: Value, file_name: Option<PathBuf>) -> Result<TreeNode> {
        let name = sanitize_name(key);
        let node = match value {
            Value::Scalar(v) => TreeNode::new(&name)?
                .with_kind(VALUE_KIND)
                .with_attribute("value", v),
            nested => {
                let count = nested.entries().len() as u64;
                let source = MappingSource::new(nested).with_file_name(file_name.clone());
                TreeNode::new_lazy(&name, source)?
                    .with_kind(MAPPING_KIND)
                    .with_attribute("entries", count)
            }
        };
        if name != key {
            node.set_attribute("key", key);
        }
        Ok(match file_name {
            Some(file_name) => node.with_file_name(file_name),
            None => node,
        })
    }
}

impl ChildSource for MappingSource {
    fn produce_children(&mut self, _path: &str) -> Result<Vec<TreeNode>> {
        self.entries
            .iter()
            .map(|(key, value)| Self::node_for(key, value.clone(), self.file_name.clone()))
            .collect()
    }
}
