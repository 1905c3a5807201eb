// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use crate::error::{Error, Result};
use crate::factory::FILE_FACTORY;
use crate::node::TreeNode;

/// Creates a leaf node for a host file no factory knows how to read.
pub fn file_node(name: &str, file_name: &Path) -> Result<TreeNode> {
    let metadata = std::fs::metadata(file_name).map_err(|e| Error::io(file_name, e))?;
    Ok(TreeNode::new(name)?
        .with_kind(FILE_FACTORY)
        .with_file_name(file_name)
        .with_attribute("size", metadata.len()))
}
