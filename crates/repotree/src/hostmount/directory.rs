// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use diagnostics::{log_debug, log_warn};

use crate::error::{Error, Result};
use crate::factory::{DIRECTORY_FACTORY, FactoryRegistry, NodeFactory};
use crate::node::{ChildSource, TreeNode};

/// Kind of the leaf shown for an entry whose node could not be created
pub const ERROR_KIND: &str = "error";

/// A source listing a host directory.
///
/// Entries are sorted by name. Subdirectories become lazy directory nodes and
/// files are built by the registry's factories. An entry the registry cannot
/// build, such as a dangling symlink, becomes an `error` leaf.
pub struct HostDirectorySource {
    host_path: PathBuf,
    registry: FactoryRegistry,
}

impl HostDirectorySource {
    pub fn new(host_path: PathBuf, registry: FactoryRegistry) -> Self {
        Self {
            host_path,
            registry,
        }
    }

    fn visible(&self, name: &str) -> bool {
        self.registry.options().show_hidden || !name.starts_with('.')
    }
}

impl ChildSource for HostDirectorySource {
    fn produce_children(&mut self, path: &str) -> Result<Vec<TreeNode>> {
        let entries =
            std::fs::read_dir(&self.host_path).map_err(|e| Error::io(&self.host_path, e))?;

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.host_path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if self.visible(&name) {
                listed.push((name, entry.path()));
            }
        }
        listed.sort();

        log_debug!("Listing {count} entries for {path}", count: listed.len(), path: path);

        listed
            .iter()
            .map(|(name, host_path)| match self.registry.create_node(host_path, None) {
                Ok(node) => Ok(node),
                Err(e) => error_node(name, host_path, &e),
            })
            .collect()
    }
}

/// A leaf standing in for a directory entry that could not be read
fn error_node(name: &str, host_path: &Path, error: &Error) -> Result<TreeNode> {
    let file = host_path.display().to_string();
    let message = error.to_string();
    log_warn!("Unreadable entry {file}: {message}", file: file.as_str(), message: message.as_str());

    Ok(TreeNode::new(name)?
        .with_kind(ERROR_KIND)
        .with_file_name(host_path)
        .with_attribute("error", message))
}

/// Creates a lazy node for the host directory `host_path`.
pub fn directory_node(name: &str, host_path: &Path, registry: FactoryRegistry) -> Result<TreeNode> {
    let metadata = std::fs::metadata(host_path).map_err(|e| Error::io(host_path, e))?;
    if !metadata.is_dir() {
        return Err(Error::invalid_argument(format!(
            "not a directory: {}",
            host_path.display()
        )));
    }

    let source = HostDirectorySource::new(host_path.to_path_buf(), registry);
    Ok(TreeNode::new_lazy(name, source)?
        .with_kind(DIRECTORY_FACTORY)
        .with_file_name(host_path))
}
