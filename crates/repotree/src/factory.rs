// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! Factories that build detached tree nodes for host files.
//!
//! A [`SourceFactory`] describes one kind of source (a directory, a JSON
//! document, ...). The [`FactoryRegistry`] picks a factory from a file name and
//! builds the node, which is how files are loaded into and reloaded in a store.

use std::path::Path;

use diagnostics::log_debug;

use crate::error::{Error, Result};
use crate::hostmount::{self, DocumentFormat, HostOptions};
use crate::node::TreeNode;
use crate::path::basename;

/// Builds a detached node representing a host file.
pub trait NodeFactory {
    /// Creates the node for `file_name`. `kind` selects a factory by name;
    /// when `None` the kind is detected from the file name.
    fn create_node(&self, file_name: &Path, kind: Option<&str>) -> Result<TreeNode>;
}

/// A factory descriptor
#[derive(Clone, Copy)]
pub struct SourceFactory {
    /// The name of the factory, also the kind of the nodes it creates
    pub name: &'static str,

    /// Human-readable description of what this factory reads
    pub description: &'static str,

    /// Lower-case file extensions handled by this factory
    pub extensions: &'static [&'static str],

    /// Creates a node named `name` for `file_name`
    pub create: fn(name: &str, file_name: &Path, registry: &FactoryRegistry) -> Result<TreeNode>,
}

/// Name of the factory used for host directories
pub const DIRECTORY_FACTORY: &str = "directory";
/// Name of the fallback factory for files with unknown extensions
pub const FILE_FACTORY: &str = "file";

static BUILTIN_FACTORIES: [SourceFactory; 4] = [
    SourceFactory {
        name: DIRECTORY_FACTORY,
        description: "Host directory, children listed on expansion",
        extensions: &[],
        create: |name, file_name, registry| {
            hostmount::directory_node(name, file_name, registry.clone())
        },
    },
    SourceFactory {
        name: "json",
        description: "JSON document, parsed on expansion",
        extensions: &["json"],
        create: |name, file_name, _| hostmount::document_node(name, file_name, DocumentFormat::Json),
    },
    SourceFactory {
        name: "yaml",
        description: "YAML document, parsed on expansion",
        extensions: &["yaml", "yml"],
        create: |name, file_name, _| hostmount::document_node(name, file_name, DocumentFormat::Yaml),
    },
    SourceFactory {
        name: FILE_FACTORY,
        description: "Any other file, shown as a leaf with its size",
        extensions: &[],
        create: |name, file_name, _| hostmount::file_node(name, file_name),
    },
];

/// Registry of source factories
#[derive(Clone)]
pub struct FactoryRegistry {
    factories: Vec<SourceFactory>,
    options: HostOptions,
}

impl FactoryRegistry {
    /// Registry with the built-in factories
    pub fn new(options: HostOptions) -> Self {
        Self {
            factories: BUILTIN_FACTORIES.to_vec(),
            options,
        }
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// Adds a factory. Later registrations win when extensions overlap.
    pub fn register(&mut self, factory: SourceFactory) {
        self.factories.push(factory);
    }

    /// Get a factory by name
    pub fn get_factory(&self, name: &str) -> Option<&SourceFactory> {
        self.factories.iter().rev().find(|factory| factory.name == name)
    }

    /// List all available factories
    pub fn list_factories(&self) -> &[SourceFactory] {
        &self.factories
    }

    /// Picks the factory name for a host path.
    ///
    /// Directories map to the directory factory, files are matched by
    /// extension and fall back to the plain file factory.
    pub fn detect<P: AsRef<Path>>(&self, file_name: P) -> &'static str {
        let file_name = file_name.as_ref();
        if file_name.is_dir() {
            return DIRECTORY_FACTORY;
        }
        let Some(ext) = file_name
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
        else {
            return FILE_FACTORY;
        };
        self.factories
            .iter()
            .rev()
            .find(|factory| factory.extensions.contains(&ext.as_str()))
            .map_or(FILE_FACTORY, |factory| factory.name)
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new(HostOptions::default())
    }
}

impl NodeFactory for FactoryRegistry {
    fn create_node(&self, file_name: &Path, kind: Option<&str>) -> Result<TreeNode> {
        let kind = kind.unwrap_or_else(|| self.detect(file_name));
        let factory = self
            .get_factory(kind)
            .ok_or_else(|| Error::not_found(format!("factory '{kind}'")))?;
        let name = basename(file_name).ok_or_else(|| {
            Error::invalid_argument(format!("no file name in '{}'", file_name.display()))
        })?;

        let file = file_name.display().to_string();
        log_debug!("Creating {kind} node for {file}", kind: kind, file: file.as_str());
        (factory.create)(&name, file_name, self)
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.factories.iter().map(|factory| factory.name).collect();
        f.debug_struct("FactoryRegistry")
            .field("factories", &names)
            .field("options", &self.options)
            .finish()
    }
}
