// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use diagnostics::{log_debug, log_warn};
use repotree::{FactoryRegistry, HostOptions, NoopObserver, RepoModel, TreeNode};

/// Default number of levels expanded below each source
pub const DEFAULT_DEPTH: usize = 2;

/// Host sources to load, shared by the tree, ls and attrs commands
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Host directories or files to load under the root
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Levels expanded below each source
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Include entries whose name starts with a dot
    #[arg(long)]
    pub show_hidden: bool,
}

impl SourceArgs {
    pub fn new<P: Into<PathBuf>>(sources: impl IntoIterator<Item = P>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            depth: DEFAULT_DEPTH,
            show_hidden: false,
        }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn with_show_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    pub fn registry(&self) -> FactoryRegistry {
        FactoryRegistry::new(HostOptions {
            show_hidden: self.show_hidden,
        })
    }
}

/// Loads every source under the root of a fresh store and expands each one
/// `depth` levels. Nodes below a source that fail to fetch stay unexpanded.
pub fn open_model(args: &SourceArgs) -> Result<RepoModel<NoopObserver>> {
    let registry = args.registry();
    let mut model = RepoModel::new(repotree::TreeStore::new(), NoopObserver);

    for source in &args.sources {
        let path = model
            .load(&registry, source, None, "", None)
            .with_context(|| format!("Failed to load {}", source.display()))?;
        let inserted = model
            .store()
            .expand_with(&path, args.depth, |node, e| skip_below(&path, node, e))
            .with_context(|| format!("Failed to expand {path}"))?;
        log_debug!("Source {path} expanded with {inserted} nodes", path: path.as_str(), inserted: inserted);
    }

    Ok(model)
}

/// Fails on the source node itself, logs and skips nodes below it
fn skip_below(source_path: &str, node: &TreeNode, error: repotree::Error) -> repotree::Result<()> {
    let path = node.path();
    if path == source_path {
        return Err(error);
    }
    let message = error.to_string();
    log_warn!("Skipping {path}: {message}", path: path.as_str(), message: message.as_str());
    Ok(())
}

/// Resolves `path` in the model, where `None` or "" selects the root.
pub fn resolve_node(model: &RepoModel<NoopObserver>, path: Option<&str>) -> Result<TreeNode> {
    match path {
        None | Some("") => Ok(model.store().root().clone()),
        Some(path) => model
            .store()
            .resolve(path)
            .with_context(|| format!("No node at '{path}'")),
    }
}

/// Renders rows as left-aligned columns separated by two spaces
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_row: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    for row in std::iter::once(&header_row).chain(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }
    output
}
