// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! Box-drawing rendering of trees.
//!
//! ```
//! use repotree::tree_format::{DisplayNode, format_tree};
//!
//! let root = DisplayNode::new("root")
//!     .with_child(DisplayNode::new("child1"))
//!     .with_child(DisplayNode::new("child2")
//!         .with_child(DisplayNode::new("grandchild")));
//!
//! let output = format_tree(&root);
//! // root
//! // ├── child1
//! // └─┬ child2
//! //   └── grandchild
//! ```

use std::fmt;

use crate::node::TreeNode;

/// Marker appended to lazy nodes whose children were not fetched yet
pub const UNFETCHED_MARKER: &str = "…";

/// A labelled node ready for rendering
#[derive(Debug, Clone)]
pub struct DisplayNode {
    /// The label for this node (can be multi-line)
    pub label: String,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: DisplayNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: DisplayNode) {
        self.children.push(child);
    }

    /// Builds the display tree of `node`, at most `max_depth` levels deep.
    pub fn from_tree(node: &TreeNode, max_depth: usize) -> Self {
        let mut display = DisplayNode::new(label(node));
        if max_depth > 0 {
            for child in node.children() {
                display.add_child(DisplayNode::from_tree(&child, max_depth - 1));
            }
        } else if node.child_count() > 0 {
            display.add_child(DisplayNode::new(format!("({} more)", node.child_count())));
        }
        display
    }
}

/// `name [kind]`, with the unfetched marker for lazy nodes not yet expanded
fn label(node: &TreeNode) -> String {
    let mut label = format!("{} [{}]", node.name(), node.kind());
    if node.can_fetch_children() {
        label.push(' ');
        label.push_str(UNFETCHED_MARKER);
    }
    label
}

/// Renders `node` and its subtree down to `max_depth` levels
pub fn format_node(node: &TreeNode, max_depth: usize) -> String {
    format_tree(&DisplayNode::from_tree(node, max_depth))
}

/// Format a tree structure with box-drawing characters
pub fn format_tree(root: &DisplayNode) -> String {
    let mut output = String::new();
    output.push_str(&root.label);
    output.push('\n');
    format_children(&mut output, &root.children, "");
    output
}

fn format_children(output: &mut String, children: &[DisplayNode], prefix: &str) {
    let child_count = children.len();

    for (index, child) in children.iter().enumerate() {
        let is_last = index == child_count - 1;

        // Nodes with children get a tee connector
        let (connector, continuation_char) = match (child.children.is_empty(), is_last) {
            (true, true) => ("└──", ' '),
            (true, false) => ("├──", '│'),
            (false, true) => ("└─┬", ' '),
            (false, false) => ("├─┬", '│'),
        };

        for (line_idx, line) in child.label.lines().enumerate() {
            output.push_str(prefix);
            if line_idx == 0 {
                output.push_str(connector);
                output.push(' ');
            } else {
                output.push(continuation_char);
                output.push_str(&" ".repeat(connector.chars().count()));
            }
            output.push_str(line);
            output.push('\n');
        }

        if !child.children.is_empty() {
            let new_prefix = format!("{prefix}{continuation_char} ");
            format_children(output, &child.children, &new_prefix);
        }
    }
}

impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_tree(self))
    }
}
