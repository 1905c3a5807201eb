// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use repotree::{Column, RowRecord};
use serde::Serialize;

use crate::common::{SourceArgs, format_table, open_model, resolve_node};

#[derive(Serialize)]
struct Listing {
    path: String,
    rows: Vec<RowRecord>,
}

/// Lists the child rows of the node at `path` (the root when `None`).
///
/// A lazy node that was not expanded yet is fetched first.
pub fn ls_command(args: &SourceArgs, path: Option<&str>, json: bool) -> Result<String> {
    let mut model = open_model(args)?;
    let node = resolve_node(&model, path)?;
    if model.can_fetch_more(&node) {
        let _ = model.fetch_more(&node)?;
    }

    let children: Vec<_> = (0..model.row_count(&node))
        .map(|row| model.child_at_row(&node, row))
        .collect::<repotree::Result<_>>()?;

    if json {
        let listing = Listing {
            path: node.path(),
            rows: children.iter().map(|child| model.row_record(child)).collect(),
        };
        let mut output = serde_json::to_string_pretty(&listing)?;
        output.push('\n');
        return Ok(output);
    }

    let headers: Vec<_> = Column::ALL.iter().map(|column| column.header()).collect();
    let rows: Vec<Vec<String>> = children
        .iter()
        .map(|child| {
            Column::ALL
                .iter()
                .map(|column| model.column_value(child, *column))
                .collect()
        })
        .collect();
    Ok(format_table(&headers, &rows))
}
