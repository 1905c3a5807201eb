// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use repotree::attribute_rows;

use crate::common::{SourceArgs, format_table, open_model, resolve_node};

/// Lists the attributes of the node at `path`, sorted by name
pub fn attrs_command(args: &SourceArgs, path: &str) -> Result<String> {
    let model = open_model(args)?;
    let node = resolve_node(&model, Some(path))?;

    let rows: Vec<Vec<String>> = attribute_rows(&node.attributes())
        .into_iter()
        .map(|row| vec![row.name, row.value, row.type_name.to_string()])
        .collect();
    if rows.is_empty() {
        return Ok(format!("{} has no attributes\n", node.path()));
    }
    Ok(format_table(&["name", "value", "type"], &rows))
}
