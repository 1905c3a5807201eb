// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use repotree::tree_format::format_node;

use crate::common::{SourceArgs, open_model};

/// Renders every loaded source down to the expansion depth
pub fn tree_command(args: &SourceArgs) -> Result<String> {
    let model = open_model(args)?;
    let mut output = String::new();
    for source in model.store().root().children() {
        output.push_str(&format_node(&source, args.depth));
    }
    Ok(output)
}
