// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use diagnostics::log_debug;
use repotree::FactoryRegistry;

/// Lists the registered source factories
pub fn factories_command(registry: &FactoryRegistry) -> String {
    log_debug!("Listing available source factories");

    let factories = registry.list_factories();
    if factories.is_empty() {
        return "No source factories available.\n".to_string();
    }

    let mut output = String::from("Available source factories:\n\n");
    for factory in factories {
        output.push_str(&format!("  {} - {}\n", factory.name, factory.description));
        if !factory.extensions.is_empty() {
            output.push_str(&format!("    Extensions: {}\n", factory.extensions.join(", ")));
        }
        output.push('\n');
    }
    output
}
