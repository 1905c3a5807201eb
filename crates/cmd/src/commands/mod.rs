// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

pub mod attrs;
pub mod factories;
pub mod ls;
pub mod tree;

pub use attrs::attrs_command;
pub use factories::factories_command;
pub use ls::ls_command;
pub use tree::tree_command;
