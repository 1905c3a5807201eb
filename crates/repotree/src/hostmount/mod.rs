// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! Tree nodes backed by the host filesystem.
//!
//! Directories list their entries when expanded; documents are parsed when
//! expanded and closed again when their node is finalized.

mod directory;
mod document;
mod file;

pub use directory::{ERROR_KIND, HostDirectorySource, directory_node};
pub use document::{DocumentFormat, DocumentSource, document_node};
pub use file::file_node;


/// Options for host-backed sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOptions {
    /// List entries whose name starts with a dot
    pub show_hidden: bool,
}
