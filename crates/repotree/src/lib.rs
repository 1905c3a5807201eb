// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! An addressable, lazily populated tree of data nodes.
//!
//! Nodes are addressed by slash-separated paths of names from an invisible
//! root. Lazy nodes produce their children through a [`ChildSource`] the
//! first time they are expanded; host directories and documents are exposed
//! this way through the [`FactoryRegistry`].

pub mod attributes;
pub mod error;
pub mod factory;
pub mod hostmount;
pub mod memory;
pub mod model;
pub mod node;
pub mod path;
pub mod store;
pub mod tree_format;

#[cfg(test)]
mod tests;

pub use attributes::{AttrValue, AttributeRow, Attributes, attribute_rows};
pub use error::{Error, Result};
pub use factory::{FactoryRegistry, NodeFactory, SourceFactory};
pub use hostmount::HostOptions;
pub use model::{Column, ModelObserver, NoopObserver, RepoModel, RowRecord};
pub use node::{ChildSource, TreeNode};
pub use store::TreeStore;
