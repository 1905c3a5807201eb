// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use std::path::{Component, Path};

/// Separator between node names in a node path
pub const SEPARATOR: char = '/';

/// Checks that `name` can be used as a node name
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("node name may not be empty"));
    }
    if name.contains(SEPARATOR) {
        return Err(Error::invalid_argument(format!(
            "node name may not contain '{SEPARATOR}': {name:?}"
        )));
    }
    Ok(())
}

/// Turns an arbitrary key into a valid node name.
///
/// Separators are replaced by `_`; an empty key becomes `_`.
pub fn sanitize_name(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    key.replace(SEPARATOR, "_")
}

/// Joins a parent node path and a child name.
/// The root path is empty and contributes no segment.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Splits a relative node path into segments.
///
/// Rejects empty and absolute paths. Empty segments, from doubled or
/// trailing separators, are dropped.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    if path.starts_with(SEPARATOR) {
        return Err(Error::invalid_argument(format!(
            "node path may not start with '{SEPARATOR}': {path:?}"
        )));
    }
    if path.is_empty() {
        return Err(Error::not_found("empty node path"));
    }
    Ok(path.split(SEPARATOR).filter(|s| !s.is_empty()).collect())
}

/// Splits a node path into its parent path and final name
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rsplit_once(SEPARATOR) {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

/// Extracts the final component of a host path as a string, if possible
pub fn basename<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .components()
        .next_back()
        .and_then(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
}
