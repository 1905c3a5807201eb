// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tree operations and child sources.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed node name or path
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// Path or name resolution failure
    #[error("Not found: {0}")]
    NotFound(String),

    /// Contract violation: double fetch, re-parenting, cycles
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange { index, len }
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Error::NotFound(what.into())
    }

    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse<P: AsRef<Path>, S: ToString>(path: P, message: S) -> Self {
        Error::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// True for errors raised by a child source rather than by the tree itself
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::Io { .. } | Error::Parse { .. } | Error::Other(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::index_out_of_range(3, 2).to_string(),
            "Index 3 out of range for 2 children"
        );
        assert_eq!(Error::not_found("a/b").to_string(), "Not found: a/b");
        let err = Error::parse("/tmp/x.json", "expected value");
        assert_eq!(err.to_string(), "Failed to parse '/tmp/x.json': expected value");
    }

    #[test]
    fn test_source_errors() {
        let io = Error::io("f", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(io.is_source_error());
        assert!(!Error::invalid_state("x").is_source_error());
    }
}
