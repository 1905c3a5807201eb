// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use diagnostics::{log_debug, log_info};

use crate::error::{Error, Result};
use crate::memory::{MappingSource, Value};
use crate::node::{ChildSource, TreeNode};

/// Structured document formats read from host files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn kind(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    fn parse(self, file_name: &Path, bytes: &[u8]) -> Result<Value> {
        match self {
            DocumentFormat::Json => serde_json::from_slice::<serde_json::Value>(bytes)
                .map(Value::from)
                .map_err(|e| Error::parse(file_name, e)),
            DocumentFormat::Yaml => serde_yaml_ng::from_slice::<serde_yaml_ng::Value>(bytes)
                .map(Value::from)
                .map_err(|e| Error::parse(file_name, e)),
        }
    }
}

/// A source reading a whole document when its node is expanded.
///
/// The parsed document is kept until the node is finalized.
pub struct DocumentSource {
    file_name: PathBuf,
    format: DocumentFormat,
    document: Option<Value>,
}

impl DocumentSource {
    pub fn new(file_name: PathBuf, format: DocumentFormat) -> Self {
        Self {
            file_name,
            format,
            document: None,
        }
    }

    /// True while the parsed document is held
    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    fn open(&mut self) -> Result<Value> {
        let bytes = std::fs::read(&self.file_name).map_err(|e| Error::io(&self.file_name, e))?;
        let value = match self.format.parse(&self.file_name, &bytes)? {
            Value::Scalar(v) => Value::mapping([("value", Value::Scalar(v))]),
            other => other,
        };

        let file = self.file_name.display().to_string();
        log_info!("Opened {file}", file: file.as_str());
        self.document = Some(value.clone());
        Ok(value)
    }
}

impl ChildSource for DocumentSource {
    fn produce_children(&mut self, path: &str) -> Result<Vec<TreeNode>> {
        let value = self.open()?;
        MappingSource::new(value)
            .with_file_name(Some(self.file_name.clone()))
            .produce_children(path)
    }

    fn close(&mut self) {
        if self.document.take().is_some() {
            let file = self.file_name.display().to_string();
            log_debug!("Closed {file}", file: file.as_str());
        }
    }
}

/// Creates a lazy node for a document file. The file must exist.
pub fn document_node(name: &str, file_name: &Path, format: DocumentFormat) -> Result<TreeNode> {
    let metadata = std::fs::metadata(file_name).map_err(|e| Error::io(file_name, e))?;
    let source = DocumentSource::new(file_name.to_path_buf(), format);
    Ok(TreeNode::new_lazy(name, source)?
        .with_kind(format.kind())
        .with_file_name(file_name)
        .with_attribute("size", metadata.len()))
}
