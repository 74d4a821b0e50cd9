//! Lossless experiment documents
//!
//! A `Document` is the raw YAML tree of one experiment file, with mapping
//! order preserved. All re-serialization (`show`, round-tripping) goes
//! through the raw tree; the typed [`ExperimentConfig`](crate::experiment::ExperimentConfig)
//! is derived from it on demand and never written back.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{Result, RlconfError};
use crate::experiment::ExperimentConfig;

#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    source: Option<PathBuf>,
}

impl Document {
    /// Parse a document from text. The root must be a mapping.
    pub fn parse_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        if !root.is_mapping() {
            return Err(RlconfError::NotADocument(
                "top level is not a mapping".to_string(),
            ));
        }
        Ok(Self { root, source: None })
    }

    /// Read and parse a document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut doc = Self::parse_str(&text).map_err(|e| match e {
            RlconfError::NotADocument(msg) => {
                RlconfError::NotADocument(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        doc.source = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Path of the file this document was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Top-level lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.as_mapping().and_then(|m| m.get(key))
    }

    /// Experiment identifier, when present and a string
    pub fn experiment_name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Derive the typed model from the raw tree
    pub fn typed(&self) -> Result<ExperimentConfig> {
        Ok(serde_yaml::from_value(self.root.clone())?)
    }

    /// Re-serialize the raw tree as YAML. Key order and nesting are
    /// preserved; comments are not retained.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    /// Re-serialize the raw tree as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}
