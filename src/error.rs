use std::path::PathBuf;
use thiserror::Error;

/// The main error type for taxolabel operations.
///
/// Only conditions that abort a whole pass live here. Per-record problems
/// (unknown image ids, malformed label lines, unmapped classes) are collected
/// in a [`RewriteReport`](crate::rewrite::RewriteReport) instead.
#[derive(Debug, Error)]
pub enum TaxolabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The taxonomy document is unusable (missing root key, bad node shape).
    #[error("Invalid taxonomy in {path}: {message}")]
    TaxonomyConfig { path: PathBuf, message: String },

    #[error("Failed to parse taxonomy YAML from {path}: {source}")]
    TaxonomyParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An index table artifact lacks its `names` field or is not dense.
    #[error("Invalid index table in {path}: {message}")]
    IndexTableSchema { path: PathBuf, message: String },

    #[error("Failed to parse index table YAML from {path}: {source}")]
    IndexTableParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Label directory not found: {path}")]
    LabelDirMissing { path: PathBuf },

    #[error("Failed while traversing {path}: {message}")]
    LabelDirWalk { path: PathBuf, message: String },

    /// Lookup of a name that the taxonomy does not contain.
    #[error("Unknown taxonomy node '{name}'")]
    UnknownTaxonomyNode { name: String },

    #[error("Class index {index} is out of range for a table with {len} name(s)")]
    UnknownClassIndex { index: usize, len: usize },

    #[error("Failed to write hierarchy rows to {path}: {message}")]
    HierarchyWrite { path: PathBuf, message: String },

    #[error("Invalid class index '{0}'; expected a non-negative integer")]
    InvalidClassIndex(String),

    #[error("Failed to serialize report as JSON: {0}")]
    ReportSerialize(#[source] serde_json::Error),
}
