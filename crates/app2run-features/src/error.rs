//! Error types for loading the feature table
//!
//! Every variant is fatal: the table is loaded before any checking or
//! translation starts, and a broken table aborts the invocation.

use std::path::PathBuf;

use app2run_descriptor::InputSource;

use crate::rule::FeatureKind;

/// Errors while loading the feature table
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Malformed YAML, unknown field or missing required field
    #[error("malformed feature table: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// IO error reading a table file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two rules of one category resolve to the same path
    #[error("duplicate {kind} path '{path}' for {input}")]
    DuplicatePath {
        kind: FeatureKind,
        input: InputSource,
        path: String,
    },

    /// A rule path is blank
    #[error("empty {input} path in {kind} rule #{index}")]
    EmptyPath {
        kind: FeatureKind,
        input: InputSource,
        index: usize,
    },

    /// `min` is greater than `max`
    #[error("invalid range for '{path}': min {min} is greater than max {max}")]
    InvertedRange { path: String, min: f64, max: f64 },

    /// A range bound is NaN or infinite
    #[error("invalid range for '{path}': bounds must be finite, got min {min} and max {max}")]
    NonFiniteRange { path: String, min: f64, max: f64 },

    /// `allowed_pattern` does not compile
    #[error("invalid allowed_pattern for '{path}': {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    /// A rule that must emit flags declares none
    #[error("{kind} rule '{path}' declares no flags")]
    MissingFlags { kind: FeatureKind, path: String },
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
