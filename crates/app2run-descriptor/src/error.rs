//! Error types for descriptor parsing

use std::path::PathBuf;

/// Errors while reading an input document
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Document is empty or only `null`
    #[error("document is empty")]
    Empty,

    /// YAML syntax error
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// Top level is not a mapping
    #[error("expected a mapping at the document root, found {found}")]
    NotAMapping { found: &'static str },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DescriptorError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller supplied an empty document
    #[inline]
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
