//! Error types for app2run
//!
//! Only conditions that stop an invocation live here. Everything the
//! checker and translator can recover from is reported as a finding or a
//! [`Warning`](crate::Warning) instead.

use std::path::PathBuf;

use app2run_descriptor::DescriptorError;
use app2run_features::LoadError;

/// Main app2run error type
#[derive(Debug, thiserror::Error)]
pub enum App2RunError {
    /// Input document could not be read or parsed
    #[error("invalid input document: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Feature table could not be loaded
    #[error("feature table error: {0}")]
    FeatureTable(#[from] LoadError),

    /// IO error outside document parsing
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Describing a deployed version failed
    #[error("failed to describe version {version} of service {service}: {reason}")]
    DescribeFailed {
        service: String,
        version: String,
        reason: String,
    },

    /// Input document is empty
    #[error("{name} is empty.")]
    EmptyInput { name: String },
}

impl App2RunError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create describe failure
    pub fn describe_failed(
        service: impl Into<String>,
        version: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DescribeFailed {
            service: service.into(),
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller supplied an empty document
    ///
    /// Empty input is reported to the user but is not a failure.
    #[inline]
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        match self {
            Self::EmptyInput { .. } => true,
            Self::Descriptor(e) => e.is_empty_input(),
            _ => false,
        }
    }
}

/// Result type for app2run operations
pub type Result<T> = std::result::Result<T, App2RunError>;
