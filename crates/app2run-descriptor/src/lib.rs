//! app2run Descriptor
//!
//! The input side of the translator: App Engine configuration documents and
//! the flattened view every rule lookup works against.
//!
//! # Core Concepts
//!
//! - [`InputSource`]: where a document came from (local `app.yaml` or a
//!   deployed version), which decides the key namespace in use
//! - [`Descriptor`]: a parsed configuration tree
//! - [`FlatConfig`]: dotted-path to scalar projection produced by [`flatten`]
//!
//! # Example
//!
//! ```rust
//! use app2run_descriptor::{Descriptor, InputSource};
//!
//! let doc = Descriptor::from_yaml_str(
//!     "resources:\n  cpu: 2\n",
//!     InputSource::DescriptorFile,
//! ).unwrap();
//! let flat = doc.flatten();
//! assert!(flat.contains_key("resources.cpu"));
//! ```

#![warn(unreachable_pub)]

mod document;
mod error;
mod flatten;
mod scalar;
mod source;

pub use document::Descriptor;
pub use error::DescriptorError;
pub use flatten::{flatten, unflatten, FlatConfig, OPAQUE_KEYS};
pub use scalar::{as_number, display_value, format_number};
pub use source::InputSource;

/// Re-exported YAML value types used throughout the workspace
pub use serde_yaml::{Mapping, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
