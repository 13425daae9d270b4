//! app2run Feature Table
//!
//! The declarative compatibility table between App Engine configuration and
//! Cloud Run, and the lookups the checker and translator run against it.
//!
//! # Categories
//!
//! | Category | Meaning |
//! |---|---|
//! | `unsupported` | any presence is incompatible |
//! | `range_limited` | numeric value must lie within a range; clamped when translated |
//! | `value_limited` | value must be known, then allowed, or match a pattern |
//! | `supported` | drives flag emission only |
//!
//! # Example
//!
//! ```rust
//! use app2run_descriptor::InputSource;
//! use app2run_features::{FeatureKind, FeatureTable};
//!
//! let table = FeatureTable::builtin().unwrap();
//! let cpu = table
//!     .lookup(FeatureKind::RangeLimited, InputSource::DescriptorFile)
//!     .get("resources.cpu")
//!     .unwrap();
//! assert_eq!(cpu.flags(), ["--cpu"]);
//! ```

#![warn(unreachable_pub)]

mod error;
mod path;
mod rule;
mod table;

pub use error::LoadError;
pub use path::FeaturePath;
pub use rule::{
    flags_with_value, FeatureKind, FeatureRule, Range, RangeLimit, RuleKind, Severity, Supported,
    Unsupported, ValueLimit, ValuePattern,
};
pub use table::{FeatureTable, RuleIndex, BUILTIN_TABLE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
