//! app2run Core
//!
//! Evaluates App Engine configuration against the feature table and
//! translates it into a `gcloud beta run deploy` command.
//!
//! # Architecture
//!
//! ```text
//! Descriptor ──flatten──► FlatConfig ─┬─► CompatibilityChecker ─► IncompatibilityReport
//!                                     │
//!                                     └─► Translator ─► Translation ─► DeployCommand
//!                                              │
//!                                  ProcfileStore, ProjectLookup
//! ```
//!
//! Both consumers borrow the same
//! [`FeatureTable`](app2run_features::FeatureTable). Neither returns errors:
//! the checker reports findings and the translator reports warnings.
//!
//! # Example
//!
//! ```rust
//! use app2run_core::{
//!     Collaborators, CompatibilityChecker, MemoryProcfile, NoProject, TranslateOptions,
//!     Translator,
//! };
//! use app2run_descriptor::{Descriptor, InputSource};
//! use app2run_features::FeatureTable;
//!
//! let table = FeatureTable::builtin().unwrap();
//! let doc = Descriptor::from_yaml_str(
//!     "env: flex\nresources:\n  cpu: 9\n",
//!     InputSource::DescriptorFile,
//! ).unwrap();
//!
//! let findings = CompatibilityChecker::new(table).check_descriptor(&doc);
//! assert_eq!(findings[0].path, "resources.cpu");
//!
//! let procfile = MemoryProcfile::new();
//! let translation = Translator::new(table).translate(
//!     &doc,
//!     &TranslateOptions::new().with_project("demo"),
//!     Collaborators { procfile: &procfile, projects: &NoProject },
//! );
//! assert!(translation.flags.contains(&"--cpu=8".to_string()));
//! ```

#![warn(unreachable_pub)]

pub mod check;
pub mod error;
pub mod procfile;
pub mod project;
pub mod report;
pub mod translate;

pub use check::{CompatibilityChecker, Finding};
pub use error::{App2RunError, Result};
pub use procfile::{plan_procfile, FsProcfile, MemoryProcfile, ProcfileAction, ProcfileStore};
pub use project::{parse_gcloud_project, FixedProject, NoProject, ProjectLookup};
pub use report::{
    service_name, DeployCommand, IncompatibilityReport, DEFAULT_SERVICE, NO_INCOMPATIBILITIES,
    PARTIAL_TRANSLATION_NOTICE,
};
pub use translate::{
    default_rules, Collaborators, TranslateOptions, Translation, TranslationContext,
    TranslationRule, Translator, Warning,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
