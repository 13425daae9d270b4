//! Flags every migrated service is deployed with

use super::{TranslationContext, TranslationRule};

/// Constant flags, in output order
pub const REQUIRED_FLAGS: &[&str] = &["--no-cpu-throttling", "--allow-unauthenticated"];

/// Label value marking a service as migrated, tagged with this tool's version
///
/// Label values may not contain dots, so the version is written with
/// underscores.
#[must_use]
pub fn labels() -> String {
    let version = env!("CARGO_PKG_VERSION").replace('.', "_");
    format!("migrated-from=app-engine,app2run-version={version}")
}

/// Appends [`REQUIRED_FLAGS`] and the migration labels
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFlagsRule;

impl TranslationRule for RequiredFlagsRule {
    fn name(&self) -> &'static str {
        "required"
    }

    fn translate(&self, _ctx: &mut TranslationContext<'_>) -> Vec<String> {
        REQUIRED_FLAGS
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(format!("--labels={}", labels())))
            .collect()
    }
}
