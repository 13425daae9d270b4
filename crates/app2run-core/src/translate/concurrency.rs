//! Request concurrency translation

use app2run_descriptor::format_number;
use app2run_features::{flags_with_value, FeatureKind};

use super::{TranslationContext, TranslationRule};

const FLEX_CONCURRENCY: &str = "automatic_scaling.target_concurrent_requests";
const STANDARD_CONCURRENCY: &str = "automatic_scaling.max_concurrent_requests";

/// Concurrency used for standard apps that do not configure one
pub const DEFAULT_STANDARD_CONCURRENCY: f64 = 10.0;

/// Translates per-instance request concurrency into `--concurrency`
///
/// Flexible apps read `target_concurrent_requests` and default to the
/// maximum Cloud Run allows; standard apps read `max_concurrent_requests`
/// and default to [`DEFAULT_STANDARD_CONCURRENCY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrencyRule;

impl TranslationRule for ConcurrencyRule {
    fn name(&self) -> &'static str {
        "concurrency"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let flex = ctx.is_flex();
        let key = if flex { FLEX_CONCURRENCY } else { STANDARD_CONCURRENCY };
        let Some(rule) = ctx.rule(FeatureKind::RangeLimited, key) else {
            return Vec::new();
        };
        let Some(limit) = rule.as_range_limited() else {
            return Vec::new();
        };

        let path = rule.path(ctx.source());
        let target = match ctx.value_of(rule) {
            Some(value) => ctx.bounded(path, limit, value),
            None if flex => Some(limit.range.max),
            None => Some(DEFAULT_STANDARD_CONCURRENCY),
        };

        target
            .map(|value| flags_with_value(&limit.flags, &format_number(value)))
            .unwrap_or_default()
    }
}
