//! Request timeout translation

use super::scaling::{detect_scaling, ScalingDetection};
use super::{TranslationContext, TranslationRule};

const FLEX_TIMEOUT: &str = "60m";

/// Carries App Engine's request timeout over as `--timeout`
///
/// The timeout is never configured explicitly; it follows from the
/// environment and the scaling policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutRule;

impl TranslationRule for TimeoutRule {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        if ctx.is_flex() {
            return vec![format!("--timeout={FLEX_TIMEOUT}")];
        }

        match detect_scaling(ctx.flat(), ctx.source()) {
            ScalingDetection::Single(group) => {
                vec![format!("--timeout={}", group.default_timeout())]
            }
            ScalingDetection::Absent | ScalingDetection::Ambiguous(_) => Vec::new(),
        }
    }
}
