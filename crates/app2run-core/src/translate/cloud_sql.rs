//! Cloud SQL connection translation

use app2run_descriptor::{display_value, Value};
use app2run_features::{flags_with_value, FeatureKind};

use super::{TranslationContext, TranslationRule};

const CLOUD_SQL_INSTANCES_KEY: &str = "beta_settings.cloud_sql_instances";

/// Carries Cloud SQL connections over as `--add-cloudsql-instances`
///
/// The App Engine setting is one comma-separated string. Connection names
/// that fail the table's pattern are dropped with a warning; the remaining
/// ones are joined back into a single flag value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudSqlRule;

impl TranslationRule for CloudSqlRule {
    fn name(&self) -> &'static str {
        "cloud_sql"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let Some(rule) = ctx.rule(FeatureKind::ValueLimited, CLOUD_SQL_INSTANCES_KEY) else {
            return Vec::new();
        };
        let (Some(limit), Some(value)) = (rule.as_value_limited(), ctx.value_of(rule)) else {
            return Vec::new();
        };
        let path = rule.path(ctx.source());
        let Value::String(connections) = value else {
            ctx.warn(format!(
                "{path} has value {}, expected comma-separated connection names; it is not translated.",
                display_value(value)
            ));
            return Vec::new();
        };

        let mut accepted = Vec::new();
        for connection in limit.items(connections) {
            if limit.accepts_item(connection) {
                accepted.push(connection);
            } else {
                ctx.warn(format!(
                    "{connection} in {path} is not a valid Cloud SQL connection name, it is not translated."
                ));
            }
        }

        if accepted.is_empty() {
            return Vec::new();
        }
        flags_with_value(&limit.flags, &accepted.join(","))
    }
}
