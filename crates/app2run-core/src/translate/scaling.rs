//! Scaling policy translation

use app2run_descriptor::{format_number, FlatConfig, InputSource};
use app2run_features::{flags_with_value, FeatureKind};

use super::{TranslationContext, TranslationRule};

/// One of the mutually exclusive App Engine scaling policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalingGroup {
    /// `automatic_scaling`
    Automatic,
    /// `manual_scaling`
    Manual,
    /// `basic_scaling`
    Basic,
}

impl ScalingGroup {
    /// All groups, in detection order
    pub const ALL: [Self; 3] = [Self::Automatic, Self::Manual, Self::Basic];

    /// Top-level key of the group in `source`
    #[must_use]
    pub fn prefix(self, source: InputSource) -> &'static str {
        match (self, source) {
            (Self::Automatic, InputSource::DescriptorFile) => "automatic_scaling",
            (Self::Manual, InputSource::DescriptorFile) => "manual_scaling",
            (Self::Basic, InputSource::DescriptorFile) => "basic_scaling",
            (Self::Automatic, InputSource::DeployedVersion) => "automaticScaling",
            (Self::Manual, InputSource::DeployedVersion) => "manualScaling",
            (Self::Basic, InputSource::DeployedVersion) => "basicScaling",
        }
    }

    /// Instance class App Engine assumes when none is configured
    #[must_use]
    pub fn default_instance_class(self) -> &'static str {
        match self {
            Self::Automatic => "F1",
            Self::Manual | Self::Basic => "B2",
        }
    }

    /// Request timeout App Engine applies under this policy
    #[must_use]
    pub fn default_timeout(self) -> &'static str {
        match self {
            Self::Automatic => "10m",
            Self::Manual | Self::Basic => "60m",
        }
    }

    /// Instance-count fields, by `app.yaml` path
    fn instance_fields(self) -> &'static [&'static str] {
        match self {
            Self::Automatic => &[
                "automatic_scaling.min_num_instances",
                "automatic_scaling.max_num_instances",
                "automatic_scaling.min_instances",
                "automatic_scaling.max_instances",
            ],
            Self::Manual => &["manual_scaling.instances"],
            Self::Basic => &["basic_scaling.max_instances"],
        }
    }
}

/// Which scaling groups a document configures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingDetection {
    /// No scaling group
    Absent,
    /// Exactly one group
    Single(ScalingGroup),
    /// More than one group; the configuration is ambiguous
    Ambiguous(Vec<ScalingGroup>),
}

impl ScalingDetection {
    /// The group, when exactly one is configured
    #[inline]
    #[must_use]
    pub fn single(&self) -> Option<ScalingGroup> {
        match self {
            Self::Single(group) => Some(*group),
            _ => None,
        }
    }
}

/// Detect scaling groups by any key under their prefix
#[must_use]
pub fn detect_scaling(flat: &FlatConfig, source: InputSource) -> ScalingDetection {
    let mut present: Vec<ScalingGroup> = ScalingGroup::ALL
        .into_iter()
        .filter(|group| flat.has_under(group.prefix(source)))
        .collect();

    match present.len() {
        0 => ScalingDetection::Absent,
        1 => ScalingDetection::Single(present.remove(0)),
        _ => ScalingDetection::Ambiguous(present),
    }
}

pub(super) const AMBIGUOUS_SCALING: &str =
    "More than one scaling option is defined, only one scaling option should be used.";

/// Translates instance counts of the configured scaling group
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalingRule;

impl TranslationRule for ScalingRule {
    fn name(&self) -> &'static str {
        "scaling"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let source = ctx.source();
        let group = match detect_scaling(ctx.flat(), source) {
            ScalingDetection::Absent => return Vec::new(),
            ScalingDetection::Ambiguous(_) => {
                ctx.warn(AMBIGUOUS_SCALING);
                return Vec::new();
            }
            ScalingDetection::Single(group) => group,
        };

        let fields: Vec<_> = group
            .instance_fields()
            .iter()
            .filter_map(|field| ctx.rule(FeatureKind::RangeLimited, field))
            .filter_map(|rule| Some((rule.path(source), rule.as_range_limited()?)))
            .collect();

        let mut flags = Vec::new();
        for (path, value) in ctx.flat().under(group.prefix(source)) {
            let Some((_, limit)) = fields.iter().find(|(field, _)| *field == path) else {
                continue;
            };
            if let Some(target) = ctx.bounded(path, limit, value) {
                flags.extend(flags_with_value(&limit.flags, &format_number(target)));
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::testing::run;
    use app2run_descriptor::{Descriptor, Value};
    use pretty_assertions::assert_eq;

    fn flat(yaml: &str) -> FlatConfig {
        Descriptor::from_yaml_str(yaml, InputSource::DescriptorFile)
            .unwrap()
            .flatten()
    }

    #[test]
    fn detection() {
        assert_eq!(detect_scaling(&flat("runtime: go\n"), InputSource::DescriptorFile), ScalingDetection::Absent);
        assert_eq!(
            detect_scaling(&flat("basic_scaling:\n  max_instances: 2\n"), InputSource::DescriptorFile),
            ScalingDetection::Single(ScalingGroup::Basic)
        );
        assert_eq!(
            detect_scaling(
                &flat("manual_scaling:\n  instances: 1\nbasic_scaling:\n  max_instances: 2\n"),
                InputSource::DescriptorFile
            ),
            ScalingDetection::Ambiguous(vec![ScalingGroup::Manual, ScalingGroup::Basic])
        );
    }

    #[test]
    fn detection_is_segment_aware() {
        let mut config = FlatConfig::new();
        config.insert("manual_scaling_notes.x", Value::from(1));
        assert_eq!(detect_scaling(&config, InputSource::DescriptorFile), ScalingDetection::Absent);
    }

    #[test]
    fn deployed_version_prefixes() {
        let doc = Descriptor::from_yaml_str(
            "manualScaling:\n  instances: 3\n",
            InputSource::DeployedVersion,
        )
        .unwrap();
        assert_eq!(
            detect_scaling(&doc.flatten(), InputSource::DeployedVersion).single(),
            Some(ScalingGroup::Manual)
        );
    }

    #[test]
    fn automatic_min_instances() {
        let out = run(ScalingRule, "automatic_scaling:\n  min_instances: 1\n");
        assert_eq!(out.flags, ["--min-instances=1"]);
    }

    #[test]
    fn below_minimum_warns_and_drops() {
        let out = run(ScalingRule, "automatic_scaling:\n  min_instances: -1\n");
        assert!(out.flags.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].message.contains("minimum value is 0"));
    }

    #[test]
    fn above_maximum_clamps() {
        let out = run(ScalingRule, "automatic_scaling:\n  max_instances: 1001\n");
        assert_eq!(out.flags, ["--max-instances=1000"]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn flex_instance_counts() {
        let out = run(
            ScalingRule,
            "env: flex\nautomatic_scaling:\n  min_num_instances: 1\n  max_num_instances: 999\n",
        );
        assert_eq!(out.flags, ["--min-instances=1", "--max-instances=999"]);
    }

    #[test]
    fn manual_instances_pin_both_bounds() {
        let out = run(ScalingRule, "manual_scaling:\n  instances: 10\n");
        assert_eq!(out.flags, ["--min-instances=10", "--max-instances=10"]);
    }

    #[test]
    fn basic_instances_clamped() {
        let out = run(ScalingRule, "basic_scaling:\n  max_instances: 1001\n");
        assert_eq!(out.flags, ["--min-instances=1000", "--max-instances=1000"]);
    }

    #[test]
    fn other_automatic_fields_ignored() {
        let out = run(
            ScalingRule,
            "automatic_scaling:\n  max_concurrent_requests: 50\n  target_cpu_utilization: 0.6\n",
        );
        assert!(out.flags.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn ambiguous_groups_emit_nothing() {
        let out = run(
            ScalingRule,
            "automatic_scaling:\n  min_instances: 1\nmanual_scaling:\n  instances: 2\n",
        );
        assert!(out.flags.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].message, AMBIGUOUS_SCALING);
    }

    #[test]
    fn non_numeric_instances_warn() {
        let out = run(ScalingRule, "manual_scaling:\n  instances: many\n");
        assert!(out.flags.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }
}
