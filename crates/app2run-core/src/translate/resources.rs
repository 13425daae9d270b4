//! CPU and memory translation

use app2run_descriptor::{as_number, display_value, format_number, InputSource};
use app2run_features::{flags_with_value, FeatureKind};

use super::scaling::{detect_scaling, ScalingDetection, AMBIGUOUS_SCALING};
use super::{TranslationContext, TranslationRule};

/// CPU and memory of an App Engine instance class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceResources {
    /// vCPUs
    pub cpu: f64,
    /// Memory in GiB
    pub memory_gb: f64,
}

const INSTANCE_CLASSES: &[(&str, InstanceResources)] = &[
    ("F1", InstanceResources { cpu: 1.0, memory_gb: 0.25 }),
    ("F2", InstanceResources { cpu: 1.2, memory_gb: 0.5 }),
    ("F4", InstanceResources { cpu: 2.4, memory_gb: 1.0 }),
    ("F4_1G", InstanceResources { cpu: 2.4, memory_gb: 2.0 }),
    ("B1", InstanceResources { cpu: 1.0, memory_gb: 0.25 }),
    ("B2", InstanceResources { cpu: 1.2, memory_gb: 0.5 }),
    ("B4", InstanceResources { cpu: 2.4, memory_gb: 1.0 }),
    ("B4_1G", InstanceResources { cpu: 2.4, memory_gb: 2.0 }),
    ("B8", InstanceResources { cpu: 4.8, memory_gb: 2.0 }),
];

/// Resources of a standard-environment instance class
#[must_use]
pub fn instance_class_resources(class: &str) -> Option<InstanceResources> {
    INSTANCE_CLASSES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(class))
        .map(|(_, resources)| *resources)
}

const FLEX_RESOURCES: [(&str, bool); 2] = [("resources.cpu", false), ("resources.memory_gb", true)];

fn memory_flag(gb: f64) -> String {
    format!("--memory={}Gi", format_number(gb))
}

/// Translates instance sizing into `--cpu` and `--memory`
///
/// Flexible apps declare CPU and memory directly. Standard apps declare an
/// instance class, or inherit the default class of their scaling policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcesRule;

impl ResourcesRule {
    fn flex(ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let mut flags = Vec::new();
        for (key, is_memory) in FLEX_RESOURCES {
            let Some(rule) = ctx.rule(FeatureKind::RangeLimited, key) else {
                continue;
            };
            let (Some(limit), Some(value)) = (rule.as_range_limited(), ctx.value_of(rule)) else {
                continue;
            };
            let Some(number) = as_number(value) else {
                ctx.warn(format!(
                    "{} has non-numeric value {}, it is not translated.",
                    rule.path(ctx.source()),
                    display_value(value)
                ));
                continue;
            };

            let target = format_number(limit.range.clamp(number));
            let target = if is_memory { format!("{target}Gi") } else { target };
            flags.extend(flags_with_value(&limit.flags, &target));
        }
        flags
    }

    fn standard(ctx: &mut TranslationContext<'_>) -> Vec<String> {
        let class_key = match ctx.source() {
            InputSource::DescriptorFile => "instance_class",
            InputSource::DeployedVersion => "instanceClass",
        };
        let explicit = ctx.descriptor().get(class_key).map(display_value);

        let class = match explicit {
            Some(class) => class,
            None => match detect_scaling(ctx.flat(), ctx.source()) {
                ScalingDetection::Absent => return Vec::new(),
                ScalingDetection::Ambiguous(_) => {
                    ctx.warn(AMBIGUOUS_SCALING);
                    return Vec::new();
                }
                ScalingDetection::Single(group) => group.default_instance_class().to_string(),
            },
        };

        match instance_class_resources(&class) {
            Some(resources) => vec![
                format!("--cpu={}", format_number(resources.cpu)),
                memory_flag(resources.memory_gb),
            ],
            None => {
                ctx.warn(format!(
                    "Instance class {class} has no known Cloud Run equivalent, --cpu and --memory are not set."
                ));
                Vec::new()
            }
        }
    }
}

impl TranslationRule for ResourcesRule {
    fn name(&self) -> &'static str {
        "resources"
    }

    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String> {
        if ctx.is_flex() {
            Self::flex(ctx)
        } else {
            Self::standard(ctx)
        }
    }
}
