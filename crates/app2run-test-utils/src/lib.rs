//! Testing utilities for the app2run workspace
//!
//! Shared fixture tables, document builders and translation helpers.

#![allow(missing_docs)]

use app2run_core::{
    Collaborators, CompatibilityChecker, Finding, FixedProject, MemoryProcfile, TranslateOptions,
    Translation, TranslationRule, Translator,
};
use app2run_descriptor::{Descriptor, InputSource};
use app2run_features::FeatureTable;

pub const TEST_PROJECT: &str = "test-project";

/// Small table covering one rule of each category
pub const FIXTURE_TABLE: &str = r"
unsupported:
  - path: {app_yaml: inbound_services, admin_api: inboundServices}
    severity: major
    reason: Cloud Run does not support bundled services.
range_limited:
  - path: {app_yaml: resources.cpu, admin_api: resources.cpu}
    severity: major
    reason: Cloud Run supports between 1 and 8 CPUs.
    range: {min: 1, max: 8}
    flags: [--cpu]
  - path: {app_yaml: resources.memory_gb, admin_api: resources.memoryGb}
    severity: major
    reason: Cloud Run supports between 0.125 and 32 GB of memory.
    range: {min: 0.125, max: 32}
    flags: [--memory]
value_limited:
  - path: {app_yaml: runtime_config.python_version, admin_api: runtimeConfig.pythonVersion}
    severity: major
    reason: Python 2 is not supported.
    allowed_values: [3]
    known_values: [2, 3]
supported:
  - path: {app_yaml: service_account, admin_api: serviceAccount}
    flags: [--service-account]
";

/// Table where one path is listed in all three reporting categories
pub const OVERLAPPING_TABLE: &str = r"
unsupported:
  - path: {app_yaml: overlap.a, admin_api: overlap.a}
    severity: minor
    reason: from unsupported
range_limited:
  - path: {app_yaml: overlap.a, admin_api: overlap.a}
    severity: major
    reason: from range_limited
    range: {min: 0, max: 1}
  - path: {app_yaml: overlap.b, admin_api: overlap.b}
    severity: major
    reason: from range_limited
    range: {min: 0, max: 1}
value_limited:
  - path: {app_yaml: overlap.a, admin_api: overlap.a}
    severity: major
    reason: from value_limited
    allowed_values: [1]
    known_values: [1]
  - path: {app_yaml: overlap.b, admin_api: overlap.b}
    severity: major
    reason: from value_limited
    allowed_values: [1]
    known_values: [1]
supported: []
";

pub fn fixture_table(yaml: &str) -> FeatureTable {
    FeatureTable::from_yaml_str(yaml).unwrap()
}

pub fn builtin_table() -> &'static FeatureTable {
    FeatureTable::builtin().unwrap()
}

pub fn app_yaml(yaml: &str) -> Descriptor {
    Descriptor::from_yaml_str(yaml, InputSource::DescriptorFile).unwrap()
}

pub fn deployed(yaml: &str) -> Descriptor {
    Descriptor::from_yaml_str(yaml, InputSource::DeployedVersion).unwrap()
}

pub fn check(table: &FeatureTable, descriptor: &Descriptor) -> Vec<Finding> {
    CompatibilityChecker::new(table).check_descriptor(descriptor)
}

/// Full pipeline against the built-in table, project [`TEST_PROJECT`]
pub fn translate(descriptor: &Descriptor) -> Translation {
    translate_with(
        descriptor,
        &TranslateOptions::new().with_project(TEST_PROJECT),
        &MemoryProcfile::new(),
    )
}

pub fn translate_with(
    descriptor: &Descriptor,
    options: &TranslateOptions,
    procfile: &MemoryProcfile,
) -> Translation {
    Translator::new(builtin_table()).translate(
        descriptor,
        options,
        Collaborators {
            procfile,
            projects: &FixedProject(TEST_PROJECT.to_string()),
        },
    )
}

/// A single rule against the built-in table
pub fn translate_rule(rule: impl TranslationRule + 'static, descriptor: &Descriptor) -> Translation {
    Translator::with_rules(builtin_table(), vec![Box::new(rule)]).translate(
        descriptor,
        &TranslateOptions::new().with_project(TEST_PROJECT),
        Collaborators {
            procfile: &MemoryProcfile::new(),
            projects: &FixedProject(TEST_PROJECT.to_string()),
        },
    )
}

/// Index of `flag` in `flags`, panicking with the full list when absent
pub fn position(flags: &[String], flag: &str) -> usize {
    flags
        .iter()
        .position(|f| f == flag)
        .unwrap_or_else(|| panic!("{flag} not found in {flags:?}"))
}
