//! End-to-end checks and translations of small documents

use app2run_core::{IncompatibilityReport, NO_INCOMPATIBILITIES};
use app2run_descriptor::{Descriptor, InputSource, Mapping};
use app2run_features::Severity;
use app2run_test_utils::{
    app_yaml, builtin_table, check, fixture_table, position, translate, FIXTURE_TABLE,
};
use pretty_assertions::assert_eq;

#[test]
fn cpu_above_range_is_reported_and_clamped() {
    let table = fixture_table(FIXTURE_TABLE);
    let doc = app_yaml("resources:\n  cpu: 9\n");

    let findings = check(&table, &doc);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "resources.cpu");
    assert_eq!(findings[0].severity, Severity::Major);

    let flex = app_yaml("env: flex\nresources:\n  cpu: 9\n");
    let translation = translate(&flex);
    assert!(translation.flags.contains(&"--cpu=8".to_string()));
}

#[test]
fn automatic_scaling_defaults_to_f1() {
    let translation = translate(&app_yaml("automatic_scaling:\n  min_instances: 1\n"));
    let flags = &translation.flags;

    let cpu = position(flags, "--cpu=1");
    let memory = position(flags, "--memory=0.25Gi");
    let timeout = position(flags, "--timeout=10m");
    assert!(timeout < cpu);
    assert_eq!(memory, cpu + 1);
}

#[test]
fn unknown_python_version() {
    let table = fixture_table(FIXTURE_TABLE);
    let findings = check(&table, &app_yaml("runtime_config:\n  python_version: 4\n"));

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Unknown);
    assert_eq!(
        findings[0].reason,
        "4 is not a known value for runtime_config.python_version."
    );
}

#[test]
fn empty_document_has_no_findings() {
    let empty = Descriptor::new(Mapping::new(), InputSource::DescriptorFile);
    let findings = check(builtin_table(), &empty);
    assert!(findings.is_empty());

    let report = IncompatibilityReport::new(findings);
    assert_eq!(report.render_yaml().unwrap().trim_end(), NO_INCOMPATIBILITIES);
}

#[test]
fn empty_document_is_a_distinct_input_error() {
    let err = Descriptor::from_yaml_str("", InputSource::DescriptorFile).unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn builtin_table_flags_common_incompatibilities() {
    let doc = app_yaml(
        "runtime: python39\n\
         inbound_services:\n  - warmup\n\
         handlers:\n  - url: /.*\n    script: auto\n\
         resources:\n  cpu: 12\n",
    );
    let findings = check(builtin_table(), &doc);
    let paths: Vec<_> = findings.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["inbound_services", "handlers", "resources.cpu"]);
}
