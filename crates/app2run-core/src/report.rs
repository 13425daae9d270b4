//! Output assembly
//!
//! Turns checker findings into the incompatibility report and translator
//! flags into the `gcloud` deploy command.

use std::collections::BTreeMap;
use std::fmt;

use app2run_descriptor::Descriptor;
use app2run_features::Severity;
use serde::Serialize;

use crate::check::Finding;

/// Printed when a document has no incompatible features
pub const NO_INCOMPATIBILITIES: &str = "No incompatibilities found.";

/// Printed ahead of every generated deploy command
pub const PARTIAL_TRANSLATION_NOTICE: &str = "Warning: not all configuration could be translated, \
for more info use app2run list-incompatible-features.";

/// Service name used when neither the caller nor the document names one
pub const DEFAULT_SERVICE: &str = "default";

/// Findings of one compatibility check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncompatibilityReport {
    findings: Vec<Finding>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    summary: BTreeMap<Severity, usize>,
    incompatible_features: &'a [Finding],
}

impl IncompatibilityReport {
    /// Wrap checker output
    #[inline]
    #[must_use]
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    /// Findings in document order
    #[inline]
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Whether every feature is compatible
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings per severity
    #[must_use]
    pub fn summary(&self) -> BTreeMap<Severity, usize> {
        let mut summary = BTreeMap::new();
        for finding in &self.findings {
            *summary.entry(finding.severity).or_insert(0) += 1;
        }
        summary
    }

    fn document(&self) -> ReportDocument<'_> {
        ReportDocument {
            summary: self.summary(),
            incompatible_features: &self.findings,
        }
    }

    /// YAML report, or [`NO_INCOMPATIBILITIES`] when there are no findings
    ///
    /// # Errors
    /// Returns the serializer error, which does not occur for well-formed
    /// findings.
    pub fn render_yaml(&self) -> Result<String, serde_yaml::Error> {
        if self.is_empty() {
            return Ok(format!("{NO_INCOMPATIBILITIES}\n"));
        }
        serde_yaml::to_string(&self.document())
    }

    /// JSON report; an empty report renders empty collections
    ///
    /// # Errors
    /// Returns the serializer error, which does not occur for well-formed
    /// findings.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.document())
    }
}

impl From<Vec<Finding>> for IncompatibilityReport {
    fn from(findings: Vec<Finding>) -> Self {
        Self::new(findings)
    }
}

/// `gcloud beta run deploy` invocation for a translated service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCommand {
    /// Target Cloud Run service
    pub service: String,
    /// Flags in output order
    pub flags: Vec<String>,
}

impl DeployCommand {
    /// Create command
    #[inline]
    #[must_use]
    pub fn new(service: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            service: service.into(),
            flags,
        }
    }
}

impl fmt::Display for DeployCommand {
    /// One flag per line, continued with ` \`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gcloud beta run deploy {}", self.service)?;
        for flag in &self.flags {
            write!(f, " \\\n  {flag}")?;
        }
        Ok(())
    }
}

/// Cloud Run service name for a document
///
/// An explicit override wins, then the document's `service` key, then
/// [`DEFAULT_SERVICE`].
#[must_use]
pub fn service_name(descriptor: &Descriptor, explicit: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| descriptor.service())
        .unwrap_or(DEFAULT_SERVICE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use app2run_descriptor::InputSource;
    use pretty_assertions::assert_eq;

    fn doc(yaml: &str) -> Descriptor {
        Descriptor::from_yaml_str(yaml, InputSource::DescriptorFile).unwrap()
    }

    #[test]
    fn empty_report() {
        let report = IncompatibilityReport::default();
        assert_eq!(report.render_yaml().unwrap(), "No incompatibilities found.\n");
        assert!(report.summary().is_empty());
    }

    #[test]
    fn yaml_report_layout() {
        let report = IncompatibilityReport::new(vec![
            Finding::new("inbound_services", Severity::Major, "no bundled services"),
            Finding::new(
                "runtime_config.python_version",
                Severity::Unknown,
                "value is not known",
            ),
            Finding::new("handlers", Severity::Major, "no handlers"),
        ]);
        let expected = "\
summary:
  major: 2
  unknown: 1
incompatible_features:
- path: inbound_services
  severity: major
  reason: no bundled services
- path: runtime_config.python_version
  severity: unknown
  reason: value is not known
- path: handlers
  severity: major
  reason: no handlers
";
        assert_eq!(report.render_yaml().unwrap(), expected);
    }

    #[test]
    fn json_report_carries_same_data() {
        let report = IncompatibilityReport::new(vec![Finding::new(
            "resources.cpu",
            Severity::Major,
            "too many",
        )]);
        let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["major"], 1);
        assert_eq!(json["incompatible_features"][0]["path"], "resources.cpu");
        assert_eq!(json["incompatible_features"][0]["severity"], "major");
    }

    #[test]
    fn deploy_command_layout() {
        let command = DeployCommand::new(
            "default",
            vec!["--cpu=1".to_string(), "--memory=2Gi".to_string(), "--timeout=10m".to_string()],
        );
        assert_eq!(
            command.to_string(),
            "gcloud beta run deploy default \\\n  --cpu=1 \\\n  --memory=2Gi \\\n  --timeout=10m"
        );
    }

    #[test]
    fn deploy_command_without_flags() {
        assert_eq!(
            DeployCommand::new("api", Vec::new()).to_string(),
            "gcloud beta run deploy api"
        );
    }

    #[test]
    fn service_name_precedence() {
        let named = doc("service: ' worker '\n");
        assert_eq!(service_name(&named, Some("cli")), "cli");
        assert_eq!(service_name(&named, None), "worker");
        assert_eq!(service_name(&named, Some("  ")), "worker");
        assert_eq!(service_name(&doc("runtime: go\n"), None), "default");
    }
}
