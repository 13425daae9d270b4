//! Compatibility checker
//!
//! Walks a flattened document against the three reporting categories of the
//! feature table. Each key resolves through the first category that has a
//! rule for it, in the order unsupported, range limited, value limited.

use app2run_descriptor::{as_number, display_value, Descriptor, FlatConfig, InputSource, Value};
use app2run_features::{FeatureKind, FeatureRule, FeatureTable, RuleIndex, RuleKind, Severity};
use serde::Serialize;

/// One reported incompatibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Path as spelled in the active input source
    pub path: String,
    /// How serious the incompatibility is
    pub severity: Severity,
    /// Human-readable explanation
    pub reason: String,
}

impl Finding {
    /// Create finding
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            severity,
            reason: reason.into(),
        }
    }
}

/// Classifies every key of a document against a [`FeatureTable`]
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityChecker<'t> {
    table: &'t FeatureTable,
}

impl<'t> CompatibilityChecker<'t> {
    /// Create checker over a table
    #[inline]
    #[must_use]
    pub fn new(table: &'t FeatureTable) -> Self {
        Self { table }
    }

    /// Findings for a flattened document, in document order
    ///
    /// An empty result means every present key is compatible.
    #[must_use]
    pub fn check(&self, flat: &FlatConfig, source: InputSource) -> Vec<Finding> {
        let indexes: Vec<RuleIndex<'t>> = FeatureKind::CHECKED
            .iter()
            .map(|&kind| self.table.lookup(kind, source))
            .collect();

        let mut findings = Vec::new();
        for (path, value) in flat.iter() {
            let Some(rule) = indexes.iter().find_map(|index| index.get(path)) else {
                continue;
            };
            if let Some(finding) = evaluate(rule, path, value) {
                tracing::debug!(path, severity = %finding.severity, "incompatible feature");
                findings.push(finding);
            }
        }
        findings
    }

    /// Findings for a parsed document
    #[must_use]
    pub fn check_descriptor(&self, descriptor: &Descriptor) -> Vec<Finding> {
        self.check(&descriptor.flatten(), descriptor.source())
    }
}

fn evaluate(rule: &FeatureRule, path: &str, value: &Value) -> Option<Finding> {
    match &rule.kind {
        RuleKind::Unsupported(r) => Some(Finding::new(path, r.severity, &r.reason)),
        RuleKind::RangeLimited(r) => match as_number(value) {
            None => Some(Finding::new(
                path,
                Severity::Invalid,
                format!("{} is not a numeric value for {path}.", display_value(value)),
            )),
            Some(n) if !r.range.contains(n) => {
                Some(Finding::new(path, r.severity, &r.reason))
            }
            Some(_) => None,
        },
        RuleKind::ValueLimited(r) => {
            if !r.is_known(value) {
                Some(Finding::new(
                    path,
                    Severity::Unknown,
                    format!("{} is not a known value for {path}.", display_value(value)),
                ))
            } else if !r.is_allowed(value) {
                Some(Finding::new(path, r.severity, &r.reason))
            } else {
                None
            }
        }
        RuleKind::Supported(_) => None,
    }
}
