//! Flag translator
//!
//! Translation is a fixed pipeline of independent [`TranslationRule`]s. Each
//! rule reads the document through a [`TranslationContext`] and returns the
//! flags it is responsible for; the translator concatenates them in pipeline
//! order. Rules never fail. Anything they cannot translate becomes a
//! [`Warning`], which is logged and returned alongside the flags.

mod cloud_sql;
mod concurrency;
mod entrypoint;
mod required;
mod resources;
mod scaling;
mod supported;
mod timeout;

use std::fmt;

use app2run_descriptor::{
    as_number, display_value, format_number, Descriptor, FlatConfig, InputSource, Value,
};
use app2run_features::{FeatureKind, FeatureRule, FeatureTable, RangeLimit, RuleIndex};
use serde::Serialize;

use crate::procfile::ProcfileStore;
use crate::project::ProjectLookup;

pub use cloud_sql::CloudSqlRule;
pub use concurrency::{ConcurrencyRule, DEFAULT_STANDARD_CONCURRENCY};
pub use entrypoint::{default_entrypoint, EntrypointRule, PROCFILE_RUNTIMES};
pub use required::{labels, RequiredFlagsRule, REQUIRED_FLAGS};
pub use resources::{instance_class_resources, InstanceResources, ResourcesRule};
pub use scaling::{detect_scaling, ScalingDetection, ScalingGroup, ScalingRule};
pub use supported::{env_vars_value, SupportedRule};
pub use timeout::TimeoutRule;

/// One step of the translation pipeline
pub trait TranslationRule: Send + Sync {
    /// Short name used in warnings and logs
    fn name(&self) -> &'static str;

    /// Flags contributed by this rule, in output order
    fn translate(&self, ctx: &mut TranslationContext<'_>) -> Vec<String>;
}

/// Caller-supplied overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Project id for the default service account
    pub project: Option<String>,
    /// Start command, required for deployed versions
    pub command: Option<String>,
}

impl TranslateOptions {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project id
    #[inline]
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// With start command
    #[inline]
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// External collaborators a translation may consult
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Procfile access for buildpack runtimes
    pub procfile: &'a dyn ProcfileStore,
    /// Fallback project id source
    pub projects: &'a dyn ProjectLookup,
}

impl fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Something a rule could not translate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Rule that raised it
    pub rule: &'static str,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Result of translating one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Flags in pipeline order
    pub flags: Vec<String>,
    /// Warnings in the order they were raised
    pub warnings: Vec<Warning>,
}

impl Translation {
    /// Warnings raised by one rule
    pub fn warnings_from<'s>(&'s self, rule: &'s str) -> impl Iterator<Item = &'s Warning> + 's {
        self.warnings.iter().filter(move |w| w.rule == rule)
    }
}

/// Everything a rule may read, plus the warning sink
pub struct TranslationContext<'a> {
    descriptor: &'a Descriptor,
    flat: &'a FlatConfig,
    table: &'a FeatureTable,
    options: &'a TranslateOptions,
    collaborators: Collaborators<'a>,
    rule: &'static str,
    warnings: Vec<Warning>,
}

impl<'a> TranslationContext<'a> {
    /// The parsed document
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &'a Descriptor {
        self.descriptor
    }

    /// Flattened view of the document
    #[inline]
    #[must_use]
    pub fn flat(&self) -> &'a FlatConfig {
        self.flat
    }

    /// Active input source
    #[inline]
    #[must_use]
    pub fn source(&self) -> InputSource {
        self.descriptor.source()
    }

    /// Whether the document targets the flexible environment
    #[inline]
    #[must_use]
    pub fn is_flex(&self) -> bool {
        self.descriptor.is_flex()
    }

    /// Caller overrides
    #[inline]
    #[must_use]
    pub fn options(&self) -> &'a TranslateOptions {
        self.options
    }

    /// Procfile collaborator
    #[inline]
    #[must_use]
    pub fn procfile(&self) -> &'a dyn ProcfileStore {
        self.collaborators.procfile
    }

    /// Project lookup collaborator
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &'a dyn ProjectLookup {
        self.collaborators.projects
    }

    /// Rule of `kind` named by its `app.yaml` path
    ///
    /// A missing rule means the table was customized; the caller skips the
    /// feature.
    #[must_use]
    pub fn rule(&self, kind: FeatureKind, app_yaml_path: &str) -> Option<&'a FeatureRule> {
        let found = self.table.find(kind, app_yaml_path);
        if found.is_none() {
            tracing::debug!(rule = self.rule, %kind, path = app_yaml_path, "no rule in feature table");
        }
        found
    }

    /// All rules of one category keyed by the active source's path
    #[inline]
    #[must_use]
    pub fn rules(&self, kind: FeatureKind) -> RuleIndex<'a> {
        self.table.lookup(kind, self.source())
    }

    /// Value of `rule`'s feature in the document, if present
    #[inline]
    #[must_use]
    pub fn value_of(&self, rule: &FeatureRule) -> Option<&'a Value> {
        self.flat.get(rule.path(self.source()))
    }

    /// Record a warning against the running rule
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(rule = self.rule, "{message}");
        self.warnings.push(Warning {
            rule: self.rule,
            message,
        });
    }

    /// Numeric `value` bounded by `limit` for translation
    ///
    /// Values below the minimum are dropped with a warning, values above the
    /// maximum are clamped to it. Non-numeric values are dropped with a
    /// warning.
    pub fn bounded(&mut self, path: &str, limit: &RangeLimit, value: &Value) -> Option<f64> {
        let Some(number) = as_number(value) else {
            self.warn(format!(
                "{path} has non-numeric value {}, it is not translated.",
                display_value(value)
            ));
            return None;
        };

        if number < limit.range.min {
            self.warn(format!(
                "{path} has invalid value of {}, minimum value is {}.",
                format_number(number),
                format_number(limit.range.min)
            ));
            return None;
        }

        if number > limit.range.max {
            tracing::info!(
                path,
                value = number,
                max = limit.range.max,
                "value above maximum, clamped"
            );
        }
        Some(limit.range.clamp(number))
    }
}

/// Runs the translation pipeline against one feature table
pub struct Translator<'t> {
    table: &'t FeatureTable,
    rules: Vec<Box<dyn TranslationRule>>,
}

impl<'t> Translator<'t> {
    /// Translator with the standard pipeline
    #[must_use]
    pub fn new(table: &'t FeatureTable) -> Self {
        Self::with_rules(table, default_rules())
    }

    /// Translator with a custom pipeline
    #[must_use]
    pub fn with_rules(table: &'t FeatureTable, rules: Vec<Box<dyn TranslationRule>>) -> Self {
        Self { table, rules }
    }

    /// Rule names in pipeline order
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Translate one document
    #[must_use]
    pub fn translate(
        &self,
        descriptor: &Descriptor,
        options: &TranslateOptions,
        collaborators: Collaborators<'_>,
    ) -> Translation {
        let flat = descriptor.flatten();
        let mut ctx = TranslationContext {
            descriptor,
            flat: &flat,
            table: self.table,
            options,
            collaborators,
            rule: "",
            warnings: Vec::new(),
        };

        let mut flags = Vec::new();
        for rule in &self.rules {
            ctx.rule = rule.name();
            let emitted = rule.translate(&mut ctx);
            tracing::debug!(rule = rule.name(), flags = emitted.len(), "rule translated");
            flags.extend(emitted);
        }

        Translation {
            flags,
            warnings: ctx.warnings,
        }
    }
}

impl fmt::Debug for Translator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The standard pipeline, in output order
#[must_use]
pub fn default_rules() -> Vec<Box<dyn TranslationRule>> {
    vec![
        Box::new(ConcurrencyRule),
        Box::new(ScalingRule),
        Box::new(TimeoutRule),
        Box::new(ResourcesRule),
        Box::new(EntrypointRule),
        Box::new(SupportedRule),
        Box::new(CloudSqlRule),
        Box::new(RequiredFlagsRule),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for the rule modules' unit tests

    use super::*;
    use crate::procfile::MemoryProcfile;
    use crate::project::NoProject;

    /// Run one rule against the built-in table
    pub(crate) fn run(rule: impl TranslationRule + 'static, yaml: &str) -> Translation {
        run_with(
            rule,
            yaml,
            InputSource::DescriptorFile,
            &TranslateOptions::new(),
            &MemoryProcfile::new(),
        )
    }

    /// Run one rule with explicit source, options and Procfile
    pub(crate) fn run_with(
        rule: impl TranslationRule + 'static,
        yaml: &str,
        source: InputSource,
        options: &TranslateOptions,
        procfile: &MemoryProcfile,
    ) -> Translation {
        let table = FeatureTable::builtin().unwrap();
        let descriptor = Descriptor::from_yaml_str(yaml, source).unwrap();
        let translator = Translator::with_rules(table, vec![Box::new(rule)]);
        translator.translate(
            &descriptor,
            options,
            Collaborators {
                procfile,
                projects: &NoProject,
            },
        )
    }
}
