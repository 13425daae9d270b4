//! Feature table loading and lookup
//!
//! The table is read once from its declarative source, validated, and
//! indexed per (category, input source) so each lookup is a dictionary hit
//! on the resolved path.

use std::collections::HashMap;
use std::path::Path;

use app2run_descriptor::{InputSource, Value};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::LoadError;
use crate::path::FeaturePath;
use crate::rule::{
    FeatureKind, FeatureRule, Range, RangeLimit, RuleKind, Severity, Supported, Unsupported,
    ValueLimit, ValuePattern,
};

/// Table shipped with the binary
pub const BUILTIN_TABLE: &str = include_str!("../config/features.yaml");

static BUILTIN: OnceCell<FeatureTable> = OnceCell::new();

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    unsupported: Vec<RawUnsupported>,
    range_limited: Vec<RawRangeLimited>,
    value_limited: Vec<RawValueLimited>,
    supported: Vec<RawSupported>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnsupported {
    path: FeaturePath,
    severity: Severity,
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRangeLimited {
    path: FeaturePath,
    severity: Severity,
    reason: String,
    range: Range,
    #[serde(default)]
    flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawValueLimited {
    path: FeaturePath,
    severity: Severity,
    reason: String,
    #[serde(default)]
    allowed_values: Vec<Value>,
    #[serde(default)]
    known_values: Vec<Value>,
    allowed_pattern: Option<String>,
    separator: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSupported {
    path: FeaturePath,
    flags: Vec<String>,
}

impl RawValueLimited {
    fn into_rule(self) -> Result<FeatureRule, LoadError> {
        let allowed_pattern = self
            .allowed_pattern
            .as_deref()
            .map(ValuePattern::new)
            .transpose()
            .map_err(|source| LoadError::InvalidPattern {
                path: self.path.app_yaml.clone(),
                source,
            })?;

        Ok(FeatureRule::new(
            self.path,
            RuleKind::ValueLimited(ValueLimit {
                severity: self.severity,
                reason: self.reason,
                allowed_values: self.allowed_values,
                known_values: self.known_values,
                allowed_pattern,
                separator: self.separator,
                flags: self.flags,
            }),
        ))
    }
}

impl TryFrom<RawTable> for Vec<FeatureRule> {
    type Error = LoadError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        let mut rules = Vec::with_capacity(
            raw.unsupported.len()
                + raw.range_limited.len()
                + raw.value_limited.len()
                + raw.supported.len(),
        );

        rules.extend(raw.unsupported.into_iter().map(|r| {
            FeatureRule::new(
                r.path,
                RuleKind::Unsupported(Unsupported {
                    severity: r.severity,
                    reason: r.reason,
                }),
            )
        }));
        rules.extend(raw.range_limited.into_iter().map(|r| {
            FeatureRule::new(
                r.path,
                RuleKind::RangeLimited(RangeLimit {
                    severity: r.severity,
                    reason: r.reason,
                    range: r.range,
                    flags: r.flags,
                }),
            )
        }));
        for r in raw.value_limited {
            rules.push(r.into_rule()?);
        }
        rules.extend(
            raw.supported
                .into_iter()
                .map(|r| FeatureRule::new(r.path, RuleKind::Supported(Supported { flags: r.flags }))),
        );

        Ok(rules)
    }
}

/// The feature compatibility table
///
/// Immutable after construction. Per category, every path is unique within
/// each input source, so a resolved path identifies at most one rule.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rules: Vec<FeatureRule>,
    index: HashMap<(FeatureKind, InputSource), IndexMap<String, usize>>,
}

impl FeatureTable {
    /// Build a table from rules, validating and indexing them
    ///
    /// # Errors
    /// Returns [`LoadError`] for blank paths, duplicate paths within one
    /// category, inverted or non-finite ranges, or `supported` rules without
    /// flags.
    pub fn from_rules(rules: Vec<FeatureRule>) -> Result<Self, LoadError> {
        let mut index: HashMap<(FeatureKind, InputSource), IndexMap<String, usize>> =
            HashMap::new();
        let mut ordinal: HashMap<FeatureKind, usize> = HashMap::new();

        for (i, rule) in rules.iter().enumerate() {
            let kind = rule.category();
            let position = ordinal.entry(kind).or_default();
            validate(rule, kind, *position)?;
            *position += 1;

            for input in InputSource::ALL {
                let path = rule.path(input);
                let slot = index.entry((kind, input)).or_default();
                if slot.insert(path.to_string(), i).is_some() {
                    return Err(LoadError::DuplicatePath {
                        kind,
                        input,
                        path: path.to_string(),
                    });
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// Parse and validate a YAML table
    ///
    /// # Errors
    /// Returns [`LoadError::Malformed`] if the document does not match the
    /// table schema, [`LoadError::InvalidPattern`] if an `allowed_pattern`
    /// does not compile, otherwise the errors of [`FeatureTable::from_rules`].
    pub fn from_yaml_str(content: &str) -> Result<Self, LoadError> {
        let raw: RawTable = serde_yaml::from_str(content)?;
        Self::from_rules(raw.try_into()?)
    }

    /// Read, parse and validate a YAML table file
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if the file cannot be read, otherwise the
    /// errors of [`FeatureTable::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;
        let table = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), rules = table.len(), "loaded feature table");
        Ok(table)
    }

    /// The table shipped with the binary, loaded on first use
    ///
    /// # Errors
    /// Returns [`LoadError`] if the embedded table is invalid.
    pub fn builtin() -> Result<&'static Self, LoadError> {
        BUILTIN.get_or_try_init(|| Self::from_yaml_str(BUILTIN_TABLE))
    }

    /// All rules, in source order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[FeatureRule] {
        &self.rules
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Dictionary of one category keyed by the path for `source`
    #[must_use]
    pub fn lookup(&self, kind: FeatureKind, source: InputSource) -> RuleIndex<'_> {
        RuleIndex {
            rules: &self.rules,
            entries: self.index.get(&(kind, source)),
        }
    }

    /// Find a rule by its `app.yaml` path
    ///
    /// Translation rules name features by their descriptor-file spelling and
    /// then resolve the path for the active source from the returned rule.
    #[inline]
    #[must_use]
    pub fn find(&self, kind: FeatureKind, app_yaml_path: &str) -> Option<&FeatureRule> {
        self.lookup(kind, InputSource::DescriptorFile).get(app_yaml_path)
    }
}

fn validate(rule: &FeatureRule, kind: FeatureKind, index: usize) -> Result<(), LoadError> {
    for input in InputSource::ALL {
        if rule.path(input).trim().is_empty() {
            return Err(LoadError::EmptyPath { kind, input, index });
        }
    }

    match &rule.kind {
        RuleKind::RangeLimited(r) if !(r.range.min.is_finite() && r.range.max.is_finite()) => {
            Err(LoadError::NonFiniteRange {
                path: rule.path.app_yaml.clone(),
                min: r.range.min,
                max: r.range.max,
            })
        }
        RuleKind::RangeLimited(r) if r.range.min > r.range.max => Err(LoadError::InvertedRange {
            path: rule.path.app_yaml.clone(),
            min: r.range.min,
            max: r.range.max,
        }),
        RuleKind::Supported(r) if r.flags.is_empty() => Err(LoadError::MissingFlags {
            kind,
            path: rule.path.app_yaml.clone(),
        }),
        _ => Ok(()),
    }
}

/// Read-only view of one category keyed by resolved path
#[derive(Debug, Clone, Copy)]
pub struct RuleIndex<'a> {
    rules: &'a [FeatureRule],
    entries: Option<&'a IndexMap<String, usize>>,
}

impl<'a> RuleIndex<'a> {
    /// Rule at resolved path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'a FeatureRule> {
        self.entries?.get(path).map(|&i| &self.rules[i])
    }

    /// Check whether a resolved path has a rule
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.is_some_and(|e| e.contains_key(path))
    }

    /// Number of rules in this category
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.map_or(0, IndexMap::len)
    }

    /// Check if this category is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(resolved path, rule)` in source order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a FeatureRule)> + 'a {
        let rules = self.rules;
        self.entries
            .into_iter()
            .flat_map(IndexMap::iter)
            .map(move |(path, &i)| (path.as_str(), &rules[i]))
    }
}
