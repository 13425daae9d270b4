//! Feature rules
//!
//! A rule is a [`FeaturePath`] plus one of four category payloads. The
//! category alone decides how a value is validated, so the payloads are a
//! closed sum type rather than an extensible trait.

use std::fmt::{self, Display, Formatter};

use app2run_descriptor::{InputSource, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::path::FeaturePath;

/// How serious an incompatibility is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks a like-for-like migration
    Major,
    /// Behavior differs but the service still runs
    Minor,
    /// Value not in the table's known set; target behavior undocumented
    Unknown,
    /// Value has the wrong type for its rule
    Invalid,
}

impl Severity {
    /// Lowercase name, as rendered in reports
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Unknown => "unknown",
            Self::Invalid => "invalid",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    /// Any presence is incompatible
    Unsupported,
    /// Numeric value must lie in a range
    RangeLimited,
    /// Value must be known and allowed
    ValueLimited,
    /// Fully compatible; drives flag emission
    Supported,
}

impl FeatureKind {
    /// Categories the compatibility checker consults, in precedence order
    pub const CHECKED: [Self; 3] = [Self::Unsupported, Self::RangeLimited, Self::ValueLimited];

    /// All categories, in table order
    pub const ALL: [Self; 4] = [
        Self::Unsupported,
        Self::RangeLimited,
        Self::ValueLimited,
        Self::Supported,
    ];

    /// Name of the top-level list in the table source
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::RangeLimited => "range_limited",
            Self::ValueLimited => "value_limited",
            Self::Supported => "supported",
        }
    }
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Range {
    /// Create range
    #[inline]
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check `min <= value <= max`
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Clamp into `[min, max]`
    ///
    /// In-range values come back unchanged, so clamping is idempotent.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Payload of an `unsupported` rule
#[derive(Debug, Clone, PartialEq)]
pub struct Unsupported {
    /// Finding severity
    pub severity: Severity,
    /// Human-readable explanation
    pub reason: String,
}

/// Payload of a `range_limited` rule
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLimit {
    /// Finding severity
    pub severity: Severity,
    /// Human-readable explanation
    pub reason: String,
    /// Accepted values
    pub range: Range,
    /// Target flags the value is translated to
    pub flags: Vec<String>,
}

/// Regex that a whole value must match
#[derive(Debug, Clone)]
pub struct ValuePattern(Regex);

impl ValuePattern {
    /// Compile `pattern`, anchored at both ends
    ///
    /// # Errors
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self)
    }

    /// Check `text` against the pattern
    #[inline]
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// Anchored source of the pattern
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for ValuePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Payload of a `value_limited` rule
///
/// Values are matched either against the enumerated `allowed_values` and
/// `known_values`, or against `allowed_pattern` when the set of valid values
/// is open. A pattern rule with a `separator` holds a list in one string and
/// every item must match.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueLimit {
    /// Finding severity
    pub severity: Severity,
    /// Human-readable explanation
    pub reason: String,
    /// Values Cloud Run accepts
    pub allowed_values: Vec<Value>,
    /// Values the table knows about at all
    pub known_values: Vec<Value>,
    /// Pattern accepted values match
    pub allowed_pattern: Option<ValuePattern>,
    /// Item separator of list-valued strings
    pub separator: Option<String>,
    /// Target flags the value is translated to
    pub flags: Vec<String>,
}

impl ValueLimit {
    /// Whether the table has an opinion about `value`
    ///
    /// Every value is known to a pattern rule.
    #[inline]
    #[must_use]
    pub fn is_known(&self, value: &Value) -> bool {
        self.allowed_pattern.is_some() || self.known_values.contains(value)
    }

    /// Whether Cloud Run accepts `value`
    #[must_use]
    pub fn is_allowed(&self, value: &Value) -> bool {
        match (&self.allowed_pattern, value) {
            (Some(_), Value::String(text)) => {
                let items = self.items(text);
                !items.is_empty() && items.iter().all(|item| self.accepts_item(item))
            }
            (Some(_), _) => false,
            (None, _) => self.allowed_values.contains(value),
        }
    }

    /// Split a list-valued string on the separator
    ///
    /// Items are trimmed and blanks dropped. Without a separator the whole
    /// trimmed string is the only item.
    #[must_use]
    pub fn items<'v>(&self, text: &'v str) -> Vec<&'v str> {
        match &self.separator {
            Some(separator) => text
                .split(separator.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect(),
            None => vec![text.trim()],
        }
    }

    /// Whether one item matches the pattern; always false without one
    #[inline]
    #[must_use]
    pub fn accepts_item(&self, item: &str) -> bool {
        self.allowed_pattern.as_ref().is_some_and(|p| p.is_match(item))
    }
}

/// Payload of a `supported` rule
#[derive(Debug, Clone, PartialEq)]
pub struct Supported {
    /// Target flags the value is translated to
    pub flags: Vec<String>,
}

/// Category payload
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// See [`Unsupported`]
    Unsupported(Unsupported),
    /// See [`RangeLimit`]
    RangeLimited(RangeLimit),
    /// See [`ValueLimit`]
    ValueLimited(ValueLimit),
    /// See [`Supported`]
    Supported(Supported),
}

/// One row of the feature table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRule {
    /// Path per input source
    pub path: FeaturePath,
    /// Category payload
    pub kind: RuleKind,
}

impl FeatureRule {
    /// Create rule
    #[inline]
    #[must_use]
    pub fn new(path: FeaturePath, kind: RuleKind) -> Self {
        Self { path, kind }
    }

    /// Path for the given input source
    #[inline]
    #[must_use]
    pub fn path(&self, source: InputSource) -> &str {
        self.path.for_source(source)
    }

    /// Category discriminant
    #[must_use]
    pub fn category(&self) -> FeatureKind {
        match self.kind {
            RuleKind::Unsupported(_) => FeatureKind::Unsupported,
            RuleKind::RangeLimited(_) => FeatureKind::RangeLimited,
            RuleKind::ValueLimited(_) => FeatureKind::ValueLimited,
            RuleKind::Supported(_) => FeatureKind::Supported,
        }
    }

    /// Target flags; empty for `unsupported`
    #[must_use]
    pub fn flags(&self) -> &[String] {
        match &self.kind {
            RuleKind::Unsupported(_) => &[],
            RuleKind::RangeLimited(r) => &r.flags,
            RuleKind::ValueLimited(r) => &r.flags,
            RuleKind::Supported(r) => &r.flags,
        }
    }

    /// Range payload, if this is a `range_limited` rule
    #[inline]
    #[must_use]
    pub fn as_range_limited(&self) -> Option<&RangeLimit> {
        match &self.kind {
            RuleKind::RangeLimited(r) => Some(r),
            _ => None,
        }
    }

    /// Value payload, if this is a `value_limited` rule
    #[inline]
    #[must_use]
    pub fn as_value_limited(&self) -> Option<&ValueLimit> {
        match &self.kind {
            RuleKind::ValueLimited(r) => Some(r),
            _ => None,
        }
    }
}

/// Pair every flag name with the same value: `--name=value`
#[must_use]
pub fn flags_with_value(flags: &[String], value: &str) -> Vec<String> {
    flags.iter().map(|flag| format!("{flag}={value}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_is_inclusive() {
        let range = Range::new(1.0, 8.0);
        assert!(range.contains(1.0));
        assert!(range.contains(8.0));
        assert!(!range.contains(9.0));
        assert!(!range.contains(0.5));
    }

    #[test]
    fn range_clamp_is_idempotent() {
        let range = Range::new(0.0, 1000.0);
        for value in [-3.0, 0.0, 12.5, 1000.0, 1001.0] {
            let once = range.clamp(value);
            assert_eq!(range.clamp(once), once);
            if range.contains(value) {
                assert_eq!(once, value);
            }
        }
    }

    #[test]
    fn single_flag() {
        let flags = vec!["--a".to_string()];
        assert_eq!(flags_with_value(&flags, "b"), vec!["--a=b"]);
    }

    #[test]
    fn multi_flags_share_value() {
        let flags = vec!["--a".to_string(), "--b".to_string()];
        assert_eq!(flags_with_value(&flags, "c"), vec!["--a=c", "--b=c"]);
    }

    #[test]
    fn rule_accessors_follow_category() {
        let rule = FeatureRule::new(
            FeaturePath::new("resources.cpu", "resources.cpu"),
            RuleKind::RangeLimited(RangeLimit {
                severity: Severity::Major,
                reason: "too many".to_string(),
                range: Range::new(1.0, 8.0),
                flags: vec!["--cpu".to_string()],
            }),
        );

        assert_eq!(rule.category(), FeatureKind::RangeLimited);
        assert_eq!(rule.flags(), ["--cpu"]);
        assert!(rule.as_range_limited().is_some());
        assert!(rule.as_value_limited().is_none());
    }

    fn connection_list() -> ValueLimit {
        ValueLimit {
            severity: Severity::Major,
            reason: "bad connection".to_string(),
            allowed_values: Vec::new(),
            known_values: Vec::new(),
            allowed_pattern: Some(ValuePattern::new("[a-z]+:[a-z0-9-]+:[a-z]+").unwrap()),
            separator: Some(",".to_string()),
            flags: vec!["--add-cloudsql-instances".to_string()],
        }
    }

    #[test]
    fn pattern_rule_checks_every_item() {
        let limit = connection_list();
        assert!(limit.is_known(&Value::from("anything")));
        assert!(limit.is_allowed(&Value::from("p:us-east1:db")));
        assert!(limit.is_allowed(&Value::from("p:us-east1:db, q:europe-west1:cache")));
        assert!(!limit.is_allowed(&Value::from("p:us-east1:db,test")));
        assert!(!limit.is_allowed(&Value::from(" , ")));
        assert!(!limit.is_allowed(&Value::from(3)));
    }

    #[test]
    fn pattern_is_anchored() {
        let limit = connection_list();
        assert!(!limit.accepts_item("x p:us-east1:db"));
        assert!(!limit.accepts_item("p:us-east1:db:extra"));
        assert_eq!(limit.items("a, b,,c"), ["a", "b", "c"]);
    }

    #[test]
    fn enumerated_rule_without_pattern() {
        let limit = ValueLimit {
            allowed_pattern: None,
            separator: None,
            allowed_values: vec![Value::from(3)],
            known_values: vec![Value::from(2), Value::from(3)],
            ..connection_list()
        };
        assert!(limit.is_allowed(&Value::from(3)));
        assert!(limit.is_known(&Value::from(2)));
        assert!(!limit.is_allowed(&Value::from(2)));
        assert!(!limit.is_known(&Value::from(4)));
        assert!(!limit.accepts_item("p:us-east1:db"));
    }

    #[test]
    fn severity_names() {
        assert_eq!(Severity::Unknown.to_string(), "unknown");
        assert_eq!(serde_yaml::to_string(&Severity::Minor).unwrap().trim(), "minor");
    }
}
