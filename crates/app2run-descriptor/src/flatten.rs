//! Path flattener
//!
//! Projects a nested configuration tree onto single-level dotted keys:
//!
//! ```text
//! resources:              resources.cpu       → 5
//!   cpu: 5          →     resources.memory_gb → 10
//!   memory_gb: 10
//! ```
//!
//! Environment variable maps are the one exception. Their keys are chosen by
//! the user, not by the schema, so the whole map is kept as a single leaf
//! under its own key.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Keys whose mapping values are leaves, in both namespaces
pub const OPAQUE_KEYS: &[&str] = &[
    "env_variables",
    "envVariables",
    "build_env_variables",
    "buildEnvVariables",
];

/// Dotted-path to leaf-value view of a configuration tree
///
/// Iteration follows the document order of the source tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    entries: IndexMap<String, Value>,
}

impl FlatConfig {
    /// Create empty flattened config
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get value at dotted path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    /// Check whether a dotted path is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of leaf entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, value)` pairs in document order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over entries at or below `prefix`
    ///
    /// Matching is segment-aware: `basic_scaling` does not match
    /// `basic_scaling_extra.x`.
    pub fn under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.iter().filter(move |(key, _)| is_at_or_below(key, prefix))
    }

    /// Check if any entry lives at or below `prefix`
    #[inline]
    #[must_use]
    pub fn has_under(&self, prefix: &str) -> bool {
        self.under(prefix).next().is_some()
    }

    /// Insert a leaf, returning the previous value if any
    pub fn insert(&mut self, path: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(path.into(), value)
    }
}

impl<'a> IntoIterator for &'a FlatConfig {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for FlatConfig {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn is_at_or_below(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Flatten a mapping into root-to-leaf dotted paths
#[must_use]
pub fn flatten(root: &Mapping) -> FlatConfig {
    let mut out = FlatConfig::new();
    flatten_into(root, "", &mut out);
    out
}

fn flatten_into(map: &Mapping, parent: &str, out: &mut FlatConfig) {
    for (key, value) in map {
        let key = key_to_string(key);
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::Mapping(child) if !OPAQUE_KEYS.contains(&key.as_str()) => {
                flatten_into(child, &path, out);
            }
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Re-nest a flattened config into a tree
///
/// Inverse of [`flatten`] for trees without dotted keys or key collisions
/// across depth levels.
#[must_use]
pub fn unflatten(flat: &FlatConfig) -> Mapping {
    let mut root = Mapping::new();
    for (key, value) in flat.iter() {
        let segments: Vec<&str> = key.split('.').collect();
        set_nested(&mut root, &segments, value.clone());
    }
    root
}

fn set_nested(map: &mut Mapping, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = map;
    for segment in parents {
        let slot = current
            .entry(Value::String((*segment).to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(Value::String((*last).to_string()), value);
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
