//! Parsed configuration documents

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::DescriptorError;
use crate::flatten::{flatten, FlatConfig};
use crate::source::InputSource;

/// A parsed App Engine configuration document
///
/// Holds the raw tree together with the [`InputSource`] it came from, so
/// that every later lookup resolves paths in the right namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    root: Mapping,
    source: InputSource,
}

impl Descriptor {
    /// Wrap an already parsed tree
    #[inline]
    #[must_use]
    pub fn new(root: Mapping, source: InputSource) -> Self {
        Self { root, source }
    }

    /// Parse a YAML document
    ///
    /// # Errors
    /// - [`DescriptorError::Empty`] for an empty or `null` document
    /// - [`DescriptorError::Syntax`] if the YAML is malformed
    /// - [`DescriptorError::NotAMapping`] if the root is a scalar or list
    pub fn from_yaml_str(content: &str, source: InputSource) -> Result<Self, DescriptorError> {
        if content.trim().is_empty() {
            return Err(DescriptorError::Empty);
        }

        match serde_yaml::from_str::<Value>(content)? {
            Value::Null => Err(DescriptorError::Empty),
            Value::Mapping(root) => Ok(Self::new(root, source)),
            other => Err(DescriptorError::NotAMapping {
                found: kind_name(&other),
            }),
        }
    }

    /// Read and parse a YAML file
    ///
    /// # Errors
    /// Returns [`DescriptorError::Io`] if the file cannot be read, otherwise
    /// the errors of [`Descriptor::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>, source: InputSource) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| DescriptorError::io_error(path, e))?;
        Self::from_yaml_str(&content, source)
    }

    /// Raw tree
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Where the document came from
    #[inline]
    #[must_use]
    pub fn source(&self) -> InputSource {
        self.source
    }

    /// Top-level value by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Flattened view of this document
    #[inline]
    #[must_use]
    pub fn flatten(&self) -> FlatConfig {
        flatten(&self.root)
    }

    /// Whether the document targets the flexible environment
    ///
    /// `app.yaml` spells it `flex`, the deployed representation `flexible`.
    #[must_use]
    pub fn is_flex(&self) -> bool {
        matches!(
            self.get("env").and_then(Value::as_str),
            Some("flex" | "flexible")
        )
    }

    /// Declared runtime, if any
    #[inline]
    #[must_use]
    pub fn runtime(&self) -> Option<&str> {
        self.get("runtime").and_then(Value::as_str)
    }

    /// Declared service name, trimmed, if non-empty
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.get("service")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_yaml(content: &str) -> Descriptor {
        Descriptor::from_yaml_str(content, InputSource::DescriptorFile).unwrap()
    }

    #[test]
    fn parse_valid() {
        let doc = app_yaml("runtime: python39\nservice: api\n");
        assert_eq!(doc.runtime(), Some("python39"));
        assert_eq!(doc.service(), Some("api"));
        assert_eq!(doc.source(), InputSource::DescriptorFile);
    }

    #[test]
    fn parse_empty_is_distinct_error() {
        for content in ["", "   \n", "~\n", "null"] {
            let err = Descriptor::from_yaml_str(content, InputSource::DescriptorFile).unwrap_err();
            assert!(err.is_empty_input(), "{content:?} should be empty input");
        }
    }

    #[test]
    fn parse_rejects_non_mapping_root() {
        let err = Descriptor::from_yaml_str("- a\n- b\n", InputSource::DescriptorFile).unwrap_err();
        assert!(matches!(err, DescriptorError::NotAMapping { found: "a sequence" }));
    }

    #[test]
    fn parse_rejects_bad_yaml() {
        let err = Descriptor::from_yaml_str("a: [1, 2\n", InputSource::DescriptorFile).unwrap_err();
        assert!(matches!(err, DescriptorError::Syntax(_)));
    }

    #[test]
    fn flex_detection() {
        assert!(app_yaml("env: flex\n").is_flex());
        assert!(app_yaml("env: flexible\n").is_flex());
        assert!(!app_yaml("env: standard\n").is_flex());
        assert!(!app_yaml("runtime: go\n").is_flex());
    }

    #[test]
    fn blank_service_is_absent() {
        assert_eq!(app_yaml("service: '  '\n").service(), None);
        assert_eq!(app_yaml("service: ' worker '\n").service(), Some("worker"));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = Descriptor::from_path("/definitely/not/here/app.yaml", InputSource::DescriptorFile)
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Io { .. }));
    }
}
