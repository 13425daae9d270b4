//! Scalar helpers shared by the checker and the translator

use serde_yaml::Value;

/// Read a YAML scalar as a number
///
/// Only finite YAML numbers qualify; numeric-looking strings and `.nan` or
/// `.inf` are not numbers here.
#[inline]
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Format a number the way gcloud flags expect it
///
/// Whole numbers drop the fractional part (`8`, not `8.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Render a value for messages and flag values
///
/// Strings are rendered bare, everything else in YAML flow form.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1.2), "1.2");
        assert_eq!(format_number(-1.0), "-1");
    }

    #[test]
    fn as_number_rejects_strings() {
        assert_eq!(as_number(&Value::from(3)), Some(3.0));
        assert_eq!(as_number(&Value::from(0.5)), Some(0.5));
        assert_eq!(as_number(&Value::from("3")), None);
    }

    #[test]
    fn as_number_rejects_non_finite() {
        let nan: Value = serde_yaml::from_str(".nan").unwrap();
        let inf: Value = serde_yaml::from_str("-.inf").unwrap();
        assert!(matches!(nan, Value::Number(_)));
        assert_eq!(as_number(&nan), None);
        assert_eq!(as_number(&inf), None);
    }

    #[test]
    fn display_scalars() {
        assert_eq!(display_value(&Value::from(4)), "4");
        assert_eq!(display_value(&Value::from("python")), "python");
        assert_eq!(display_value(&Value::Bool(true)), "true");
        assert_eq!(display_value(&Value::Null), "null");
    }
}
