//! Post-coercion value checks.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Compiled regular expression, serialized as its source text.
///
/// An invalid pattern is rejected when the value is built or deserialized,
/// so a `Validator::Regexp` always holds a usable expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = regex::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// A check run on a field value after type coercion.
///
/// JSON form uses a "type" tag with snake_case variant names, e.g.
/// `{"type": "length", "max": 20}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Validator {
    /// Character count for strings, element count for lists and mappings
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Inclusive numeric bounds
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    OneOf { choices: Vec<Value> },
    Regexp { pattern: Pattern },
}

impl Validator {
    /// `Regexp` validator for `pattern`.
    pub fn regexp(pattern: &str) -> Result<Self, regex::Error> {
        Pattern::new(pattern).map(|pattern| Validator::Regexp { pattern })
    }

    /// Check a coerced value, returning the error message on failure.
    ///
    /// Values of a kind the validator does not apply to pass unchecked.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::Length { min, max } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Array(items) => items.len(),
                    Value::Object(map) => map.len(),
                    _ => return Ok(()),
                };
                if let Some(min) = min {
                    if len < *min {
                        return Err(format!("Shorter than minimum length {}.", min));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(format!("Longer than maximum length {}.", max));
                    }
                }
                Ok(())
            }
            Validator::Range { min, max } => {
                let number = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let Some(number) = number else {
                    return Ok(());
                };
                if let Some(min) = min {
                    if number < *min {
                        return Err(format!("Must be greater than or equal to {}.", min));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(format!("Must be less than or equal to {}.", max));
                    }
                }
                Ok(())
            }
            Validator::OneOf { choices } => {
                if choices.contains(value) {
                    Ok(())
                } else {
                    let listed = choices
                        .iter()
                        .map(|c| match c {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    Err(format!("Must be one of: {}.", listed))
                }
            }
            Validator::Regexp { pattern } => {
                let Value::String(s) = value else {
                    return Ok(());
                };
                if pattern.is_match(s) {
                    Ok(())
                } else {
                    Err("String does not match expected pattern.".to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("ab"), Some(2), Some(4), true)]
    #[case(json!("a"), Some(2), Some(4), false)]
    #[case(json!("abcde"), Some(2), Some(4), false)]
    #[case(json!([1, 2, 3]), None, Some(2), false)]
    #[case(json!({"a": 1}), Some(1), None, true)]
    #[case(json!(42), Some(10), None, true)]
    fn test_length(
        #[case] value: Value,
        #[case] min: Option<usize>,
        #[case] max: Option<usize>,
        #[case] ok: bool,
    ) {
        assert_eq!(Validator::Length { min, max }.check(&value).is_ok(), ok);
    }

    #[rstest]
    #[case(json!(5), true)]
    #[case(json!(0), true)]
    #[case(json!(-1), false)]
    #[case(json!(10.5), false)]
    #[case(json!("7"), true)]
    fn test_range(#[case] value: Value, #[case] ok: bool) {
        let validator = Validator::Range {
            min: Some(0.0),
            max: Some(10.0),
        };
        assert_eq!(validator.check(&value).is_ok(), ok);
    }

    #[test]
    fn test_range_messages() {
        let validator = Validator::Range {
            min: Some(1.0),
            max: None,
        };
        assert_eq!(
            validator.check(&json!(0)).unwrap_err(),
            "Must be greater than or equal to 1."
        );
    }

    #[test]
    fn test_one_of() {
        let validator = Validator::OneOf {
            choices: vec![json!("red"), json!("blue")],
        };
        assert!(validator.check(&json!("red")).is_ok());
        assert_eq!(
            validator.check(&json!("green")).unwrap_err(),
            "Must be one of: red, blue."
        );
    }

    #[test]
    fn test_regexp() {
        let validator = Validator::regexp("^[a-z]+$").unwrap();
        assert!(validator.check(&json!("abc")).is_ok());
        assert_eq!(
            validator.check(&json!("ABC")).unwrap_err(),
            "String does not match expected pattern."
        );
        assert!(validator.check(&json!(12)).is_ok());
    }

    #[test]
    fn test_invalid_pattern_rejected_up_front() {
        assert!(Validator::regexp("(").is_err());
        assert!("[".parse::<Pattern>().is_err());

        let result: Result<Validator, _> =
            serde_json::from_value(json!({"type": "regexp", "pattern": "("}));
        assert!(result.is_err());
    }

    #[test]
    fn test_pattern_json_form_is_source_text() {
        let validator = Validator::regexp(r"^\d+$").unwrap();
        let value = serde_json::to_value(&validator).unwrap();
        assert_eq!(value, json!({"type": "regexp", "pattern": r"^\d+$"}));
        assert_eq!(serde_json::from_value::<Validator>(value).unwrap(), validator);
    }

    #[test]
    fn test_json_form() {
        let validator: Validator =
            serde_json::from_value(json!({"type": "length", "max": 20})).unwrap();
        assert_eq!(
            validator,
            Validator::Length {
                min: None,
                max: Some(20)
            }
        );
        let validator: Validator =
            serde_json::from_value(json!({"type": "one_of", "choices": ["a"]})).unwrap();
        assert_eq!(
            validator,
            Validator::OneOf {
                choices: vec![json!("a")]
            }
        );
    }
}
