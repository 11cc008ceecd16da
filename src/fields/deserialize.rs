//! Per-field deserialization of JSON input values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::{Number, Value};

use super::{Field, FieldType};

/// Error messages keyed by dotted field path.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("url pattern compiles")
});

const TRUTHY: &[&str] = &["true", "t", "yes", "y", "on", "1"];
const FALSY: &[&str] = &["false", "f", "no", "n", "off", "0"];

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

pub(crate) fn push_error(errors: &mut ErrorMap, path: &str, message: impl Into<String>) {
    errors
        .entry(path.to_string())
        .or_default()
        .push(message.into());
}

impl Field {
    /// Coerce and validate one input value.
    ///
    /// Failures are recorded in `errors` under `path` (or a path below it for
    /// list items and nested fields) and yield `None`.
    pub(crate) fn deserialize(
        &self,
        value: &Value,
        path: &str,
        errors: &mut ErrorMap,
    ) -> Option<Value> {
        if value.is_null() {
            if self.options.allow_none {
                return Some(Value::Null);
            }
            push_error(errors, path, "Field may not be null.");
            return None;
        }

        let loaded = self.deserialize_kind(value, path, errors)?;

        let mut valid = true;
        for validator in &self.options.validators {
            if let Err(message) = validator.check(&loaded) {
                push_error(errors, path, message);
                valid = false;
            }
        }

        valid.then_some(loaded)
    }

    fn deserialize_kind(&self, value: &Value, path: &str, errors: &mut ErrorMap) -> Option<Value> {
        let scalar = match &self.kind {
            FieldType::List(inner) => return deserialize_list(inner, value, path, errors),
            FieldType::Nested(schema) => {
                return schema.load_object(value, path, errors).map(Value::Object);
            }
            FieldType::String => as_string(value),
            FieldType::Integer => as_integer(value),
            FieldType::Float => as_float(value),
            FieldType::Decimal => as_decimal(value),
            FieldType::Boolean => as_boolean(value),
            FieldType::DateTime => as_datetime(value),
            FieldType::Email => as_matching(value, &EMAIL_RE, "Not a valid email address."),
            FieldType::Url => as_matching(value, &URL_RE, "Not a valid URL."),
            FieldType::ObjectId => as_object_id(value),
            FieldType::Reference { document } => as_reference(value, document),
            FieldType::Dict => match value {
                Value::Object(_) => Ok(value.clone()),
                _ => Err("Not a valid mapping type.".to_string()),
            },
            FieldType::Raw => Ok(value.clone()),
        };

        match scalar {
            Ok(loaded) => Some(loaded),
            Err(message) => {
                push_error(errors, path, message);
                None
            }
        }
    }
}

fn deserialize_list(
    inner: &Field,
    value: &Value,
    path: &str,
    errors: &mut ErrorMap,
) -> Option<Value> {
    let Value::Array(items) = value else {
        push_error(errors, path, "Not a valid list.");
        return None;
    };

    let mut loaded = Vec::with_capacity(items.len());
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        match inner.deserialize(item, &join_path(path, &i.to_string()), errors) {
            Some(v) => loaded.push(v),
            None => valid = false,
        }
    }

    valid.then_some(Value::Array(loaded))
}

fn as_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        _ => Err("Not a valid string.".to_string()),
    }
}

fn as_integer(value: &Value) -> Result<Value, String> {
    const INVALID: &str = "Not a valid integer.";
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(value.clone())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::from(f as i64))
                    }
                    _ => Err(INVALID.to_string()),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| INVALID.to_string()),
        _ => Err(INVALID.to_string()),
    }
}

fn as_float(value: &Value) -> Result<Value, String> {
    const INVALID: &str = "Not a valid number.";
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| INVALID.to_string())
}

fn as_decimal(value: &Value) -> Result<Value, String> {
    const INVALID: &str = "Not a valid decimal.";
    match value {
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::String(trimmed.to_string())),
                _ => Err(INVALID.to_string()),
            }
        }
        _ => Err(INVALID.to_string()),
    }
}

fn as_boolean(value: &Value) -> Result<Value, String> {
    const INVALID: &str = "Not a valid boolean.";
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(INVALID.to_string()),
        },
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&lowered.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSY.contains(&lowered.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(INVALID.to_string())
            }
        }
        _ => Err(INVALID.to_string()),
    }
}

fn as_datetime(value: &Value) -> Result<Value, String> {
    const INVALID: &str = "Not a valid datetime.";
    let Value::String(s) = value else {
        return Err(INVALID.to_string());
    };
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::String(dt.to_rfc3339()));
    }

    // Naive timestamps are taken as UTC
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Value::String(Utc.from_utc_datetime(&naive).to_rfc3339()))
        .map_err(|_| INVALID.to_string())
}

fn as_matching(value: &Value, re: &Regex, message: &str) -> Result<Value, String> {
    match value {
        Value::String(s) if re.is_match(s) => Ok(value.clone()),
        _ => Err(message.to_string()),
    }
}

fn parse_object_id(s: &str) -> Option<String> {
    if s.len() != 24 {
        return None;
    }
    hex::decode(s).ok().map(|bytes| hex::encode(bytes))
}

fn as_object_id(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => parse_object_id(s)
            .map(Value::String)
            .ok_or_else(|| "Not a valid ObjectId.".to_string()),
        _ => Err("Not a valid ObjectId.".to_string()),
    }
}

fn as_reference(value: &Value, document: &str) -> Result<Value, String> {
    let id = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("id").and_then(Value::as_str),
        _ => None,
    };
    id.and_then(parse_object_id)
        .map(Value::String)
        .ok_or_else(|| format!("Not a valid {} reference.", document))
}
