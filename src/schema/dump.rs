//! Dumping values through a schema.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::Schema;
use crate::fields::{Field, FieldType};

/// Dump error types
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Schema '{schema}' can only dump objects, got {found}")]
    NotAnObject { schema: String, found: &'static str },
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Schema {
    /// Serialize `obj` and keep only the schema's dumpable fields.
    pub fn dump<T: Serialize + ?Sized>(&self, obj: &T) -> Result<Map<String, Value>, DumpError> {
        let value = serde_json::to_value(obj)?;
        self.dump_value(&value)
    }

    /// Dump an already-serialized object.
    ///
    /// Attributes absent from `value` are skipped; `load_only` fields are
    /// never emitted.
    pub fn dump_value(&self, value: &Value) -> Result<Map<String, Value>, DumpError> {
        match value {
            Value::Object(object) => Ok(self.dump_object(object)),
            other => Err(DumpError::NotAnObject {
                schema: self.name.clone(),
                found: value_kind(other),
            }),
        }
    }

    fn dump_object(&self, object: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.options.load_only)
            .filter_map(|(name, field)| {
                object
                    .get(name)
                    .map(|value| (field.external_key(name).to_string(), dump_field(field, value)))
            })
            .collect()
    }
}

fn dump_field(field: &Field, value: &Value) -> Value {
    match (&field.kind, value) {
        (FieldType::Nested(schema), Value::Object(object)) => {
            Value::Object(schema.dump_object(object))
        }
        (FieldType::List(inner), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| dump_field(inner, item)).collect())
        }
        // Referenced documents dump as their id
        (FieldType::Reference { .. }, Value::Object(object)) => object
            .get("id")
            .or_else(|| object.get("_id"))
            .cloned()
            .unwrap_or(Value::Null),
        _ => value.clone(),
    }
}
