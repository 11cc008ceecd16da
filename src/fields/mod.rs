//! Schema field declarations.
//!
//! A `Field` is one serializable attribute of a schema: its type, whether it
//! is required, how nulls and absent keys are handled, and the validators run
//! after type coercion. Fields carry no name; a schema keys them by name in a
//! `FieldMap`.
//!
//! # Type Mapping
//!
//! | FieldType | Loads from | Loads to |
//! |-----------|------------|----------|
//! | String | string | string |
//! | Integer | integer, integral float, numeric string | integer |
//! | Float | number, numeric string | float |
//! | Decimal | number, numeric string | string |
//! | Boolean | bool, 0/1, truthy/falsy string | bool |
//! | DateTime | RFC 3339 or naive ISO string | RFC 3339 string |
//! | Email, Url | matching string | string |
//! | ObjectId, Reference | 24-hex string | lowercase hex string |
//! | List | array | array |
//! | Dict | object | object |
//! | Nested | object | object |
//! | Raw | anything | unchanged |

mod deserialize;
mod validator;

pub use deserialize::ErrorMap;
pub(crate) use deserialize::{join_path, push_error};
pub use validator::{Pattern, Validator};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::Schema;

/// Field name → declaration.
pub type FieldMap = BTreeMap<String, Field>;

/// Value type of a schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Email,
    Url,
    ObjectId,
    /// Id of a document of the named type
    Reference { document: String },
    List(Box<Field>),
    Dict,
    Nested(Arc<Schema>),
    Raw,
}

impl FieldType {
    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Decimal => "Decimal",
            FieldType::Boolean => "Boolean",
            FieldType::DateTime => "DateTime",
            FieldType::Email => "Email",
            FieldType::Url => "Url",
            FieldType::ObjectId => "ObjectId",
            FieldType::Reference { .. } => "Reference",
            FieldType::List(_) => "List",
            FieldType::Dict => "Dict",
            FieldType::Nested(_) => "Nested",
            FieldType::Raw => "Raw",
        }
    }
}

/// Load/dump behaviour shared by all field types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Absent keys are an error on load
    pub required: bool,
    /// Null is accepted and loaded as null
    pub allow_none: bool,
    /// Never dumped
    pub load_only: bool,
    /// Never loaded
    pub dump_only: bool,
    /// Loaded in place of an absent key
    pub missing: Option<Value>,
    /// External key name, if different from the field name
    pub data_key: Option<String>,
    pub validators: Vec<Validator>,
}

/// A single field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldType,
    pub options: FieldOptions,
}

impl Field {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            options: FieldOptions::default(),
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    pub fn float() -> Self {
        Self::new(FieldType::Float)
    }

    pub fn decimal() -> Self {
        Self::new(FieldType::Decimal)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn datetime() -> Self {
        Self::new(FieldType::DateTime)
    }

    pub fn email() -> Self {
        Self::new(FieldType::Email)
    }

    pub fn url() -> Self {
        Self::new(FieldType::Url)
    }

    pub fn object_id() -> Self {
        Self::new(FieldType::ObjectId)
    }

    pub fn reference(document: impl Into<String>) -> Self {
        Self::new(FieldType::Reference {
            document: document.into(),
        })
    }

    pub fn list(inner: Field) -> Self {
        Self::new(FieldType::List(Box::new(inner)))
    }

    pub fn dict() -> Self {
        Self::new(FieldType::Dict)
    }

    pub fn nested(schema: Arc<Schema>) -> Self {
        Self::new(FieldType::Nested(schema))
    }

    pub fn raw() -> Self {
        Self::new(FieldType::Raw)
    }

    pub fn required(mut self) -> Self {
        self.options.required = true;
        self
    }

    pub fn allow_none(mut self) -> Self {
        self.options.allow_none = true;
        self
    }

    pub fn load_only(mut self) -> Self {
        self.options.load_only = true;
        self
    }

    pub fn dump_only(mut self) -> Self {
        self.options.dump_only = true;
        self
    }

    pub fn missing(mut self, value: Value) -> Self {
        self.options.missing = Some(value);
        self
    }

    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.options.data_key = Some(key.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.options.validators.push(validator);
        self
    }

    /// Key used for this field in external data.
    pub fn external_key<'a>(&'a self, name: &'a str) -> &'a str {
        self.options.data_key.as_deref().unwrap_or(name)
    }
}
