//! Stored field metadata.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::Model;

/// Storage type of a model field.
#[derive(Debug, Clone)]
pub enum ModelFieldKind {
    ObjectId,
    String,
    Url,
    Email,
    Int,
    Float,
    Decimal,
    Boolean,
    DateTime,
    /// Auto-incrementing counter
    Sequence,
    /// Untyped value
    Dynamic,
    Dict,
    List(Box<ModelFieldKind>),
    EmbeddedDocument(Arc<Model>),
    /// Reference to another document, by document name
    Reference(String),
    File,
    Image,
    Point,
}

impl ModelFieldKind {
    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ObjectId => "ObjectIdField",
            Self::String => "StringField",
            Self::Url => "URLField",
            Self::Email => "EmailField",
            Self::Int => "IntField",
            Self::Float => "FloatField",
            Self::Decimal => "DecimalField",
            Self::Boolean => "BooleanField",
            Self::DateTime => "DateTimeField",
            Self::Sequence => "SequenceField",
            Self::Dynamic => "DynamicField",
            Self::Dict => "DictField",
            Self::List(_) => "ListField",
            Self::EmbeddedDocument(_) => "EmbeddedDocumentField",
            Self::Reference(_) => "ReferenceField",
            Self::File => "FileField",
            Self::Image => "ImageField",
            Self::Point => "PointField",
        }
    }
}

// Embedded models compare by name; constructors are not comparable.
impl PartialEq for ModelFieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => a == b,
            (Self::EmbeddedDocument(a), Self::EmbeddedDocument(b)) => a.name() == b.name(),
            (Self::Reference(a), Self::Reference(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for ModelFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single stored field of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    pub name: String,
    pub kind: ModelFieldKind,
    pub required: bool,
    pub primary_key: bool,
    /// Value the model assigns when the field is absent
    pub default: Option<Value>,
    pub choices: Option<Vec<Value>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub regex: Option<String>,
}

impl ModelField {
    pub fn new(name: impl Into<String>, kind: ModelFieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            primary_key: false,
            default: None,
            choices: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            regex: None,
        }
    }

    pub fn object_id(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::ObjectId)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::Boolean)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::DateTime)
    }

    pub fn list(name: impl Into<String>, inner: ModelFieldKind) -> Self {
        Self::new(name, ModelFieldKind::List(Box::new(inner)))
    }

    pub fn embedded(name: impl Into<String>, model: Arc<Model>) -> Self {
        Self::new(name, ModelFieldKind::EmbeddedDocument(model))
    }

    pub fn reference(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::Reference(document.into()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn value_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }
}
