//! Document model definitions.
//!
//! A `Model` describes a stored document type: its name, its fields and, when
//! known, how to build a live instance from a loaded mapping. Models are the
//! input to a `Converter`; schemas never read them directly.
//!
//! Types implementing [`Document`] get a serde-backed constructor through
//! [`Model::of`], so loading a schema can hand back a typed value.

mod field;

pub use field::{ModelField, ModelFieldKind};

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Boxed value produced by a model constructor.
pub type AnyInstance = Box<dyn Any + Send + Sync>;

type Constructor = Arc<dyn Fn(Map<String, Value>) -> Result<AnyInstance, ModelError> + Send + Sync>;

/// Model construction errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model '{model}' has no constructor")]
    NotConstructible { model: String },

    #[error("Failed to construct '{model}': {source}")]
    Construct {
        model: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// A Rust type backed by a document model.
///
/// The associated model metadata describes the stored fields; construction
/// goes through `serde`, so the type's own `Deserialize` impl decides which
/// inputs it accepts.
pub trait Document: DeserializeOwned + Send + Sync + 'static {
    /// Describe the stored fields of this document.
    fn model() -> Model;
}

/// Introspectable description of a document type.
#[derive(Clone)]
pub struct Model {
    name: String,
    fields: Vec<ModelField>,
    constructor: Option<Constructor>,
}

impl Model {
    /// Create an empty model with no constructor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructor: None,
        }
    }

    /// Build the model of `T`, wired to construct `T` through serde.
    pub fn of<T: Document>() -> Arc<Self> {
        let model = T::model();
        let name = model.name.clone();
        Arc::new(model.with_constructor(move |data| {
            serde_json::from_value::<T>(Value::Object(data))
                .map(|instance| Box::new(instance) as AnyInstance)
                .map_err(|e| ModelError::Construct {
                    model: name.clone(),
                    source: Box::new(e),
                })
        }))
    }

    /// Append a field definition.
    pub fn field(mut self, field: ModelField) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the constructor used by `construct`.
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Result<AnyInstance, ModelError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[ModelField] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Build a live instance from a field-name → value mapping.
    ///
    /// Errors raised by the constructor are returned as-is inside
    /// `ModelError::Construct`.
    pub fn construct(&self, data: Map<String, Value>) -> Result<AnyInstance, ModelError> {
        match &self.constructor {
            Some(constructor) => constructor(data),
            None => Err(ModelError::NotConstructible {
                model: self.name.clone(),
            }),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}
