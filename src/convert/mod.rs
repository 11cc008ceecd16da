//! Model → schema field conversion.
//!
//! A `Converter` turns the stored fields of a `Model` into schema field
//! declarations. The standard implementation is [`ModelConverter`]; schemas
//! can swap in their own through `Meta::model_converter`.

mod kwargs;
mod model_converter;

pub use kwargs::{FieldKwargs, FieldsKwargs};
pub use model_converter::ModelConverter;

use std::fmt::Debug;

use thiserror::Error;

use crate::fields::FieldMap;
use crate::model::Model;

/// Conversion error types
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Field '{field}' of model '{model}' has unsupported type {kind}")]
    UnsupportedField {
        model: String,
        field: String,
        kind: String,
    },

    #[error("Field '{field}' of model '{model}': {message}")]
    InvalidField {
        model: String,
        field: String,
        message: String,
    },
}

/// Derives schema fields from a model.
pub trait Converter: Debug + Send + Sync {
    /// Produce a field declaration for every model field.
    ///
    /// # Arguments
    /// * `model` - The model to introspect
    /// * `fields` - Restriction list; `None` converts every model field
    /// * `fields_kwargs` - Per-field overrides applied to the derived declarations
    fn fields_for_model(
        &self,
        model: &Model,
        fields: Option<&[String]>,
        fields_kwargs: &FieldsKwargs,
    ) -> Result<FieldMap, ConvertError>;
}
