//! Schema configuration block and its normalized options.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::convert::{Converter, FieldKwargs, FieldsKwargs, ModelConverter};
use crate::model::Model;

/// What `load` does with input keys that match no field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// Report each unknown key as an error
    #[default]
    Raise,
    /// Drop unknown keys
    Exclude,
    /// Pass unknown keys through unchanged
    Include,
}

/// Configuration block of a schema definition.
///
/// Every entry is optional; `SchemaOpts::from_meta` fills in defaults.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub model: Option<Arc<Model>>,
    pub fields: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub model_fields_kwargs: Option<FieldsKwargs>,
    pub model_converter: Option<Arc<dyn Converter>>,
    pub unknown: Option<UnknownPolicy>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: Arc<Model>) -> Self {
        self.model = Some(model);
        self
    }

    /// Keep only the named fields. Derivation is limited to them and
    /// explicit fields outside the list are dropped too.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drop the named fields from the final field set.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn model_fields_kwargs(mut self, kwargs: FieldsKwargs) -> Self {
        self.model_fields_kwargs = Some(kwargs);
        self
    }

    /// Add overrides for one derived field.
    pub fn field_kwargs(mut self, name: impl Into<String>, kwargs: FieldKwargs) -> Self {
        self.model_fields_kwargs
            .get_or_insert_with(FieldsKwargs::new)
            .insert(name.into(), kwargs);
        self
    }

    pub fn model_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.model_converter = Some(converter);
        self
    }

    pub fn unknown(mut self, policy: UnknownPolicy) -> Self {
        self.unknown = Some(policy);
        self
    }
}

/// Normalized options of one schema definition.
#[derive(Debug, Clone)]
pub struct SchemaOpts {
    pub model: Option<Arc<Model>>,
    pub fields: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub model_fields_kwargs: FieldsKwargs,
    pub model_converter: Arc<dyn Converter>,
    pub unknown: UnknownPolicy,
}

impl SchemaOpts {
    /// Read a configuration block, applying defaults for unset entries.
    ///
    /// Nothing is validated here; a missing model is legal.
    pub fn from_meta(meta: &Meta) -> Self {
        Self {
            model: meta.model.clone(),
            fields: meta.fields.clone(),
            exclude: meta.exclude.clone(),
            model_fields_kwargs: meta.model_fields_kwargs.clone().unwrap_or_default(),
            model_converter: meta
                .model_converter
                .clone()
                .unwrap_or_else(|| Arc::new(ModelConverter)),
            unknown: meta.unknown.unwrap_or_default(),
        }
    }
}

impl Default for SchemaOpts {
    fn default() -> Self {
        Self::from_meta(&Meta::default())
    }
}
