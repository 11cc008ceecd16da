//! Loading input data through a schema.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Schema, UnknownPolicy};
use crate::fields::{ErrorMap, join_path, push_error};
use crate::model::{AnyInstance, ModelError};

/// Key for errors that apply to the input as a whole.
pub const SCHEMA_ERROR_KEY: &str = "_schema";

/// Collected field errors from a failed load.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation failed for schema '{schema}': {}", format_messages(.messages))]
pub struct ValidationError {
    pub schema: String,
    pub messages: ErrorMap,
}

fn format_messages(messages: &ErrorMap) -> String {
    messages
        .iter()
        .map(|(path, errs)| format!("{}: {}", path, errs.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load error types
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Schema '{schema}' has no model to construct")]
    NoModel { schema: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Schema '{schema}' constructs '{model}', not the requested type")]
    TypeMismatch { schema: String, model: String },
}

/// A model instance built by a schema.
pub struct Instance {
    model: String,
    value: AnyInstance,
}

impl Instance {
    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the concrete value, or get the instance back if `T` is wrong.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { model, value } = self;
        match value.downcast::<T>() {
            Ok(concrete) => Ok(*concrete),
            Err(value) => Err(Self { model, value }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Result of `Schema::load`.
#[derive(Debug)]
pub enum Loaded {
    /// Built by the schema's model
    Instance(Instance),
    /// Plain mapping, for schemas without a model
    Data(Map<String, Value>),
}

impl Loaded {
    pub fn is_instance(&self) -> bool {
        matches!(self, Loaded::Instance(_))
    }

    pub fn into_instance<T: Any>(self) -> Option<T> {
        match self {
            Loaded::Instance(instance) => instance.downcast::<T>().ok(),
            Loaded::Data(_) => None,
        }
    }

    pub fn into_data(self) -> Option<Map<String, Value>> {
        match self {
            Loaded::Data(data) => Some(data),
            Loaded::Instance(_) => None,
        }
    }
}

impl Schema {
    /// Check `input` without building anything. Empty means valid.
    pub fn validate(&self, input: &Value) -> ErrorMap {
        let mut errors = ErrorMap::new();
        self.load_object(input, "", &mut errors);
        errors
    }

    /// Deserialize and validate `input` into a field-name → value mapping.
    pub fn load_data(&self, input: &Value) -> Result<Map<String, Value>, ValidationError> {
        let mut errors = ErrorMap::new();
        match self.load_object(input, "", &mut errors) {
            Some(data) if errors.is_empty() => Ok(data),
            _ => Err(ValidationError {
                schema: self.name.clone(),
                messages: errors,
            }),
        }
    }

    /// Load `input`, building a model instance when the schema has a model.
    pub fn load(&self, input: &Value) -> Result<Loaded, LoadError> {
        let data = self.load_data(input)?;
        if self.model.is_some() {
            self.make_object(data).map(Loaded::Instance)
        } else {
            Ok(Loaded::Data(data))
        }
    }

    /// Load `input` straight into the model type `T`.
    pub fn load_into<T: Any>(&self, input: &Value) -> Result<T, LoadError> {
        let data = self.load_data(input)?;
        self.make_object(data)?
            .downcast::<T>()
            .map_err(|instance| LoadError::TypeMismatch {
                schema: self.name.clone(),
                model: instance.model,
            })
    }

    /// Pass loaded data to the model constructor.
    ///
    /// Constructor failures are returned unchanged as `LoadError::Model`.
    pub fn make_object(&self, data: Map<String, Value>) -> Result<Instance, LoadError> {
        let Some(model) = &self.model else {
            return Err(LoadError::NoModel {
                schema: self.name.clone(),
            });
        };
        let value = model.construct(data)?;
        Ok(Instance {
            model: model.name().to_string(),
            value,
        })
    }

    /// Load one object, recording errors under paths starting at `prefix`.
    pub(crate) fn load_object(
        &self,
        input: &Value,
        prefix: &str,
        errors: &mut ErrorMap,
    ) -> Option<Map<String, Value>> {
        let Value::Object(object) = input else {
            let path = if prefix.is_empty() { SCHEMA_ERROR_KEY } else { prefix };
            push_error(errors, path, "Invalid input type.");
            return None;
        };

        let mut loaded = Map::new();
        let mut known = BTreeSet::new();
        let mut valid = true;

        for (name, field) in &self.fields {
            if field.options.dump_only {
                continue;
            }
            let key = field.external_key(name);
            known.insert(key);
            let path = join_path(prefix, key);

            match object.get(key) {
                Some(raw) => match field.deserialize(raw, &path, errors) {
                    Some(value) => {
                        loaded.insert(name.clone(), value);
                    }
                    None => valid = false,
                },
                None => {
                    if let Some(missing) = &field.options.missing {
                        loaded.insert(name.clone(), missing.clone());
                    } else if field.options.required {
                        push_error(errors, &path, "Missing data for required field.");
                        valid = false;
                    }
                }
            }
        }

        for (key, raw) in object {
            if known.contains(key.as_str()) {
                continue;
            }
            match self.opts.unknown {
                UnknownPolicy::Raise => {
                    push_error(errors, &join_path(prefix, key), "Unknown field.");
                    valid = false;
                }
                UnknownPolicy::Exclude => {}
                UnknownPolicy::Include => {
                    loaded.insert(key.clone(), raw.clone());
                }
            }
        }

        valid.then_some(loaded)
    }
}
