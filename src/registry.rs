//! Named models, converters and built schemas.
//!
//! Schemas are defined once; registering a second schema, model or converter
//! under a taken name is an error rather than a replacement.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::convert::Converter;
use crate::model::{Document, Model};
use crate::schema::Schema;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} '{name}' is already registered")]
    Duplicate { kind: &'static str, name: String },

    #[error("{kind} '{name}' is not registered")]
    NotFound { kind: &'static str, name: String },
}

#[derive(Debug, Default)]
pub struct Registry {
    models: BTreeMap<String, Arc<Model>>,
    converters: BTreeMap<String, Arc<dyn Converter>>,
    schemas: BTreeMap<String, Arc<Schema>>,
}

fn insert_unique<V>(
    map: &mut BTreeMap<String, V>,
    kind: &'static str,
    name: String,
    value: V,
) -> Result<(), RegistryError> {
    if map.contains_key(&name) {
        return Err(RegistryError::Duplicate { kind, name });
    }
    map.insert(name, value);
    Ok(())
}

fn lookup<V: Clone>(
    map: &BTreeMap<String, V>,
    kind: &'static str,
    name: &str,
) -> Result<V, RegistryError> {
    map.get(name).cloned().ok_or_else(|| RegistryError::NotFound {
        kind,
        name: name.to_string(),
    })
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its own name.
    pub fn register_model(&mut self, model: Arc<Model>) -> Result<Arc<Model>, RegistryError> {
        insert_unique(&mut self.models, "Model", model.name().to_string(), Arc::clone(&model))?;
        Ok(model)
    }

    /// Register the model of a `Document` type.
    pub fn register_document<T: Document>(&mut self) -> Result<Arc<Model>, RegistryError> {
        self.register_model(Model::of::<T>())
    }

    pub fn register_converter(
        &mut self,
        name: impl Into<String>,
        converter: Arc<dyn Converter>,
    ) -> Result<(), RegistryError> {
        insert_unique(&mut self.converters, "Converter", name.into(), converter)
    }

    /// Register a built schema under its own name.
    pub fn register_schema(&mut self, schema: Arc<Schema>) -> Result<Arc<Schema>, RegistryError> {
        insert_unique(&mut self.schemas, "Schema", schema.name().to_string(), Arc::clone(&schema))?;
        Ok(schema)
    }

    pub fn model(&self, name: &str) -> Result<Arc<Model>, RegistryError> {
        lookup(&self.models, "Model", name)
    }

    pub fn converter(&self, name: &str) -> Result<Arc<dyn Converter>, RegistryError> {
        lookup(&self.converters, "Converter", name)
    }

    pub fn schema(&self, name: &str) -> Result<Arc<Schema>, RegistryError> {
        lookup(&self.schemas, "Schema", name)
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}
