//! Schema definitions from JSON configuration files.
//!
//! A configuration file lists schema definitions in dependency order. Models
//! and converters are referenced by the names they were registered under in a
//! [`Registry`]; parents and nested schemas refer to schemas defined earlier
//! in the file (or already registered).
//!
//! ```json
//! {
//!   "schemas": [
//!     {
//!       "name": "PersonSchema",
//!       "meta": {
//!         "model": "Person",
//!         "model_fields_kwargs": { "age": { "required": false } }
//!       }
//!     },
//!     {
//!       "name": "PublicPersonSchema",
//!       "parent": "PersonSchema",
//!       "fields": { "age": { "type": "integer", "options": { "load_only": true } } }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{FieldKwargs, FieldsKwargs};
use crate::fields::{Field, FieldType};
use crate::registry::{Registry, RegistryError};
use crate::schema::{Meta, Schema, SchemaError, UnknownPolicy};

/// Configuration file name looked up by [`SchemaConfigFile::load_default`].
pub const DEFAULT_CONFIG_FILE: &str = "model_schema.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema '{schema}': {source}")]
    Registry {
        schema: String,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfigFile {
    pub schemas: Vec<SchemaConfig>,
}

/// One schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub meta: Option<MetaConfig>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldConfig>,
}

/// JSON form of `Meta`, with models and converters given by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaConfig {
    pub model: Option<String>,
    pub fields: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub model_fields_kwargs: Option<FieldsKwargs>,
    pub model_converter: Option<String>,
    pub unknown: Option<UnknownPolicy>,
}

/// An explicitly declared field.
///
/// JSON format uses a "type" tag with snake_case type names, plus an
/// optional "options" object using the keyword-override keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(flatten)]
    pub kind: FieldTypeConfig,
    #[serde(default)]
    pub options: FieldKwargs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldTypeConfig {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    #[serde(rename = "datetime")]
    DateTime,
    Email,
    Url,
    #[serde(rename = "object_id")]
    ObjectId,
    Reference { document: String },
    List { item: Box<FieldConfig> },
    Dict,
    /// Nested schema, by registered name
    Nested { schema: String },
    Raw,
}

impl SchemaConfigFile {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::NotFound { path: display });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Load `model_schema.json` from the current directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load [`DEFAULT_CONFIG_FILE`] from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&dir.join(DEFAULT_CONFIG_FILE))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: "<string>".to_string(),
            source,
        })
    }

    /// Build every schema in file order and register it.
    pub fn build_schemas(
        &self,
        registry: &mut Registry,
    ) -> Result<Vec<Arc<Schema>>, ConfigError> {
        let mut built = Vec::with_capacity(self.schemas.len());
        for config in &self.schemas {
            let schema = config.build(registry)?;
            let schema = registry
                .register_schema(schema)
                .map_err(|source| ConfigError::Registry {
                    schema: config.name.clone(),
                    source,
                })?;
            debug!("Registered schema '{}' from configuration", config.name);
            built.push(schema);
        }
        Ok(built)
    }
}

impl SchemaConfig {
    /// Build this definition against already-registered names.
    pub fn build(&self, registry: &Registry) -> Result<Arc<Schema>, ConfigError> {
        let lookup_err = |source| ConfigError::Registry {
            schema: self.name.clone(),
            source,
        };

        let mut builder = Schema::builder(self.name.clone());
        if let Some(parent) = &self.parent {
            builder = builder.parent(&registry.schema(parent).map_err(lookup_err)?);
        }
        if let Some(meta) = &self.meta {
            builder = builder.meta(meta.to_meta(registry).map_err(lookup_err)?);
        }
        for (name, field) in &self.fields {
            builder = builder.field(name.clone(), field.to_field(registry).map_err(lookup_err)?);
        }

        Ok(builder.build()?)
    }
}

impl MetaConfig {
    pub fn to_meta(&self, registry: &Registry) -> Result<Meta, RegistryError> {
        let mut meta = Meta {
            fields: self.fields.clone(),
            exclude: self.exclude.clone(),
            model_fields_kwargs: self.model_fields_kwargs.clone(),
            unknown: self.unknown,
            ..Meta::default()
        };
        if let Some(model) = &self.model {
            meta.model = Some(registry.model(model)?);
        }
        if let Some(converter) = &self.model_converter {
            meta.model_converter = Some(registry.converter(converter)?);
        }
        Ok(meta)
    }
}

impl FieldConfig {
    pub fn to_field(&self, registry: &Registry) -> Result<Field, RegistryError> {
        let kind = match &self.kind {
            FieldTypeConfig::String => FieldType::String,
            FieldTypeConfig::Integer => FieldType::Integer,
            FieldTypeConfig::Float => FieldType::Float,
            FieldTypeConfig::Decimal => FieldType::Decimal,
            FieldTypeConfig::Boolean => FieldType::Boolean,
            FieldTypeConfig::DateTime => FieldType::DateTime,
            FieldTypeConfig::Email => FieldType::Email,
            FieldTypeConfig::Url => FieldType::Url,
            FieldTypeConfig::ObjectId => FieldType::ObjectId,
            FieldTypeConfig::Reference { document } => FieldType::Reference {
                document: document.clone(),
            },
            FieldTypeConfig::List { item } => FieldType::List(Box::new(item.to_field(registry)?)),
            FieldTypeConfig::Dict => FieldType::Dict,
            FieldTypeConfig::Nested { schema } => FieldType::Nested(registry.schema(schema)?),
            FieldTypeConfig::Raw => FieldType::Raw,
        };

        let mut field = Field::new(kind);
        field.apply_kwargs(&self.options);
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ModelConverter;
    use crate::test_utils::{Person, address_model};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
    {
        "schemas": [
            {
                "name": "PersonSchema",
                "meta": {
                    "model": "Person",
                    "model_converter": "standard",
                    "model_fields_kwargs": { "age": { "required": false } }
                }
            },
            {
                "name": "PublicPersonSchema",
                "parent": "PersonSchema",
                "fields": {
                    "age": { "type": "integer", "options": { "load_only": true } },
                    "emails": { "type": "list", "item": { "type": "email" } }
                }
            }
        ]
    }
    "#;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_document::<Person>().unwrap();
        registry
            .register_converter("standard", Arc::new(ModelConverter))
            .unwrap();
        registry
    }

    #[test]
    fn test_build_schemas_from_str() {
        let mut registry = registry();
        let config = SchemaConfigFile::from_json_str(CONFIG).unwrap();
        let built = config.build_schemas(&mut registry).unwrap();
        assert_eq!(built.len(), 2);
        assert_eq!(
            registry.schema_names().collect::<Vec<_>>(),
            vec!["PersonSchema", "PublicPersonSchema"]
        );

        let person = registry.schema("PersonSchema").unwrap();
        assert!(!person.fields()["age"].options.required);

        let public = registry.schema("PublicPersonSchema").unwrap();
        assert!(public.fields()["age"].options.load_only);
        assert_eq!(public.fields()["emails"], Field::list(Field::email()));
        assert_eq!(public.model().unwrap().name(), "Person");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = SchemaConfigFile::load(file.path()).unwrap();
        assert_eq!(config.schemas.len(), 2);
        assert_eq!(config.schemas[1].parent.as_deref(), Some("PersonSchema"));
    }

    #[test]
    fn test_load_default_file_name_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), CONFIG).unwrap();

        let config = SchemaConfigFile::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.schemas[0].name, "PersonSchema");

        let empty = tempfile::tempdir().unwrap();
        let result = SchemaConfigFile::load_from_dir(empty.path());
        assert!(matches!(
            result,
            Err(ConfigError::NotFound { path }) if path.ends_with(DEFAULT_CONFIG_FILE)
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected_at_parse() {
        let result = SchemaConfigFile::from_json_str(
            r#"{"schemas": [{"name": "S", "fields": {
                "code": {"type": "string", "options": {"validate": [{"type": "regexp", "pattern": "("}]}}
            }}]}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = SchemaConfigFile::load(Path::new("/nonexistent/model_schema.json"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = SchemaConfigFile::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_model_name() {
        let mut registry = Registry::new();
        let config = SchemaConfigFile::from_json_str(
            r#"{"schemas": [{"name": "S", "meta": {"model": "Ghost"}}]}"#,
        )
        .unwrap();
        let err = config.build_schemas(&mut registry).unwrap_err();
        match err {
            ConfigError::Registry { schema, source } => {
                assert_eq!(schema, "S");
                assert_eq!(
                    source,
                    RegistryError::NotFound {
                        kind: "Model",
                        name: "Ghost".to_string()
                    }
                );
            }
            other => panic!("Expected Registry error, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_field_by_schema_name() {
        let mut registry = Registry::new();
        registry.register_model(address_model()).unwrap();
        let config = SchemaConfigFile::from_json_str(
            r#"{"schemas": [
                {"name": "AddressSchema", "meta": {"model": "Address"}},
                {"name": "Contact", "fields": {
                    "home": {"type": "nested", "schema": "AddressSchema", "options": {"required": true}}
                }}
            ]}"#,
        )
        .unwrap();
        config.build_schemas(&mut registry).unwrap();

        let contact = registry.schema("Contact").unwrap();
        let errors = contact.validate(&json!({"home": {"street": "Main"}}));
        assert!(errors.contains_key("home.city"));
    }

    #[test]
    fn test_unknown_meta_key_rejected() {
        let result = SchemaConfigFile::from_json_str(
            r#"{"schemas": [{"name": "S", "meta": {"modle": "Person"}}]}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
