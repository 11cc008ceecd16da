//! Model-backed schemas.
//!
//! A schema definition is declared with [`Schema::builder`]: a name, an
//! optional configuration block ([`Meta`]), an optional parent schema and any
//! hand-written fields. `build` runs once per definition and freezes the
//! result:
//!
//! 1. **Options** - the definition's own `Meta`, or the parent's options
//!    wholesale when it has none.
//! 2. **Derived fields** - the first model found walking from the definition
//!    up through its ancestors is handed to that options' converter.
//! 3. **Explicit fields** - the parent's explicit fields overlaid by the
//!    definition's own. These replace derived fields of the same name.
//! 4. **Restriction** - when the options set `fields`, only those names are
//!    kept, explicit ones included.
//! 5. **Exclusions** - names in `exclude` are dropped.
//!
//! A schema with no model anywhere in its chain is a plain schema: `load`
//! returns the loaded mapping instead of a model instance.

mod dump;
mod load;
mod merge;
mod options;

pub use dump::DumpError;
pub use load::{Instance, LoadError, Loaded, ValidationError};
pub use merge::build_fields;
pub use options::{Meta, SchemaOpts, UnknownPolicy};

use std::iter;
use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::convert::ConvertError;
use crate::fields::{Field, FieldMap};
use crate::model::Model;

/// Schema build error types
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Invalid fields excluded from schema '{schema}': {names:?}")]
    UnknownExclude { schema: String, names: Vec<String> },
}

/// A built schema: immutable field set plus the options it was built from.
#[derive(Debug)]
pub struct Schema {
    name: String,
    opts: SchemaOpts,
    parent: Option<Arc<Schema>>,
    /// Model found along the options chain
    model: Option<Arc<Model>>,
    /// Hand-written fields, merged through the ancestors
    declared_fields: FieldMap,
    fields: FieldMap,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            meta: None,
            parent: None,
            declared: FieldMap::new(),
        }
    }

    /// Schema whose fields were derived from `model` directly, with no
    /// explicit declarations. Used for embedded documents.
    pub(crate) fn derived(model: Arc<Model>, fields: FieldMap) -> Self {
        Self {
            name: model.name().to_string(),
            opts: SchemaOpts::from_meta(&Meta::new().model(Arc::clone(&model))),
            parent: None,
            model: Some(model),
            declared_fields: FieldMap::new(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opts(&self) -> &SchemaOpts {
        &self.opts
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Model instances are built from, if any.
    pub fn model(&self) -> Option<&Arc<Model>> {
        self.model.as_ref()
    }

    /// Final field set.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Explicit declarations only, including inherited ones.
    pub fn declared_fields(&self) -> &FieldMap {
        &self.declared_fields
    }

    /// This schema followed by each ancestor, most-derived first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Schema> {
        iter::successors(Some(self), |schema| schema.parent.as_deref())
    }
}

// Schemas are equal when they expose the same fields under the same name.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

/// Declares one schema definition.
pub struct SchemaBuilder {
    name: String,
    meta: Option<Meta>,
    parent: Option<Arc<Schema>>,
    declared: FieldMap,
}

impl SchemaBuilder {
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn parent(mut self, parent: &Arc<Schema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare an explicit field. Redeclaring a name replaces it.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.declared.insert(name.into(), field);
        self
    }

    /// Resolve options, merge derived and explicit fields and freeze the
    /// schema.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let opts = match (self.meta, &self.parent) {
            (Some(meta), _) => SchemaOpts::from_meta(&meta),
            (None, Some(parent)) => parent.opts.clone(),
            (None, None) => SchemaOpts::default(),
        };

        let mut declared_fields = self
            .parent
            .as_ref()
            .map(|parent| parent.declared_fields.clone())
            .unwrap_or_default();
        declared_fields.extend(self.declared);

        let chain: Vec<&SchemaOpts> = iter::once(&opts)
            .chain(
                self.parent
                    .iter()
                    .flat_map(|parent| parent.ancestors())
                    .map(|schema| &schema.opts),
            )
            .collect();
        let model = chain.iter().find_map(|o| o.model.clone());
        let mut fields = build_fields(chain, &declared_fields)?;

        if let Some(only) = &opts.fields {
            for name in only.iter().filter(|name| !fields.contains_key(name.as_str())) {
                warn!("Schema '{}' lists unknown field '{}'", self.name, name);
            }
            fields.retain(|name, _| only.contains(name));
        }

        let unknown: Vec<String> = opts
            .exclude
            .iter()
            .filter(|name| fields.remove(name.as_str()).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaError::UnknownExclude {
                schema: self.name,
                names: unknown,
            });
        }

        debug!(
            "Built schema '{}' with {} fields (model: {})",
            self.name,
            fields.len(),
            model.as_ref().map_or("none", |m| m.name())
        );

        Ok(Arc::new(Schema {
            name: self.name,
            opts,
            parent: self.parent,
            model,
            declared_fields,
            fields,
        }))
    }
}
