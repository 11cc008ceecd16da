//! model_schema library - schemas derived from document models
//!
//! Builds serialization/validation schemas whose fields are derived from
//! document model definitions, so a model does not need a hand-written
//! parallel schema. Hand-written fields overlay the derived ones, and a schema
//! with a model loads input straight into a model instance.
//!
//! ```ignore
//! let schema = Schema::builder("UserSchema")
//!     .meta(Meta::new().model(Model::of::<User>()))
//!     .field("email", Field::email().required())
//!     .build()?;
//! let user: User = schema.load_into(&input)?;
//! ```

pub mod config;
pub mod convert;
pub mod fields;
pub mod model;
pub mod registry;
pub mod schema;

pub use convert::{ConvertError, Converter, FieldKwargs, FieldsKwargs, ModelConverter};
pub use fields::{Field, FieldMap, FieldType, Pattern, Validator};
pub use model::{Document, Model, ModelField, ModelFieldKind};
pub use registry::Registry;
pub use schema::{Loaded, Meta, Schema, SchemaError, SchemaOpts, UnknownPolicy};

#[cfg(test)]
pub mod test_utils;
