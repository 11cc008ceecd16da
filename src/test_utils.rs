//! Shared test models and fixtures.

use std::sync::Arc;

use rstest::fixture;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::{Document, Model, ModelField, ModelFieldKind};
use crate::schema::{Meta, Schema};

/// Two-field document used across tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Person {
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

impl Document for Person {
    fn model() -> Model {
        Model::new("Person")
            .field(ModelField::string("name").required())
            .field(ModelField::int("age").required())
    }
}

pub fn person_model() -> Arc<Model> {
    Model::of::<Person>()
}

/// Embedded document with one required field.
pub fn address_model() -> Arc<Model> {
    Arc::new(
        Model::new("Address")
            .field(ModelField::string("street"))
            .field(ModelField::string("city").required()),
    )
}

/// Model exercising constraints, lists, embedded documents and references.
pub fn article_model() -> Arc<Model> {
    Arc::new(
        Model::new("Article")
            .field(ModelField::object_id("id").primary_key())
            .field(ModelField::string("title").required().length(Some(1), Some(200)))
            .field(ModelField::string("body"))
            .field(
                ModelField::string("status")
                    .default(json!("draft"))
                    .choices(vec![json!("draft"), json!("published")]),
            )
            .field(ModelField::list("tags", ModelFieldKind::String))
            .field(ModelField::embedded("address", address_model()))
            .field(ModelField::reference("author", "Person")),
    )
}

#[fixture]
pub fn person_schema() -> Arc<Schema> {
    Schema::builder("PersonSchema")
        .meta(Meta::new().model(person_model()))
        .build()
        .expect("person schema builds")
}
