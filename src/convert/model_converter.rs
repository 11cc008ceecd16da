//! Standard model converter.

use std::sync::Arc;

use log::{trace, warn};

use super::{ConvertError, Converter, FieldsKwargs};
use crate::fields::{Field, FieldMap, FieldType, Pattern, Validator};
use crate::model::{Model, ModelField, ModelFieldKind};
use crate::schema::Schema;

/// Converts model fields using the standard type mapping.
///
/// | ModelFieldKind | FieldType |
/// |----------------|-----------|
/// | ObjectId | ObjectId |
/// | String | String |
/// | Url / Email | Url / Email |
/// | Int / Sequence | Integer |
/// | Float / Decimal | Float / Decimal |
/// | Boolean / DateTime | Boolean / DateTime |
/// | Dynamic | Raw |
/// | Dict | Dict |
/// | List(k) | List(convert k) |
/// | EmbeddedDocument(m) | Nested(schema derived from m) |
/// | Reference(d) | Reference(d) |
/// | File / Image / Point | unsupported |
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelConverter;

impl ModelConverter {
    /// Convert a single model field, without keyword overrides.
    pub fn convert_field(&self, model: &Model, field: &ModelField) -> Result<Field, ConvertError> {
        let kind = self.convert_kind(model, field, &field.kind)?;
        let mut converted = Field::new(kind);

        // Generated values are never accepted on load
        let generated = matches!(field.kind, ModelFieldKind::Sequence)
            || (field.primary_key && matches!(field.kind, ModelFieldKind::ObjectId));

        let options = &mut converted.options;
        if generated {
            options.dump_only = true;
        } else {
            options.required = field.required && field.default.is_none();
            options.missing = field.default.clone();
        }
        options.allow_none = !field.required;
        options.validators = self.validators_for(model, field)?;

        Ok(converted)
    }

    fn convert_kind(
        &self,
        model: &Model,
        field: &ModelField,
        kind: &ModelFieldKind,
    ) -> Result<FieldType, ConvertError> {
        let converted = match kind {
            ModelFieldKind::ObjectId => FieldType::ObjectId,
            ModelFieldKind::String => FieldType::String,
            ModelFieldKind::Url => FieldType::Url,
            ModelFieldKind::Email => FieldType::Email,
            ModelFieldKind::Int | ModelFieldKind::Sequence => FieldType::Integer,
            ModelFieldKind::Float => FieldType::Float,
            ModelFieldKind::Decimal => FieldType::Decimal,
            ModelFieldKind::Boolean => FieldType::Boolean,
            ModelFieldKind::DateTime => FieldType::DateTime,
            ModelFieldKind::Dynamic => FieldType::Raw,
            ModelFieldKind::Dict => FieldType::Dict,
            ModelFieldKind::List(inner) => {
                let inner = self.convert_kind(model, field, inner)?;
                FieldType::List(Box::new(Field::new(inner)))
            }
            ModelFieldKind::EmbeddedDocument(embedded) => {
                let fields = self.fields_for_model(embedded, None, &FieldsKwargs::new())?;
                FieldType::Nested(Arc::new(Schema::derived(Arc::clone(embedded), fields)))
            }
            ModelFieldKind::Reference(document) => FieldType::Reference {
                document: document.clone(),
            },
            ModelFieldKind::File | ModelFieldKind::Image | ModelFieldKind::Point => {
                return Err(ConvertError::UnsupportedField {
                    model: model.name().to_string(),
                    field: field.name.clone(),
                    kind: kind.to_string(),
                });
            }
        };
        Ok(converted)
    }

    fn validators_for(
        &self,
        model: &Model,
        field: &ModelField,
    ) -> Result<Vec<Validator>, ConvertError> {
        let mut validators = Vec::new();

        if let Some(choices) = &field.choices {
            validators.push(Validator::OneOf {
                choices: choices.clone(),
            });
        }
        if field.min_length.is_some() || field.max_length.is_some() {
            validators.push(Validator::Length {
                min: field.min_length,
                max: field.max_length,
            });
        }
        if field.min_value.is_some() || field.max_value.is_some() {
            validators.push(Validator::Range {
                min: field.min_value,
                max: field.max_value,
            });
        }
        if let Some(pattern) = &field.regex {
            let pattern = Pattern::new(pattern).map_err(|e| ConvertError::InvalidField {
                model: model.name().to_string(),
                field: field.name.clone(),
                message: format!("invalid regex '{}': {}", pattern, e),
            })?;
            validators.push(Validator::Regexp { pattern });
        }

        Ok(validators)
    }
}

impl Converter for ModelConverter {
    fn fields_for_model(
        &self,
        model: &Model,
        fields: Option<&[String]>,
        fields_kwargs: &FieldsKwargs,
    ) -> Result<FieldMap, ConvertError> {
        if let Some(only) = fields {
            for name in only.iter().filter(|n| model.get_field(n).is_none()) {
                warn!("Model '{}' has no field '{}' to include", model.name(), name);
            }
        }
        for name in fields_kwargs.keys().filter(|n| model.get_field(n).is_none()) {
            warn!("Ignoring kwargs for unknown field '{}' of model '{}'", name, model.name());
        }

        let mut converted = FieldMap::new();
        for field in model.fields() {
            if let Some(only) = fields {
                if !only.iter().any(|n| *n == field.name) {
                    continue;
                }
            }

            let mut declaration = self.convert_field(model, field)?;
            if let Some(kwargs) = fields_kwargs.get(&field.name) {
                declaration.apply_kwargs(kwargs);
            }
            trace!(
                "{}.{}: {} -> {}",
                model.name(),
                field.name,
                field.kind,
                declaration.kind.type_name()
            );
            converted.insert(field.name.clone(), declaration);
        }

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::FieldKwargs;
    use crate::test_utils::{address_model, article_model};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ModelFieldKind::String, FieldType::String)]
    #[case(ModelFieldKind::Int, FieldType::Integer)]
    #[case(ModelFieldKind::Float, FieldType::Float)]
    #[case(ModelFieldKind::Decimal, FieldType::Decimal)]
    #[case(ModelFieldKind::Boolean, FieldType::Boolean)]
    #[case(ModelFieldKind::DateTime, FieldType::DateTime)]
    #[case(ModelFieldKind::Email, FieldType::Email)]
    #[case(ModelFieldKind::Url, FieldType::Url)]
    #[case(ModelFieldKind::ObjectId, FieldType::ObjectId)]
    #[case(ModelFieldKind::Dynamic, FieldType::Raw)]
    #[case(ModelFieldKind::Dict, FieldType::Dict)]
    fn test_scalar_mapping(#[case] kind: ModelFieldKind, #[case] expected: FieldType) {
        let model = Model::new("M").field(ModelField::new("f", kind));
        let fields = ModelConverter
            .fields_for_model(&model, None, &FieldsKwargs::new())
            .unwrap();
        assert_eq!(fields["f"].kind, expected);
    }

    #[rstest]
    #[case(ModelFieldKind::File)]
    #[case(ModelFieldKind::Image)]
    #[case(ModelFieldKind::Point)]
    fn test_unsupported_kinds_fail(#[case] kind: ModelFieldKind) {
        let model = Model::new("Upload").field(ModelField::new("blob", kind));
        let err = ModelConverter
            .fields_for_model(&model, None, &FieldsKwargs::new())
            .unwrap_err();
        match err {
            ConvertError::UnsupportedField { model, field, .. } => {
                assert_eq!(model, "Upload");
                assert_eq!(field, "blob");
            }
            other => panic!("Expected UnsupportedField, got {:?}", other),
        }
    }

    #[test]
    fn test_required_and_default() {
        let model = Model::new("M")
            .field(ModelField::string("a").required())
            .field(ModelField::string("b").required().default(json!("x")))
            .field(ModelField::string("c"));
        let fields = ModelConverter
            .fields_for_model(&model, None, &FieldsKwargs::new())
            .unwrap();

        assert!(fields["a"].options.required);
        assert!(!fields["a"].options.allow_none);

        assert!(!fields["b"].options.required);
        assert_eq!(fields["b"].options.missing, Some(json!("x")));

        assert!(!fields["c"].options.required);
        assert!(fields["c"].options.allow_none);
    }

    #[test]
    fn test_generated_fields_are_dump_only() {
        let model = Model::new("M")
            .field(ModelField::object_id("id").primary_key())
            .field(ModelField::new("counter", ModelFieldKind::Sequence))
            .field(ModelField::object_id("owner"));
        let fields = ModelConverter
            .fields_for_model(&model, None, &FieldsKwargs::new())
            .unwrap();

        assert!(fields["id"].options.dump_only);
        assert!(fields["counter"].options.dump_only);
        assert_eq!(fields["counter"].kind, FieldType::Integer);
        assert!(!fields["owner"].options.dump_only);
    }

    #[test]
    fn test_constraints_become_validators() {
        let fields = ModelConverter
            .fields_for_model(&article_model(), None, &FieldsKwargs::new())
            .unwrap();

        let status = &fields["status"].options.validators;
        assert_eq!(
            status,
            &vec![Validator::OneOf {
                choices: vec![json!("draft"), json!("published")]
            }]
        );

        let title = &fields["title"].options.validators;
        assert!(title.contains(&Validator::Length {
            min: Some(1),
            max: Some(200)
        }));
    }

    #[test]
    fn test_invalid_model_regex() {
        let model = Model::new("M").field(ModelField::string("code").regex("("));
        let err = ModelConverter
            .fields_for_model(&model, None, &FieldsKwargs::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidField { .. }));
    }

    #[test]
    fn test_list_and_embedded() {
        let fields = ModelConverter
            .fields_for_model(&article_model(), None, &FieldsKwargs::new())
            .unwrap();

        assert_eq!(
            fields["tags"].kind,
            FieldType::List(Box::new(Field::string()))
        );

        let FieldType::Nested(schema) = &fields["address"].kind else {
            panic!("Expected nested schema for embedded document");
        };
        assert_eq!(schema.name(), "Address");
        let city = &schema.fields()["city"];
        assert!(city.options.required);

        assert_eq!(
            fields["author"].kind,
            FieldType::Reference {
                document: "Person".to_string()
            }
        );
    }

    #[test]
    fn test_restriction_list() {
        let only = vec!["title".to_string(), "status".to_string()];
        let fields = ModelConverter
            .fields_for_model(&article_model(), Some(&only), &FieldsKwargs::new())
            .unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["status", "title"]);
    }

    #[test]
    fn test_kwargs_override_derived() {
        let mut kwargs = FieldsKwargs::new();
        kwargs.insert("city".to_string(), FieldKwargs::default().required(false));
        kwargs.insert("nonexistent".to_string(), FieldKwargs::default().load_only(true));

        let fields = ModelConverter
            .fields_for_model(&address_model(), None, &kwargs)
            .unwrap();
        assert!(!fields["city"].options.required);
        assert!(!fields.contains_key("nonexistent"));
    }
}
