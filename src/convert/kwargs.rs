//! Per-field keyword overrides for derived fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{Field, Validator};

/// Field name → overrides.
pub type FieldsKwargs = BTreeMap<String, FieldKwargs>;

/// Overrides applied to one derived field.
///
/// Unset entries leave the derived value alone. `validate` is appended to the
/// validators the converter derived from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldKwargs {
    pub required: Option<bool>,
    pub allow_none: Option<bool>,
    pub load_only: Option<bool>,
    pub dump_only: Option<bool>,
    pub missing: Option<Value>,
    pub data_key: Option<String>,
    pub validate: Vec<Validator>,
}

impl FieldKwargs {
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = Some(allow_none);
        self
    }

    pub fn load_only(mut self, load_only: bool) -> Self {
        self.load_only = Some(load_only);
        self
    }

    pub fn dump_only(mut self, dump_only: bool) -> Self {
        self.dump_only = Some(dump_only);
        self
    }

    pub fn missing(mut self, value: Value) -> Self {
        self.missing = Some(value);
        self
    }

    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate.push(validator);
        self
    }
}

impl Field {
    /// Apply keyword overrides in place.
    pub fn apply_kwargs(&mut self, kwargs: &FieldKwargs) {
        let options = &mut self.options;
        if let Some(required) = kwargs.required {
            options.required = required;
        }
        if let Some(allow_none) = kwargs.allow_none {
            options.allow_none = allow_none;
        }
        if let Some(load_only) = kwargs.load_only {
            options.load_only = load_only;
        }
        if let Some(dump_only) = kwargs.dump_only {
            options.dump_only = dump_only;
        }
        if let Some(missing) = &kwargs.missing {
            options.missing = Some(missing.clone());
        }
        if let Some(data_key) = &kwargs.data_key {
            options.data_key = Some(data_key.clone());
        }
        options.validators.extend(kwargs.validate.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_overrides_only_set_entries() {
        let mut field = Field::string().required().validate(Validator::Length {
            min: None,
            max: Some(10),
        });
        field.apply_kwargs(
            &FieldKwargs::default()
                .load_only(true)
                .validate(Validator::regexp("^a").unwrap()),
        );

        assert!(field.options.required);
        assert!(field.options.load_only);
        assert!(!field.options.dump_only);
        assert_eq!(field.options.validators.len(), 2);
    }

    #[test]
    fn test_apply_can_relax_required() {
        let mut field = Field::integer().required();
        field.apply_kwargs(&FieldKwargs::default().required(false).missing(json!(0)));
        assert!(!field.options.required);
        assert_eq!(field.options.missing, Some(json!(0)));
    }

    #[test]
    fn test_json_form_rejects_unknown_keys() {
        let kwargs: FieldKwargs =
            serde_json::from_value(json!({"required": true, "data_key": "n"})).unwrap();
        assert_eq!(kwargs.required, Some(true));
        assert_eq!(kwargs.data_key.as_deref(), Some("n"));

        let result: Result<FieldKwargs, _> = serde_json::from_value(json!({"requird": true}));
        assert!(result.is_err());
    }
}
