//! Derived/explicit field merging.

use log::debug;

use super::SchemaOpts;
use crate::convert::ConvertError;
use crate::fields::FieldMap;

/// Build the final field set of a schema definition.
///
/// `chain` yields the definition's own options first, then each ancestor's
/// options up to the most-base schema. The first options value with a model
/// decides derivation: its converter is called with its model, restriction
/// list and per-field overrides. Later models in the chain are ignored.
///
/// `explicit` holds the hand-written declarations, already merged through
/// the ancestor chain. Each explicit entry replaces a derived entry of the
/// same name.
pub fn build_fields<'a, I>(chain: I, explicit: &FieldMap) -> Result<FieldMap, ConvertError>
where
    I: IntoIterator<Item = &'a SchemaOpts>,
{
    let source = chain
        .into_iter()
        .find_map(|opts| opts.model.as_ref().map(|model| (opts, model)));

    let mut fields = match source {
        Some((opts, model)) => {
            debug!(
                "Deriving fields from model '{}' with {:?}",
                model.name(),
                opts.model_converter
            );
            opts.model_converter.fields_for_model(
                model,
                opts.fields.as_deref(),
                &opts.model_fields_kwargs,
            )?
        }
        None => FieldMap::new(),
    };

    fields.extend(explicit.iter().map(|(name, field)| (name.clone(), field.clone())));

    Ok(fields)
}
