//! Argument conversion pipeline.
//!
//! Applies a candidate's converters left to right over a single cursor into
//! the argument text. The candidate matches only if every converter succeeds
//! and no text is left over.

use super::argument::ArgumentSpec;
use super::arguments::{Argument, Arguments};
use super::configuration::Configuration;
use super::converter::ConvertContext;
use super::failure::FailedArgument;
use super::prefetch::KnownEntities;
use crate::error::ConvertError;
use tracing::trace;

/// Convert `text` into arguments for `specs`.
pub fn convert_arguments(
    specs: &[ArgumentSpec],
    text: &str,
    config: &Configuration,
    known: &KnownEntities,
) -> Result<Arguments, FailedArgument> {
    let mut remaining = text;
    let mut arguments = Arguments::empty();

    for (position, spec) in specs.iter().enumerate() {
        let failed = |error: ConvertError| FailedArgument {
            position,
            argument: Some(spec.name().to_string()),
            type_name: Some(spec.type_key().short_name()),
            error,
        };

        let converter = config
            .converters()
            .get(&spec.type_key())
            .ok_or_else(|| failed(ConvertError::NoConverter(spec.type_key().name())))?;
        let cx = ConvertContext {
            spec,
            tokenizer: config.tokenizer(),
            known,
        };

        let converted = converter.convert(remaining, &cx).map_err(|e| {
            trace!(argument = spec.name(), error = %e, "Conversion failed");
            failed(e)
        })?;
        arguments.push(Argument::new(spec.name(), converted.consumed, converted.value));
        remaining = converted.remaining;
    }

    if !remaining.is_empty() {
        return Err(FailedArgument {
            position: specs.len(),
            argument: None,
            type_name: None,
            error: ConvertError::Leftover(remaining.to_string()),
        });
    }
    Ok(arguments)
}
