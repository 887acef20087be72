//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("commands.prefix must not be empty")]
    EmptyPrefix,
    #[error("commands.separators must not be empty")]
    NoSeparators,
    #[error("commands.separators entries must be exactly one character, got {0:?}")]
    MultiCharSeparator(String),
    #[error("commands.prefix must not start with a separator, got {0:?}")]
    PrefixStartsWithSeparator(String),
    #[error("directory.{table} has duplicate id '{id}'")]
    DuplicateSeedId { table: &'static str, id: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let commands = &config.commands;

    if commands.prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    }

    if commands.separators.is_empty() {
        errors.push(ValidationError::NoSeparators);
    }
    let mut separators = Vec::new();
    for sep in &commands.separators {
        let mut chars = sep.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => separators.push(c),
            _ => errors.push(ValidationError::MultiCharSeparator(sep.clone())),
        }
    }

    if let Some(first) = commands.prefix.chars().next()
        && separators.contains(&first)
    {
        errors.push(ValidationError::PrefixStartsWithSeparator(
            commands.prefix.clone(),
        ));
    }

    let directory = &config.directory;
    check_unique("members", directory.members.iter().map(|m| m.id.as_str()), &mut errors);
    check_unique("roles", directory.roles.iter().map(|r| r.id.as_str()), &mut errors);
    check_unique("channels", directory.channels.iter().map(|c| c.id.as_str()), &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique<'a>(
    table: &'static str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateSeedId {
                table,
                id: id.to_string(),
            });
        }
    }
}
