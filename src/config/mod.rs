//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: config struct definitions (Config, CommandsConfig, LoggingConfig, ...)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks returning every problem found

pub mod defaults;
mod types;
mod validation;

pub use types::{
    CommandsConfig, Config, ConfigError, DirectoryConfig, LogFormat, LoggingConfig, MemberSeed,
    MetricsConfig, NamedSeed,
};
pub use validation::{ValidationError, validate};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SplitPolicy;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[commands]
prefix = "!"
separators = [" ", ","]
split_policy = "keep_empty"

[logging]
filter = "relaybot=debug"
format = "json"

[metrics]
port = 9100

[directory]
server = "s1"

[[directory.members]]
id = "u1"
name = "alice"
nickname = "Al"
"#
        )
        .unwrap();

        let config = Config::load_validated(file.path()).unwrap();
        assert_eq!(config.commands.prefix, "!");
        assert_eq!(config.commands.split_policy, SplitPolicy::KeepEmpty);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.metrics.port, Some(9100));
        assert_eq!(config.directory.members[0].nickname.as_deref(), Some("Al"));
    }

    #[test]
    fn test_load_reports_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[commands]\nprefix = \"\"").unwrap();
        let err = Config::load_validated(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref errors) if errors.len() == 1));
        assert_eq!(err.to_string(), "invalid config: commands.prefix must not be empty");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/relaybot.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
