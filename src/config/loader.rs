//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `store.uri`.
pub const DATABASE_URI_ENV: &str = "DATABASE_URI";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(uri) = lookup(DATABASE_URI_ENV).filter(|v| !v.is_empty()) {
        config.store.uri = Some(uri);
    }
}

/// Validate a fully assembled configuration.
pub fn finish(config: ServiceConfig) -> Result<ServiceConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_uri_overrides_file_value() {
        let mut config = ServiceConfig::default();
        config.store.uri = Some("mongodb://file:27017".into());

        apply_env_overrides(&mut config, |key| {
            (key == DATABASE_URI_ENV).then(|| "mongodb://env:27017".to_string())
        });
        assert_eq!(config.store.uri.as_deref(), Some("mongodb://env:27017"));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.store.uri, None);
    }

    #[test]
    fn validation_errors_are_listed() {
        let err = finish(ServiceConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: store.uri"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config(Path::new("/nonexistent/book-inventory.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
