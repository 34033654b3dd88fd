//! Configuration loading from disk and environment.

use secrecy::SecretString;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "RELAY_CONFIG";

/// Environment variable overriding the listener port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable holding the upstream API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid {var} value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the effective configuration: optional file, then environment overrides.
///
/// `lookup` resolves environment variables; the binary passes `std::env::var`.
pub fn load_with_overrides<F>(path: Option<&Path>, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = lookup(PORT_VAR).filter(|p| !p.is_empty()) {
        let parsed = port.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
            var: PORT_VAR,
            value: port.clone(),
        })?;
        config.listener.with_port(parsed);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read the upstream credential. Empty values count as missing.
pub fn load_credential<F>(lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_VAR)
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"127.0.0.1:4000\"\n\n[upstream]\nmodel = \"test-model\""
        )
        .unwrap();

        let config = load_with_overrides(Some(file.path()), lookup_from(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.upstream.model, "test-model");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\nsession_url = \"not a url\"").unwrap();

        let err = load_with_overrides(Some(file.path()), lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("upstream.session_url"));
    }

    #[test]
    fn test_port_override() {
        let config = load_with_overrides(None, lookup_from(&[("PORT", "8123")])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");

        let err = load_with_overrides(None, lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_with_overrides(Some(Path::new("/definitely/missing.toml")), lookup_from(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_credential_loading() {
        let key = load_credential(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(key.expose_secret(), "sk-test");

        assert!(load_credential(lookup_from(&[("OPENAI_API_KEY", "  ")])).is_none());
        assert!(load_credential(lookup_from(&[])).is_none());
    }
}
