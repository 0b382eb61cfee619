//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{AccessFilterConfig, FilterConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Toml(e) => write!(f, "Parse error: {}", e),
            ConfigError::Json(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, or JSON when the extension is `.json`.
pub fn load_config(path: &Path) -> Result<AccessFilterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        parse_json(&content)?
    } else {
        parse_toml(&content)?
    };

    validate_config(&config.filter).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Top-level sections of the full configuration file.
const SECTIONS: [&str; 2] = ["filter", "observability"];

/// A non-empty document with none of the top-level sections is a flat plugin
/// configuration (`{"disallowedIPs": [...], ...}`) and maps onto `filter`.
fn is_plugin_shape<'a>(keys: impl Iterator<Item = &'a String>) -> bool {
    let mut keys = keys.peekable();
    keys.peek().is_some() && keys.all(|key| !SECTIONS.contains(&key.as_str()))
}

/// Parse a TOML document without validating it.
pub fn parse_toml(content: &str) -> Result<AccessFilterConfig, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(ConfigError::Toml)?;

    if is_plugin_shape(table.keys()) {
        let filter: FilterConfig = toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::Toml)?;
        return Ok(AccessFilterConfig {
            filter,
            ..AccessFilterConfig::default()
        });
    }

    toml::Value::Table(table)
        .try_into()
        .map_err(ConfigError::Toml)
}

/// Parse a JSON document without validating it.
pub fn parse_json(content: &str) -> Result<AccessFilterConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(ConfigError::Json)?;

    let flat = matches!(&value, serde_json::Value::Object(map) if is_plugin_shape(map.keys()));

    if flat {
        let filter: FilterConfig = serde_json::from_value(value).map_err(ConfigError::Json)?;
        return Ok(AccessFilterConfig {
            filter,
            ..AccessFilterConfig::default()
        });
    }

    serde_json::from_value(value).map_err(ConfigError::Json)
}
