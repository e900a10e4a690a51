//! Configuration loading from files, strings and HTTP URLs.
//!
//! Every source goes through the same pipeline: parse (JSON or YAML),
//! check against the meta-schema, then deserialize into a [`Configuration`].

use std::path::Path;

use serde_json::Value;

use crate::config::Configuration;
use crate::error::ConfigError;
use crate::validator::validate_config;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Serialization format of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension. `.yaml` and `.yml` are YAML,
    /// everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }

    /// Like [`ConfigFormat::from_path`], for a URL or path string.
    /// Query strings and fragments are ignored.
    pub fn from_source(source: &str) -> Self {
        let end = source.find(['?', '#']).unwrap_or(source.len());
        Self::from_path(Path::new(&source[..end]))
    }

    fn parse(self, content: &str) -> Result<Value, ConfigError> {
        match self {
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|source| ConfigError::InvalidJson { source })
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|source| ConfigError::InvalidYaml { source })
            }
        }
    }
}

/// Load a configuration from a file path.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if the file doesn't exist,
/// a parse error if it isn't valid JSON/YAML, or `ConfigError::Invalid`
/// if it doesn't describe a valid configuration.
pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "loaded configuration file");
    load_config_str(&content, ConfigFormat::from_path(path))
}

/// Load a configuration from a string in the given format.
///
/// # Errors
///
/// Returns a parse error if the content isn't valid in `format`, or
/// `ConfigError::Invalid` if it doesn't describe a valid configuration.
pub fn load_config_str(content: &str, format: ConfigFormat) -> Result<Configuration, ConfigError> {
    let value = format.parse(content)?;
    config_from_value(value)
}

/// Load a configuration from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default). The format follows
/// the URL's extension.
///
/// # Errors
///
/// Returns `ConfigError::NetworkError` if the request fails or the server
/// answers with an error status.
#[cfg(feature = "remote")]
pub fn load_config_url(url: &str) -> Result<Configuration, ConfigError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| ConfigError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| ConfigError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Check for HTTP errors before parsing
    let response = response
        .error_for_status()
        .map_err(|source| ConfigError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let content = response
        .text()
        .map_err(|source| ConfigError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!(%url, "fetched remote configuration");
    load_config_str(&content, ConfigFormat::from_source(url))
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a configuration from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_config_auto(source: &str) -> Result<Configuration, ConfigError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_config_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ConfigError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_config(Path::new(source))
    }
}

/// Validate an already-parsed document and turn it into a [`Configuration`].
///
/// # Errors
///
/// Returns `ConfigError::Invalid` with every meta-schema violation.
pub fn config_from_value(value: Value) -> Result<Configuration, ConfigError> {
    validate_config(&value)?;
    serde_json::from_value(value).map_err(|source| ConfigError::Deserialize { source })
}
