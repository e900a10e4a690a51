//! Error types for configuration loading, document synthesis and output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while synthesizing a document from a configuration.
///
/// Every variant aborts the whole generation pass; no partial document is
/// returned.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid operation \"{token}\": expected a token starting with a lowercase verb")]
    InvalidOperation { token: String },

    #[error(
        "unexpected operation \"{token}\": expected one of get, getById, post, patchById, deleteById"
    )]
    UnexpectedOperation { token: String },

    #[error("cannot build a request body for operation \"{operation}\": expected post or patchById")]
    InvalidBodyType { operation: String },

    #[error("duplicate {section} component \"{name}\"")]
    DuplicateComponent { section: &'static str, name: String },

    #[error("duplicate operation {method} {path}")]
    DuplicateOperation { path: String, method: String },
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading and validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration meta-schema: {message}")]
    InvalidMetaSchema { message: String },

    #[error("cannot read configuration: {source}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
    },

    // Validation errors (exit code 1)
    #[error("configuration is invalid ({} error(s))", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::FileNotFound { .. } | ConfigError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ConfigError::NetworkError { .. } => 3,
            ConfigError::Invalid { .. } => 1,
            _ => 2,
        }
    }
}

/// Errors while rendering or writing a generated document.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot serialize document as JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize document as YAML: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            OutputError::Write { .. } => 3,
            _ => 2,
        }
    }
}

/// Single configuration violation with path context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the offending value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
