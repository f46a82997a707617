//! Error types for config loading and snapshot decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the exporter config. All of them are fatal
/// at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid nextcloud_url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),

    #[error("invalid listen address {0:?}")]
    InvalidListen(String),
}

/// A serverinfo document that could not be decoded into a snapshot.
///
/// `message` is the serde message, which names the raw offending value.
/// `field` is the JSON key closest to the failure position, when one exists.
#[derive(Debug, Error)]
#[error("{}", describe(.field, .message, *.line, *.column))]
pub struct DecodeError {
    pub field: Option<String>,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

fn describe(field: &Option<String>, message: &str, line: usize, column: usize) -> String {
    match field {
        Some(field) => format!("decode field {field:?}: {message} (line {line}, column {column})"),
        None => format!("decode serverinfo: {message} (line {line}, column {column})"),
    }
}
