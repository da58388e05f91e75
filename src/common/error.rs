use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("invalid config in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// A single platform request that went wrong. Never fatal on its own.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unparseable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode posts: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
#[error("console output failed: {0}")]
pub struct OutputError(#[from] pub std::io::Error);
