//! Error types for remote calls and configuration.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single request against the kwork REST store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Server answered with a non-success status
    #[error("server returned status {0}")]
    Status(u16),

    /// Connection refused, DNS, timeout and friends
    #[error("{0}")]
    Transport(String),

    /// Response body was not the JSON we expected
    #[error("invalid response body: {0}")]
    Decode(#[source] io::Error),
}

impl From<ureq::Error> for StoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => StoreError::Status(code),
            ureq::Error::Transport(transport) => StoreError::Transport(transport.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}
