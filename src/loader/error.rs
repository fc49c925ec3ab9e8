//! Errors raised while loading resources.

use thiserror::Error;

use crate::fetch::FetchError;

/// Failure to turn a resource path into a JSON value.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The request could not be completed
    #[error("Failed to load {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
    /// The server answered with a non-success status
    #[error("Failed to load {path} ({status})")]
    Status { path: String, status: u16 },
    /// The body is not valid JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The path template needs a language and none was given
    #[error("Path template {path} requires a language")]
    MissingLanguage { path: String },
}

impl LoadError {
    /// Resource path the error refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Fetch { path, .. }
            | Self::Status { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingLanguage { path } => path,
        }
    }
}
