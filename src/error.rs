//! Error types for graph construction, asset loading and theming.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort scene construction.
///
/// No partial graph is ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The descriptor does not have one of the accepted shapes, or is missing
    /// required fields.
    #[error("malformed resource descriptor: {0}")]
    DataIntegrity(String),

    /// An edge names a resource that is not in the node registry.
    #[error("edge {tail} -> {head} references unknown resource {missing}")]
    UnresolvedEndpoint {
        tail: String,
        head: String,
        missing: String,
    },

    #[error("failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::DataIntegrity(err.to_string())
    }
}

/// Failure to load a single icon texture. Recovered by the graph builder.
#[derive(Error, Debug)]
pub enum AssetLoadError {
    #[error("failed to read icon {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode icon {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("icon {0} is not available")]
    Missing(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}
