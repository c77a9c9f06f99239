//! Error types for library retrieval

use thiserror::Error;

/// Errors that can occur while retrieving the manifest or a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("{path}: server responded with status {status}")]
    Status { status: u16, path: String },

    /// The request never produced a response.
    #[error("{path}: network error: {message}")]
    Network { path: String, message: String },

    /// Reading from a local library failed.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The manifest payload is not valid JSON of the expected shape.
    #[error("malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
