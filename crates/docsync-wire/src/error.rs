//! Error types.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while encoding or decoding wire messages.
pub enum WireError {
    #[error("JSON error: {0}")]
    /// JSON encoding or decoding failed.
    Json(#[from] serde_json::Error),

    #[error("unknown marker kind: {0}")]
    /// A marker carried a kind name this version does not know.
    UnknownMarkerKind(String),

    #[error("unknown annotation severity: {0}")]
    /// An annotation carried a severity name this version does not know.
    UnknownSeverity(String),
}
