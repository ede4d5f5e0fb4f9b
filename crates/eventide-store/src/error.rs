//! Error types for the persistence layer.

/// Errors surfaced by a storage backend.
///
/// These never reach lifecycle callers; the writer logs them and probes
/// backend health. In-memory state is the source of truth regardless.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend's underlying medium failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is not in a usable state.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
