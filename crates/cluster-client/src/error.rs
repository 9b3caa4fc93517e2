//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API
///
/// HTTP status codes the controller reacts to (conflict on create, expired
/// watch cursor) are lifted into their own variants here so callers match on
/// types, never on status codes.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// An object with the same name already exists (create conflict)
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The requested object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The watch cursor is too old for the platform to resume from
    #[error("watch cursor expired: {0}")]
    CursorExpired(String),

    /// An object returned by the API is missing required metadata
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// The watch stream failed
    #[error("watch stream error: {0}")]
    Watch(String),

    /// Any other Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
}
