//! Error types for scene builds.

use thiserror::Error;

/// Errors a scene build can surface.
///
/// Degraded-scene conditions (unresolvable references, reference cycles)
/// are absorbed where they are detected and never reach the caller; only
/// cancellation and a missing root model do.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The caller requested cancellation through the progress callback.
    #[error("scene build cancelled")]
    Cancelled,

    /// The requested root model is not in the document.
    #[error("root model `{0}` not found in document")]
    UnknownModel(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
