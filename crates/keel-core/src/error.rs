//! Core error types.

use crate::EngineId;

/// Errors from manifest resolution and identity validation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The engine ID is invalid.
    #[error("invalid engine id: {0}")]
    InvalidId(String),

    /// The manifest is structurally invalid at the top level.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A specific descriptor in the manifest is invalid.
    #[error("invalid engine entry '{engine_id}': {reason}")]
    InvalidDescriptor {
        /// The offending descriptor's id.
        engine_id: EngineId,
        /// Why the descriptor was rejected.
        reason: String,
    },

    /// Two descriptors in the manifest share an id.
    #[error("duplicate engine entry: {0}")]
    DuplicateDescriptor(EngineId),

    /// Failed to parse the manifest document.
    #[error("manifest parse error: {0}")]
    ManifestParse(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
