//! Router error types.

use keel_core::EngineId;

/// Errors from capability routing.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The capability is already claimed by another engine.
    #[error("capability \"{capability}\" is already registered by engine \"{owner}\"")]
    CapabilityClaimed {
        /// The contested capability name.
        capability: String,
        /// The engine that currently owns it.
        owner: EngineId,
    },

    /// A handler reported a failure while serving a call.
    #[error("{0}")]
    Handler(String),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
