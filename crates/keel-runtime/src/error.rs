//! Runtime error types.

use std::fmt;

use keel_core::{CoreError, EngineId};

/// One engine the loader could not make progress on, with the dependency
/// ids that were still unmet when the pass stalled.
#[derive(Debug, Clone)]
pub struct StuckEngine {
    /// The engine that never became loadable.
    pub id: EngineId,
    /// Its dependencies that were never satisfied — disabled, undeclared,
    /// or themselves stuck.
    pub missing: Vec<EngineId>,
}

impl fmt::Display for StuckEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if !self.missing.is_empty() {
            let missing: Vec<&str> = self.missing.iter().map(EngineId::as_str).collect();
            write!(f, " (unmet: {})", missing.join(", "))?;
        }
        Ok(())
    }
}

/// The set of stuck engines from a stalled load pass, in manifest order.
#[derive(Debug, Clone)]
pub struct StuckEngines(pub Vec<StuckEngine>);

impl StuckEngines {
    /// Ids of the stuck engines, in manifest order.
    #[must_use]
    pub fn ids(&self) -> Vec<&EngineId> {
        self.0.iter().map(|s| &s.id).collect()
    }
}

impl fmt::Display for StuckEngines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Errors from engine loading and lifecycle sequencing.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The shared context was initialized twice.
    #[error("shared context already initialized")]
    ContextAlreadyInitialized,

    /// The orchestrator was asked to initialize twice without a reset.
    #[error("runtime already initialized; reset before reinitializing")]
    RuntimeAlreadyInitialized,

    /// An engine instance is already registered under this id.
    #[error("engine '{0}' is already registered in context")]
    DuplicateEngine(EngineId),

    /// The requested engine has no instance in the context registry.
    #[error("engine '{0}' not found in context")]
    EngineNotFound(EngineId),

    /// A load pass made zero progress with engines still remaining. Covers
    /// both circular dependencies and references to disabled or undeclared
    /// engines; the unmet dependency ids carried per engine distinguish the
    /// causes for a reader.
    #[error("cannot resolve dependencies for engines: {stuck}")]
    UnresolvableDependencies {
        /// The engines that never became loadable.
        stuck: StuckEngines,
    },

    /// Engine construction failed; the remaining load passes were aborted.
    #[error("engine construction failed: {engine_id} - {message}")]
    ConstructionFailed {
        /// The engine whose factory call failed.
        engine_id: EngineId,
        /// Failure reason.
        message: String,
    },

    /// An engine's init hook failed; remaining inits were not attempted.
    #[error("engine init failed: {engine_id} - {message}")]
    InitFailed {
        /// The engine whose init hook failed.
        engine_id: EngineId,
        /// Failure reason.
        message: String,
    },

    /// A failure raised by an engine's own hook body.
    #[error("engine failure: {0}")]
    EngineFailure(String),

    /// Manifest resolution error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
