//! The shared runtime context.
//!
//! One mutable object threaded through every lifecycle hook: the engine
//! registry, the run's config bag, and run metadata. Explicitly constructed
//! and passed by reference — there is no global "current context", and
//! nothing recreates one lazily.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use keel_core::{EngineId, ManifestMetadata};

use crate::engine::{Engine, EngineCell};
use crate::error::{RuntimeError, RuntimeResult};

/// Opaque key/value configuration bag.
pub type ConfigMap = HashMap<String, serde_json::Value>;

/// Run metadata carried on the context, sourced from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMetadata {
    /// Manifest/application version.
    pub version: String,
    /// Maintaining party.
    pub maintainer: String,
    /// Human-readable description.
    pub description: String,
}

impl Default for ContextMetadata {
    fn default() -> Self {
        Self {
            version: "0.0.0".into(),
            maintainer: "unspecified".into(),
            description: String::new(),
        }
    }
}

impl From<&ManifestMetadata> for ContextMetadata {
    fn from(metadata: &ManifestMetadata) -> Self {
        Self {
            version: metadata.version.clone(),
            maintainer: metadata.maintainer.clone(),
            description: metadata.description.clone(),
        }
    }
}

/// One registered engine as listed in an audit snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    /// Engine id.
    pub id: EngineId,
    /// Display name from the descriptor.
    pub name: String,
    /// Version from the descriptor.
    pub version: String,
    /// Whether the engine's init hook had completed when the snapshot was
    /// taken.
    pub initialized: bool,
}

/// Lifecycle snapshot attached to the context when the runtime is
/// configured with `audit`.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSnapshot {
    /// Every registered engine, in registration (= init) order.
    pub engines: Vec<EngineSnapshot>,
}

/// The shared runtime context.
///
/// The engine registry holds at most one instance per engine id, in
/// insertion order — which, by construction, is the init order. Only the
/// dependency loader and lifecycle sequencer insert; hooks read.
#[derive(Debug, Default)]
pub struct SharedContext {
    initialized: bool,
    start_time: Option<DateTime<Utc>>,
    run_id: Option<Uuid>,
    order: Vec<EngineId>,
    engines: HashMap<EngineId, EngineCell>,
    config: ConfigMap,
    metadata: ContextMetadata,
    audit: Option<LifecycleSnapshot>,
}

impl SharedContext {
    /// Create a fresh, not-yet-initialized context.
    #[must_use]
    pub fn new(config: ConfigMap, metadata: ContextMetadata) -> Self {
        Self {
            config,
            metadata,
            ..Self::default()
        }
    }

    /// Mark the context initialized, stamping the start time and run id.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ContextAlreadyInitialized`] if called on an
    /// already-initialized context; the existing context is not mutated.
    pub fn initialize(&mut self) -> RuntimeResult<()> {
        if self.initialized {
            return Err(RuntimeError::ContextAlreadyInitialized);
        }
        self.initialized = true;
        self.start_time = Some(Utc::now());
        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);
        info!(%run_id, "Shared context initialized");
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// When this run was initialized. `None` before initialization.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// This run's identifier. `None` before initialization.
    #[must_use]
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Register an engine instance under its id.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateEngine`] if an instance is already
    /// registered under the same id — the registry never silently replaces.
    pub fn register_engine(
        &mut self,
        id: EngineId,
        engine: Box<dyn Engine>,
    ) -> RuntimeResult<()> {
        if self.engines.contains_key(&id) {
            return Err(RuntimeError::DuplicateEngine(id));
        }
        info!(engine_id = %id, "Registered engine in context");
        self.order.push(id.clone());
        self.engines.insert(id, Arc::new(Mutex::new(engine)));
        Ok(())
    }

    /// Get a handle to a registered engine.
    #[must_use]
    pub fn engine(&self, id: &EngineId) -> Option<EngineCell> {
        self.engines.get(id).map(Arc::clone)
    }

    /// Registered engine ids in registration order.
    #[must_use]
    pub fn engine_ids(&self) -> &[EngineId] {
        &self.order
    }

    /// Number of registered engines.
    #[must_use]
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// The run's configuration bag.
    #[must_use]
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// Merge updates into the configuration bag, replacing existing keys.
    pub fn update_config(&mut self, updates: ConfigMap) {
        self.config.extend(updates);
    }

    /// Run metadata.
    #[must_use]
    pub fn metadata(&self) -> &ContextMetadata {
        &self.metadata
    }

    /// Attach an audit snapshot (runtime `audit` option).
    pub fn attach_audit(&mut self, snapshot: LifecycleSnapshot) {
        self.audit = Some(snapshot);
    }

    /// The audit snapshot, if one was attached.
    #[must_use]
    pub fn audit(&self) -> Option<&LifecycleSnapshot> {
        self.audit.as_ref()
    }

    /// Return the context to its pre-initialized, empty state.
    ///
    /// For test harnesses and explicit reinitialization only — nothing in
    /// the production path calls this. The config bag and metadata survive;
    /// the registry, audit snapshot, start time, and run id do not.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.start_time = None;
        self.run_id = None;
        self.order.clear();
        self.engines.clear();
        self.audit = None;
    }
}
