//! The orchestrator entry points external callers bootstrap through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use keel_core::{EngineId, EngineManifest};

use crate::context::{ConfigMap, ContextMetadata, EngineSnapshot, LifecycleSnapshot, SharedContext};
use crate::engine::EngineFactory;
use crate::error::{RuntimeError, RuntimeResult};
use crate::lifecycle::{LifecycleTracker, run_init, run_shutdown};
use crate::loader::DependencyLoader;
use crate::state::LifecycleState;

/// Options recognized by [`Orchestrator::initialize`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Load and init engines during initialization. When false, the
    /// dependency loader and lifecycle sequencer are skipped entirely and a
    /// bare initialized context is returned.
    pub auto_load_engines: bool,
    /// After lifecycle init, additionally invoke each engine's own
    /// [`configure`](crate::Engine::configure) method with `custom_config`.
    pub initialize_on_load: bool,
    /// Attach a lifecycle snapshot listing every registered engine to the
    /// returned context.
    pub audit: bool,
    /// Configuration handed to `configure` under `initialize_on_load`.
    pub custom_config: ConfigMap,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            auto_load_engines: true,
            initialize_on_load: false,
            audit: false,
            custom_config: ConfigMap::new(),
        }
    }
}

/// Engine totals reported by [`Orchestrator::runtime_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineCounts {
    /// Descriptors declared in the manifest.
    pub total: usize,
    /// Descriptors with `enabled = true`.
    pub enabled: usize,
    /// Instances registered in the context.
    pub loaded: usize,
}

/// Runtime status for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    /// Manifest version.
    pub version: String,
    /// Manifest maintainer.
    pub maintainer: String,
    /// Whether the context has been initialized.
    pub initialized: bool,
    /// When the run started. `None` for a never-initialized context.
    pub start_time: Option<DateTime<Utc>>,
    /// Milliseconds since the run started.
    pub uptime_ms: i64,
    /// Engine totals.
    pub engines: EngineCounts,
}

/// Drives one orchestrated run: manifest → load order → init, and later the
/// log-reverse shutdown.
///
/// The orchestrator owns the lifecycle bookkeeping (states, event log,
/// init-order log) across the run; the [`SharedContext`] it returns owns the
/// engine registry. A second [`initialize`](Self::initialize) without an
/// explicit [`reset`](Self::reset) is a contract violation.
pub struct Orchestrator {
    manifest: EngineManifest,
    factory: Box<dyn EngineFactory>,
    tracker: LifecycleTracker,
    initialized: bool,
}

impl Orchestrator {
    /// Create an orchestrator over a manifest and an engine factory.
    ///
    /// # Errors
    ///
    /// Returns the manifest's structural validation error, so that an
    /// invalid manifest is rejected before any loading begins.
    pub fn new(manifest: EngineManifest, factory: Box<dyn EngineFactory>) -> RuntimeResult<Self> {
        manifest.validate()?;
        Ok(Self {
            manifest,
            factory,
            tracker: LifecycleTracker::new(),
            initialized: false,
        })
    }

    /// Initialize a run: create the shared context, load every enabled
    /// engine in dependency order, and drive init hooks over the load order.
    ///
    /// Either the whole sequence completes and the populated context is
    /// returned, or the first failure propagates — there is no partial
    /// success. On failure the lifecycle log retains the failure entry;
    /// surface [`LifecycleTracker::last_error`] as the primary reason.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::RuntimeAlreadyInitialized`] on a repeat call without
    /// [`reset`](Self::reset); otherwise any loader or init error.
    pub async fn initialize(
        &mut self,
        initial_config: ConfigMap,
        options: &RuntimeConfig,
    ) -> RuntimeResult<SharedContext> {
        if self.initialized {
            return Err(RuntimeError::RuntimeAlreadyInitialized);
        }
        // A failed run consumes the orchestrator too: failed is terminal,
        // and only an explicit reset starts over.
        self.initialized = true;

        let mut ctx = SharedContext::new(
            initial_config,
            ContextMetadata::from(&self.manifest.metadata),
        );
        ctx.initialize()?;

        if options.auto_load_engines {
            let loader = DependencyLoader::new(&self.manifest, self.factory.as_ref());
            let order = loader.load_all(&mut ctx, &mut self.tracker).await?;
            run_init(&order, &ctx, &mut self.tracker).await?;

            if options.initialize_on_load {
                self.configure_engines(&ctx, &options.custom_config).await;
            }
        } else {
            info!("auto_load_engines disabled, returning bare context");
        }

        if options.audit {
            let snapshot = self.build_snapshot(&ctx);
            ctx.attach_audit(snapshot);
        }

        Ok(ctx)
    }

    /// Run the shutdown sequence: every initialized engine, exact reverse of
    /// the recorded init order, best-effort throughout.
    pub async fn shutdown_all(&mut self, ctx: &SharedContext) {
        run_shutdown(ctx, &mut self.tracker).await;
    }

    /// Per-engine configuration pass (`initialize_on_load`). Failures are
    /// logged per engine and do not halt the pass, matching the optional
    /// nature of the hook.
    async fn configure_engines(&self, ctx: &SharedContext, config: &ConfigMap) {
        for engine_id in self.tracker.init_order() {
            let Some(cell) = ctx.engine(engine_id) else {
                continue;
            };
            let mut engine = cell.lock().await;
            if let Err(e) = engine.configure(config) {
                warn!(engine_id = %engine_id, error = %e, "Engine configure failed");
            }
        }
    }

    fn build_snapshot(&self, ctx: &SharedContext) -> LifecycleSnapshot {
        let engines = ctx
            .engine_ids()
            .iter()
            .map(|id| {
                let descriptor = self.manifest.descriptor(id);
                EngineSnapshot {
                    id: id.clone(),
                    name: descriptor.map_or_else(|| id.as_str().to_string(), |d| d.name.clone()),
                    version: descriptor.map_or_else(String::new, |d| d.version.clone()),
                    initialized: self
                        .tracker
                        .state(id)
                        .is_some_and(|state| state.initialized),
                }
            })
            .collect();
        LifecycleSnapshot { engines }
    }

    /// The manifest this orchestrator runs.
    #[must_use]
    pub fn manifest(&self) -> &EngineManifest {
        &self.manifest
    }

    /// Lifecycle state recorded for one engine.
    #[must_use]
    pub fn engine_state(&self, id: &EngineId) -> Option<&LifecycleState> {
        self.tracker.state(id)
    }

    /// The run's lifecycle bookkeeping: states, event log, init order.
    #[must_use]
    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }

    /// Runtime status: metadata, uptime, engine totals.
    #[must_use]
    pub fn runtime_info(&self, ctx: &SharedContext) -> RuntimeInfo {
        let uptime_ms = ctx.start_time().map_or(0, |start| {
            Utc::now().signed_duration_since(start).num_milliseconds()
        });
        RuntimeInfo {
            version: self.manifest.metadata.version.clone(),
            maintainer: self.manifest.metadata.maintainer.clone(),
            initialized: ctx.is_initialized(),
            start_time: ctx.start_time(),
            uptime_ms,
            engines: EngineCounts {
                total: self.manifest.len(),
                enabled: self.manifest.enabled_descriptors().len(),
                loaded: ctx.engine_count(),
            },
        }
    }

    /// Clear the run's lifecycle bookkeeping so the orchestrator can drive a
    /// fresh run. Test-harness and explicit reinitialization use only.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.initialized = false;
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engines", &self.manifest.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
