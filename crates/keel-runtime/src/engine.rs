//! The engine trait and its construction seam.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use keel_core::{EngineDescriptor, EngineId};

use crate::context::{ConfigMap, SharedContext};
use crate::error::RuntimeResult;

/// A loaded engine participating in the orchestrated lifecycle.
///
/// Both hooks default to no-ops so engines that decline lifecycle
/// participation implement nothing beyond [`id`](Engine::id).
///
/// # Hook contract
///
/// `init` runs after every declared dependency has been initialized and
/// registered, so a hook may look dependencies up in the context registry
/// and rely on them being ready. Hooks may read the registry but must not
/// remove entries from it, and must not lock their **own** cell through the
/// context — the sequencer already holds it.
#[async_trait]
pub trait Engine: Send + Sync {
    /// The unique identifier for this engine.
    fn id(&self) -> &EngineId;

    /// Initialization hook, awaited in dependency order.
    async fn init(&mut self, _ctx: &SharedContext) -> RuntimeResult<()> {
        Ok(())
    }

    /// Shutdown hook, awaited in reverse init order. Best-effort: a failure
    /// here is logged by the sequencer and never halts the teardown.
    async fn shutdown(&mut self, _ctx: &SharedContext) -> RuntimeResult<()> {
        Ok(())
    }

    /// Optional engine-internal configuration, invoked after lifecycle init
    /// when the runtime is configured with `initialize_on_load`.
    fn configure(&mut self, _config: &ConfigMap) -> RuntimeResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("id", self.id()).finish_non_exhaustive()
    }
}

/// Shared handle to a registered engine instance.
///
/// The registry hands out clones of this handle; the async mutex gives the
/// strictly sequential lifecycle exclusive access to one engine at a time.
pub type EngineCell = Arc<Mutex<Box<dyn Engine>>>;

/// Constructs engine instances from their descriptors.
///
/// This is the dependency-injection seam: production code supplies the real
/// constructor set, tests supply factories that build doubles or fail on
/// command for specific ids.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Construct the runtime instance for one descriptor.
    ///
    /// # Errors
    ///
    /// A factory error is fatal for the whole load: the loader records it on
    /// the engine's lifecycle state and aborts the remaining passes.
    async fn create(&self, descriptor: &EngineDescriptor) -> RuntimeResult<Box<dyn Engine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareEngine {
        id: EngineId,
    }

    #[async_trait]
    impl Engine for BareEngine {
        fn id(&self) -> &EngineId {
            &self.id
        }
    }

    #[tokio::test]
    async fn default_hooks_are_no_ops() {
        let mut engine = BareEngine {
            id: EngineId::from_static("bare"),
        };
        let ctx = SharedContext::default();
        assert!(engine.init(&ctx).await.is_ok());
        assert!(engine.shutdown(&ctx).await.is_ok());
        assert!(engine.configure(&ConfigMap::new()).is_ok());
    }

    #[test]
    fn dyn_engine_debug_shows_id() {
        let engine: Box<dyn Engine> = Box::new(BareEngine {
            id: EngineId::from_static("bare"),
        });
        let debug = format!("{engine:?}");
        assert!(debug.contains("bare"));
    }
}
