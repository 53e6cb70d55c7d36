//! Dependency-ordered engine loading.

use std::collections::HashSet;

use tracing::{debug, error, info};

use keel_core::{EngineDescriptor, EngineId, EngineManifest};

use crate::context::SharedContext;
use crate::engine::EngineFactory;
use crate::error::{RuntimeError, RuntimeResult, StuckEngine, StuckEngines};
use crate::lifecycle::LifecycleTracker;

/// Resolves a safe load order and instantiates each enabled engine once.
///
/// The algorithm is fixed-point layering rather than an explicit
/// topological sort: passes repeat over the remaining engines, loading every
/// engine whose declared dependencies are already loaded, until no engine
/// remains or a pass makes zero progress. Within a pass, engines are
/// attempted in manifest declaration order — the deterministic tie-break
/// when several become eligible at once.
///
/// A stalled pass is the single observable symptom of both circular
/// dependencies and references to disabled or undeclared engines; the
/// resulting error carries each stuck engine's unmet dependency ids.
pub struct DependencyLoader<'a> {
    manifest: &'a EngineManifest,
    factory: &'a dyn EngineFactory,
}

impl<'a> DependencyLoader<'a> {
    /// Create a loader over a validated manifest and a factory.
    #[must_use]
    pub fn new(manifest: &'a EngineManifest, factory: &'a dyn EngineFactory) -> Self {
        Self { manifest, factory }
    }

    /// Load every enabled engine in dependency order.
    ///
    /// Each constructed instance is registered in the context and its
    /// lifecycle state marked `loaded`. Returns the load order, which the
    /// lifecycle sequencer consumes as the init order.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ConstructionFailed`] if a factory call fails (the
    /// error is also recorded on that engine's lifecycle state, and the
    /// remaining passes are aborted — no partial silent continuation), or
    /// [`RuntimeError::UnresolvableDependencies`] if a pass stalls.
    pub async fn load_all(
        &self,
        ctx: &mut SharedContext,
        tracker: &mut LifecycleTracker,
    ) -> RuntimeResult<Vec<EngineId>> {
        let mut remaining: Vec<&EngineDescriptor> = self.manifest.enabled_descriptors();
        let mut loaded: HashSet<EngineId> = HashSet::new();
        let mut order: Vec<EngineId> = Vec::new();

        while !remaining.is_empty() {
            let mut progressed = false;
            let mut still: Vec<&EngineDescriptor> = Vec::new();

            for descriptor in remaining {
                let ready = descriptor
                    .dependencies
                    .iter()
                    .all(|dep| loaded.contains(dep));
                if !ready {
                    still.push(descriptor);
                    continue;
                }

                tracker.begin_load(&descriptor.id);
                match self.factory.create(descriptor).await {
                    Ok(engine) => {
                        ctx.register_engine(descriptor.id.clone(), engine)?;
                        tracker.mark_loaded(&descriptor.id);
                        loaded.insert(descriptor.id.clone());
                        order.push(descriptor.id.clone());
                        progressed = true;
                        debug!(engine_id = %descriptor.id, "Engine loaded");
                    },
                    Err(e) => {
                        let message = e.to_string();
                        tracker.record_error(&descriptor.id, &message);
                        error!(
                            engine_id = %descriptor.id,
                            error = %message,
                            "Engine construction failed, aborting load"
                        );
                        return Err(RuntimeError::ConstructionFailed {
                            engine_id: descriptor.id.clone(),
                            message,
                        });
                    },
                }
            }

            if !progressed {
                let stuck = StuckEngines(
                    still
                        .iter()
                        .map(|descriptor| StuckEngine {
                            id: descriptor.id.clone(),
                            missing: descriptor
                                .dependencies
                                .iter()
                                .filter(|&dep| !loaded.contains(dep))
                                .cloned()
                                .collect(),
                        })
                        .collect(),
                );
                error!(stuck = %stuck, "Dependency resolution stalled");
                return Err(RuntimeError::UnresolvableDependencies { stuck });
            }

            remaining = still;
        }

        info!(count = order.len(), "All enabled engines loaded");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use async_trait::async_trait;
    use keel_core::ManifestMetadata;
    use std::collections::HashMap;

    struct NullEngine {
        id: EngineId,
    }

    #[async_trait]
    impl Engine for NullEngine {
        fn id(&self) -> &EngineId {
            &self.id
        }
    }

    /// Factory double: constructs `NullEngine`s, failing for ids it was
    /// told to reject.
    #[derive(Default)]
    struct ScriptedFactory {
        failures: HashMap<String, String>,
    }

    impl ScriptedFactory {
        fn failing(id: &str, message: &str) -> Self {
            Self {
                failures: HashMap::from([(id.to_string(), message.to_string())]),
            }
        }
    }

    #[async_trait]
    impl EngineFactory for ScriptedFactory {
        async fn create(&self, descriptor: &EngineDescriptor) -> RuntimeResult<Box<dyn Engine>> {
            if let Some(message) = self.failures.get(descriptor.id.as_str()) {
                return Err(RuntimeError::EngineFailure(message.clone()));
            }
            Ok(Box::new(NullEngine {
                id: descriptor.id.clone(),
            }))
        }
    }

    fn id(s: &str) -> EngineId {
        EngineId::from_static(s)
    }

    fn manifest(entries: &[(&str, &[&str], bool)]) -> EngineManifest {
        EngineManifest {
            engines: entries
                .iter()
                .map(|(name, deps, enabled)| {
                    EngineDescriptor::new(id(name))
                        .with_dependencies(deps.iter().map(|d| id(d)).collect())
                        .with_enabled(*enabled)
                })
                .collect(),
            metadata: ManifestMetadata {
                version: "1.0.0".into(),
                maintainer: "tests".into(),
                description: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn linear_chain_loads_in_dependency_order() {
        let manifest = manifest(&[
            ("c", &["a", "b"], true),
            ("b", &["a"], true),
            ("a", &[], true),
        ]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let order = loader.load_all(&mut ctx, &mut tracker).await.unwrap();
        assert_eq!(order, vec![id("a"), id("b"), id("c")]);
        assert_eq!(ctx.engine_count(), 3);
        assert!(tracker.state(&id("c")).unwrap().loaded);
    }

    #[tokio::test]
    async fn manifest_order_breaks_ties() {
        // Both have no dependencies; declaration order wins.
        let manifest = manifest(&[("beta", &[], true), ("alpha", &[], true)]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let order = loader.load_all(&mut ctx, &mut tracker).await.unwrap();
        assert_eq!(order, vec![id("beta"), id("alpha")]);
    }

    #[tokio::test]
    async fn disabled_engines_are_skipped() {
        let manifest = manifest(&[("a", &[], true), ("ghost", &[], false)]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let order = loader.load_all(&mut ctx, &mut tracker).await.unwrap();
        assert_eq!(order, vec![id("a")]);
        assert!(tracker.state(&id("ghost")).is_none());
    }

    #[tokio::test]
    async fn dependency_on_disabled_engine_stalls() {
        let manifest = manifest(&[("ghost", &[], false), ("dependent", &["ghost"], true)]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let err = loader.load_all(&mut ctx, &mut tracker).await.unwrap_err();
        match err {
            RuntimeError::UnresolvableDependencies { stuck } => {
                assert_eq!(stuck.ids(), vec![&id("dependent")]);
                assert_eq!(stuck.0[0].missing, vec![id("ghost")]);
            },
            other => panic!("expected UnresolvableDependencies, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn circular_dependencies_stall_with_both_named() {
        let manifest = manifest(&[("a", &["b"], true), ("b", &["a"], true)]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let err = loader.load_all(&mut ctx, &mut tracker).await.unwrap_err();
        match err {
            RuntimeError::UnresolvableDependencies { stuck } => {
                assert_eq!(stuck.ids(), vec![&id("a"), &id("b")]);
            },
            other => panic!("expected UnresolvableDependencies, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn construction_failure_aborts_and_records_state() {
        let manifest = manifest(&[("a", &[], true), ("b", &["a"], true), ("c", &["b"], true)]);
        let factory = ScriptedFactory::failing("b", "constructor exploded");
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let err = loader.load_all(&mut ctx, &mut tracker).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ConstructionFailed { ref engine_id, .. } if engine_id.as_str() == "b"
        ));

        // a loaded, b failed, c never attempted.
        assert!(tracker.state(&id("a")).unwrap().loaded);
        let b_state = tracker.state(&id("b")).unwrap();
        assert!(!b_state.loaded);
        assert!(b_state.error.as_deref().unwrap().contains("constructor exploded"));
        assert!(tracker.state(&id("c")).is_none());
        assert_eq!(ctx.engine_count(), 1);
    }

    #[tokio::test]
    async fn diamond_resolves_in_manifest_tie_break_order() {
        let manifest = manifest(&[
            ("a", &[], true),
            ("b", &["a"], true),
            ("c", &["a"], true),
            ("d", &["b", "c"], true),
        ]);
        let factory = ScriptedFactory::default();
        let loader = DependencyLoader::new(&manifest, &factory);
        let mut ctx = SharedContext::default();
        let mut tracker = LifecycleTracker::new();

        let order = loader.load_all(&mut ctx, &mut tracker).await.unwrap();
        assert_eq!(order, vec![id("a"), id("b"), id("c"), id("d")]);
    }
}
