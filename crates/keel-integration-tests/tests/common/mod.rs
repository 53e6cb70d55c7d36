//! Shared fixtures: a recording engine/factory pair and manifest builders.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use keel_core::{EngineDescriptor, EngineId, EngineManifest, ManifestMetadata};
use keel_runtime::{
    ConfigMap, Engine, EngineFactory, RuntimeError, RuntimeResult, SharedContext,
};

/// Append-only trail of lifecycle events, shared between test and engines.
///
/// Entries look like `"construct:a"`, `"init:a"`, `"shutdown:a"`,
/// `"configure:a"`.
#[derive(Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().expect("trail poisoned").push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().expect("trail poisoned").clone()
    }

    /// Events of one kind (`"init"`, `"shutdown"`, ...), engine ids only.
    pub fn of(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{kind}:");
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(ToString::to_string))
            .collect()
    }
}

/// Engine double that records every hook invocation on a [`Trail`] and can
/// be told to fail init or shutdown.
pub struct RecordingEngine {
    id: EngineId,
    trail: Trail,
    fail_init: bool,
    fail_shutdown: bool,
}

#[async_trait]
impl Engine for RecordingEngine {
    fn id(&self) -> &EngineId {
        &self.id
    }

    async fn init(&mut self, _ctx: &SharedContext) -> RuntimeResult<()> {
        if self.fail_init {
            return Err(RuntimeError::EngineFailure(format!(
                "simulated init failure in {}",
                self.id
            )));
        }
        self.trail.push(format!("init:{}", self.id));
        Ok(())
    }

    async fn shutdown(&mut self, _ctx: &SharedContext) -> RuntimeResult<()> {
        if self.fail_shutdown {
            return Err(RuntimeError::EngineFailure(format!(
                "simulated shutdown failure in {}",
                self.id
            )));
        }
        self.trail.push(format!("shutdown:{}", self.id));
        Ok(())
    }

    fn configure(&mut self, _config: &ConfigMap) -> RuntimeResult<()> {
        self.trail.push(format!("configure:{}", self.id));
        Ok(())
    }
}

/// Factory double: builds [`RecordingEngine`]s, with per-id failure
/// injection for construction, init, and shutdown.
#[derive(Default)]
pub struct RecordingFactory {
    pub trail: Trail,
    pub fail_construct: HashMap<String, String>,
    pub fail_init: HashSet<String>,
    pub fail_shutdown: HashSet<String>,
}

impl RecordingFactory {
    pub fn new(trail: Trail) -> Self {
        Self {
            trail,
            ..Self::default()
        }
    }

    pub fn fail_construct(mut self, id: &str, message: &str) -> Self {
        self.fail_construct.insert(id.into(), message.into());
        self
    }

    pub fn fail_init(mut self, id: &str) -> Self {
        self.fail_init.insert(id.into());
        self
    }

    pub fn fail_shutdown(mut self, id: &str) -> Self {
        self.fail_shutdown.insert(id.into());
        self
    }
}

#[async_trait]
impl EngineFactory for RecordingFactory {
    async fn create(&self, descriptor: &EngineDescriptor) -> RuntimeResult<Box<dyn Engine>> {
        if let Some(message) = self.fail_construct.get(descriptor.id.as_str()) {
            return Err(RuntimeError::EngineFailure(message.clone()));
        }
        self.trail.push(format!("construct:{}", descriptor.id));
        Ok(Box::new(RecordingEngine {
            id: descriptor.id.clone(),
            trail: self.trail.clone(),
            fail_init: self.fail_init.contains(descriptor.id.as_str()),
            fail_shutdown: self.fail_shutdown.contains(descriptor.id.as_str()),
        }))
    }
}

pub fn id(s: &str) -> EngineId {
    EngineId::from_static(s)
}

/// Build a manifest from `(id, dependencies, enabled)` triples, preserving
/// declaration order.
pub fn manifest(entries: &[(&str, &[&str], bool)]) -> EngineManifest {
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
            maintainer: "integration tests".into(),
            description: "generated test manifest".into(),
        },
    }
}

/// Install a test subscriber so `RUST_LOG`-filtered traces show up under
/// `cargo test -- --nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
