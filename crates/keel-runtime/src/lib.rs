//! Engine lifecycle orchestration for the keel runtime.
//!
//! This crate sequences the whole engine lifecycle:
//!
//! - [`Engine`]: Trait for pluggable engines (`init`/`shutdown` hooks with
//!   no-op defaults)
//! - [`EngineFactory`]: Injection seam that constructs engine instances from
//!   their descriptors
//! - [`SharedContext`]: The single mutable object threaded through every
//!   lifecycle hook, holding the engine registry and run metadata
//! - [`DependencyLoader`]: Resolves a safe load order from declared
//!   dependencies via fixed-point layering
//! - [`run_init`] / [`run_shutdown`]: Ordered init with halt-on-failure and
//!   best-effort reverse-order shutdown
//! - [`Orchestrator`]: The entry point external callers bootstrap through
//!
//! # Ordering guarantees
//!
//! Init order is a linear extension of the dependency graph: every
//! dependency initializes strictly before its dependents. Shutdown order is
//! the exact reverse of the recorded init-order log — a log replay, not a
//! fresh graph resolution. The entire sequence is a strictly ordered chain
//! of awaited steps; no two hooks ever run concurrently.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod context;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod prelude;
pub mod runtime;
pub mod state;

pub use context::{ConfigMap, ContextMetadata, EngineSnapshot, LifecycleSnapshot, SharedContext};
pub use engine::{Engine, EngineCell, EngineFactory};
pub use error::{RuntimeError, RuntimeResult, StuckEngine, StuckEngines};
pub use lifecycle::{LifecycleEvent, LifecycleEventKind, LifecycleTracker, run_init, run_shutdown};
pub use loader::DependencyLoader;
pub use runtime::{EngineCounts, Orchestrator, RuntimeConfig, RuntimeInfo};
pub use state::LifecycleState;

// Diagnostic entry points, callable independent of a live context.
pub use keel_capabilities::{CapabilityGraph, CapabilityMap, ValidationResult, build_graph, validate};
