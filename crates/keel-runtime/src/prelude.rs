//! Prelude module - commonly used types for convenient import.
//!
//! Use `use keel_runtime::prelude::*;` to import all essential types.

pub use crate::{ConfigMap, ContextMetadata, SharedContext};
pub use crate::{Engine, EngineCell, EngineFactory};
pub use crate::{EngineCounts, Orchestrator, RuntimeConfig, RuntimeInfo};
pub use crate::{LifecycleEvent, LifecycleEventKind, LifecycleState, LifecycleTracker};
pub use crate::{RuntimeError, RuntimeResult};
pub use crate::{run_init, run_shutdown};
