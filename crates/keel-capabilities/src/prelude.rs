//! Prelude module - commonly used types for convenient import.
//!
//! Use `use keel_capabilities::prelude::*;` to import all essential types.

pub use crate::{CapabilityMap, EngineCapabilities};
pub use crate::{CapabilityEdge, CapabilityGraph, CapabilityNode, build_graph};
pub use crate::{CapabilityGap, ValidationResult, validate};
