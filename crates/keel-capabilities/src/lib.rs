//! Capability contracts and their validation for the keel orchestrator.
//!
//! Every engine declares a capability contract: the capability names it
//! `provides` and the names it `consumes`. This crate is the pure,
//! order-insensitive analysis over those declarations:
//!
//! - [`CapabilityMap`]: Insertion-ordered map of engine id → declared contract
//! - [`validate`]: Missing providers, unused capabilities, circular
//!   capability dependencies
//! - [`build_graph`]: The derived consumer→provider graph for inspection
//!
//! Validation is a diagnostic report, decoupled from the load/init path — a
//! `valid = false` result is fatal only if the caller decides it is.
//!
//! # Example
//!
//! ```
//! use keel_capabilities::{CapabilityMap, EngineCapabilities, validate};
//! use keel_core::EngineId;
//!
//! let mut map = CapabilityMap::new();
//! map.insert(
//!     EngineId::from_static("scorer"),
//!     EngineCapabilities::new(["scoring"], ["telemetry"]),
//! );
//! map.insert(
//!     EngineId::from_static("telemetry"),
//!     EngineCapabilities {
//!         provides: vec!["telemetry".into()],
//!         consumes: vec![],
//!     },
//! );
//!
//! let report = validate(&map);
//! assert!(report.valid);
//! assert!(report.missing_providers.is_empty());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod contract;
mod graph;
mod validate;

pub use contract::{CapabilityMap, EngineCapabilities};
pub use graph::{CapabilityEdge, CapabilityGraph, CapabilityNode, build_graph};
pub use validate::{CapabilityGap, ValidationResult, validate};
