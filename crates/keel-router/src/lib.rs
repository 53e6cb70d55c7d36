//! Capability routing and declarative pipelines for keel engines.
//!
//! Once engines are loaded and initialized, their capabilities become
//! callable: the [`CapabilityRouter`] maps each capability name to the
//! engine handler that serves it, and [`run_pipeline`] chains capability
//! calls declaratively with automatic data flow and first-failure halting.
//!
//! Routing is claim-exclusive: one handler per capability name. This is
//! stricter than the declaration layer, where multiple engines may declare
//! the same `provides` — the router is where a single winner must be
//! chosen, and a second claim is rejected naming the current owner.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod pipeline;
pub mod router;

pub use error::{RouterError, RouterResult};
pub use pipeline::{Pipeline, PipelineReport, PipelineStep, PipelineValidation, run_pipeline, validate_pipeline};
pub use router::{CallOutcome, CapabilityHandler, CapabilityRouter};
