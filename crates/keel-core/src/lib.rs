//! Engine identity, descriptors, and manifest model for the keel orchestrator.
//!
//! This crate holds the static declarations the orchestrator consumes:
//!
//! - [`EngineId`]: Stable, human-readable engine identifier
//! - [`EngineDescriptor`]: One engine's manifest entry (name, version,
//!   dependencies, enabled flag)
//! - [`EngineManifest`]: The full declarative manifest plus global metadata,
//!   with structural validation
//!
//! Descriptors are immutable once the manifest resolves — everything mutable
//! (lifecycle state, the engine registry) lives in `keel-runtime`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod id;
pub mod manifest;

pub use descriptor::EngineDescriptor;
pub use error::{CoreError, CoreResult};
pub use id::EngineId;
pub use manifest::{EngineManifest, ManifestMetadata};
