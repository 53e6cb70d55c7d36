//! The engine manifest: descriptor list plus global metadata.
//!
//! The manifest is consumed, not owned, by the orchestrator — its on-disk
//! format is a collaborator concern. What is owned here is the validation
//! contract: a manifest that reaches the loader has a well-formed descriptor
//! for every engine, with violations named by descriptor id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::descriptor::EngineDescriptor;
use crate::error::{CoreError, CoreResult};
use crate::id::EngineId;

/// Global manifest metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Manifest schema/application version.
    pub version: String,
    /// Maintaining party.
    pub maintainer: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// The declarative list of engine descriptors and their dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineManifest {
    /// Engine descriptors in declaration order.
    ///
    /// Declaration order is load-significant: it is the deterministic
    /// tie-break when several engines become loadable in the same pass.
    pub engines: Vec<EngineDescriptor>,
    /// Global metadata.
    pub metadata: ManifestMetadata,
}

impl EngineManifest {
    /// Parse and validate a manifest from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ManifestParse`] when the document is not
    /// structurally a manifest (missing engines list or metadata, a
    /// non-list `dependencies`, malformed ids), and the validation errors
    /// of [`validate`](Self::validate) otherwise.
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        let manifest: Self =
            serde_json::from_str(raw).map_err(|e| CoreError::ManifestParse(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate a manifest from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same contract as [`from_json_str`](Self::from_json_str).
    pub fn from_value(value: serde_json::Value) -> CoreResult<Self> {
        let manifest: Self =
            serde_json::from_value(value).map_err(|e| CoreError::ManifestParse(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read, parse, and validate a manifest from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// [`CoreError::ManifestParse`] for unreadable files, plus the contract
    /// of [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ManifestParse(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Structurally validate the manifest.
    ///
    /// Checks the constraints serde cannot express: non-empty names and
    /// versions, no duplicate descriptor ids, no self-dependencies. Each
    /// violation names the offending descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDescriptor`] or
    /// [`CoreError::DuplicateDescriptor`] for the first violation found, in
    /// declaration order.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen: HashSet<&EngineId> = HashSet::new();
        for descriptor in &self.engines {
            if !seen.insert(&descriptor.id) {
                return Err(CoreError::DuplicateDescriptor(descriptor.id.clone()));
            }
            if descriptor.name.trim().is_empty() {
                return Err(CoreError::InvalidDescriptor {
                    engine_id: descriptor.id.clone(),
                    reason: "missing or invalid name".into(),
                });
            }
            if descriptor.version.trim().is_empty() {
                return Err(CoreError::InvalidDescriptor {
                    engine_id: descriptor.id.clone(),
                    reason: "missing or invalid version".into(),
                });
            }
            if descriptor.dependencies.contains(&descriptor.id) {
                return Err(CoreError::InvalidDescriptor {
                    engine_id: descriptor.id.clone(),
                    reason: "engine depends on itself".into(),
                });
            }
        }
        Ok(())
    }

    /// Look up a descriptor by id.
    #[must_use]
    pub fn descriptor(&self, id: &EngineId) -> Option<&EngineDescriptor> {
        self.engines.iter().find(|d| &d.id == id)
    }

    /// Descriptors with `enabled = true`, in declaration order.
    #[must_use]
    pub fn enabled_descriptors(&self) -> Vec<&EngineDescriptor> {
        self.engines.iter().filter(|d| d.enabled).collect()
    }

    /// Total descriptor count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether the manifest declares no engines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
