//! Engine descriptors.

use serde::{Deserialize, Serialize};

use crate::EngineId;

/// One engine's entry in the manifest.
///
/// A descriptor is the static declaration the orchestrator consumes: who the
/// engine is, which other engines it depends on, and whether it should be
/// loaded at all. Descriptors are immutable once the manifest resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Unique engine identifier.
    pub id: EngineId,
    /// Human-readable display name.
    pub name: String,
    /// Semantic version string.
    pub version: String,
    /// Engine ids this engine depends on, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<EngineId>,
    /// Whether the engine participates in loading at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl EngineDescriptor {
    /// Build a minimal enabled descriptor with no dependencies.
    ///
    /// Name and version are derived placeholders; manifest-resolved
    /// descriptors carry the real values.
    #[must_use]
    pub fn new(id: EngineId) -> Self {
        Self {
            name: id.as_str().to_string(),
            id,
            version: "0.0.0".into(),
            dependencies: Vec::new(),
            enabled: true,
        }
    }

    /// Replace the dependency list.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<EngineId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set the enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
