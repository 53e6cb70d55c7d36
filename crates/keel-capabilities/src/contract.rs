//! Declared capability contracts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use keel_core::EngineId;

/// One engine's declared capability contract.
///
/// `provides` need not be globally unique — multiple engines may provide the
/// same capability. `consumes` may be empty; an engine with nothing to
/// consume has no outgoing edges in the derived graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCapabilities {
    /// Capabilities this engine provides to other engines.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Capabilities this engine requires from other engines.
    #[serde(default)]
    pub consumes: Vec<String>,
}

impl EngineCapabilities {
    /// Build a contract from anything iterable into capability names.
    pub fn new<P, C>(provides: P, consumes: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            provides: provides.into_iter().map(Into::into).collect(),
            consumes: consumes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Insertion-ordered map of engine id → declared contract.
///
/// Iteration order is declaration order, which keeps validation output and
/// graph edges deterministic for the same input.
#[derive(Debug, Clone, Default)]
pub struct CapabilityMap {
    order: Vec<EngineId>,
    entries: HashMap<EngineId, EngineCapabilities>,
}

impl CapabilityMap {
    /// Create an empty capability map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an engine's contract.
    ///
    /// Replacing keeps the engine's original position in iteration order.
    pub fn insert(&mut self, id: EngineId, capabilities: EngineCapabilities) {
        if !self.entries.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entries.insert(id, capabilities);
    }

    /// Look up an engine's contract.
    #[must_use]
    pub fn get(&self, id: &EngineId) -> Option<&EngineCapabilities> {
        self.entries.get(id)
    }

    /// Whether the map declares the given engine.
    #[must_use]
    pub fn contains(&self, id: &EngineId) -> bool {
        self.entries.contains_key(id)
    }

    /// Engine ids in declaration order.
    #[must_use]
    pub fn ids(&self) -> &[EngineId] {
        &self.order
    }

    /// Iterate contracts in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&EngineId, &EngineCapabilities)> {
        self.order.iter().filter_map(|id| {
            let caps = self.entries.get(id)?;
            Some((id, caps))
        })
    }

    /// Number of declared engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no engines are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<(EngineId, EngineCapabilities)> for CapabilityMap {
    fn from_iter<T: IntoIterator<Item = (EngineId, EngineCapabilities)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (id, caps) in iter {
            map.insert(id, caps);
        }
        map
    }
}

/// Capability name → providing engines, in declaration order.
///
/// The single provider-resolution rule shared by validation and graph
/// derivation: a capability may have multiple providers, and every consumer
/// resolves to all of them.
#[derive(Debug, Default)]
pub(crate) struct ProviderIndex {
    by_capability: HashMap<String, Vec<EngineId>>,
}

impl ProviderIndex {
    pub(crate) fn build(map: &CapabilityMap) -> Self {
        let mut index = Self::default();
        for (engine_id, caps) in map.iter() {
            for capability in &caps.provides {
                index
                    .by_capability
                    .entry(capability.clone())
                    .or_default()
                    .push(engine_id.clone());
            }
        }
        index
    }

    pub(crate) fn providers(&self, capability: &str) -> &[EngineId] {
        self.by_capability
            .get(capability)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn has_provider(&self, capability: &str) -> bool {
        self.by_capability.contains_key(capability)
    }
}
