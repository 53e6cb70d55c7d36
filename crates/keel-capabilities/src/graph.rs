//! Derived capability graph.

use serde::Serialize;

use keel_core::EngineId;

use crate::contract::{CapabilityMap, ProviderIndex};

/// One engine's node in the derived graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityNode {
    /// The engine this node describes.
    pub engine_id: EngineId,
    /// Declared provided capabilities.
    pub provides: Vec<String>,
    /// Declared consumed capabilities.
    pub consumes: Vec<String>,
    /// De-duplicated engine ids that provide any capability this engine
    /// consumes, in resolution order.
    pub dependencies: Vec<EngineId>,
}

/// One consumer→provider edge, labelled with the capability that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEdge {
    /// Consuming engine.
    pub from: EngineId,
    /// Providing engine.
    pub to: EngineId,
    /// The capability the consumer resolves through this provider.
    pub capability: String,
}

/// The derived view over a capability map: nodes plus per-provider edges.
///
/// Fully recomputable from the declarations — treat it as a cache, never
/// hand-mutate it.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityGraph {
    /// Nodes in declaration order.
    pub nodes: Vec<CapabilityNode>,
    /// Edges in resolution order: one per (consumer, provider, capability).
    pub edges: Vec<CapabilityEdge>,
}

impl CapabilityGraph {
    /// Look up a node by engine id.
    #[must_use]
    pub fn node(&self, id: &EngineId) -> Option<&CapabilityNode> {
        self.nodes.iter().find(|n| &n.engine_id == id)
    }

    /// Edges originating at the given consumer.
    #[must_use]
    pub fn edges_from(&self, id: &EngineId) -> Vec<&CapabilityEdge> {
        self.edges.iter().filter(|e| &e.from == id).collect()
    }
}

/// Materialize the capability graph for inspection and visualization.
///
/// Uses the same provider-resolution rule as [`validate`](crate::validate):
/// a capability may have multiple providers and an edge is emitted per
/// provider; self-loops are excluded.
#[must_use]
pub fn build_graph(capabilities: &CapabilityMap) -> CapabilityGraph {
    let providers = ProviderIndex::build(capabilities);

    let mut nodes: Vec<CapabilityNode> = capabilities
        .iter()
        .map(|(engine_id, caps)| CapabilityNode {
            engine_id: engine_id.clone(),
            provides: caps.provides.clone(),
            consumes: caps.consumes.clone(),
            dependencies: Vec::new(),
        })
        .collect();

    let mut edges = Vec::new();
    for (index, (engine_id, caps)) in capabilities.iter().enumerate() {
        for capability in &caps.consumes {
            for provider in providers.providers(capability) {
                if provider == engine_id {
                    continue;
                }
                edges.push(CapabilityEdge {
                    from: engine_id.clone(),
                    to: provider.clone(),
                    capability: capability.clone(),
                });
                let node = &mut nodes[index];
                if !node.dependencies.contains(provider) {
                    node.dependencies.push(provider.clone());
                }
            }
        }
    }

    CapabilityGraph { nodes, edges }
}
