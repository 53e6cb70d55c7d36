//! Capability contract validation.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use keel_core::EngineId;

use crate::contract::{CapabilityMap, ProviderIndex};

/// A single contract gap: an engine and the capability it trips on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityGap {
    /// The engine on whose contract the gap was found.
    pub engine_id: EngineId,
    /// The capability name involved.
    pub capability: String,
}

/// The full validation report over a capability map.
///
/// `valid` is false when a consumed capability has no provider anywhere, or
/// when the consumer→provider graph contains a cycle. Unused capabilities
/// are informational only.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Whether the declared contracts are mutually satisfiable.
    pub valid: bool,
    /// Consumed capabilities with no provider anywhere.
    pub missing_providers: Vec<CapabilityGap>,
    /// One representative cycle per strongly-connected region, as a closed
    /// engine-id path (first id repeated at the end).
    pub circular_dependencies: Vec<Vec<EngineId>>,
    /// Provided capabilities no engine consumes. Does not affect `valid`.
    pub unused_capabilities: Vec<CapabilityGap>,
}

/// Validate capability dependencies across engines.
///
/// Pure and side-effect-free; results are deterministic in the map's
/// declaration order.
#[must_use]
pub fn validate(capabilities: &CapabilityMap) -> ValidationResult {
    let providers = ProviderIndex::build(capabilities);

    let mut missing_providers = Vec::new();
    for (engine_id, caps) in capabilities.iter() {
        for capability in &caps.consumes {
            if !providers.has_provider(capability) {
                missing_providers.push(CapabilityGap {
                    engine_id: engine_id.clone(),
                    capability: capability.clone(),
                });
            }
        }
    }

    let consumed: HashSet<&str> = capabilities
        .iter()
        .flat_map(|(_, caps)| caps.consumes.iter().map(String::as_str))
        .collect();

    let mut unused_capabilities = Vec::new();
    for (engine_id, caps) in capabilities.iter() {
        for capability in &caps.provides {
            if !consumed.contains(capability.as_str()) {
                unused_capabilities.push(CapabilityGap {
                    engine_id: engine_id.clone(),
                    capability: capability.clone(),
                });
            }
        }
    }

    let circular_dependencies = find_cycles(capabilities, &providers);

    let valid = missing_providers.is_empty() && circular_dependencies.is_empty();
    if !valid {
        debug!(
            missing = missing_providers.len(),
            cycles = circular_dependencies.len(),
            "Capability validation failed"
        );
    }

    ValidationResult {
        valid,
        missing_providers,
        circular_dependencies,
        unused_capabilities,
    }
}

/// Depth-first cycle search over the consumer→provider edge set.
///
/// Maintains the recursion stack explicitly; revisiting an engine currently
/// on the stack emits the closed path from its first occurrence through the
/// current position. Self-edges (an engine providing a capability it also
/// consumes) are excluded.
fn find_cycles(capabilities: &CapabilityMap, providers: &ProviderIndex) -> Vec<Vec<EngineId>> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<EngineId> = HashSet::new();
    let mut stack: HashSet<EngineId> = HashSet::new();
    let mut path: Vec<EngineId> = Vec::new();

    for engine_id in capabilities.ids() {
        if !visited.contains(engine_id) {
            visit(
                engine_id,
                capabilities,
                providers,
                &mut visited,
                &mut stack,
                &mut path,
                &mut cycles,
            );
        }
    }

    cycles
}

fn visit(
    engine_id: &EngineId,
    capabilities: &CapabilityMap,
    providers: &ProviderIndex,
    visited: &mut HashSet<EngineId>,
    stack: &mut HashSet<EngineId>,
    path: &mut Vec<EngineId>,
    cycles: &mut Vec<Vec<EngineId>>,
) {
    if stack.contains(engine_id) {
        if let Some(start) = path.iter().position(|id| id == engine_id) {
            let mut cycle: Vec<EngineId> = path[start..].to_vec();
            cycle.push(engine_id.clone());
            cycles.push(cycle);
        }
        return;
    }

    if visited.contains(engine_id) {
        return;
    }

    visited.insert(engine_id.clone());
    stack.insert(engine_id.clone());
    path.push(engine_id.clone());

    if let Some(caps) = capabilities.get(engine_id) {
        for capability in &caps.consumes {
            for provider in providers.providers(capability) {
                if provider != engine_id {
                    visit(provider, capabilities, providers, visited, stack, path, cycles);
                }
            }
        }
    }

    stack.remove(engine_id);
    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::EngineCapabilities;

    fn id(s: &str) -> EngineId {
        EngineId::from_static(s)
    }

    fn caps(provides: &[&str], consumes: &[&str]) -> EngineCapabilities {
        EngineCapabilities::new(provides.iter().copied(), consumes.iter().copied())
    }

    #[test]
    fn satisfied_contracts_are_valid() {
        let map: CapabilityMap = [
            (id("telemetry"), caps(&["telemetry"], &[])),
            (id("scorer"), caps(&["scoring"], &["telemetry"])),
            (id("reporter"), caps(&[], &["scoring", "telemetry"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(report.valid);
        assert!(report.missing_providers.is_empty());
        assert!(report.circular_dependencies.is_empty());
    }

    #[test]
    fn missing_provider_is_reported_once_per_consumer() {
        let map: CapabilityMap = [(id("x"), caps(&[], &["p"]))].into_iter().collect();

        let report = validate(&map);
        assert!(!report.valid);
        assert_eq!(report.missing_providers.len(), 1);
        assert_eq!(report.missing_providers[0].engine_id.as_str(), "x");
        assert_eq!(report.missing_providers[0].capability, "p");
    }

    #[test]
    fn unused_capability_does_not_affect_validity() {
        let map: CapabilityMap = [
            (id("b"), caps(&["y"], &[])),
            (id("c"), caps(&["z"], &["z"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(report.valid);
        assert_eq!(report.unused_capabilities.len(), 1);
        assert_eq!(report.unused_capabilities[0].engine_id.as_str(), "b");
        assert_eq!(report.unused_capabilities[0].capability, "y");
    }

    #[test]
    fn two_engine_cycle_is_detected() {
        let map: CapabilityMap = [
            (id("a"), caps(&["alpha"], &["beta"])),
            (id("b"), caps(&["beta"], &["alpha"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(!report.valid);
        assert_eq!(report.circular_dependencies.len(), 1);
        let cycle = &report.circular_dependencies[0];
        // Closed path: first engine repeated at the end.
        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.len() >= 3);
    }

    #[test]
    fn disjoint_cycles_are_each_reported() {
        let map: CapabilityMap = [
            (id("a"), caps(&["alpha"], &["beta"])),
            (id("b"), caps(&["beta"], &["alpha"])),
            (id("c"), caps(&["gamma"], &["delta"])),
            (id("d"), caps(&["delta"], &["gamma"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(!report.valid);
        assert_eq!(report.circular_dependencies.len(), 2);

        let touches = |cycle: &Vec<EngineId>, engine: &str| {
            cycle.iter().any(|e| e.as_str() == engine)
        };
        assert!(report.circular_dependencies.iter().any(|c| touches(c, "a")));
        assert!(report.circular_dependencies.iter().any(|c| touches(c, "c")));
    }

    #[test]
    fn self_provided_capability_is_not_a_cycle() {
        // c both provides and consumes "z" — no self-loop edge is created.
        let map: CapabilityMap = [(id("c"), caps(&["z"], &["z"]))].into_iter().collect();

        let report = validate(&map);
        assert!(report.valid);
        assert!(report.circular_dependencies.is_empty());
    }

    #[test]
    fn empty_consumes_cannot_source_a_cycle() {
        let map: CapabilityMap = [
            (id("leaf"), caps(&["root"], &[])),
            (id("mid"), caps(&["branch"], &["root"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(report.valid);
    }

    #[test]
    fn three_engine_cycle_reports_full_path() {
        let map: CapabilityMap = [
            (id("a"), caps(&["alpha"], &["gamma"])),
            (id("b"), caps(&["beta"], &["alpha"])),
            (id("c"), caps(&["gamma"], &["beta"])),
        ]
        .into_iter()
        .collect();

        let report = validate(&map);
        assert!(!report.valid);
        assert_eq!(report.circular_dependencies.len(), 1);
        let cycle = &report.circular_dependencies[0];
        assert_eq!(cycle.len(), 4);
        assert_eq!(cycle.first(), cycle.last());
        for engine in ["a", "b", "c"] {
            assert!(cycle.iter().any(|e| e.as_str() == engine));
        }
    }

    #[test]
    fn report_serializes_for_diagnostics() {
        let map: CapabilityMap = [(id("x"), caps(&[], &["p"]))].into_iter().collect();
        let report = validate(&map);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["missing_providers"][0]["engine_id"], "x");
    }
}
