//! Per-engine lifecycle state.

use serde::Serialize;

/// Load/init progress and any captured error for one engine.
///
/// Invariant: `initialized` implies `loaded`. State is created when load
/// begins, mutated by the dependency loader and the lifecycle sequencer,
/// and cleared only by an explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleState {
    /// The engine instance was constructed and registered.
    pub loaded: bool,
    /// The engine's init hook completed successfully.
    pub initialized: bool,
    /// Message from a load or init failure. Terminal for the run.
    pub error: Option<String>,
}

impl LifecycleState {
    /// Whether this engine failed during load or init.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_unloaded() {
        let state = LifecycleState::default();
        assert!(!state.loaded);
        assert!(!state.initialized);
        assert!(!state.is_failed());
    }
}
