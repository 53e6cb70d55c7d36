//! The capability routing table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use keel_core::EngineId;

use crate::error::{RouterError, RouterResult};

/// An async handler serving one capability.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Serve one call. A returned error becomes a failed [`CallOutcome`],
    /// not a panic or a propagated router error.
    async fn handle(&self, input: Value) -> RouterResult<Value>;
}

struct Route {
    engine_id: EngineId,
    handler: Arc<dyn CapabilityHandler>,
}

/// The result of one capability call.
///
/// Dispatch failures (unknown capability, handler error) are data, not
/// propagated errors — callers inspect the outcome and decide.
#[derive(Debug)]
pub struct CallOutcome {
    /// The capability that was called.
    pub capability: String,
    /// The engine that served (or would have served) the call, when known.
    pub engine_id: Option<EngineId>,
    /// The handler's output, or the failure message.
    pub result: Result<Value, String>,
}

impl CallOutcome {
    /// Whether the call produced a value.
    #[must_use]
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }

    /// The output value, if the call succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    /// The failure message, if the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

/// Maps capability names to the engine handlers that serve them.
///
/// Registration is claim-exclusive per capability; iteration/inspection
/// order is registration order.
#[derive(Default)]
pub struct CapabilityRouter {
    order: Vec<String>,
    routes: HashMap<String, Route>,
}

impl CapabilityRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one capability.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::CapabilityClaimed`] if the capability is
    /// already registered, naming its current owner.
    pub fn register(
        &mut self,
        capability: impl Into<String>,
        engine_id: EngineId,
        handler: Arc<dyn CapabilityHandler>,
    ) -> RouterResult<()> {
        let capability = capability.into();
        if let Some(existing) = self.routes.get(&capability) {
            return Err(RouterError::CapabilityClaimed {
                capability,
                owner: existing.engine_id.clone(),
            });
        }
        debug!(capability = %capability, engine_id = %engine_id, "Registered capability handler");
        self.order.push(capability.clone());
        self.routes.insert(capability, Route { engine_id, handler });
        Ok(())
    }

    /// Register a batch of handlers for one engine.
    ///
    /// # Errors
    ///
    /// Fails on the first already-claimed capability; earlier entries in
    /// the batch stay registered.
    pub fn register_engine(
        &mut self,
        engine_id: &EngineId,
        handlers: Vec<(String, Arc<dyn CapabilityHandler>)>,
    ) -> RouterResult<()> {
        for (capability, handler) in handlers {
            self.register(capability, engine_id.clone(), handler)?;
        }
        Ok(())
    }

    /// Call a capability by name.
    pub async fn call(&self, capability: &str, input: Value) -> CallOutcome {
        let Some(route) = self.routes.get(capability) else {
            return CallOutcome {
                capability: capability.to_string(),
                engine_id: None,
                result: Err(format!("capability \"{capability}\" not found")),
            };
        };

        let result = route
            .handler
            .handle(input)
            .await
            .map_err(|e| e.to_string());
        CallOutcome {
            capability: capability.to_string(),
            engine_id: Some(route.engine_id.clone()),
            result,
        }
    }

    /// Whether a capability is registered.
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.routes.contains_key(capability)
    }

    /// All registered capability names, in registration order.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.order
    }

    /// The engine that owns a capability.
    #[must_use]
    pub fn engine_for(&self, capability: &str) -> Option<&EngineId> {
        self.routes.get(capability).map(|route| &route.engine_id)
    }

    /// (capability, owner) pairs in registration order, for inspection.
    #[must_use]
    pub fn routing_table(&self) -> Vec<(&str, &EngineId)> {
        self.order
            .iter()
            .filter_map(|capability| {
                let route = self.routes.get(capability)?;
                Some((capability.as_str(), &route.engine_id))
            })
            .collect()
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no capabilities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove all registered handlers.
    pub fn clear(&mut self) {
        self.order.clear();
        self.routes.clear();
    }
}

impl std::fmt::Debug for CapabilityRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRouter")
            .field("capabilities", &self.order)
            .finish()
    }
}
