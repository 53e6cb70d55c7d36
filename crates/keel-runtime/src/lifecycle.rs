//! Lifecycle sequencing: ordered init, log-reverse shutdown, event log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use keel_core::EngineId;

use crate::context::SharedContext;
use crate::error::{RuntimeError, RuntimeResult};
use crate::state::LifecycleState;

/// What a lifecycle event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    /// An init hook completed.
    Init,
    /// A shutdown hook completed.
    Shutdown,
    /// A load, init, or shutdown step failed.
    Error,
}

/// One append-only lifecycle log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    /// What happened.
    pub kind: LifecycleEventKind,
    /// The engine involved.
    pub engine_id: EngineId,
    /// Failure message for [`LifecycleEventKind::Error`] entries.
    pub message: Option<String>,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// Per-run lifecycle bookkeeping: engine states, the append-only event log,
/// and the init-order log that shutdown replays in reverse.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    states: HashMap<EngineId, LifecycleState>,
    events: Vec<LifecycleEvent>,
    init_order: Vec<EngineId>,
}

impl LifecycleTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lifecycle state recorded for an engine, if load ever began.
    #[must_use]
    pub fn state(&self, id: &EngineId) -> Option<&LifecycleState> {
        self.states.get(id)
    }

    /// Iterate all recorded states.
    pub fn states(&self) -> impl Iterator<Item = (&EngineId, &LifecycleState)> {
        self.states.iter()
    }

    /// The full event log, in append order.
    #[must_use]
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Events of one kind, in append order.
    #[must_use]
    pub fn events_of(&self, kind: LifecycleEventKind) -> Vec<&LifecycleEvent> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    /// The most recent error entry — the primary failure reason callers
    /// should surface.
    #[must_use]
    pub fn last_error(&self) -> Option<&LifecycleEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind == LifecycleEventKind::Error)
    }

    /// The append-only init-order log.
    #[must_use]
    pub fn init_order(&self) -> &[EngineId] {
        &self.init_order
    }

    /// Clear all bookkeeping. Test-harness and explicit-reset use only.
    pub fn reset(&mut self) {
        self.states.clear();
        self.events.clear();
        self.init_order.clear();
    }

    pub(crate) fn begin_load(&mut self, id: &EngineId) -> &mut LifecycleState {
        self.states.entry(id.clone()).or_default()
    }

    pub(crate) fn mark_loaded(&mut self, id: &EngineId) {
        self.begin_load(id).loaded = true;
    }

    pub(crate) fn record_init(&mut self, id: &EngineId) {
        let state = self.begin_load(id);
        debug_assert!(state.loaded, "initialized implies loaded");
        state.initialized = true;
        self.init_order.push(id.clone());
        self.events.push(LifecycleEvent {
            kind: LifecycleEventKind::Init,
            engine_id: id.clone(),
            message: None,
            timestamp: Utc::now(),
        });
    }

    pub(crate) fn record_shutdown(&mut self, id: &EngineId) {
        self.events.push(LifecycleEvent {
            kind: LifecycleEventKind::Shutdown,
            engine_id: id.clone(),
            message: None,
            timestamp: Utc::now(),
        });
    }

    pub(crate) fn record_error(&mut self, id: &EngineId, message: &str) {
        self.begin_load(id).error = Some(message.to_string());
        self.events.push(LifecycleEvent {
            kind: LifecycleEventKind::Error,
            engine_id: id.clone(),
            message: Some(message.to_string()),
            timestamp: Utc::now(),
        });
    }
}

/// Drive `init` over every loaded engine, in load order.
///
/// Each hook is awaited before the next starts. On success the engine id is
/// appended to the init-order log; on failure the run **halts** — no
/// remaining engine is initialized, the failure is recorded on the engine's
/// state and in the event log, and the error propagates to the caller.
///
/// # Errors
///
/// [`RuntimeError::EngineNotFound`] if an id in `order` has no registered
/// instance, or [`RuntimeError::InitFailed`] carrying the failing engine's
/// id and message.
pub async fn run_init(
    order: &[EngineId],
    ctx: &SharedContext,
    tracker: &mut LifecycleTracker,
) -> RuntimeResult<()> {
    for engine_id in order {
        let cell = ctx
            .engine(engine_id)
            .ok_or_else(|| RuntimeError::EngineNotFound(engine_id.clone()))?;
        let mut engine = cell.lock().await;
        match engine.init(ctx).await {
            Ok(()) => {
                tracker.record_init(engine_id);
                info!(engine_id = %engine_id, "Engine initialized");
            },
            Err(e) => {
                let message = e.to_string();
                tracker.record_error(engine_id, &message);
                error!(engine_id = %engine_id, error = %message, "Engine init failed, halting");
                return Err(RuntimeError::InitFailed {
                    engine_id: engine_id.clone(),
                    message,
                });
            },
        }
    }
    Ok(())
}

/// Drive `shutdown` over every initialized engine, in the exact reverse of
/// the recorded init order.
///
/// Shutdown is a log replay, not a fresh graph resolution. It is also
/// best-effort: a failing hook is logged and recorded, and every remaining
/// engine still gets its shutdown attempt.
pub async fn run_shutdown(ctx: &SharedContext, tracker: &mut LifecycleTracker) {
    let order: Vec<EngineId> = tracker.init_order().iter().rev().cloned().collect();
    for engine_id in order {
        let Some(cell) = ctx.engine(&engine_id) else {
            warn!(engine_id = %engine_id, "Initialized engine missing from registry at shutdown");
            continue;
        };
        let mut engine = cell.lock().await;
        match engine.shutdown(ctx).await {
            Ok(()) => {
                tracker.record_shutdown(&engine_id);
                info!(engine_id = %engine_id, "Engine shut down");
            },
            Err(e) => {
                let message = e.to_string();
                tracker.record_error(&engine_id, &message);
                warn!(engine_id = %engine_id, error = %message, "Engine shutdown failed, continuing");
            },
        }
    }
}
