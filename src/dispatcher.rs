use async_trait::async_trait;
use thiserror::Error;

use crate::{
    action::{ActionGroups, ActionId},
    route::RouteContext,
};

/// Failure reported by a dispatcher.
///
/// For gating purposes an error is still a resolution; the gate logs it
/// and flips ready.  Retry policy and user-facing propagation belong to
/// the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("action `{action}` failed: {reason}")]
    Action { action: ActionId, reason: String },
    #[error("{0}")]
    Other(String),
}

/// The single call-out boundary of the gate: performs the preparation
/// actions for one dispatch cycle.
///
/// Injected into [`DispatchGate::activate`](crate::gate::DispatchGate::activate)
/// rather than looked up through a process-wide hook, so tests can supply
/// doubles without monkey-patching shared state.  Implementations must
/// tolerate being called again before a prior call resolves.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        groups: ActionGroups,
        context: RouteContext,
    ) -> Result<(), DispatchError>;
}
