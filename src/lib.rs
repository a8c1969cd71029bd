//! This crate provides a route-change-aware data-loading gate for a
//! client-side view tree: before a set of route-matched views is revealed,
//! one or more asynchronous preparation actions (typically data fetches)
//! are dispatched, and the real render is withheld until they resolve,
//! with a placeholder shown in the meantime.  The crate owns only the
//! dispatch-coordination state machine; rendering, transport, and route
//! matching stay with the host.
//!
//! ## Use case
//!
//! A navigation arrives and the views matched for the new location need
//! their data before they are worth showing.  Naively re-fetching on
//! every notification either duplicates work (redundant notifications)
//! or misses it (a changed action set with an unchanged location).  The
//! [`DispatchGate`] tracks both inputs, normalizes the configured action
//! set, and triggers a dispatch cycle exactly when one of them actually
//! changed, racing overlapping cycles safely through a monotonically
//! increasing cycle id: only the latest cycle's resolution flips the
//! gate back to ready.
//!
//! The gate never spawns tasks and never talks to a concrete transport.
//! Each triggering method hands back a [`DispatchCycle`] for the host to
//! await or schedule, and the actual work goes through an injected
//! [`ActionDispatcher`](dispatcher::ActionDispatcher) implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use route_dispatch_gate::{
//!     action::{ActionGroups, ActionSpec},
//!     dispatcher::{ActionDispatcher, DispatchError},
//!     route::{Location, RouteContext, RouteDescriptor},
//!     DispatchGate, GateInput, InputChange,
//! };
//!
//! struct ApiDispatcher;
//!
//! #[async_trait]
//! impl ActionDispatcher for ApiDispatcher {
//!     async fn dispatch(
//!         &self,
//!         groups: ActionGroups,
//!         context: RouteContext,
//!     ) -> Result<(), DispatchError> {
//!         for group in groups {
//!             for _action in group {
//!                 // fetch the data this action stands for, scoped to
//!                 // `context.location` and `context.routes`
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let mut input = GateInput::new(
//!     Location::new("/posts"),
//!     ActionSpec::Flat(vec!["posts".into(), "author".into()]),
//! );
//! input.routes = vec![RouteDescriptor::new("posts", "/posts")];
//! input.dispatch_on_first_activation = true;
//! input.placeholder = "Loading...".into();
//!
//! let (gate, cycle) = DispatchGate::activate(input, Arc::new(ApiDispatcher));
//! assert!(!gate.readiness().has_dispatched); // placeholder branch
//!
//! cycle.expect("first activation dispatches").run().await;
//! assert!(gate.readiness().has_dispatched); // real render branch
//!
//! // A later navigation re-runs the preparation actions.
//! if let Some(cycle) = gate.on_input_change(InputChange::location(Location::new("/about"))) {
//!     cycle.run().await;
//! }
//! # }
//! ```
//!
//! Readiness is also observable asynchronously: [`DispatchGate::subscribe`]
//! returns a [`ReadySubscription`] whose `wait` future completes once the
//! latest in-flight cycle has resolved, which is how a streaming renderer
//! or a test harness holds back until the gate's content is safe to show.

pub mod action;
pub mod dispatcher;
pub mod gate;
mod ready;
pub mod render;
pub mod route;

#[cfg(test)]
mod tests;

pub use gate::{CycleId, DispatchCycle, DispatchGate, GateInput, InputChange, Readiness};
pub use ready::{Ready, ReadySubscription};
