use std::sync::{Arc, Mutex};

use tracing::{debug, trace, warn};

use crate::{
    action::{ActionGroups, ActionSet, ActionSpec},
    dispatcher::ActionDispatcher,
    ready::{Ready, ReadySubscription},
    render::{Fragment, RenderFn, Renderable},
    route::{Location, Props, RouteContext, RouteDescriptor},
};

/// Keys the gate consumes itself; everything else in [`GateInput::props`]
/// passes through to the render callback.
const RESERVED_PROPS: &[&str] = &[
    "location",
    "routes",
    "actions",
    "dispatch_on_first_activation",
    "dispatch_on_input_change",
    "placeholder",
];

/// Monotonically increasing identifier of a dispatch cycle; a resolution
/// carrying anything other than the latest id is ignored.
pub type CycleId = u64;

/// Activation input for [`DispatchGate::activate`].
pub struct GateInput {
    pub location: Location,
    pub routes: Vec<RouteDescriptor>,
    pub actions: ActionSpec,
    /// Trigger a dispatch cycle on activation, before the first render.
    pub dispatch_on_first_activation: bool,
    /// Trigger dispatch cycles when observed inputs change.  With this
    /// off, changed inputs are still tracked but never dispatch.
    pub dispatch_on_input_change: bool,
    pub placeholder: Renderable,
    pub render: Option<RenderFn>,
    pub props: Props,
}

impl GateInput {
    pub fn new(location: Location, actions: ActionSpec) -> Self {
        Self {
            location,
            routes: Vec::new(),
            actions,
            dispatch_on_first_activation: false,
            dispatch_on_input_change: true,
            placeholder: Renderable::default(),
            render: None,
            props: Props::new(),
        }
    }
}

/// Partial update delivered by the hosting environment when it observes
/// new inputs.  Absent fields count as unchanged.
#[derive(Clone, Debug, Default)]
pub struct InputChange {
    pub location: Option<Location>,
    pub actions: Option<ActionSpec>,
}

impl InputChange {
    pub fn location(location: Location) -> Self {
        Self {
            location: Some(location),
            actions: None,
        }
    }

    pub fn actions(actions: ActionSpec) -> Self {
        Self {
            location: None,
            actions: Some(actions),
        }
    }
}

/// Snapshot of the gate's readiness state.
///
/// `previous_location` is non-`None` exactly while a dispatch is in
/// flight, holding the location that was current immediately before the
/// triggering change so a second change arriving before resolution still
/// compares against the right baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct Readiness {
    pub has_dispatched: bool,
    pub previous_location: Option<Location>,
}

struct GateState {
    location: Location,
    actions: ActionSet,
    has_dispatched: bool,
    previous_location: Option<Location>,
    cycle: CycleId,
}

struct GateInner {
    dispatcher: Arc<dyn ActionDispatcher>,
    routes: Vec<RouteDescriptor>,
    dispatch_on_input_change: bool,
    placeholder: Renderable,
    render: Option<RenderFn>,
    extra_props: Props,
    ready: Ready,
    state: Mutex<GateState>,
}

/// The dispatch-coordination state machine.
///
/// Sequences "prepare, then reveal": on activation and on every observed
/// change of location or action set it decides whether a dispatch cycle
/// is warranted, flips unready while one is in flight, and flips ready
/// again when the latest cycle resolves.  State transitions happen
/// synchronously on the caller's thread of control; only the dispatcher
/// resolution itself is awaited, so notifications arriving during a
/// pending cycle are processed without waiting for it.
///
/// Cloning shares the same gate instance.
#[derive(Clone)]
pub struct DispatchGate {
    inner: Arc<GateInner>,
}

/// One run of "mark not-ready, invoke the dispatcher, mark ready on
/// resolution", returned by whichever gate method triggered it.
///
/// The gate never spawns; the host decides whether to await the cycle in
/// place or hand it to an executor.  There is no cancellation: a cycle
/// dropped before running still counts as resolved for its own id, so
/// readiness cannot wedge on a discarded future.
#[must_use = "a dispatch cycle does nothing until run"]
pub struct DispatchCycle {
    gate: DispatchGate,
    cycle: CycleId,
    request: Option<(ActionGroups, RouteContext)>,
}

impl DispatchGate {
    /// Activates a gate from its input and an injected dispatcher.
    ///
    /// The initial readiness flag is the negation of
    /// `dispatch_on_first_activation`; when that flag is set, the second
    /// element holds the already-triggered first cycle, with the current
    /// location serving as both old and new.
    pub fn activate(
        input: GateInput,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> (Self, Option<DispatchCycle>) {
        let GateInput {
            location,
            routes,
            actions,
            dispatch_on_first_activation,
            dispatch_on_input_change,
            placeholder,
            render,
            mut props,
        } = input;
        props.retain(|key, _| !RESERVED_PROPS.contains(&key.as_str()));
        let has_dispatched = !dispatch_on_first_activation;

        let gate = Self {
            inner: Arc::new(GateInner {
                dispatcher,
                routes,
                dispatch_on_input_change,
                placeholder,
                render,
                extra_props: props,
                ready: Ready::new(has_dispatched),
                state: Mutex::new(GateState {
                    location,
                    actions: ActionSet::normalize(actions),
                    has_dispatched,
                    previous_location: None,
                    cycle: 0,
                }),
            }),
        };

        let cycle = dispatch_on_first_activation.then(|| {
            let mut state = gate.inner.state.lock().unwrap();
            gate.begin_cycle(&mut state, None)
        });
        (gate, cycle)
    }

    /// Processes a change notification.
    ///
    /// Unchanged inputs are free: no state mutation, no dispatch.  A
    /// changed location or action set records the pre-change location,
    /// stores the new inputs, and triggers a cycle, unless
    /// `dispatch_on_input_change` is off, in which case the inputs are
    /// tracked silently.
    pub fn on_input_change(&self, change: InputChange) -> Option<DispatchCycle> {
        let mut state = self.inner.state.lock().unwrap();

        let location_changed = change
            .location
            .as_ref()
            .is_some_and(|next| *next != state.location);
        let next_actions = change.actions.map(ActionSet::normalize);
        let actions_changed = next_actions
            .as_ref()
            .is_some_and(|next| *next != state.actions);

        if !location_changed && !actions_changed {
            trace!("inputs unchanged, nothing to dispatch");
            return None;
        }
        if let Some(next) = next_actions.filter(|_| actions_changed) {
            state.actions = next;
        }
        if !self.inner.dispatch_on_input_change {
            if let Some(next) = change.location.filter(|_| location_changed) {
                state.location = next;
            }
            debug!("input changed but dispatch on change is off");
            return None;
        }
        let next_location = change.location.filter(|_| location_changed);
        Some(self.begin_cycle(&mut state, next_location))
    }

    /// Marks the resolution of cycle `cycle`.
    ///
    /// Only the latest cycle resolves the gate; a stale id is ignored so
    /// an overlapping older cycle cannot clear state set by a newer one.
    /// Returns whether the resolution took effect.
    pub fn on_dispatch_resolved(&self, cycle: CycleId) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        if cycle != state.cycle {
            debug!(cycle, latest = state.cycle, "stale dispatch resolution ignored");
            return false;
        }
        state.has_dispatched = true;
        state.previous_location = None;
        self.inner.ready.set(true);
        debug!(cycle, "dispatch resolved, gate ready");
        true
    }

    /// The render decision: placeholder while unready, then the render
    /// callback's output, or nothing when no callback was supplied.
    pub fn render(&self) -> Fragment {
        let has_dispatched = self.inner.state.lock().unwrap().has_dispatched;
        if !has_dispatched {
            return self.inner.placeholder.render();
        }
        match &self.inner.render {
            Some(render) => render(&self.inner.routes, &self.inner.extra_props),
            None => Fragment::empty(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        let state = self.inner.state.lock().unwrap();
        Readiness {
            has_dispatched: state.has_dispatched,
            previous_location: state.previous_location.clone(),
        }
    }

    /// The readiness flag as an awaitable signal.
    pub fn ready(&self) -> Ready {
        self.inner.ready.clone()
    }

    /// Shorthand for `self.ready().subscribe()`.
    pub fn subscribe(&self) -> ReadySubscription {
        self.inner.ready.subscribe()
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.inner.routes
    }

    pub fn location(&self) -> Location {
        self.inner.state.lock().unwrap().location.clone()
    }

    /// The currently stored, normalized action set.
    pub fn action_set(&self) -> ActionSet {
        self.inner.state.lock().unwrap().actions.clone()
    }

    fn begin_cycle(&self, state: &mut GateState, next_location: Option<Location>) -> DispatchCycle {
        state.previous_location = Some(state.location.clone());
        if let Some(next) = next_location {
            state.location = next;
        }
        state.has_dispatched = false;
        state.cycle += 1;
        self.inner.ready.set(false);

        let context = RouteContext {
            routes: self.inner.routes.clone(),
            location: state.location.clone(),
        };
        let groups = state.actions.resolve(&context);
        debug!(cycle = state.cycle, location = ?state.location, "dispatch cycle triggered");
        DispatchCycle {
            gate: self.clone(),
            cycle: state.cycle,
            request: Some((groups, context)),
        }
    }
}

impl std::fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().unwrap();
        f.debug_struct("DispatchGate")
            .field("has_dispatched", &state.has_dispatched)
            .field("previous_location", &state.previous_location)
            .field("cycle", &state.cycle)
            .finish()
    }
}

impl DispatchCycle {
    pub fn id(&self) -> CycleId {
        self.cycle
    }

    /// Runs the cycle to resolution.
    ///
    /// The dispatcher is invoked exactly once; success and failure are
    /// both "done" for gating purposes, with failure logged and left to
    /// the dispatcher's own policy.
    pub async fn run(mut self) {
        let Some((groups, context)) = self.request.take() else {
            return;
        };
        if let Err(err) = self.gate.inner.dispatcher.dispatch(groups, context).await {
            warn!(cycle = self.cycle, %err, "action dispatch failed, treated as resolved");
        }
        self.gate.on_dispatch_resolved(self.cycle);
    }
}

impl Drop for DispatchCycle {
    fn drop(&mut self) {
        // a cycle dropped before running still counts as resolved
        if self.request.is_some() {
            self.gate.on_dispatch_resolved(self.cycle);
        }
    }
}

impl std::fmt::Debug for DispatchCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchCycle")
            .field("cycle", &self.cycle)
            .field("pending", &self.request.is_some())
            .finish()
    }
}
