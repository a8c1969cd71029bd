use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::route::RouteContext;

/// Identifier of a single preparation action, resolved to actual work by
/// the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered groups of action identifiers; each group runs together as one
/// logical unit.
pub type ActionGroups = Vec<Vec<ActionId>>;

/// An action set produced lazily at dispatch time from the cycle's route
/// context.
///
/// Change detection compares these by reference identity only, so a
/// freshly built `DeferredActions` always counts as changed even when it
/// is behaviorally identical to the stored one.  Cloning preserves
/// identity.
#[derive(Clone)]
pub struct DeferredActions(Arc<dyn Fn(&RouteContext) -> ActionGroups + Send + Sync>);

impl DeferredActions {
    pub fn new(f: impl Fn(&RouteContext) -> ActionGroups + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, context: &RouteContext) -> ActionGroups {
        (self.0)(context)
    }
}

impl PartialEq for DeferredActions {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DeferredActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredActions(..)")
    }
}

/// The caller-facing shape of "what to run before revealing content".
#[derive(Clone, Debug)]
pub enum ActionSpec {
    /// A bare single identifier.
    One(ActionId),
    /// A flat list of identifiers, run as one group.
    Flat(Vec<ActionId>),
    /// A list already composed of groups, passed through unchanged.
    Groups(ActionGroups),
    /// A function invoked at dispatch time, never normalized ahead of it.
    Deferred(DeferredActions),
}

/// The normalized stored form of an [`ActionSpec`].
#[derive(Clone, Debug, PartialEq)]
pub enum ActionSet {
    Static(ActionGroups),
    Deferred(DeferredActions),
}

impl ActionSet {
    /// Normalizes a spec into its stored form: a bare identifier becomes
    /// a single one-element group, a flat list becomes a single group,
    /// groups pass through, and a deferred function is stored as-is.
    pub fn normalize(spec: ActionSpec) -> Self {
        match spec {
            ActionSpec::One(id) => Self::Static(vec![vec![id]]),
            ActionSpec::Flat(ids) => Self::Static(vec![ids]),
            ActionSpec::Groups(groups) => Self::Static(groups),
            ActionSpec::Deferred(f) => Self::Deferred(f),
        }
    }

    /// The static groups, when this set is not deferred.
    pub fn groups(&self) -> Option<&ActionGroups> {
        match self {
            Self::Static(groups) => Some(groups),
            Self::Deferred(_) => None,
        }
    }

    /// Produces the groups a dispatch cycle will run, invoking a deferred
    /// set with the cycle's context.
    pub fn resolve(&self, context: &RouteContext) -> ActionGroups {
        match self {
            Self::Static(groups) => groups.clone(),
            Self::Deferred(f) => f.resolve(context),
        }
    }
}

impl From<ActionSpec> for ActionSet {
    fn from(spec: ActionSpec) -> Self {
        Self::normalize(spec)
    }
}
