use serde::{Deserialize, Serialize};

/// Where the user currently is, as reported by the hosting router.
///
/// The gate treats this as an opaque comparable value: change detection
/// uses whole-value equality and never looks at individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    path: String,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One route matched against the current location by the external
/// route-matching algorithm.  Opaque to the gate; passed through to the
/// dispatcher and the render callback untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub name: String,
    pub path: String,
}

impl RouteDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The matched routes and the location a dispatch cycle was triggered
/// for, handed to the [`ActionDispatcher`](crate::dispatcher::ActionDispatcher)
/// as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteContext {
    pub routes: Vec<RouteDescriptor>,
    pub location: Location,
}

/// Extra props carried alongside the gate's own inputs and passed through
/// to the render callback once the gate's reserved keys are filtered out.
pub type Props = serde_json::Map<String, serde_json::Value>;
