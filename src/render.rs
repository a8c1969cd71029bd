use std::{fmt, sync::Arc};

use crate::route::{Props, RouteDescriptor};

/// A rendered markup fragment.
///
/// The empty fragment means "produce nothing" and is distinct from an
/// empty container such as `<div></div>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// A fragment holding already-formed markup.
    pub fn raw(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Wraps a bare markup token in a minimal container.
    pub fn container(inner: &str) -> Self {
        Self(format!("<div>{inner}</div>"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_markup(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placeholder in one of its accepted shapes, normalized once at
/// activation time instead of re-branching on runtime shape every render.
///
/// A literal string is wrapped in a minimal container up front; a
/// component type or zero-argument component factory becomes `Factory`
/// and is invoked per render.
#[derive(Clone)]
pub enum Renderable {
    Fragment(Fragment),
    Factory(Arc<dyn Fn() -> Fragment + Send + Sync>),
}

impl Renderable {
    pub fn factory(f: impl Fn() -> Fragment + Send + Sync + 'static) -> Self {
        Self::Factory(Arc::new(f))
    }

    pub fn render(&self) -> Fragment {
        match self {
            Self::Fragment(fragment) => fragment.clone(),
            Self::Factory(f) => f(),
        }
    }
}

impl Default for Renderable {
    fn default() -> Self {
        Self::Fragment(Fragment::container(""))
    }
}

impl From<&str> for Renderable {
    fn from(markup: &str) -> Self {
        Self::Fragment(Fragment::container(markup))
    }
}

impl From<String> for Renderable {
    fn from(markup: String) -> Self {
        Self::Fragment(Fragment::container(&markup))
    }
}

impl From<Fragment> for Renderable {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl fmt::Debug for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragment(fragment) => f.debug_tuple("Fragment").field(fragment).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Render callback invoked once the gate is ready, with the matched
/// routes and the pass-through props.
pub type RenderFn = Arc<dyn Fn(&[RouteDescriptor], &Props) -> Fragment + Send + Sync>;
