// ABOUTME: Phantom-typed identifiers for cluster-side resources.
// ABOUTME: A ContainerId cannot be passed where a NetworkId is expected.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Empty enums as markers: no instantiation, no trait bounds.
pub enum ContainerMarker {}
pub enum NetworkMarker {}

/// An opaque identifier handed back by the control plane.
///
/// The phantom parameter keeps ids for different resource kinds apart at
/// compile time. The value is whatever the control plane printed (a
/// container hash, a network name) and is never parsed.
#[must_use = "ids reference live cluster resources"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// T is phantom, so derives would wrongly require T: Clone etc.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

pub type ContainerId = Id<ContainerMarker>;
pub type NetworkId = Id<NetworkMarker>;
