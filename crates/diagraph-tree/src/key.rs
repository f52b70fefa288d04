//! Stable child keys for keyed reconciliation.

/// A stable identity for a child slot across reconciliation passes. Callers
/// typically derive this from the same stable id the entity stores use
/// (`diagraph_types::EntityId`), but the tree kernel itself does not depend
/// on that crate — a key is just an opaque, hashable, clonable string here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildKey(String);

impl ChildKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChildKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChildKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ChildKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
