//! Geometry primitives shared across the diagraph workspace.
//!
//! World space is an unbounded `f64` plane; screen space is pixels into the
//! host surface. Both are represented with the same [`Point`]/[`Rect`] types
//! — callers are expected to know which space a value lives in from context,
//! the same way the rest of the workspace threads "world" vs "screen"
//! through function names rather than the type system.

mod point;
mod rect;
mod transform;

pub use point::Point;
pub use rect::Rect;
pub use transform::Transform2D;

/// An entity id: either an interned string or a small integer, matching
/// the "stable string-or-integer id" requirement for block,
/// connection, anchor and group identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum EntityId {
    /// A caller-supplied string id (the common case — host applications
    /// usually key blocks by a UUID or slug).
    Str(String),
    /// A caller-supplied integer id.
    Int(i64),
}

impl EntityId {
    /// Construct a string id.
    pub fn from_str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for EntityId {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Direction an anchor faces relative to its owning block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorDirection {
    /// Incoming connections terminate here.
    In,
    /// Outgoing connections originate here.
    Out,
}

/// Policy controlling whether a user drag may mutate a block's `x`/`y`.
/// Shared between the engine-facing configuration layer and the gesture
/// controller that has to enforce it, so it lives below both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CanChangeBlockGeometry {
    /// Drag never mutates block geometry; the default action is suppressed
    /// entirely and only `prevent_default`-style custom handlers can move
    /// anything.
    None,
    /// Only anchor-originated drags (port repositioning) may move
    /// geometry; whole-block drags are rejected by the default action.
    OnlyAnchor,
    /// Any drag that resolves to a block may move it. The permissive
    /// default — most graph editors start fully interactive and dial
    /// restrictions in afterward.
    All,
}

impl Default for CanChangeBlockGeometry {
    fn default() -> Self {
        Self::All
    }
}
