//! Built-in block/connection/anchor scene components.
//!
//! Everything here is rendering and hit-registration logic layered on top
//! of `diagraph-tree`'s component kernel, `diagraph-camera`'s scale-level
//! classification, and `diagraph-hittest`'s spatial index. Concrete pixel
//! drawing is deliberately out of scope — components only call through the
//! [`paint::Paint`] trait, which a host implements.

mod anchor;
mod block;
mod connection;
mod geometry;
mod paint;
mod port_snap;
mod registry;

pub use anchor::{AnchorComponent, AnchorProps, ANCHOR_TYPE_TAG};
pub use block::{BlockComponent, BlockProps, BLOCK_TYPE_TAG};
pub use connection::{ConnectionComponent, ConnectionProps, CONNECTION_TYPE_TAG};
pub use geometry::{zoom_scaled_threshold, ConnectionGeometry, Curve};
pub use paint::{Color, GraphRenderContext, Paint, Palette};
pub use port_snap::{default_snap_condition, find_snap_target, PortCandidate};
pub use registry::ComponentRegistry;
