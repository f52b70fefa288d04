//! Pointer gesture/drag controller (): turns a raw pointer
//! stream into tap/pan/pinch/drag bus events and wires their default
//! actions into [`diagraph_camera::Camera`] and [`diagraph_store::GraphStore`].

mod config;
mod controller;
mod input;
mod state;

pub use config::GestureConfig;
pub use controller::GestureController;
pub use input::{Modifiers, PointerId, PointerInput};
