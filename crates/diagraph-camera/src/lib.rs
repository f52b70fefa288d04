//! World/screen affine camera: pan, zoom, fit-to-rect, and scale-level
//! classification for level-of-detail selection.

mod camera;
mod scale_level;

pub use camera::Camera;
pub use scale_level::{ScaleLevel, ScaleThresholds};
