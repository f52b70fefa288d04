//! Tunables for the gesture controller.

use diagraph_types::CanChangeBlockGeometry;

/// Thresholds that classify a pointer stream, plus the host-facing policy
/// flags the default pan/zoom/drag actions must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Screen-space movement, in pixels, beyond which a press is no longer
    /// a candidate tap.
    pub tap_slop: f64,
    /// Seconds within which a press must release (without exceeding
    /// `tap_slop`) to count as a tap.
    pub tap_timeout: f64,
    /// World-space grid a dragged block's position snaps to.
    /// `<= 1.0` is a no-op (Open Question b).
    pub snap_grid_size: f64,
    /// Whether the default pan action may move the camera at all. `false`
    /// still lets a host's own `PAN_MOVE` handler move it explicitly.
    pub can_drag_camera: bool,
    /// Whether the default pinch action may zoom the camera.
    pub can_zoom_camera: bool,
    /// Whether the default drag action may mutate a block's `x`/`y`.
    pub can_change_block_geometry: CanChangeBlockGeometry,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_slop: 4.0,
            tap_timeout: 0.3,
            snap_grid_size: 1.0,
            can_drag_camera: true,
            can_zoom_camera: true,
            can_change_block_geometry: CanChangeBlockGeometry::default(),
        }
    }
}
