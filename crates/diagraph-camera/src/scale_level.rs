//! Discrete classification of camera scale into level-of-detail bands.

/// Level-of-detail band selected by the current camera scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleLevel {
    /// Below `tau_0`: fill-only rendering.
    Minimalistic,
    /// `tau_0 <= scale < tau_1`: filled shape, border, centred label.
    Schematic,
    /// `scale >= tau_1`: full body with anchors and inner content.
    Detailed,
}

/// The pair of thresholds that partition scale into [`ScaleLevel`] bands.
/// Exposed here as configuration rather than hard-coded constants so a
/// host can tune LoD switching to its own content density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleThresholds {
    pub tau_0: f64,
    pub tau_1: f64,
}

impl ScaleThresholds {
    pub fn new(tau_0: f64, tau_1: f64) -> Self {
        assert!(tau_0 > 0.0 && tau_1 > tau_0, "thresholds must be positive and increasing");
        Self { tau_0, tau_1 }
    }

    pub fn classify(&self, scale: f64) -> ScaleLevel {
        if scale < self.tau_0 {
            ScaleLevel::Minimalistic
        } else if scale < self.tau_1 {
            ScaleLevel::Schematic
        } else {
            ScaleLevel::Detailed
        }
    }
}

impl Default for ScaleThresholds {
    /// Defaults chosen so a scale of 1.0 (no zoom) renders Schematic — the
    /// common case — while zooming out drops to Minimalistic and zooming
    /// in reveals Detailed.
    fn default() -> Self {
        Self {
            tau_0: 0.5,
            tau_1: 1.5,
        }
    }
}
