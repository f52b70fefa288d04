//! Host-facing configuration.
//!
//! `GraphConfig` is the `serde`-deserializable shape a host assembles (by
//! hand, or by loading JSON/TOML) to construct a [`crate::Graph`]. Every
//! recognised configuration key has a field here except
//! `block_components`/`connection_components`: those map a `kind_tag` to a
//! *constructor*, which isn't data a config file can carry — hosts register
//! those through [`crate::Graph::register_block_kind`] /
//! [`crate::Graph::register_connection_kind`] instead (see `DESIGN.md`).

use diagraph_camera::ScaleThresholds;
use diagraph_components::{Color, Palette};
use diagraph_foundation::Error;
use diagraph_store::{Anchor, Block, Connection, Group};
use serde::{Deserialize, Serialize};

/// `settings.canChangeBlockGeometry`: controls whether user drag may
/// mutate block x/y. Defined in `diagraph-types` so the gesture controller
/// that enforces it can read the same type without depending back on this
/// crate.
pub use diagraph_types::CanChangeBlockGeometry;

/// `settings`: the nested, recognised configuration keys
/// besides the dispatch tables (see module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub can_change_block_geometry: CanChangeBlockGeometry,
    pub use_blocks_anchors: bool,
    pub show_connection_arrows: bool,
    pub show_connection_labels: bool,
    pub use_bezier_connections: bool,
    pub can_create_new_connections: bool,
    pub can_drag_camera: bool,
    pub can_zoom_camera: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            can_change_block_geometry: CanChangeBlockGeometry::default(),
            use_blocks_anchors: true,
            show_connection_arrows: true,
            show_connection_labels: true,
            use_bezier_connections: false,
            can_create_new_connections: true,
            can_drag_camera: true,
            can_zoom_camera: true,
        }
    }
}

/// `layers: [{type, props} ...]`: one entry per layer to
/// construct. `props` is an opaque bag the host's layer factory for
/// `type_tag` interprets; the engine only uses `z_index` to place the
/// layer in its [`diagraph_layer::LayerStack`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub props: serde_json::Value,
}

/// `view_configuration.colors`: a deep-partial override of
/// [`Palette`] broadcast through component context. Every field absent
/// from the override keeps the base palette's value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaletteOverride {
    pub fill: Option<u32>,
    pub fill_selected: Option<u32>,
    pub border: Option<u32>,
    pub text: Option<u32>,
    pub stroke: Option<u32>,
    pub stroke_selected: Option<u32>,
}

impl PaletteOverride {
    /// Apply this override on top of `base`, field by field.
    pub fn apply(&self, base: Palette) -> Palette {
        Palette {
            fill: self.fill.map(Color).unwrap_or(base.fill),
            fill_selected: self.fill_selected.map(Color).unwrap_or(base.fill_selected),
            border: self.border.map(Color).unwrap_or(base.border),
            text: self.text.map(Color).unwrap_or(base.text),
            stroke: self.stroke.map(Color).unwrap_or(base.stroke),
            stroke_selected: self.stroke_selected.map(Color).unwrap_or(base.stroke_selected),
        }
    }
}

/// `view_configuration.constants`: the spacing/sizing
/// constants this workspace otherwise hard-codes (anchor radius, port
/// snap radius, connection stroke threshold, LoD scale thresholds),
/// collected so a host can retune them without recompiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConstants {
    pub anchor_radius: f64,
    pub port_snap_radius: f64,
    pub connection_stroke_threshold_px: f64,
    pub scale_tau_0: f64,
    pub scale_tau_1: f64,
}

impl Default for GraphConstants {
    fn default() -> Self {
        let thresholds = ScaleThresholds::default();
        Self {
            anchor_radius: 3.0,
            port_snap_radius: 12.0,
            connection_stroke_threshold_px: 6.0,
            scale_tau_0: thresholds.tau_0,
            scale_tau_1: thresholds.tau_1,
        }
    }
}

impl GraphConstants {
    pub fn scale_thresholds(&self) -> ScaleThresholds {
        ScaleThresholds::new(self.scale_tau_0, self.scale_tau_1)
    }
}

/// `view_configuration`: the palette and constants overrides
/// broadcast through component context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfiguration {
    pub colors: PaletteOverride,
    pub constants: GraphConstants,
}

/// The full configuration a [`crate::Graph`] is constructed from.
/// `configurationName` is informational only — the engine
/// never branches on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConfig {
    pub configuration_name: String,
    pub blocks: Vec<Block>,
    pub connections: Vec<Connection>,
    pub anchors: Vec<Anchor>,
    pub groups: Vec<Group>,
    pub settings: Settings,
    pub layers: Vec<LayerSpec>,
    pub view_configuration: ViewConfiguration,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            configuration_name: String::new(),
            blocks: Vec::new(),
            connections: Vec::new(),
            anchors: Vec::new(),
            groups: Vec::new(),
            settings: Settings::default(),
            layers: Vec::new(),
            view_configuration: ViewConfiguration::default(),
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl GraphConfig {
    /// Validate the recognised invariants placed on the
    /// initial data: block/connection/anchor/group id uniqueness, block
    /// `w`/`h` positivity, and anchors referencing their declared owner.
    /// Returns the first violation found; validation errors are
    /// caller-visible, surfaced synchronously.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen_blocks = ahash::HashSet::default();
        for block in &self.blocks {
            if !seen_blocks.insert(&block.id) {
                return Err(Error::duplicate_id("block", &block.id));
            }
            if block.w <= 0.0 {
                return Err(Error::invalid_value("block", format!("{}: w must be > 0", block.id)));
            }
            if block.h <= 0.0 {
                return Err(Error::invalid_value("block", format!("{}: h must be > 0", block.id)));
            }
        }

        let mut seen_anchors = ahash::HashSet::default();
        for anchor in &self.anchors {
            if !seen_anchors.insert(&anchor.id) {
                return Err(Error::duplicate_id("anchor", &anchor.id));
            }
            if !seen_blocks.contains(&anchor.owner_block) {
                return Err(Error::unknown_id("block", &anchor.owner_block));
            }
        }

        let mut seen_connections = ahash::HashSet::default();
        for connection in &self.connections {
            if !seen_connections.insert(&connection.id) {
                return Err(Error::duplicate_id("connection", &connection.id));
            }
        }

        let mut seen_groups = ahash::HashSet::default();
        for group in &self.groups {
            if !seen_groups.insert(&group.id) {
                return Err(Error::duplicate_id("group", &group.id));
            }
        }

        Ok(())
    }
}
