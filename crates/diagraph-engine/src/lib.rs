//! The public entry point: a host constructs one [`Graph`] per diagram
//! instance from a [`GraphConfig`], registers any custom block/connection
//! kinds, then drives it with [`Graph::run_frame`] once per display
//! refresh.

pub mod config;
pub mod graph;
pub mod root;

pub use config::{
    CanChangeBlockGeometry, GraphConfig, GraphConstants, LayerSpec, PaletteOverride, Settings,
    ViewConfiguration,
};
pub use graph::{Graph, ZoomTarget};
pub use root::{GraphRoot, GraphRootProps, RootRenderOptions, GRAPH_ROOT_TYPE_TAG};
