//! Block/connection/anchor/group entity tables as reactive signals.

mod entity;
mod fingerprint;
mod store;
mod table;

pub use entity::{Anchor, Block, BlockPatch, Connection, ConnectionPatch, Group, Identified};
pub use fingerprint::ids_changed;
pub use store::GraphStore;
pub use table::EntityTable;
