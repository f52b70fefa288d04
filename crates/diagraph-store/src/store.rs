//! The graph-wide entity store: the only mutable-shared
//! state in the engine.

use crate::entity::{Anchor, Block, BlockPatch, Connection, ConnectionPatch, Group};
use crate::table::EntityTable;
use diagraph_reactive::Computed;
use diagraph_types::{EntityId, Rect};

#[derive(Clone, Default)]
pub struct GraphStore {
    pub blocks: EntityTable<Block>,
    pub connections: EntityTable<Connection>,
    pub anchors: EntityTable<Anchor>,
    pub groups: EntityTable<Group>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_blocks(&self, blocks: Vec<Block>) -> bool {
        self.blocks.set_all(blocks)
    }

    /// Apply field-level patches to existing blocks. Patches for unknown
    /// ids are logged and skipped — `update_blocks` never creates entities.
    pub fn update_blocks(&self, patches: Vec<BlockPatch>) {
        for patch in patches {
            if !self.blocks.patch(&patch.id, |block| block.apply_patch(&patch)) {
                tracing::debug!(id = %patch.id, "update_blocks: patch for unknown block id ignored");
            }
        }
    }

    pub fn set_connections(&self, connections: Vec<Connection>) -> bool {
        self.connections.set_all(connections)
    }

    pub fn update_connections(&self, patches: Vec<ConnectionPatch>) {
        for patch in patches {
            if !self
                .connections
                .patch(&patch.id, |conn| conn.apply_patch(&patch))
            {
                tracing::debug!(id = %patch.id, "update_connections: patch for unknown connection id ignored");
            }
        }
    }

    pub fn set_anchors(&self, anchors: Vec<Anchor>) -> bool {
        self.anchors.set_all(anchors)
    }

    pub fn set_groups(&self, groups: Vec<Group>) -> bool {
        self.groups.set_all(groups)
    }

    /// Move a single block. The only geometry-mutation path besides
    /// `set_blocks`/`update_blocks` — used by the drag controller. These
    /// are the only paths that write geometry.
    pub fn set_xy(&self, id: &EntityId, x: f64, y: f64) -> bool {
        self.blocks.patch(id, |block| {
            block.x = x;
            block.y = y;
        })
    }

    /// The authoritative rect for a group: its explicit `rect` if set,
    /// otherwise the bounding union of its member blocks' rects.
    pub fn group_rect(&self, group: &Group) -> Option<Rect> {
        if let Some(rect) = group.rect {
            return Some(rect);
        }
        Rect::union_all(
            group
                .member_blocks
                .iter()
                .filter_map(|id| self.blocks.get(id))
                .map(|signal| signal.peek().rect()),
        )
    }

    /// A lazily-recomputed view of [`GraphStore::group_rect`] for one
    /// group, re-evaluated whenever the group record or any member
    /// block's signal changes. Build one per group a component actually
    /// renders; the store itself does not cache these (groups come and go
    /// with `set_groups`, and a stale `Computed` would outlive its group).
    pub fn group_rect_computed(&self, group_id: EntityId) -> Computed<Option<Rect>> {
        let store = self.clone();
        Computed::new(move || {
            let Some(group_signal) = store.groups.get(&group_id) else {
                return None;
            };
            let group = group_signal.get();
            store.group_rect(&group)
        })
    }

    /// Ids of connections that are live, i.e. both endpoints
    /// resolve to a currently-stored block. Invalid connections are
    /// skipped in render but retained in the store.
    pub fn live_connection_ids(&self) -> Vec<EntityId> {
        let live_blocks: ahash::HashSet<EntityId> = self.blocks.ids().peek().into_iter().collect();
        self.connections
            .snapshot()
            .into_iter()
            .filter(|conn| conn.is_live(&live_blocks))
            .map(|conn| conn.id)
            .collect()
    }
}
