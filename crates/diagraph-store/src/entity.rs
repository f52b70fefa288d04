//! Entity record types (Data Model).

use diagraph_types::{AnchorDirection, EntityId, Point, Rect};

/// Any entity stored in an [`crate::EntityTable`].
pub trait Identified {
    fn entity_id(&self) -> &EntityId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: EntityId,
    pub kind_tag: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub name: String,
    pub group: Option<EntityId>,
    pub selected: bool,
    pub anchors: Vec<EntityId>,
    pub user_meta: serde_json::Value,
}

impl Block {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn apply_patch(&mut self, patch: &BlockPatch) {
        if let Some(v) = &patch.kind_tag {
            self.kind_tag = v.clone();
        }
        if let Some(v) = patch.x {
            self.x = v;
        }
        if let Some(v) = patch.y {
            self.y = v;
        }
        if let Some(v) = patch.w {
            self.w = v;
        }
        if let Some(v) = patch.h {
            self.h = v;
        }
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.group {
            self.group = v.clone();
        }
        if let Some(v) = patch.selected {
            self.selected = v;
        }
        if let Some(v) = &patch.anchors {
            self.anchors = v.clone();
        }
        if let Some(v) = &patch.user_meta {
            self.user_meta = v.clone();
        }
    }
}

impl Identified for Block {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

/// A partial update to an existing [`Block`], applied field-by-field
/// (`update_blocks(list_partial)`). `None` means "leave
/// unchanged"; there is no way to explicitly clear `group` back to `None`
/// through a patch — use `set_blocks` for that.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPatch {
    pub id: EntityId,
    pub kind_tag: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub name: Option<String>,
    pub group: Option<Option<EntityId>>,
    pub selected: Option<bool>,
    pub anchors: Option<Vec<EntityId>>,
    pub user_meta: Option<serde_json::Value>,
}

impl BlockPatch {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            kind_tag: None,
            x: None,
            y: None,
            w: None,
            h: None,
            name: None,
            group: None,
            selected: None,
            anchors: None,
            user_meta: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: EntityId,
    pub kind_tag: String,
    pub source_block: EntityId,
    pub target_block: EntityId,
    pub source_anchor: Option<EntityId>,
    pub target_anchor: Option<EntityId>,
    pub selected: bool,
    pub label: Option<String>,
    pub dashed: Option<bool>,
    pub styles: Option<serde_json::Value>,
    pub points: Option<Vec<Point>>,
    pub user_meta: serde_json::Value,
}

impl Identified for Connection {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPatch {
    pub id: EntityId,
    pub kind_tag: Option<String>,
    pub source_block: Option<EntityId>,
    pub target_block: Option<EntityId>,
    pub source_anchor: Option<Option<EntityId>>,
    pub target_anchor: Option<Option<EntityId>>,
    pub selected: Option<bool>,
    pub label: Option<Option<String>>,
    pub dashed: Option<Option<bool>>,
    pub styles: Option<Option<serde_json::Value>>,
    pub points: Option<Option<Vec<Point>>>,
    pub user_meta: Option<serde_json::Value>,
}

impl ConnectionPatch {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            kind_tag: None,
            source_block: None,
            target_block: None,
            source_anchor: None,
            target_anchor: None,
            selected: None,
            label: None,
            dashed: None,
            styles: None,
            points: None,
            user_meta: None,
        }
    }
}

impl Connection {
    pub fn apply_patch(&mut self, patch: &ConnectionPatch) {
        if let Some(v) = &patch.kind_tag {
            self.kind_tag = v.clone();
        }
        if let Some(v) = &patch.source_block {
            self.source_block = v.clone();
        }
        if let Some(v) = &patch.target_block {
            self.target_block = v.clone();
        }
        if let Some(v) = &patch.source_anchor {
            self.source_anchor = v.clone();
        }
        if let Some(v) = &patch.target_anchor {
            self.target_anchor = v.clone();
        }
        if let Some(v) = patch.selected {
            self.selected = v;
        }
        if let Some(v) = &patch.label {
            self.label = v.clone();
        }
        if let Some(v) = &patch.dashed {
            self.dashed = *v;
        }
        if let Some(v) = &patch.styles {
            self.styles = v.clone();
        }
        if let Some(v) = &patch.points {
            self.points = v.clone();
        }
        if let Some(v) = &patch.user_meta {
            self.user_meta = v.clone();
        }
    }

    /// Whether this connection is renderable: both endpoints must resolve
    /// to live blocks. Invalid connections are skipped in render but
    /// retained in the store so later insertion can re-activate them.
    pub fn is_live(&self, live_block_ids: &ahash::HashSet<EntityId>) -> bool {
        live_block_ids.contains(&self.source_block) && live_block_ids.contains(&self.target_block)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: EntityId,
    pub owner_block: EntityId,
    pub direction: AnchorDirection,
    pub position_hint: Point,
    pub user_meta: serde_json::Value,
}

impl Identified for Anchor {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: EntityId,
    /// Explicit rect override. When `None`, the rect is derived from
    /// `member_blocks`' bounding union (see `crate::store::GraphStore::group_rect`).
    pub rect: Option<Rect>,
    pub name: String,
    pub member_blocks: Vec<EntityId>,
}

impl Identified for Group {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}
