//! A uniform grid over world space: O(1) cell lookup, incrementally
//! maintained (— "a uniform grid or R-tree both satisfy
//! this; incremental maintenance is required").

use diagraph_types::{EntityId, Rect};
use std::collections::HashMap;

type CellCoord = (i64, i64);

pub(crate) struct UniformGrid {
    cell_size: f64,
    cells: HashMap<CellCoord, Vec<EntityId>, ahash::RandomState>,
}

impl UniformGrid {
    pub(crate) fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "grid cell size must be positive");
        Self {
            cell_size,
            cells: HashMap::default(),
        }
    }

    fn cell_of(&self, x: f64, y: f64) -> CellCoord {
        ((x / self.cell_size).floor() as i64, (y / self.cell_size).floor() as i64)
    }

    fn cells_for_rect(&self, rect: &Rect) -> impl Iterator<Item = CellCoord> {
        let (min_cx, min_cy) = self.cell_of(rect.min_x(), rect.min_y());
        let (max_cx, max_cy) = self.cell_of(rect.max_x(), rect.max_y());
        (min_cx..=max_cx).flat_map(move |cx| (min_cy..=max_cy).map(move |cy| (cx, cy)))
    }

    pub(crate) fn insert(&mut self, id: &EntityId, rect: &Rect) {
        for cell in self.cells_for_rect(rect) {
            self.cells.entry(cell).or_default().push(id.clone());
        }
    }

    pub(crate) fn remove(&mut self, id: &EntityId, rect: &Rect) {
        for cell in self.cells_for_rect(rect) {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|existing| existing != id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Candidate ids whose cell overlaps `rect`, deduplicated. Candidates
    /// still need an authoritative rect check against the caller's entry
    /// table — cells are a coarse bucket, not an exact membership test.
    pub(crate) fn candidates_for_rect(&self, rect: &Rect) -> Vec<EntityId> {
        let mut seen = ahash::HashSet::default();
        let mut out = Vec::new();
        for cell in self.cells_for_rect(rect) {
            if let Some(bucket) = self.cells.get(&cell) {
                for id in bucket {
                    if seen.insert(id.clone()) {
                        out.push(id.clone());
                    }
                }
            }
        }
        out
    }

    pub(crate) fn candidates_for_point(&self, x: f64, y: f64) -> Vec<EntityId> {
        let cell = self.cell_of(x, y);
        self.cells.get(&cell).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_inside_a_populated_cell_finds_its_candidate() {
        let mut grid = UniformGrid::new(32.0);
        let id = EntityId::from_str("a");
        grid.insert(&id, &Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(grid.candidates_for_point(5.0, 5.0), vec![id]);
    }

    #[test]
    fn remove_clears_every_cell_the_rect_touched() {
        let mut grid = UniformGrid::new(32.0);
        let id = EntityId::from_str("a");
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        grid.insert(&id, &rect);
        grid.remove(&id, &rect);

        assert!(grid.candidates_for_point(50.0, 50.0).is_empty());
    }
}
