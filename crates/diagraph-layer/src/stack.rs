//! Stacking multiple layers: layers stack by `z_index`.

use crate::layer::{Layer, LayerId};
use std::rc::Rc;

/// An ordered collection of [`Layer`]s. Layers are kept in insertion
/// order internally; [`LayerStack::in_stack_order`] produces the stable
/// `(z_index, insertion_index)` draw/event order on demand, the same
/// tie-break rule `diagraph-tree` uses for component children.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Rc<Layer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Rc<Layer>) {
        self.layers.push(layer);
    }

    pub fn remove(&mut self, id: LayerId) -> Option<Rc<Layer>> {
        let index = self.layers.iter().position(|l| l.id() == id)?;
        Some(self.layers.remove(index))
    }

    pub fn get(&self, id: LayerId) -> Option<Rc<Layer>> {
        self.layers.iter().find(|l| l.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from bottom to top: ascending `z_index`, ties broken by
    /// insertion order.
    pub fn in_stack_order(&self) -> Vec<Rc<Layer>> {
        let mut ordered = self.layers.clone();
        ordered.sort_by(|a, b| {
            a.z_index()
                .cmp(&b.z_index())
                .then(a.insertion_index().cmp(&b.insertion_index()))
        });
        ordered
    }
}
