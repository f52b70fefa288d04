//! The two-phase update/render driver () and per-component
//! error quarantine.

use crate::component::{Component, RenderContext};
use crate::node::{Node, NodeId};
use std::rc::Rc;

/// A component panicked during update or render and was quarantined.
#[derive(Debug, Clone)]
pub struct QuarantineEvent {
    pub node_id: NodeId,
    pub type_tag: &'static str,
    pub phase: Phase,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Update,
    Render,
}

/// Owns the root of one component tree and drives its per-frame update and
/// render phases. One `Tree` per graph instance ("Ownership &
/// lifecycle summary").
pub struct Tree {
    root: Rc<Node>,
}

impl Tree {
    pub fn new(root_type_tag: &'static str, root: Box<dyn Component>) -> Self {
        Self {
            root: Node::new(root_type_tag, root),
        }
    }

    pub fn root(&self) -> Rc<Node> {
        self.root.clone()
    }

    pub fn find(&self, id: NodeId) -> Option<Rc<Node>> {
        fn walk(node: &Rc<Node>, id: NodeId) -> Option<Rc<Node>> {
            if node.id() == id {
                return Some(node.clone());
            }
            node.children().iter().find_map(|c| walk(c, id))
        }
        walk(&self.root, id)
    }

    /// Run the update phase top-down over every node whose `needs_update`
    /// flag is set, parents before children. A node whose own
    /// `run_update_cycle` panics is
    /// quarantined and its subtree is *not* descended into this frame —
    /// per , a quarantined component's subtree is hidden until
    /// `set_props` is called again, and that call happens through the
    /// (unaffected) parent's next successful reconciliation, not through
    /// this walk.
    pub fn run_update_phase(&self) -> Vec<QuarantineEvent> {
        let mut events = Vec::new();
        update_node(&self.root, &mut events);
        events
    }

    /// Run the render phase: visit nodes in `(z_index asc, order asc,
    /// insertion_index asc)` order at every level, skipping any node that
    /// is errored, invisible, or does not have `needs_render` set
    ///.
    pub fn run_render_phase(&self, ctx: &mut dyn RenderContext) -> Vec<QuarantineEvent> {
        let mut events = Vec::new();
        render_node(&self.root, ctx, &mut events);
        events
    }
}

fn update_node(node: &Rc<Node>, events: &mut Vec<QuarantineEvent>) {
    if node.is_errored() {
        return;
    }

    if node.needs_update() {
        match node.run_update_cycle() {
            Ok(()) => {
                node.needs_update.set(false);
                node.needs_render.set(true);
            }
            Err(message) => {
                tracing::error!(node = %node.id(), %message, "component errored during update; quarantining subtree");
                node.errored.set(true);
                events.push(QuarantineEvent {
                    node_id: node.id(),
                    type_tag: node.type_tag(),
                    phase: Phase::Update,
                    message,
                });
                return;
            }
        }
    }

    for child in node.children() {
        update_node(&child, events);
    }
}

fn render_node(node: &Rc<Node>, ctx: &mut dyn RenderContext, events: &mut Vec<QuarantineEvent>) {
    if node.is_errored() {
        return;
    }

    let visible = node.component.borrow().is_visible();
    if visible && node.needs_render() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            node.component.borrow_mut().render(ctx);
        }));
        match result {
            Ok(()) => node.needs_render.set(false),
            Err(payload) => {
                let message = crate::node::panic_message(&payload);
                tracing::error!(node = %node.id(), %message, "component errored during render; quarantining subtree");
                node.errored.set(true);
                events.push(QuarantineEvent {
                    node_id: node.id(),
                    type_tag: node.type_tag(),
                    phase: Phase::Render,
                    message,
                });
                return;
            }
        }
    }

    if !visible {
        return;
    }

    for child in node.children_in_render_order() {
        render_node(&child, ctx, events);
    }
}
