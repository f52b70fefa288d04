//! The scene-graph component kernel (): a rooted tree of
//! component instances with keyed child reconciliation and a two-phase
//! update/render protocol, plus per-component error quarantine.
//!
//! Single-threaded by design (), `Rc`-based like
//! `diagraph-reactive`; a `Tree` is driven from exactly one scheduler
//! thread for its lifetime.

mod component;
mod diff;
mod key;
mod node;
mod tree;

pub use component::{ChildSpec, Component, RenderContext};
pub use diff::{reconcile_keys, ReconcileOp};
pub use key::ChildKey;
pub use node::{Node, NodeId};
pub use tree::{Phase, QuarantineEvent, Tree};

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl RenderContext for Recorder {
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Leaf {
        label: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Leaf {
        fn set_props(&mut self, props: Box<dyn Any>) {
            if let Ok(label) = props.downcast::<String>() {
                self.label = *label;
            }
        }

        fn render(&mut self, ctx: &mut dyn RenderContext) {
            if let Some(recorder) = ctx.as_any_mut().downcast_mut::<Recorder>() {
                recorder.0.borrow_mut().push(self.label.clone());
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Branch {
        child_labels: Vec<&'static str>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Branch {
        fn set_props(&mut self, _props: Box<dyn Any>) {}

        fn update_children(&mut self) -> Vec<ChildSpec> {
            let log = self.log.clone();
            self.child_labels
                .iter()
                .map(|label| {
                    let log = log.clone();
                    let label = label.to_string();
                    ChildSpec::new(
                        ChildKey::new(label.clone()),
                        "leaf",
                        Box::new(label.clone()),
                        Rc::new(move |props: Box<dyn Any>| {
                            let label = *props.downcast::<String>().unwrap();
                            Box::new(Leaf {
                                label,
                                log: log.clone(),
                            }) as Box<dyn Component>
                        }),
                    )
                })
                .collect()
        }

        fn render(&mut self, _ctx: &mut dyn RenderContext) {}

        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn update_then_render_visits_mounted_children() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let root = Branch {
            child_labels: vec!["a", "b"],
            log: log.clone(),
        };
        let tree = Tree::new("branch", Box::new(root));

        let events = tree.run_update_phase();
        assert!(events.is_empty());
        assert_eq!(tree.root().children().len(), 2);

        let mut ctx = Recorder(log.clone());
        let render_events = tree.run_render_phase(&mut ctx);
        assert!(render_events.is_empty());
        assert_eq!(*log.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn reconciliation_keeps_same_key_same_type_instance() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let root = Branch {
            child_labels: vec!["a"],
            log: log.clone(),
        };
        let tree = Tree::new("branch", Box::new(root));
        tree.run_update_phase();
        let first_id = tree.root().children()[0].id();

        tree.run_update_phase();
        let second_id = tree.root().children()[0].id();
        assert_eq!(first_id, second_id, "same key/type must reuse the instance");
    }

    struct Panics;
    impl Component for Panics {
        fn set_props(&mut self, _props: Box<dyn Any>) {}
        fn update_children(&mut self) -> Vec<ChildSpec> {
            panic!("boom");
        }
        fn render(&mut self, _ctx: &mut dyn RenderContext) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn panicking_component_is_quarantined_without_killing_the_walk() {
        let tree = Tree::new("panics", Box::new(Panics));
        let events = tree.run_update_phase();
        assert_eq!(events.len(), 1);
        assert!(tree.root().is_errored());
    }
}
