//! Kind-tag -> component factory lookup.
//!
//! "Replacing inheritance hierarchies" calls for trading the
//! source's decorator/visitor dispatch for "dynamic-dispatch tables or a
//! registry keyed by kind". This is that registry: custom block/connection
//! kinds register their own factory instead of this crate growing a fixed
//! enum of kinds it has to know about ahead of time.

use diagraph_tree::Component;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Factory = Rc<dyn Fn(Box<dyn Any>) -> Box<dyn Component>>;

#[derive(Default)]
pub struct ComponentRegistry {
    factories: RefCell<HashMap<String, Factory>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self { factories: RefCell::new(HashMap::new()) }
    }

    /// Register (or replace) the factory for `kind_tag`.
    pub fn register(&self, kind_tag: impl Into<String>, factory: Factory) {
        self.factories.borrow_mut().insert(kind_tag.into(), factory);
    }

    pub fn is_registered(&self, kind_tag: &str) -> bool {
        self.factories.borrow().contains_key(kind_tag)
    }

    /// Build a component instance for `kind_tag`, or `None` if nothing is
    /// registered for it — callers decide whether that's a fallback to a
    /// default kind or a dropped entity.
    pub fn create(&self, kind_tag: &str, props: Box<dyn Any>) -> Option<Box<dyn Component>> {
        let factory = self.factories.borrow().get(kind_tag)?.clone();
        Some(factory(props))
    }

    /// Register the built-in block/connection/anchor factories under their
    /// default `kind_tag` ("default"), so a graph that never registers a
    /// custom kind still renders.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(
            "default",
            Rc::new(|props: Box<dyn Any>| {
                Box::new(crate::block::BlockComponent::new(
                    *props.downcast::<crate::block::BlockProps>().expect("block factory given non-BlockProps"),
                )) as Box<dyn Component>
            }),
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl Component for Dummy {
        fn set_props(&mut self, _props: Box<dyn Any>) {}
        fn render(&mut self, _ctx: &mut dyn diagraph_tree::RenderContext) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn unregistered_kind_tag_returns_none() {
        let registry = ComponentRegistry::new();
        assert!(registry.create("nonexistent", Box::new(())).is_none());
    }

    #[test]
    fn registering_a_kind_makes_it_creatable() {
        let registry = ComponentRegistry::new();
        registry.register("widget", Rc::new(|_props| Box::new(Dummy) as Box<dyn Component>));
        assert!(registry.is_registered("widget"));
        assert!(registry.create("widget", Box::new(())).is_some());
    }

    #[test]
    fn re_registering_a_kind_replaces_its_factory() {
        let registry = ComponentRegistry::new();
        registry.register("widget", Rc::new(|_props| Box::new(Dummy) as Box<dyn Component>));
        registry.register("widget", Rc::new(|_props| Box::new(Dummy) as Box<dyn Component>));
        assert_eq!(registry.factories.borrow().len(), 1);
    }
}
