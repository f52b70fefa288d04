//! The event bus itself.

use crate::name::EventName;
use crate::propagation::Propagation;
use crate::scope::ScopeId;
use diagraph_foundation::{next_listener_id, ListenerId};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Handler = Rc<dyn Fn(&dyn Any) -> Propagation>;

struct Subscription {
    id: ListenerId,
    handler: Handler,
    scope: Option<ScopeId>,
    once: bool,
}

/// Options for [`EventBus::on_opts`].
#[derive(Default, Clone, Copy)]
pub struct SubscribeOptions {
    /// Auto-unsubscribe after the handler runs once.
    pub once: bool,
    /// Tie this subscription's lifetime to a scope; [`EventBus::abort_scope`]
    /// removes it along with every other subscription in the same scope.
    pub scope: Option<ScopeId>,
}

impl SubscribeOptions {
    pub fn once() -> Self {
        Self {
            once: true,
            scope: None,
        }
    }

    pub fn scoped(scope: ScopeId) -> Self {
        Self {
            once: false,
            scope: Some(scope),
        }
    }
}

/// Typed, cancellable, default-action domain event bus.
/// One bus per graph instance.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<HashMap<EventName, Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new detach scope. Pass the returned id to [`Self::on_opts`]
    /// via [`SubscribeOptions::scoped`] and later to [`Self::abort_scope`].
    pub fn create_scope(&self) -> ScopeId {
        ScopeId::next()
    }

    /// `on(name, handler, opts)`.
    #[must_use = "store the ListenerId and unsubscribe, or use a scope"]
    pub fn on(&self, name: EventName, handler: impl Fn(&dyn Any) -> Propagation + 'static) -> ListenerId {
        self.on_opts(name, handler, SubscribeOptions::default())
    }

    #[must_use = "store the ListenerId and unsubscribe, or use a scope"]
    pub fn on_opts(
        &self,
        name: EventName,
        handler: impl Fn(&dyn Any) -> Propagation + 'static,
        opts: SubscribeOptions,
    ) -> ListenerId {
        let id = next_listener_id();
        self.subscriptions.borrow_mut().entry(name).or_default().push(Subscription {
            id,
            handler: Rc::new(handler),
            scope: opts.scope,
            once: opts.once,
        });
        id
    }

    pub fn off(&self, name: EventName, id: ListenerId) {
        if let Some(subs) = self.subscriptions.borrow_mut().get_mut(&name) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Unsubscribe every handler registered under `scope`, across every
    /// event name. Idempotent.
    pub fn abort_scope(&self, scope: ScopeId) {
        for subs in self.subscriptions.borrow_mut().values_mut() {
            subs.retain(|s| s.scope != Some(scope));
        }
    }

    /// Run every handler registered for `name`, in registration order,
    /// stopping at the first [`Propagation::Cancel`]. `once` subscriptions
    /// are removed after running regardless of outcome. Returns whether any
    /// handler cancelled.
    pub fn emit(&self, name: EventName, payload: &dyn Any) -> Propagation {
        let handlers: Vec<(ListenerId, Handler, bool)> = self
            .subscriptions
            .borrow()
            .get(&name)
            .map(|subs| subs.iter().map(|s| (s.id, s.handler.clone(), s.once)).collect())
            .unwrap_or_default();

        let mut cancelled = false;
        let mut fired_once: Vec<ListenerId> = Vec::new();

        for (id, handler, once) in handlers {
            if once {
                fired_once.push(id);
            }
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(payload)));
            match result {
                Ok(Propagation::Continue) => {}
                Ok(Propagation::Cancel) => {
                    cancelled = true;
                }
                Err(panic) => {
                    let message = panic_message(&panic);
                    tracing::warn!(event = %name, %message, "event handler panicked");
                }
            }
            if cancelled {
                break;
            }
        }

        if !fired_once.is_empty() {
            if let Some(subs) = self.subscriptions.borrow_mut().get_mut(&name) {
                subs.retain(|s| !fired_once.contains(&s.id));
            }
        }

        if cancelled {
            Propagation::Cancel
        } else {
            Propagation::Continue
        }
    }

    /// `execute_default_action(name, payload, default_fn)`: run handlers, then `default_fn` only if nobody cancelled.
    pub fn execute_default_action(&self, name: EventName, payload: &dyn Any, default_fn: impl FnOnce(&dyn Any)) {
        if self.emit(name, payload) == Propagation::Continue {
            default_fn(payload);
        }
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "event handler panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = order.clone();
        bus.on(EventName::TAP, move |_| {
            o1.borrow_mut().push(1);
            Propagation::Continue
        });
        let o2 = order.clone();
        bus.on(EventName::TAP, move |_| {
            o2.borrow_mut().push(2);
            Propagation::Continue
        });

        bus.emit(EventName::TAP, &());
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn cancel_stops_later_handlers_and_the_default_action() {
        let bus = EventBus::new();
        let ran_second = Rc::new(Cell::new(false));
        let ran_default = Rc::new(Cell::new(false));

        bus.on(EventName::TAP, |_| Propagation::Cancel);
        let r2 = ran_second.clone();
        bus.on(EventName::TAP, move |_| {
            r2.set(true);
            Propagation::Continue
        });

        let rd = ran_default.clone();
        bus.execute_default_action(EventName::TAP, &(), move |_| rd.set(true));

        assert!(!ran_second.get(), "cancel must stop later handlers");
        assert!(!ran_default.get(), "cancel must skip the default action");
    }

    #[test]
    fn default_action_runs_when_nobody_cancels() {
        let bus = EventBus::new();
        let ran_default = Rc::new(Cell::new(false));
        bus.on(EventName::TAP, |_| Propagation::Continue);

        let rd = ran_default.clone();
        bus.execute_default_action(EventName::TAP, &(), move |_| rd.set(true));
        assert!(ran_default.get());
    }

    #[test]
    fn once_subscription_fires_a_single_time() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        bus.on_opts(
            EventName::TAP,
            move |_| {
                c.set(c.get() + 1);
                Propagation::Continue
            },
            SubscribeOptions::once(),
        );

        bus.emit(EventName::TAP, &());
        bus.emit(EventName::TAP, &());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn aborting_a_scope_unsubscribes_every_handler_in_it() {
        let bus = EventBus::new();
        let scope = bus.create_scope();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        bus.on_opts(
            EventName::TAP,
            move |_| {
                f.set(true);
                Propagation::Continue
            },
            SubscribeOptions::scoped(scope),
        );

        bus.abort_scope(scope);
        bus.emit(EventName::TAP, &());
        assert!(!fired.get());
    }

    #[test]
    fn off_removes_a_single_subscription() {
        let bus = EventBus::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = bus.on(EventName::TAP, move |_| {
            f.set(true);
            Propagation::Continue
        });

        bus.off(EventName::TAP, id);
        bus.emit(EventName::TAP, &());
        assert!(!fired.get());
    }
}
