//! Change-notification buses for runtime state containers.
//!
//! Presentation layers subscribe explicitly and hold the returned [`Subscription`] for as long as
//! they render; dropping it removes the listener.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};

type Listener<E> = Rc<dyn Fn(&E)>;

struct BusState<E> {
    next_listener_id: u64,
    listeners: BTreeMap<u64, Listener<E>>,
}

/// Single-threaded broadcast bus. Listeners run synchronously in subscription order.
pub struct EventBus<E> {
    state: Rc<RefCell<BusState<E>>>,
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                next_listener_id: 1,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Registers `listener` until the returned handle is dropped.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.insert(id, Rc::new(listener));
            id
        };

        let weak: Weak<RefCell<BusState<E>>> = Rc::downgrade(&self.state);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().listeners.remove(&id);
                }
            })),
        }
    }

    /// Delivers `event` to every current listener.
    ///
    /// Listeners may subscribe or unsubscribe while handling the event; changes apply from the
    /// next emit.
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self.state.borrow().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.state.borrow().listeners.len())
            .finish()
    }
}

/// Listener registration handle; unsubscribes on drop.
#[must_use = "dropping a subscription immediately removes its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keeps the listener registered for the lifetime of the bus.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
