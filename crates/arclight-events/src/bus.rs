//! Publish/subscribe event dispatch.

use std::collections::HashMap;

use crate::event::{Event, EventKind};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Event) -> bool>;

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
}

/// Event bus with per-kind subscriber lists.
///
/// Handlers return `true` to consume an event; a consumed event is not
/// delivered to later subscribers of the same kind.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<Subscription>>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.subscribers.entry(kind).or_default().push(Subscription {
            id,
            handler: Box::new(handler),
        });

        tracing::trace!(?kind, ?id, "Event handler subscribed");
        id
    }

    /// Remove a previously registered handler.
    ///
    /// Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        for subscriptions in self.subscribers.values_mut() {
            if let Some(index) = subscriptions.iter().position(|s| s.id == id) {
                subscriptions.remove(index);
                tracing::trace!(?id, "Event handler unsubscribed");
                return;
            }
        }
    }

    /// Deliver `event` to its kind's subscribers in registration order.
    ///
    /// Returns `true` if some handler consumed the event.
    pub fn publish(&mut self, event: &Event) -> bool {
        let Some(subscriptions) = self.subscribers.get_mut(&event.kind()) else {
            return false;
        };

        for subscription in subscriptions.iter_mut() {
            if (subscription.handler)(event) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn publish_reaches_subscriber() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::Quit, move |event| {
            sink.borrow_mut().push(*event);
            false
        });

        bus.publish(&Event::Quit);
        assert_eq!(seen.borrow().as_slice(), &[Event::Quit]);
    }

    #[test]
    fn consumption_stops_delivery() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        bus.subscribe(EventKind::Quit, move |_| {
            first.borrow_mut().push("first");
            true
        });

        let second = Rc::clone(&order);
        bus.subscribe(EventKind::Quit, move |_| {
            second.borrow_mut().push("second");
            false
        });

        assert!(bus.publish(&Event::Quit));
        assert_eq!(order.borrow().as_slice(), &["first"]);
    }

    #[test]
    fn kinds_are_independent() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        bus.subscribe(EventKind::MouseWheel, move |_| {
            *sink.borrow_mut() += 1;
            false
        });

        bus.publish(&Event::Quit);
        assert_eq!(*count.borrow(), 0);

        bus.publish(&Event::MouseWheel { delta: 1.0 });
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = bus.subscribe(EventKind::Quit, move |_| {
            *sink.borrow_mut() += 1;
            false
        });

        bus.publish(&Event::Quit);
        bus.unsubscribe(id);
        bus.publish(&Event::Quit);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::Quit, |_| false);
        bus.unsubscribe(id);
        // A second unsubscribe of the same id must not panic.
        bus.unsubscribe(id);
    }
}
