/// In-process broadcast of worker events to open surfaces
///
/// A listener that publishes while being notified does not recurse: the event
/// is queued and delivered after the current one reaches every listener.
use crate::messages::WorkerEvent;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn(&WorkerEvent)>;

#[derive(Default)]
struct BusInner {
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<WorkerEvent>>,
    dispatching: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

/// Keeps a listener registered until dropped
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&WorkerEvent) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, event: WorkerEvent) {
        self.inner.queue.borrow_mut().push_back(event);
        if self.inner.dispatching.replace(true) {
            return;
        }

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            let listeners: Vec<Listener> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            for listener in listeners {
                listener(&event);
            }
        }

        self.inner.dispatching.set(false);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clipboard(value: &str) -> WorkerEvent {
        WorkerEvent::ClipboardUpdated {
            value: value.to_string(),
            recognized: None,
        }
    }

    fn value_of(event: &WorkerEvent) -> String {
        match event {
            WorkerEvent::ClipboardUpdated { value, .. } => value.clone(),
            WorkerEvent::TabContextUpdated { tab_id, .. } => tab_id.to_string(),
        }
    }

    #[test]
    fn test_publish_reaches_every_listener() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.borrow_mut().push(format!("a:{}", value_of(event))))
        };
        let b = {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.borrow_mut().push(format!("b:{}", value_of(event))))
        };

        bus.publish(clipboard("1"));
        assert_eq!(*seen.borrow(), vec!["a:1", "b:1"]);
        drop((a, b));
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));

        let subscription = {
            let count = count.clone();
            bus.subscribe(move |_| count.set(count.get() + 1))
        };
        bus.publish(clipboard("1"));
        drop(subscription);
        bus.publish(clipboard("2"));

        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_reentrant_publish_is_queued() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let echo = {
            let bus = bus.clone();
            let seen = seen.clone();
            bus.clone().subscribe(move |event| {
                let value = value_of(event);
                seen.borrow_mut().push(format!("echo:{}", value));
                if value == "1" {
                    bus.publish(clipboard("2"));
                }
            })
        };
        let tail = {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.borrow_mut().push(format!("tail:{}", value_of(event))))
        };

        bus.publish(clipboard("1"));

        assert_eq!(*seen.borrow(), vec!["echo:1", "tail:1", "echo:2", "tail:2"]);
        drop((echo, tail));
    }
}
