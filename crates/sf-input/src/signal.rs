//! Synchronous event dispatch
//!
//! Listeners run on the emitting thread before `emit` returns, in
//! subscription order. The listener list is snapshotted before dispatch
//! so a listener may subscribe or unsubscribe while being called.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::body::TrackingFrame;
use crate::event::{EventCategory, ProviderEvent};

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by `subscribe`, unique across all emitters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A list of listeners for one event type
pub struct EventEmitter<E> {
    listeners: Mutex<Vec<(SubscriptionId, Listener<E>)>>,
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not subscribed here
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }

    /// Call every listener; returns how many were called
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Dispatch table of provider events, one emitter per category.
///
/// Every provider owns one; so does the coordinator, which re-emits the
/// active provider's events through its own table.
#[derive(Debug, Default)]
pub struct ProviderEvents {
    tables: [EventEmitter<ProviderEvent>; 5],
}

impl ProviderEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, category: EventCategory, listener: F) -> SubscriptionId
    where
        F: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        self.tables[category.index()].subscribe(listener)
    }

    /// Subscribe the same listener to every category
    pub fn subscribe_all<F>(&self, listener: F) -> Vec<(EventCategory, SubscriptionId)>
    where
        F: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        EventCategory::ALL
            .iter()
            .map(|&category| {
                let listener = Arc::clone(&listener);
                let id = self.subscribe(category, move |event| listener(event));
                (category, id)
            })
            .collect()
    }

    pub fn unsubscribe(&self, category: EventCategory, id: SubscriptionId) -> bool {
        self.tables[category.index()].unsubscribe(id)
    }

    /// Dispatch to the listeners of the event's category
    pub fn emit(&self, event: &ProviderEvent) -> usize {
        self.tables[event.category().index()].emit(event)
    }

    pub fn emit_started(&self) -> usize {
        self.emit(&ProviderEvent::Started)
    }

    pub fn emit_stopped(&self) -> usize {
        self.emit(&ProviderEvent::Stopped)
    }

    pub fn emit_failed(&self, reason: impl Into<String>) -> usize {
        self.emit(&ProviderEvent::failed(reason))
    }

    pub fn emit_tracking(&self, frame: TrackingFrame) -> usize {
        self.emit(&ProviderEvent::TrackingUpdated(frame))
    }

    pub fn listener_count(&self, category: EventCategory) -> usize {
        self.tables[category.index()].listener_count()
    }

    pub fn total_listeners(&self) -> usize {
        self.tables.iter().map(EventEmitter::listener_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PostureEvent, Stance};

    #[test]
    fn emitter_calls_listeners_in_order() {
        let emitter = EventEmitter::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen);
        emitter.subscribe(move |v| a.lock().push(("a", *v)));
        let b = Arc::clone(&seen);
        let id_b = emitter.subscribe(move |v| b.lock().push(("b", *v)));

        assert_eq!(emitter.emit(&1), 2);
        assert!(emitter.unsubscribe(id_b));
        assert!(!emitter.unsubscribe(id_b));
        assert_eq!(emitter.emit(&2), 1);

        assert_eq!(*seen.lock(), vec![("a", 1), ("b", 1), ("a", 2)]);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let emitter = Arc::new(EventEmitter::<()>::new());
        let slot = Arc::new(Mutex::new(None));

        let inner_emitter = Arc::clone(&emitter);
        let inner_slot = Arc::clone(&slot);
        let id = emitter.subscribe(move |_| {
            if let Some(id) = inner_slot.lock().take() {
                inner_emitter.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        emitter.emit(&());
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn provider_events_route_by_category() {
        let events = ProviderEvents::new();
        let lifecycle = Arc::new(Mutex::new(0));
        let posture = Arc::new(Mutex::new(0));

        let l = Arc::clone(&lifecycle);
        events.subscribe(EventCategory::Lifecycle, move |_| *l.lock() += 1);
        let p = Arc::clone(&posture);
        events.subscribe(EventCategory::Posture, move |_| *p.lock() += 1);

        events.emit_started();
        events.emit_failed("cable");
        events.emit_tracking(TrackingFrame::default());
        events.emit(&ProviderEvent::Posture(PostureEvent::StanceChanged(
            Stance::Orthodox,
        )));

        assert_eq!(*lifecycle.lock(), 2);
        assert_eq!(*posture.lock(), 1);
    }

    #[test]
    fn subscribe_all_covers_every_category() {
        let events = ProviderEvents::new();
        let subs = events.subscribe_all(|_| {});
        assert_eq!(subs.len(), 5);
        assert_eq!(events.total_listeners(), 5);
        for (category, id) in subs {
            assert!(events.unsubscribe(category, id));
        }
        assert_eq!(events.total_listeners(), 0);
    }
}
