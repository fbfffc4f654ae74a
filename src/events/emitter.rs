//! Update Emitter
//!
//! In-memory pub/sub carrying "N updates happened" notifications from the
//! render loop to the rate monitor. Emission is synchronous: every listener
//! runs, in subscription order, before `emit` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener = Arc<dyn Fn(u64) + Send + Sync>;

/// Unique identifier for a subscribed listener
pub type ListenerId = u64;

#[derive(Default)]
struct Listeners {
    next_id: ListenerId,
    entries: Vec<(ListenerId, Listener)>,
}

/// Broadcasts update counts to subscribed listeners
///
/// Cloning yields another handle to the same listener set.
#[derive(Clone, Default)]
pub struct UpdateEmitter {
    listeners: Arc<Mutex<Listeners>>,
}

/// Capability returned by [`UpdateEmitter::subscribe`]
///
/// Dropping it leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: ListenerId,
    listeners: Weak<Mutex<Listeners>>,
    active: AtomicBool,
}

impl UpdateEmitter {
    /// Create an emitter with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        tracing::debug!(listener_id = id, "Update listener subscribed");

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
            active: AtomicBool::new(true),
        }
    }

    /// Deliver `count` to every listener in subscription order
    ///
    /// Listeners are invoked outside the registry lock, so a listener may
    /// unsubscribe itself or others while being called.
    pub fn emit(&self, count: u64) {
        let snapshot: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(count);
        }

        tracing::trace!(count, listeners = snapshot.len(), "Emitted update count");
    }

    /// Number of listeners currently subscribed
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

impl std::fmt::Debug for UpdateEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Subscription {
    /// Remove the listener; later calls are no-ops
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
            tracing::debug!(listener_id = self.id, "Update listener unsubscribed");
        }
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Identifier assigned at subscription, unique per emitter
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Listener bookkeeping cannot be left half-updated, so a poisoned lock is
/// still safe to use.
fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let emitter = UpdateEmitter::new();
        let total = Arc::new(AtomicU64::new(0));

        let t1 = Arc::clone(&total);
        let _a = emitter.subscribe(move |n| {
            t1.fetch_add(n, Ordering::SeqCst);
        });
        let t2 = Arc::clone(&total);
        let _b = emitter.subscribe(move |n| {
            t2.fetch_add(n * 10, Ordering::SeqCst);
        });

        emitter.emit(3);
        assert_eq!(total.load(Ordering::SeqCst), 33);
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_subscription_order() {
        let emitter = UpdateEmitter::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                emitter.subscribe(move |_| order.lock().unwrap().push(i))
            })
            .collect();

        emitter.emit(1);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(subs.len(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let emitter = UpdateEmitter::new();
        let received = Arc::new(AtomicU64::new(0));

        let r = Arc::clone(&received);
        let sub = emitter.subscribe(move |n| {
            r.fetch_add(n, Ordering::SeqCst);
        });

        emitter.emit(5);
        sub.unsubscribe();
        assert!(!sub.is_active());

        for _ in 0..10 {
            emitter.emit(100);
        }
        assert_eq!(received.load(Ordering::SeqCst), 5);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let emitter = UpdateEmitter::new();
        let keep = emitter.subscribe(|_| {});
        let gone = emitter.subscribe(|_| {});

        gone.unsubscribe();
        gone.unsubscribe();
        gone.unsubscribe();

        assert_eq!(emitter.listener_count(), 1);
        assert!(keep.is_active());
    }

    #[test]
    fn test_drop_keeps_listener() {
        let emitter = UpdateEmitter::new();
        let received = Arc::new(AtomicU64::new(0));

        let r = Arc::clone(&received);
        drop(emitter.subscribe(move |n| {
            r.fetch_add(n, Ordering::SeqCst);
        }));

        emitter.emit(4);
        assert_eq!(received.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_unsubscribe_after_emitter_dropped() {
        let emitter = UpdateEmitter::new();
        let sub = emitter.subscribe(|_| {});
        drop(emitter);

        sub.unsubscribe();
        assert!(!sub.is_active());
    }

    #[test]
    fn test_clone_shares_listeners() {
        let emitter = UpdateEmitter::new();
        let handle = emitter.clone();
        let received = Arc::new(AtomicU64::new(0));

        let r = Arc::clone(&received);
        let _sub = handle.subscribe(move |n| {
            r.fetch_add(n, Ordering::SeqCst);
        });

        emitter.emit(7);
        assert_eq!(received.load(Ordering::SeqCst), 7);
    }
}
