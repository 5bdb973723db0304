use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use parking_lot::RwLock;

use crate::event::MapChange;

/// Deprecated multiplexed listener. Receives every event kind as its
/// [`crate::event::map_change`] compatibility tag.
pub trait MapChangeListener {
    fn on_map_changed(&self, change: MapChange);
}

impl<F: Fn(MapChange)> MapChangeListener for F {
    fn on_map_changed(&self, change: MapChange) {
        self(change)
    }
}

/// Registry for the legacy broadcast list.
///
/// This is the one structure touched from registration call sites that may
/// run concurrently with a broadcast, so it clones a snapshot before
/// iterating: add/remove during a broadcast only affect later broadcasts.
/// Duplicate adds are kept as-is and produce duplicate deliveries; callers
/// observably rely on that.
#[derive(Clone, Default)]
pub struct LegacyListeners {
    inner: Arc<RwLock<Vec<Arc<dyn MapChangeListener + Send + Sync>>>>,
}

impl LegacyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn MapChangeListener + Send + Sync>) {
        self.inner.write().push(listener);
    }

    /// Removes the first entry registered with the same `Arc`, matching by
    /// pointer identity. Unknown listeners are ignored.
    pub fn remove(&self, listener: &Arc<dyn MapChangeListener + Send + Sync>) {
        let mut listeners = self.inner.write();
        if let Some(index) = listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
            listeners.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Invokes every listener present at the moment the broadcast begins, in
    /// insertion order. A panicking listener is logged and skipped; it never
    /// prevents delivery to the remaining listeners or aborts the event.
    pub fn broadcast(&self, change: MapChange) {
        let snapshot: Vec<_> = self.inner.read().clone();
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener.on_map_changed(change))).is_err() {
                log::error!("legacy map change listener panicked on change {change}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::map_change;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl MapChangeListener for Counter {
        fn on_map_changed(&self, _change: MapChange) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn listeners_fire_in_insertion_order() {
        let listeners = LegacyListeners::new();
        let order = Arc::new(RwLock::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = order.clone();
            listeners.add(Arc::new(move |_change: MapChange| order.write().push(tag)));
        }

        listeners.broadcast(map_change::REGION_IS_CHANGING);
        assert_eq!(*order.read(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_registration_delivers_twice() {
        let listeners = LegacyListeners::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));

        listeners.add(counter.clone());
        listeners.add(counter.clone());
        listeners.broadcast(map_change::SOURCE_DID_CHANGE);

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remove_drops_one_entry_at_a_time() {
        let listeners = LegacyListeners::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let listener: Arc<dyn MapChangeListener + Send + Sync> =
            Arc::new(move |_change: MapChange| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        listeners.add(listener.clone());
        listeners.add(listener.clone());
        listeners.remove(&listener);

        listeners.broadcast(map_change::DID_FINISH_LOADING_MAP);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        listeners.remove(&listener);
        assert!(listeners.is_empty());
    }

    #[test]
    fn panicking_listener_does_not_abort_the_broadcast() {
        let listeners = LegacyListeners::new();
        let hits = Arc::new(AtomicUsize::new(0));

        listeners.add(Arc::new(|_change: MapChange| panic!("listener bug")));
        let counter = hits.clone();
        listeners.add(Arc::new(move |_change: MapChange| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        listeners.broadcast(map_change::DID_FAIL_LOADING_MAP);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mutation_during_broadcast_only_affects_later_broadcasts() {
        let listeners = LegacyListeners::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let registry = listeners.clone();
        let counter = hits.clone();
        listeners.add(Arc::new(move |_change: MapChange| {
            let counter = counter.clone();
            registry.add(Arc::new(move |_change: MapChange| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        // The listener added mid-broadcast is not part of this snapshot.
        listeners.broadcast(map_change::REGION_DID_CHANGE);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        listeners.broadcast(map_change::REGION_DID_CHANGE);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
