//! In-memory event emitter backing every listenable.
//!
//! Listeners are kept in registration order and receive a clone of each
//! emitted payload. Emission is a fan-out: every listener registered when
//! `emit` starts is invoked exactly once.
//!
//! The listener table lock is never held while a callback runs, so callbacks
//! may emit again or release their own subscription.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::listenable::{Callback, Subscription};
use crate::types::{ListenableId, SubscriptionId};

// =============================================================================
// Listener Management
// =============================================================================

struct Listener<T> {
    id: SubscriptionId,
    callback: Callback<T>,
}

struct EmitterState<T> {
    listeners: Vec<Listener<T>>,
    stats: EmitterStats,
}

/// Statistics about emitter usage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterStats {
    pub events_emitted: u64,
    pub listeners_added: u64,
    pub listeners_released: u64,
    pub active_listeners: usize,
}

// =============================================================================
// Emitter
// =============================================================================

/// Ordered listener registry with fan-out emission.
pub struct Emitter<T> {
    owner: ListenableId,
    state: Arc<Mutex<EmitterState<T>>>,
}

impl<T: Clone + Send + 'static> Emitter<T> {
    /// Create an emitter owned by the listenable `owner`.
    pub fn new(owner: ListenableId) -> Self {
        Self {
            owner,
            state: Arc::new(Mutex::new(EmitterState {
                listeners: Vec::new(),
                stats: EmitterStats::default(),
            })),
        }
    }

    pub fn owner(&self) -> &ListenableId {
        &self.owner
    }

    /// Register a listener.
    ///
    /// The returned subscription holds only a weak reference to the emitter;
    /// releasing it after the emitter is gone is a no-op.
    pub fn add_listener(&self, callback: Callback<T>) -> Subscription {
        let id = SubscriptionId::new();

        {
            let mut state = self.state.lock();
            state.listeners.push(Listener {
                id: id.clone(),
                callback,
            });
            state.stats.listeners_added += 1;
            state.stats.active_listeners = state.listeners.len();
        }

        tracing::debug!("Listener {} registered on {}", id, self.owner);

        let weak: Weak<Mutex<EmitterState<T>>> = Arc::downgrade(&self.state);
        let listener_id = id.clone();
        Subscription::new(id, self.owner.clone(), move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.lock();
                let before = state.listeners.len();
                state.listeners.retain(|l| l.id != listener_id);
                if state.listeners.len() < before {
                    state.stats.listeners_released += 1;
                }
                state.stats.active_listeners = state.listeners.len();
            }
        })
    }

    /// Emit a payload to all listeners. Returns the number of listeners invoked.
    pub fn emit(&self, payload: T) -> usize {
        let callbacks: Vec<Callback<T>> = {
            let mut state = self.state.lock();
            state.stats.events_emitted += 1;
            state.listeners.iter().map(|l| l.callback.clone()).collect()
        };

        for callback in &callbacks {
            callback(payload.clone());
        }

        tracing::debug!(
            "Emitted event on {} to {} listeners",
            self.owner,
            callbacks.len()
        );

        callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Get current emitter statistics.
    pub fn stats(&self) -> EmitterStats {
        self.state.lock().stats.clone()
    }

    /// Reset statistics counters (active listener count is kept).
    pub fn reset_stats(&self) {
        let mut state = self.state.lock();
        state.stats.events_emitted = 0;
        state.stats.listeners_added = 0;
        state.stats.listeners_released = 0;
    }
}

// Clones share the same listener table.
impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Emitter")
            .field("owner", &self.owner)
            .field("listeners", &state.listeners.len())
            .field("stats", &state.stats)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listenable::callback;

    fn recorder<T: Clone + Send + 'static>() -> (Callback<T>, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (callback(move |v: T| sink.lock().push(v)), seen)
    }

    #[test]
    fn test_emit_to_zero_listeners() {
        let emitter: Emitter<u32> = Emitter::new(ListenableId::new());

        assert_eq!(emitter.emit(1), 0);
        assert_eq!(emitter.stats().events_emitted, 1);
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let emitter = Emitter::new(ListenableId::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let _a = emitter.add_listener(callback(move |v: &'static str| first.lock().push(("a", v))));
        let second = order.clone();
        let _b = emitter.add_listener(callback(move |v: &'static str| second.lock().push(("b", v))));

        assert_eq!(emitter.emit("x"), 2);
        assert_eq!(*order.lock(), vec![("a", "x"), ("b", "x")]);
    }

    #[test]
    fn test_released_listener_not_invoked() {
        let emitter = Emitter::new(ListenableId::new());
        let (cb, seen) = recorder::<u32>();

        let sub = emitter.add_listener(cb);
        emitter.emit(1);
        assert!(sub.release());
        emitter.emit(2);

        assert_eq!(*seen.lock(), vec![1]);
        let stats = emitter.stats();
        assert_eq!(stats.active_listeners, 0);
        assert_eq!(stats.listeners_added, 1);
        assert_eq!(stats.listeners_released, 1);
    }

    #[test]
    fn test_release_after_emitter_dropped() {
        let emitter = Emitter::new(ListenableId::new());
        let (cb, _seen) = recorder::<u32>();
        let sub = emitter.add_listener(cb);

        drop(emitter);
        assert!(sub.release());
    }

    #[test]
    fn test_callback_may_release_itself() {
        let emitter = Emitter::new(ListenableId::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let count = Arc::new(Mutex::new(0u32));

        let inner_slot = slot.clone();
        let inner_count = count.clone();
        let sub = emitter.add_listener(callback(move |_: ()| {
            *inner_count.lock() += 1;
            if let Some(sub) = inner_slot.lock().as_ref() {
                sub.release();
            }
        }));
        *slot.lock() = Some(sub);

        emitter.emit(());
        emitter.emit(());

        assert_eq!(*count.lock(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_reset_stats_keeps_active_count() {
        let emitter = Emitter::new(ListenableId::new());
        let (cb, _seen) = recorder::<u8>();
        let _sub = emitter.add_listener(cb);

        for i in 0..5 {
            emitter.emit(i);
        }
        assert_eq!(emitter.stats().events_emitted, 5);

        emitter.reset_stats();
        let stats = emitter.stats();
        assert_eq!(stats.events_emitted, 0);
        assert_eq!(stats.active_listeners, 1);
    }
}
