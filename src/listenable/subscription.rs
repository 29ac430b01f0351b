//! Subscription handles returned by [`Listenable::listen`](super::Listenable::listen).

use parking_lot::Mutex;
use std::fmt;

use crate::types::{ListenableId, SubscriptionId};

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// Opaque token for one registered listener.
///
/// Dropping a subscription does NOT release it; call [`Subscription::release`].
#[must_use = "a subscription stays registered until released"]
pub struct Subscription {
    id: SubscriptionId,
    listenable_id: ListenableId,
    release: Mutex<Option<ReleaseFn>>,
}

impl Subscription {
    pub fn new(
        id: SubscriptionId,
        listenable_id: ListenableId,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            id,
            listenable_id,
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn listenable_id(&self) -> &ListenableId {
        &self.listenable_id
    }

    /// Release the listener. Returns `false` if it was already released.
    pub fn release(&self) -> bool {
        // take under the lock, run outside it
        let release = self.release.lock().take();
        match release {
            Some(release) => {
                release();
                tracing::debug!(
                    "Released subscription {} on {}",
                    self.id,
                    self.listenable_id
                );
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.lock().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("listenable_id", &self.listenable_id)
            .field("released", &self.is_released())
            .finish()
    }
}
