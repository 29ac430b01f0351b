//! Actions: named events triggered by callers.

use tokio::task::JoinHandle;

use super::{Callback, Listenable, Subscription};
use crate::emitter::{Emitter, EmitterStats};
use crate::types::{ListenableId, Result};
use crate::utils::next_tick;
use crate::validation::validate_non_empty;

/// A named event source with no default data.
#[derive(Debug)]
pub struct Action<T> {
    id: ListenableId,
    name: String,
    emitter: Emitter<T>,
}

impl<T: Clone + Send + 'static> Action<T> {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_non_empty(&name, "action name")?;
        let id = ListenableId::new();
        Ok(Self {
            emitter: Emitter::new(id.clone()),
            id,
            name,
        })
    }

    /// Emit `payload` to every listener now. Returns the number invoked.
    pub fn trigger(&self, payload: T) -> usize {
        tracing::debug!("Action {} triggered", self.name);
        self.emitter.emit(payload)
    }

    /// Emit `payload` on the next scheduler turn.
    pub fn trigger_async(&self, payload: T) -> Result<JoinHandle<usize>> {
        let emitter = self.emitter.clone();
        let name = self.name.clone();
        next_tick(move || {
            tracing::debug!("Action {} triggered (deferred)", name);
            emitter.emit(payload)
        })
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.listener_count()
    }

    pub fn stats(&self) -> EmitterStats {
        self.emitter.stats()
    }
}

impl<T: Clone + Send + 'static> Listenable<T> for Action<T> {
    fn id(&self) -> &ListenableId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn listen(&self, callback: Callback<T>) -> Subscription {
        self.emitter.add_listener(callback)
    }
}
