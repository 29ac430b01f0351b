//! Stores: named events that can offer default data to new listeners.

use std::fmt;

use super::{Callback, DefaultData, Listenable, Subscription};
use crate::emitter::{Emitter, EmitterStats};
use crate::types::{ListenableId, Result};
use crate::validation::validate_non_empty;

type DefaultProvider<T> = Box<dyn Fn() -> DefaultData<T> + Send + Sync>;

/// A named event source with an optional default-data provider.
pub struct Store<T> {
    id: ListenableId,
    name: String,
    emitter: Emitter<T>,
    default_provider: Option<DefaultProvider<T>>,
}

impl<T: Clone + Send + 'static> Store<T> {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_non_empty(&name, "store name")?;
        let id = ListenableId::new();
        Ok(Self {
            emitter: Emitter::new(id.clone()),
            id,
            name,
            default_provider: None,
        })
    }

    /// Install the provider called each time a binding asks for default data.
    pub fn with_default_data<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> DefaultData<T> + Send + Sync + 'static,
    {
        self.default_provider = Some(Box::new(provider));
        self
    }

    pub fn has_default_data(&self) -> bool {
        self.default_provider.is_some()
    }

    /// Emit `payload` to every listener now. Returns the number invoked.
    pub fn trigger(&self, payload: T) -> usize {
        tracing::debug!("Store {} triggered", self.name);
        self.emitter.emit(payload)
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.listener_count()
    }

    pub fn stats(&self) -> EmitterStats {
        self.emitter.stats()
    }
}

impl<T: Clone + Send + 'static> Listenable<T> for Store<T> {
    fn id(&self) -> &ListenableId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn listen(&self, callback: Callback<T>) -> Subscription {
        self.emitter.add_listener(callback)
    }

    fn default_data(&self) -> Option<DefaultData<T>> {
        self.default_provider.as_ref().map(|provider| provider())
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("emitter", &self.emitter)
            .field("has_default_data", &self.default_provider.is_some())
            .finish()
    }
}
