//! Listenable event sources.
//!
//! A listenable is anything a host can subscribe to: it hands out a
//! [`Subscription`] per registered callback and may expose default data, an
//! initial snapshot delivered once when a binding activates.
//!
//! Two concrete sources are provided:
//!   - [`Action`]: a named event with no default data
//!   - [`Store`]: a named event with an optional default-data provider

mod action;
mod store;
mod subscription;

pub use action::Action;
pub use store::Store;
pub use subscription::Subscription;

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::types::{ListenableId, Result};

/// Listener callback. Multi-argument events use a tuple payload.
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Wrap a closure as a [`Callback`].
pub fn callback<T, F>(f: F) -> Callback<T>
where
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Initial snapshot offered by a listenable.
pub enum DefaultData<T> {
    /// Available now; delivered synchronously during activation.
    Ready(T),
    /// Resolved later; delivered once the future settles.
    Deferred(BoxFuture<'static, Result<T>>),
}

impl<T> DefaultData<T> {
    pub fn ready(value: T) -> Self {
        DefaultData::Ready(value)
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        DefaultData::Deferred(future.boxed())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DefaultData::Deferred(_))
    }
}

impl<T> fmt::Debug for DefaultData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultData::Ready(_) => f.write_str("DefaultData::Ready(..)"),
            DefaultData::Deferred(_) => f.write_str("DefaultData::Deferred(..)"),
        }
    }
}

/// A subscribable event source.
pub trait Listenable<T>: Send + Sync {
    fn id(&self) -> &ListenableId;

    /// Human-readable name used in binding descriptors and logs.
    fn name(&self) -> &str;

    /// Register `callback`. Never blocks.
    fn listen(&self, callback: Callback<T>) -> Subscription;

    /// Initial snapshot, if this source has one.
    fn default_data(&self) -> Option<DefaultData<T>> {
        None
    }
}
