//! Declared bindings between a listenable and host callbacks.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::listenable::{Callback, DefaultData, Listenable, Subscription};
use crate::types::{BridgeId, Error, ListenableId, Result};

/// Name recorded for callbacks passed directly rather than by name.
pub const DIRECT_CALLBACK: &str = "<fn>";

/// Description of one binding, as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    pub listenable_id: ListenableId,
    pub listenable_name: String,
    pub callback_name: String,
    pub default_callback_name: Option<String>,
}

impl BindingDescriptor {
    pub fn key(&self) -> BindingKey {
        BindingKey {
            listenable_id: self.listenable_id.clone(),
            callback_name: self.callback_name.clone(),
        }
    }
}

/// Identifies a live subscription inside a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingKey {
    pub listenable_id: ListenableId,
    pub callback_name: String,
}

/// Per-activation delivery state shared with deferred continuations.
#[derive(Debug, Clone)]
pub(crate) struct DeliveryContext {
    pub bridge_id: BridgeId,
    pub live: Arc<AtomicBool>,
    pub suppress_after_deactivate: bool,
}

/// Default-data delivery prepared by [`Binding::attach`], run once every
/// binding of the batch has subscribed. Returns the spawned task, if any.
pub(crate) type Delivery = Box<dyn FnOnce() -> Option<JoinHandle<Result<()>>> + Send>;

pub(crate) struct Attached {
    pub key: BindingKey,
    pub subscription: Subscription,
    pub delivery: Option<Delivery>,
}

/// Type-erased binding so one bridge can hold sources of different payload types.
pub(crate) trait Binding: Send + Sync {
    fn descriptor(&self) -> &BindingDescriptor;

    /// Subscribe and prepare default-data delivery without running it.
    /// On error nothing stays subscribed.
    fn attach(&self, ctx: &DeliveryContext) -> Result<Attached>;
}

pub(crate) struct TypedBinding<T, L: ?Sized> {
    listenable: Arc<L>,
    callback: Callback<T>,
    default_callback: Option<Callback<T>>,
    descriptor: BindingDescriptor,
}

impl<T, L> TypedBinding<T, L>
where
    T: Send + 'static,
    L: Listenable<T> + ?Sized + 'static,
{
    pub fn new(
        listenable: Arc<L>,
        callback: Callback<T>,
        callback_name: String,
        default_callback: Option<(Callback<T>, String)>,
    ) -> Self {
        let (default_callback, default_callback_name) = match default_callback {
            Some((cb, name)) => (Some(cb), Some(name)),
            None => (None, None),
        };
        let descriptor = BindingDescriptor {
            listenable_id: listenable.id().clone(),
            listenable_name: listenable.name().to_string(),
            callback_name,
            default_callback_name,
        };
        Self {
            listenable,
            callback,
            default_callback,
            descriptor,
        }
    }

    fn prepare_default(&self, ctx: &DeliveryContext) -> Result<Option<Delivery>> {
        let Some(default_callback) = &self.default_callback else {
            return Ok(None);
        };
        let Some(data) = self.listenable.default_data() else {
            return Ok(None);
        };

        let default_callback = default_callback.clone();
        let ctx = ctx.clone();
        let source = self.descriptor.listenable_name.clone();

        match data {
            DefaultData::Ready(value) => {
                let delivery: Delivery = Box::new(move || {
                    tracing::debug!(
                        "Delivering default data from {} to {}",
                        source,
                        ctx.bridge_id
                    );
                    default_callback(value);
                    None
                });
                Ok(Some(delivery))
            }
            DefaultData::Deferred(future) => {
                let runtime = Handle::try_current().map_err(|e| {
                    Error::no_runtime(format!(
                        "deferred default data from {} needs a tokio runtime: {}",
                        source, e
                    ))
                })?;

                let delivery: Delivery = Box::new(move || {
                    Some(runtime.spawn(async move {
                        let value = future.await.map_err(|e| {
                            Error::delivery(format!(
                                "default data from {} rejected: {}",
                                source, e
                            ))
                        })?;

                        if ctx.suppress_after_deactivate && !ctx.live.load(Ordering::Acquire) {
                            tracing::debug!(
                                "Default data from {} suppressed: bridge {} deactivated",
                                source,
                                ctx.bridge_id
                            );
                            return Ok(());
                        }

                        tracing::debug!(
                            "Delivering deferred default data from {} to {}",
                            source,
                            ctx.bridge_id
                        );
                        default_callback(value);
                        Ok(())
                    }))
                });
                Ok(Some(delivery))
            }
        }
    }
}

impl<T, L> Binding for TypedBinding<T, L>
where
    T: Send + 'static,
    L: Listenable<T> + ?Sized + 'static,
{
    fn descriptor(&self) -> &BindingDescriptor {
        &self.descriptor
    }

    fn attach(&self, ctx: &DeliveryContext) -> Result<Attached> {
        let subscription = self.listenable.listen(self.callback.clone());

        match self.prepare_default(ctx) {
            Ok(delivery) => Ok(Attached {
                key: self.descriptor.key(),
                subscription,
                delivery,
            }),
            Err(err) => {
                subscription.release();
                Err(err)
            }
        }
    }
}
