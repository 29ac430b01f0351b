//! Subscription bridge tying a host's lifecycle to listenable subscriptions.
//!
//! A [`Bridge`] holds declared bindings. `activate` subscribes each binding
//! in declaration order and starts default-data delivery; `deactivate`
//! releases every subscription the activation created.
//!
//! ```text
//!   declare (listen_to / listen_to_named / listen_to_many)
//!        │
//!        ▼
//!   Inactive ──activate──▶ Active ──deactivate──▶ Inactive
//!                            │
//!                            ├─ one listen() per binding
//!                            └─ default data: Ready → now, Deferred → spawned
//! ```
//!
//! Deferred default data that settles after `deactivate` is dropped unless
//! [`BridgeConfig::suppress_after_deactivate`] is turned off. Errors from
//! deferred values surface through [`Bridge::settle`].

mod binding;
mod callbacks;
mod host;

pub use binding::{BindingDescriptor, BindingKey, DIRECT_CALLBACK};
pub use callbacks::{Callbacks, ResolvedNames};
pub use host::ListenerHost;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use futures::FutureExt;

use binding::{Attached, Binding, DeliveryContext, TypedBinding};

use crate::listenable::{Callback, Listenable, Subscription};
use crate::types::{BridgeConfig, BridgeId, Error, Result};
use crate::validation::validate_non_empty;

/// Bridge lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeState {
    Inactive,
    Active,
}

/// Adapter between a host's lifecycle and its listenable subscriptions.
pub struct Bridge {
    id: BridgeId,
    config: BridgeConfig,
    state: BridgeState,
    bindings: Vec<Box<dyn Binding>>,
    subscriptions: Vec<(BindingKey, Subscription)>,
    pending: Vec<JoinHandle<Result<()>>>,
    delivery_error: Option<Error>,
    live: Arc<AtomicBool>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            id: BridgeId::new(),
            config,
            state: BridgeState::Inactive,
            bindings: Vec::new(),
            subscriptions: Vec::new(),
            pending: Vec::new(),
            delivery_error: None,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &BridgeId {
        &self.id
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BridgeState::Active
    }

    /// Number of live subscriptions (zero while inactive).
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Keys of the live subscriptions, in binding order.
    pub fn subscription_keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.subscriptions.iter().map(|(key, _)| key)
    }

    /// Declared bindings, in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.bindings.iter().map(|b| b.descriptor())
    }

    /// Deferred default-data deliveries that have not finished yet.
    pub fn pending_deliveries(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Delivery handles still held, finished or not, until the next reap or settle.
    pub fn retained_deliveries(&self) -> usize {
        self.pending.len()
    }

    // =========================================================================
    // Declaring bindings
    // =========================================================================

    /// Bind `listenable` to callbacks passed directly.
    pub fn listen_to<T, L>(
        &mut self,
        listenable: Arc<L>,
        callback: Callback<T>,
        default_callback: Option<Callback<T>>,
    ) -> Result<()>
    where
        T: Send + 'static,
        L: Listenable<T> + ?Sized + 'static,
    {
        let binding = TypedBinding::new(
            listenable,
            callback,
            DIRECT_CALLBACK.to_string(),
            default_callback.map(|cb| (cb, DIRECT_CALLBACK.to_string())),
        );
        self.declare(vec![Box::new(binding) as Box<dyn Binding>])
    }

    /// Bind `listenable` to callbacks looked up by name in `callbacks`.
    ///
    /// An unknown name is a configuration error; nothing is declared.
    pub fn listen_to_named<T, L>(
        &mut self,
        listenable: Arc<L>,
        callbacks: &Callbacks<T>,
        callback_name: &str,
        default_callback_name: Option<&str>,
    ) -> Result<()>
    where
        T: Send + 'static,
        L: Listenable<T> + ?Sized + 'static,
    {
        validate_non_empty(callback_name, "callback name")?;
        let callback = lookup(callbacks, callback_name, listenable.name())?;
        let default_callback = match default_callback_name {
            Some(name) => Some((
                lookup(callbacks, name, listenable.name())?,
                name.to_string(),
            )),
            None => None,
        };

        let binding = TypedBinding::new(
            listenable,
            callback,
            callback_name.to_string(),
            default_callback,
        );
        self.declare(vec![Box::new(binding) as Box<dyn Binding>])
    }

    /// Bind a table of named listenables using the `on<Field>` convention.
    ///
    /// Entries are processed in iteration order. A field with no matching
    /// callback is skipped. The batch is all-or-nothing: on error no entry
    /// is declared or subscribed. Returns the number of bindings declared.
    pub fn listen_to_many<T, S, I>(&mut self, callbacks: &Callbacks<T>, listenables: I) -> Result<usize>
    where
        T: Send + 'static,
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Arc<dyn Listenable<T>>)>,
    {
        let entries: Vec<(S, Arc<dyn Listenable<T>>)> = listenables.into_iter().collect();
        for (field, _) in &entries {
            validate_non_empty(field.as_ref(), "listenable field")?;
        }

        let mut batch: Vec<Box<dyn Binding>> = Vec::with_capacity(entries.len());
        for (field, listenable) in entries {
            let field = field.as_ref();
            let Some(names) = callbacks.resolve_field(field) else {
                tracing::debug!("No callback for listenable field {}, skipping", field);
                continue;
            };

            let callback = lookup(callbacks, &names.callback, listenable.name())?;
            let default_callback = lookup(callbacks, &names.default_callback, listenable.name())?;
            batch.push(Box::new(TypedBinding::new(
                listenable,
                callback,
                names.callback,
                Some((default_callback, names.default_callback)),
            )));
        }

        let declared = batch.len();
        self.declare(batch)?;
        Ok(declared)
    }

    /// Record a batch of bindings; bind them right away if the bridge is active.
    ///
    /// Nothing is recorded if any binding fails to attach.
    fn declare(&mut self, batch: Vec<Box<dyn Binding>>) -> Result<()> {
        if self.is_active() {
            self.reap_finished();
            let ctx = self.delivery_context();
            let attached = attach_all(&ctx, &batch)?;
            self.install(attached);
        }

        for binding in batch {
            tracing::debug!(
                "Bridge {} bound {} -> {}",
                self.id,
                binding.descriptor().listenable_name,
                binding.descriptor().callback_name
            );
            self.bindings.push(binding);
        }
        Ok(())
    }

    /// Keep the subscriptions, then run default-data deliveries in binding order.
    fn install(&mut self, attached: Vec<Attached>) {
        let mut deliveries = Vec::with_capacity(attached.len());
        for Attached {
            key,
            subscription,
            delivery,
        } in attached
        {
            self.subscriptions.push((key, subscription));
            deliveries.extend(delivery);
        }
        for delivery in deliveries {
            self.pending.extend(delivery());
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Subscribe every declared binding in order.
    ///
    /// Default data is delivered only after every binding has subscribed. On
    /// failure every subscription made by this call is released and no
    /// default data is delivered.
    pub fn activate(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(Error::state_transition(format!(
                "cannot activate bridge {}: already active",
                self.id
            )));
        }

        self.reap_finished();
        self.live = Arc::new(AtomicBool::new(true));
        let ctx = self.delivery_context();

        let attached = match attach_all(&ctx, &self.bindings) {
            Ok(attached) => attached,
            Err(err) => {
                self.live.store(false, Ordering::Release);
                return Err(err);
            }
        };

        self.state = BridgeState::Active;
        self.install(attached);

        tracing::debug!(
            "Bridge {} activated with {} subscriptions",
            self.id,
            self.subscriptions.len()
        );
        Ok(())
    }

    /// Release every subscription. No-op when inactive.
    pub fn deactivate(&mut self) {
        if !self.is_active() {
            return;
        }

        self.live.store(false, Ordering::Release);
        let released = self.subscriptions.len();
        for (_, subscription) in self.subscriptions.drain(..) {
            subscription.release();
        }
        self.state = BridgeState::Inactive;

        tracing::debug!("Bridge {} deactivated, released {}", self.id, released);
    }

    /// Wait for all pending deferred deliveries.
    ///
    /// Every delivery is awaited; the first error encountered, including one
    /// recorded when finished deliveries were reaped earlier, is returned.
    pub async fn settle(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);

        for handle in pending {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(Error::from(join_err)),
            };
            if let Err(err) = outcome {
                self.record_delivery_error(err);
            }
        }

        match self.delivery_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drop handles of finished deliveries, keeping their first error for `settle`.
    fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|handle| handle.is_finished());
        self.pending = running;

        for mut handle in finished {
            // coop budget can still report a finished task as pending
            match (&mut handle).now_or_never() {
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(err))) => self.record_delivery_error(err),
                Some(Err(join_err)) => self.record_delivery_error(Error::from(join_err)),
                None => self.pending.push(handle),
            }
        }
    }

    fn record_delivery_error(&mut self, err: Error) {
        tracing::debug!("Bridge {} delivery failed: {}", self.id, err);
        if self.delivery_error.is_none() {
            self.delivery_error = Some(err);
        }
    }

    fn delivery_context(&self) -> DeliveryContext {
        DeliveryContext {
            bridge_id: self.id.clone(),
            live: self.live.clone(),
            suppress_after_deactivate: self.config.suppress_after_deactivate,
        }
    }
}

/// Attach a batch in order. On failure, release what was attached and return the error.
fn attach_all(ctx: &DeliveryContext, batch: &[Box<dyn Binding>]) -> Result<Vec<Attached>> {
    let mut attached: Vec<Attached> = Vec::with_capacity(batch.len());
    for binding in batch {
        match binding.attach(ctx) {
            Ok(entry) => attached.push(entry),
            Err(err) => {
                tracing::warn!(
                    "Bridge {} failed to bind {}: {}",
                    ctx.bridge_id,
                    binding.descriptor().listenable_name,
                    err
                );
                for entry in &attached {
                    entry.subscription.release();
                }
                return Err(err);
            }
        }
    }
    Ok(attached)
}

fn lookup<T>(callbacks: &Callbacks<T>, name: &str, listenable: &str) -> Result<Callback<T>>
where
    T: 'static,
{
    callbacks.get(name).cloned().ok_or_else(|| {
        Error::configuration(format!(
            "no callback named {} for listenable {}",
            name, listenable
        ))
    })
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if self.config.release_on_drop {
            self.deactivate();
        }
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("bindings", &self.bindings.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("pending", &self.pending.len())
            .field("delivery_error", &self.delivery_error)
            .finish()
    }
}
