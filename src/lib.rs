//! # Listener Core - Lifecycle-Bound Subscriptions
//!
//! Ties a host's mount / unmount lifecycle to event-source subscriptions:
//! - Listenable sources (`Action`, `Store`) with ordered fan-out emission
//! - A subscription `Bridge` that subscribes on activation and releases on
//!   deactivation
//! - Default-data delivery, immediate or deferred, guarded by a per-activation
//!   liveness flag
//! - `listen_to_many` binding by the `on<Field>` naming convention
//!
//! ## Architecture
//!
//! ```text
//!   Host (ListenerHost)
//!     │ will_mount / will_unmount
//!     ▼
//!   ┌──────────────────────────────┐
//!   │            Bridge            │
//!   │  bindings ─▶ subscriptions   │──listen()──▶ Action / Store
//!   │  pending default deliveries  │◀─default_data()──┘
//!   └──────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod bridge;
pub mod emitter;
pub mod listenable;
pub mod types;
pub mod utils;
pub mod validation;

// Internal utilities
pub mod observability;

pub use bridge::{Bridge, BridgeState, Callbacks, ListenerHost};
pub use listenable::{callback, Action, Callback, DefaultData, Listenable, Store, Subscription};
pub use types::{Config, Error, Result};
