//! Naming convention helpers and deferred scheduling.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::types::{Error, Result};

/// Suffix marking the callback that receives a listenable's default data.
pub const DEFAULT_SUFFIX: &str = "Default";

/// Derive the conventional callback name for a field: `foo` → `onFoo`.
pub fn callback_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => {
            let mut name = String::with_capacity(field.len() + 2);
            name.push_str("on");
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
            name
        }
        None => "on".to_string(),
    }
}

/// Derive the default-data callback name: `onFoo` → `onFooDefault`.
pub fn default_callback_name(name: &str) -> String {
    format!("{}{}", name, DEFAULT_SUFFIX)
}

/// Run `f` on the next scheduler turn of the ambient tokio runtime.
///
/// Fails with [`Error::NoRuntime`] when called outside a runtime.
pub fn next_tick<F, R>(f: F) -> Result<JoinHandle<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let handle = Handle::try_current()
        .map_err(|e| Error::no_runtime(format!("next_tick requires a tokio runtime: {}", e)))?;

    Ok(handle.spawn(async move {
        tokio::task::yield_now().await;
        f()
    }))
}
