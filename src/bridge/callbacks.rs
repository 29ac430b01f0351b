//! Host callback tables.
//!
//! A host declares its callbacks once, by name, and bindings resolve against
//! the table when they are declared. Activation never looks names up again.

use std::collections::HashMap;
use std::fmt;

use crate::listenable::{callback, Callback};
use crate::utils::{callback_name, default_callback_name};

/// Named callbacks exposed by a host.
pub struct Callbacks<T> {
    entries: HashMap<String, Callback<T>>,
}

/// Callback names chosen for one `listen_to_many` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub callback: String,
    pub default_callback: String,
}

impl<T: 'static> Callbacks<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Builder form of [`Callbacks::insert`] taking a closure.
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), callback(f));
        self
    }

    /// Register `cb` under `name`, returning any callback it replaced.
    pub fn insert(&mut self, name: impl Into<String>, cb: Callback<T>) -> Option<Callback<T>> {
        self.entries.insert(name.into(), cb)
    }

    pub fn get(&self, name: &str) -> Option<&Callback<T>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick callback names for a listenable field by convention.
    ///
    /// Primary: `on<Field>` if present, else `<field>` if present, else `None`.
    /// Default: `on<Field>Default`, then `<primary>Default`, then the primary.
    pub fn resolve_field(&self, field: &str) -> Option<ResolvedNames> {
        let conventional = callback_name(field);
        let primary = if self.contains(&conventional) {
            conventional.clone()
        } else if self.contains(field) {
            field.to_string()
        } else {
            return None;
        };

        let default_callback = [
            default_callback_name(&conventional),
            default_callback_name(&primary),
        ]
        .into_iter()
        .find(|name| self.contains(name))
        .unwrap_or_else(|| primary.clone());

        Some(ResolvedNames {
            callback: primary,
            default_callback,
        })
    }
}

impl<T: 'static> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Callbacks").field("names", &names).finish()
    }
}
