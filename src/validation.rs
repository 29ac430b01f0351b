//! Binding validation utilities.

use crate::types::{Error, Result};

/// Validate that a name used in a binding is not empty.
pub fn validate_non_empty(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::configuration(format!("{} cannot be empty", field)));
    }
    Ok(())
}
