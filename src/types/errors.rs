//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for listener bindings and their sources.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller configuration errors (unresolved callback name, empty name).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid bridge state transition (activate while active).
    #[error("state transition error: {0}")]
    StateTransition(String),

    /// Deferred work requested outside a tokio runtime.
    #[error("no async runtime: {0}")]
    NoRuntime(String),

    /// A deferred default value rejected, or its delivery task failed.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn state_transition(msg: impl Into<String>) -> Self {
        Self::StateTransition(msg.into())
    }

    pub fn no_runtime(msg: impl Into<String>) -> Self {
        Self::NoRuntime(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors caused by how the caller declared its bindings.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Error::delivery(format!("delivery task panicked: {}", err))
        } else {
            Error::delivery(format!("delivery task cancelled: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = Error::configuration("no callback named onFoo");
        assert_eq!(err.to_string(), "configuration error: no callback named onFoo");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_serde_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(!err.is_configuration());
    }
}
