//! Error types for registry operations.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A single handler that panicked during a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Position of the handler in the snapshot (registration order).
    pub index: usize,
    /// Panic message, if the payload was a string.
    pub message: String,
}

impl HandlerFailure {
    pub(crate) fn from_panic(index: usize, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self { index, message }
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler #{} panicked: {}", self.index, self.message)
    }
}

/// Errors surfaced by [`publish`](crate::EventRegistry::publish).
///
/// Subscribing and unsubscribing never fail; only handler failures under
/// [`FailurePolicy::Isolate`](crate::FailurePolicy::Isolate) are reported,
/// and only once every handler in the snapshot has been invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// One or more handlers panicked; the others still ran.
    #[error("{} of {invoked} handlers failed", .failures.len())]
    HandlersFailed {
        /// Number of handlers invoked, including the failed ones.
        invoked: usize,
        /// Failures in registration order.
        failures: Vec<HandlerFailure>,
    },
}

impl PublishError {
    /// Returns the individual handler failures.
    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            PublishError::HandlersFailed { failures, .. } => failures,
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_from_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let failure = HandlerFailure::from_panic(2, payload.as_ref());
        assert_eq!(failure.index, 2);
        assert_eq!(failure.message, "boom");
        assert_eq!(failure.to_string(), "handler #2 panicked: boom");
    }

    #[test]
    fn test_failure_from_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        let failure = HandlerFailure::from_panic(0, payload.as_ref());
        assert_eq!(failure.message, "code 7");
    }

    #[test]
    fn test_failure_from_other_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        let failure = HandlerFailure::from_panic(1, payload.as_ref());
        assert_eq!(failure.message, "non-string panic payload");
    }

    #[test]
    fn test_publish_error_display() {
        let err = PublishError::HandlersFailed {
            invoked: 3,
            failures: vec![HandlerFailure {
                index: 1,
                message: "bad".into(),
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 handlers failed");
        assert_eq!(err.failures().len(), 1);
    }
}
