//! Error types.
//!
//! Two kinds of failure exist in this system, with different propagation
//! rules:
//!
//! - [`TransitionError`]: a structural, synchronous error: the caller
//!   requested a transition that is illegal for the current status. It
//!   propagates to the immediate caller because it indicates a caller bug.
//! - [`OperationError`]: a domain failure reported by the asynchronous
//!   backend. It is captured into state via the `Rejected` transition and
//!   is never raised past the async boundary.
//!
//! A terminal dispatch arriving after container teardown is deliberately
//! *not* an error: it is detected and discarded without logging.

use crate::action::ActionKind;
use crate::state::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised synchronously by the transition reducer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// A requested transition is illegal for the current status.
    ///
    /// Never silently swallowed: an illegal transition surfaces a logic
    /// error in the caller (the canonical case is dispatching `pending`
    /// while already `pending`, a double submit).
    #[error("invalid transition: action '{action}' is not allowed while '{from}'")]
    InvalidTransition {
        /// The status the container was in when the action arrived.
        from: Status,
        /// The discriminant of the rejected action.
        action: ActionKind,
    },
}

/// A domain failure from the external asynchronous operation.
///
/// Carries at least a human-readable message; consumers observe it through
/// `Snapshot::error()` after a `Rejected` transition, and remain free to
/// retry with a fresh update.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct OperationError {
    message: String,
}

impl OperationError {
    /// Create a new operation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_display_names_both_sides() {
        let err = TransitionError::InvalidTransition {
            from: Status::Pending,
            action: ActionKind::Pending,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition: action 'pending' is not allowed while 'pending'"
        );
    }

    #[test]
    fn operation_error_display_is_message() {
        let err = OperationError::new("service unavailable");
        assert_eq!(err.to_string(), "service unavailable");
        assert_eq!(err.message(), "service unavailable");
    }
}
