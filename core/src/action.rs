//! Actions: the closed set of state transitions.
//!
//! Every way the container state can change is one of these variants.
//! Unknown transitions do not exist at the type level; transitions that are
//! shape-legal but illegal for the current status are rejected by the
//! reducer with [`crate::error::TransitionError`].

use crate::error::OperationError;

/// A requested state transition.
///
/// Actions are immutable values, constructed once per dispatch and consumed
/// by the reducer.
///
/// # Type Parameters
///
/// - `T`: The domain payload carried by `Reset` and `Resolved`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<T> {
    /// Return to `Idle` with a caller-supplied baseline payload, clearing
    /// any error. Legal from every status.
    Reset {
        /// The confirmed payload to restore.
        baseline: T,
    },

    /// Mark an update as in flight. Legal from `Idle` and `Rejected`
    /// (retry); a duplicate `Pending` is the double-submit guard.
    Pending,

    /// The in-flight update succeeded. Legal only from `Pending`.
    Resolved {
        /// The confirmed payload returned by the operation.
        payload: T,
    },

    /// The in-flight update failed. Legal only from `Pending`.
    Rejected {
        /// The domain failure reported by the operation.
        error: OperationError,
    },
}

impl<T> Action<T> {
    /// The payload-free discriminant of this action, used in error
    /// reporting.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Reset { .. } => ActionKind::Reset,
            Self::Pending => ActionKind::Pending,
            Self::Resolved { .. } => ActionKind::Resolved,
            Self::Rejected { .. } => ActionKind::Rejected,
        }
    }
}

/// Payload-free discriminant of [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// A `Reset` action.
    Reset,
    /// A `Pending` action.
    Pending,
    /// A `Resolved` action.
    Resolved,
    /// A `Rejected` action.
    Rejected,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reset => write!(f, "reset"),
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}
