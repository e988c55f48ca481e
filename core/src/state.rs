//! Snapshot and status types.
//!
//! A [`Snapshot`] is an immutable view of container state at one point in
//! time. Consumers only ever receive snapshots; the container replaces its
//! snapshot wholesale on every transition, so a reader can never observe a
//! half-updated state.
//!
//! # Invariant
//!
//! `error()` is `Some` if and only if `status()` is [`Status::Rejected`].
//! Snapshot fields are private and snapshots are only produced by
//! [`Snapshot::idle`] and the transition reducer, so the invariant holds by
//! construction rather than by runtime checks.

use crate::error::OperationError;
use serde::Serialize;

/// Lifecycle status of the asynchronous update tracked by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No update in flight; data is the confirmed baseline.
    Idle,

    /// An update has been submitted and has not settled yet.
    Pending,

    /// The last update succeeded; data carries its payload.
    Resolved,

    /// The last update failed; the snapshot carries the failure.
    Rejected,
}

impl Status {
    /// Check if status is idle
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if an update is in flight
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if the last update succeeded
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Check if the last update failed
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Immutable state snapshot.
///
/// `data` always reflects the last *confirmed* payload: while an update is
/// pending the snapshot keeps the pre-transition value (optimistic display
/// is the consumer's concern, not the container's).
///
/// # Type Parameters
///
/// - `T`: The domain payload (e.g. a user profile)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot<T> {
    data: T,
    status: Status,
    error: Option<OperationError>,
}

impl<T> Snapshot<T> {
    /// Create an idle snapshot around a confirmed baseline payload.
    #[must_use]
    pub const fn idle(data: T) -> Self {
        Self {
            data,
            status: Status::Idle,
            error: None,
        }
    }

    /// The last confirmed domain payload.
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Current update status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// The failure of the last update, present exactly when the status is
    /// [`Status::Rejected`].
    #[must_use]
    pub const fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    /// Consume the snapshot, returning the payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }

    // Reducer-internal constructors. Keeping these crate-private is what
    // makes the error-iff-rejected invariant structural.

    pub(crate) fn pending(data: T) -> Self {
        Self {
            data,
            status: Status::Pending,
            error: None,
        }
    }

    pub(crate) fn resolved(data: T) -> Self {
        Self {
            data,
            status: Status::Resolved,
            error: None,
        }
    }

    pub(crate) fn rejected(data: T, error: OperationError) -> Self {
        Self {
            data,
            status: Status::Rejected,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_has_no_error() {
        let snapshot = Snapshot::idle(42);
        assert_eq!(snapshot.status(), Status::Idle);
        assert_eq!(*snapshot.data(), 42);
        assert!(snapshot.error().is_none());
    }

    #[test]
    fn rejected_snapshot_carries_error() {
        let snapshot = Snapshot::rejected(42, OperationError::new("boom"));
        assert!(snapshot.status().is_rejected());
        assert_eq!(snapshot.error().map(OperationError::message), Some("boom"));
    }

    #[test]
    fn status_predicates() {
        assert!(Status::Idle.is_idle());
        assert!(Status::Pending.is_pending());
        assert!(Status::Resolved.is_resolved());
        assert!(Status::Rejected.is_rejected());
        assert!(!Status::Idle.is_pending());
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(Status::Rejected.to_string(), "rejected");
    }
}
