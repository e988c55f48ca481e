//! The transition reducer: pure business logic for status transitions.
//!
//! Reducers are pure functions `(Snapshot, Action) -> Result<Snapshot>`.
//! They perform no I/O, never mutate their input, and either produce a
//! fresh snapshot or fail fast with [`TransitionError`].

use crate::action::Action;
use crate::error::TransitionError;
use crate::state::{Snapshot, Status};

/// The Reducer trait: core abstraction for transition logic.
///
/// # Type Parameters
///
/// - `State`: The snapshot type this reducer operates on
/// - `Action`: The action type this reducer processes
///
/// # Example
///
/// ```
/// use livestate_core::reducer::{Reducer, TransitionReducer};
/// use livestate_core::state::Snapshot;
/// use livestate_core::action::Action;
///
/// let reducer = TransitionReducer::new();
/// let next = reducer.reduce(&Snapshot::idle(1), Action::Pending);
/// assert!(next.is_ok());
/// ```
pub trait Reducer {
    /// The snapshot type this reducer operates on.
    type State;

    /// The action type this reducer processes.
    type Action;

    /// Reduce an action into a fresh snapshot.
    ///
    /// This is a pure function: it reads the current snapshot, validates
    /// the action against it, and returns the successor snapshot. The
    /// input is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] when the action is
    /// illegal for the current status. The caller's state must remain
    /// untouched in that case.
    fn reduce(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<Self::State, TransitionError>;
}

/// The standard transition reducer over [`Snapshot<T>`].
///
/// Implements the transition table:
///
/// | current           | action     | next                                  |
/// |-------------------|------------|---------------------------------------|
/// | any               | `Reset`    | `Idle`, data = baseline, error cleared |
/// | `Idle`/`Rejected` | `Pending`  | `Pending`, data unchanged             |
/// | `Pending`         | `Resolved` | `Resolved`, data = payload            |
/// | `Pending`         | `Rejected` | `Rejected`, data unchanged, error set |
///
/// Every other combination fails with
/// [`TransitionError::InvalidTransition`]. In particular `Pending` while
/// already `Pending` is the double-submit guard, and `Resolved` does not
/// transition to `Pending` directly: a new update cycle starts from
/// `Reset`.
///
/// Generic over the payload type `T`.
#[derive(Debug, Clone, Copy)]
pub struct TransitionReducer<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> TransitionReducer<T> {
    /// Create a new transition reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Default for TransitionReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Reducer for TransitionReducer<T> {
    type State = Snapshot<T>;
    type Action = Action<T>;

    fn reduce(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<Self::State, TransitionError> {
        match (state.status(), action) {
            (_, Action::Reset { baseline }) => Ok(Snapshot::idle(baseline)),
            (Status::Idle | Status::Rejected, Action::Pending) => {
                Ok(Snapshot::pending(state.data().clone()))
            },
            (Status::Pending, Action::Resolved { payload }) => Ok(Snapshot::resolved(payload)),
            (Status::Pending, Action::Rejected { error }) => {
                Ok(Snapshot::rejected(state.data().clone(), error))
            },
            (from, action) => Err(TransitionError::InvalidTransition {
                from,
                action: action.kind(),
            }),
        }
    }
}
