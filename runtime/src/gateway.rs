//! Gateway: bridges synchronous dispatch and the asynchronous backend.
//!
//! One [`Gateway::run`] invocation is one update cycle:
//!
//! 1. dispatch `Pending` synchronously, before the backend is invoked
//! 2. await the backend, the sole suspension point
//! 3. dispatch `Resolved` / `Rejected` through a weak container handle,
//!    so a container torn down while the update was in flight silently
//!    discards the result
//!
//! This is fire-and-forget with result suppression, not true cancellation:
//! the backend keeps consuming resources until it naturally settles.

use crate::container::{Container, ContainerHandle, Dispatched};
use livestate_core::action::Action;
use livestate_core::backend::Backend;
use livestate_core::error::TransitionError;
use livestate_core::reducer::{Reducer, TransitionReducer};
use livestate_core::state::Snapshot;
use std::sync::Arc;

/// Async operation gateway for one container/backend pair.
///
/// Holds a weak back-reference to the container, never ownership: a
/// completed operation can check liveness without keeping the container
/// alive artificially.
///
/// # Type Parameters
///
/// - `B`: The backend supplying the asynchronous operation
/// - `R`: The reducer governing transitions (defaults to the standard
///   transition reducer over the backend's payload)
pub struct Gateway<B, R = TransitionReducer<<B as Backend>::Payload>>
where
    B: Backend,
{
    container: ContainerHandle<B::Payload, R>,
    backend: Arc<B>,
}

impl<B, R> Gateway<B, R>
where
    B: Backend,
    B::Payload: Clone,
    R: Reducer<State = Snapshot<B::Payload>, Action = Action<B::Payload>>,
{
    /// Create a gateway for the given container and backend.
    ///
    /// The gateway only keeps a weak handle to the container; dropping
    /// every strong `Container` reference while a run is in flight is
    /// equivalent to teardown as far as the gateway is concerned.
    #[must_use]
    pub fn new(container: &Container<B::Payload, R>, backend: Arc<B>) -> Self {
        Self {
            container: container.handle(),
            backend,
        }
    }

    /// Drive one full update cycle against the backend.
    ///
    /// Dispatches `Pending` immediately, awaits the backend, then
    /// dispatches the terminal transition if (and only if) the container
    /// is still live. If the container was already torn down or dropped
    /// before the cycle starts, the whole run is a no-op.
    ///
    /// A backend failure is not an error of this function: it becomes a
    /// `Rejected` snapshot that consumers observe through `state.error`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] if an update is
    /// already pending on the container (double-submit guard). The
    /// container state is untouched in that case.
    #[tracing::instrument(skip(self, request), name = "gateway_run")]
    pub async fn run(&self, request: B::Request) -> Result<(), TransitionError> {
        match self.container.dispatch(Action::Pending)? {
            Dispatched::Suppressed => return Ok(()),
            Dispatched::Applied(_) => {},
        }

        metrics::counter!("gateway.runs.total").increment(1);
        tracing::debug!("update pending, submitting to backend");

        let settled = self.backend.submit(request).await;

        let terminal = match settled {
            Ok(payload) => Action::Resolved { payload },
            Err(error) => Action::Rejected { error },
        };

        match self.container.dispatch(terminal) {
            Ok(Dispatched::Applied(snapshot)) => {
                tracing::debug!(status = %snapshot.status(), "update settled");
            },
            Ok(Dispatched::Suppressed) => {
                // Torn down while in flight. The result is discarded with
                // no error and no log; this is the expected shape of the
                // harmless teardown race.
            },
            Err(error) => {
                // Only reachable if a manual dispatch moved the container
                // out of pending while this run was in flight.
                metrics::counter!("gateway.terminal.invalid").increment(1);
                tracing::warn!(%error, "terminal transition rejected");
            },
        }

        Ok(())
    }
}

impl<B, R> Clone for Gateway<B, R>
where
    B: Backend,
{
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B, R> std::fmt::Debug for Gateway<B, R>
where
    B: Backend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}
