//! # Livestate Runtime
//!
//! Runtime for the livestate asynchronous state container.
//!
//! This crate provides the [`Container`] that owns a state snapshot, its
//! subscriber registry and its liveness flag, plus the [`gateway::Gateway`]
//! that drives update cycles against an external asynchronous backend.
//!
//! ## Core Components
//!
//! - **Container**: holds the current [`Snapshot`], applies transitions
//!   through the reducer, notifies subscribers
//! - **Subscription registry**: listeners invoked after every applied
//!   dispatch, in registration order
//! - **Liveness flag**: flips to dead exactly once at teardown; any
//!   dispatch arriving afterwards is suppressed, not failed
//! - **Gateway**: pending → await backend → terminal, with the terminal
//!   dispatch checked against liveness through a weak handle
//!
//! ## Example
//!
//! ```
//! use livestate_core::action::Action;
//! use livestate_runtime::Container;
//!
//! let container = Container::new("v1".to_string());
//! let subscription = container.subscribe(|snapshot| {
//!     println!("status is now {}", snapshot.status());
//! });
//!
//! container.dispatch(Action::Pending).unwrap();
//! assert!(container.state(|s| s.status().is_pending()));
//!
//! subscription.unsubscribe();
//! container.teardown();
//! ```

/// Gateway bridging dispatch and the asynchronous backend.
pub mod gateway;

/// Subscriber registry and subscription handles.
pub mod subscription;

/// Container: the state-holding unit with its own liveness lifecycle.
pub mod container {
    use crate::subscription::{Listener, SubscriberRegistry, Subscription};
    use livestate_core::action::Action;
    use livestate_core::error::TransitionError;
    use livestate_core::reducer::{Reducer, TransitionReducer};
    use livestate_core::state::Snapshot;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, PoisonError, RwLock, Weak};

    /// Outcome of a dispatch that did not fail structurally.
    ///
    /// A dispatch on a torn-down container is explicitly not an error: it
    /// is detected and discarded, and the caller learns about it through
    /// [`Dispatched::Suppressed`] rather than through a `Result::Err`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Dispatched<T> {
        /// The transition was applied; carries the fresh snapshot.
        Applied(Snapshot<T>),

        /// The container was torn down (or dropped); nothing happened.
        Suppressed,
    }

    impl<T> Dispatched<T> {
        /// Check whether the transition was applied.
        #[must_use]
        pub const fn is_applied(&self) -> bool {
            matches!(self, Self::Applied(_))
        }

        /// The fresh snapshot, if the transition was applied.
        #[must_use]
        pub fn applied(self) -> Option<Snapshot<T>> {
            match self {
                Self::Applied(snapshot) => Some(snapshot),
                Self::Suppressed => None,
            }
        }
    }

    struct ContainerInner<T, R> {
        state: RwLock<Snapshot<T>>,
        reducer: R,
        subscribers: Arc<SubscriberRegistry<T>>,
        live: AtomicBool,
    }

    /// The state container: one snapshot, one subscriber registry, one
    /// liveness flag.
    ///
    /// Containers are constructed explicitly and passed to every consumer
    /// needing read or dispatch access; there is no ambient or global
    /// lookup, and independent instances are fully isolated. Cloning a
    /// `Container` is cheap and shares the same underlying state.
    ///
    /// # Type Parameters
    ///
    /// - `T`: The domain payload
    /// - `R`: The reducer governing transitions (defaults to the standard
    ///   transition reducer)
    ///
    /// # Example
    ///
    /// ```
    /// use livestate_runtime::Container;
    /// use livestate_core::action::Action;
    ///
    /// let container = Container::new(0_i64);
    /// container.dispatch(Action::Pending).unwrap();
    /// container.dispatch(Action::Resolved { payload: 7 }).unwrap();
    /// assert_eq!(container.state(|s| *s.data()), 7);
    /// ```
    pub struct Container<T, R = TransitionReducer<T>> {
        inner: Arc<ContainerInner<T, R>>,
    }

    impl<T: Clone> Container<T> {
        /// Create a live container around a confirmed baseline payload,
        /// using the standard transition reducer.
        #[must_use]
        pub fn new(baseline: T) -> Self {
            Self::with_reducer(baseline, TransitionReducer::new())
        }
    }

    impl<T, R> Container<T, R>
    where
        T: Clone,
        R: Reducer<State = Snapshot<T>, Action = Action<T>>,
    {
        /// Create a live container with a custom reducer.
        #[must_use]
        pub fn with_reducer(baseline: T, reducer: R) -> Self {
            Self {
                inner: Arc::new(ContainerInner {
                    state: RwLock::new(Snapshot::idle(baseline)),
                    reducer,
                    subscribers: Arc::new(SubscriberRegistry::new()),
                    live: AtomicBool::new(true),
                }),
            }
        }

        /// Current snapshot, cloned out. No side effects.
        #[must_use]
        pub fn snapshot(&self) -> Snapshot<T> {
            self.state(Snapshot::clone)
        }

        /// Read current state via a closure, releasing the lock promptly:
        ///
        /// ```
        /// # use livestate_runtime::Container;
        /// # let container = Container::new(41_i64);
        /// let value = container.state(|s| *s.data());
        /// ```
        pub fn state<F, U>(&self, f: F) -> U
        where
            F: FnOnce(&Snapshot<T>) -> U,
        {
            let guard = self
                .inner
                .state
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            f(&guard)
        }

        /// Dispatch an action through the reducer.
        ///
        /// On success the container replaces its snapshot and notifies all
        /// subscribers synchronously, in registration order, after the
        /// state lock is released. On a torn-down container the dispatch
        /// is skipped entirely: no state change, no notification, no error
        /// and no log, just [`Dispatched::Suppressed`].
        ///
        /// # Errors
        ///
        /// Returns [`TransitionError::InvalidTransition`] when the action
        /// is illegal for the current status. State and subscribers are
        /// untouched in that case.
        pub fn dispatch(&self, action: Action<T>) -> Result<Dispatched<T>, TransitionError> {
            if !self.is_live() {
                return Ok(Dispatched::Suppressed);
            }

            let kind = action.kind();
            let next = {
                let mut guard = self
                    .inner
                    .state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);

                match self.inner.reducer.reduce(&guard, action) {
                    Ok(next) => {
                        *guard = next.clone();
                        next
                    },
                    Err(error) => {
                        metrics::counter!(
                            "container.transitions.invalid",
                            "action" => kind.to_string()
                        )
                        .increment(1);
                        tracing::debug!(%error, "rejected invalid transition");
                        return Err(error);
                    },
                }
            };

            metrics::counter!("container.dispatches.total", "action" => kind.to_string())
                .increment(1);
            tracing::trace!(status = %next.status(), "applied transition");

            self.inner.subscribers.notify(&next);
            Ok(Dispatched::Applied(next))
        }

        /// Register a listener invoked after every applied dispatch.
        ///
        /// The returned [`Subscription`] deregisters the listener via
        /// `unsubscribe()`; calling it twice is a no-op.
        pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
        where
            F: Fn(&Snapshot<T>) + Send + Sync + 'static,
        {
            let listener: Listener<T> = Arc::new(listener);
            let id = self.inner.subscribers.register(listener);
            Subscription::new(id, Arc::downgrade(&self.inner.subscribers))
        }

        /// Check whether the container still accepts dispatches.
        #[must_use]
        pub fn is_live(&self) -> bool {
            self.inner.live.load(Ordering::Acquire)
        }

        /// Tear the container down.
        ///
        /// Flips the liveness flag to dead; it can never flip back. Every
        /// dispatch arriving afterwards, including terminal dispatches
        /// from updates still in flight, is suppressed. Returns `true` for
        /// the call that actually performed the flip.
        pub fn teardown(&self) -> bool {
            let was_live = self.inner.live.swap(false, Ordering::AcqRel);
            if was_live {
                tracing::debug!("container torn down");
            }
            was_live
        }

        /// A weak handle for deferred continuations.
        ///
        /// The handle can check liveness and dispatch without keeping the
        /// container alive; once every strong reference is gone, dispatch
        /// through the handle reports [`Dispatched::Suppressed`].
        #[must_use]
        pub fn handle(&self) -> ContainerHandle<T, R> {
            ContainerHandle {
                inner: Arc::downgrade(&self.inner),
            }
        }
    }

    impl<T, R> Clone for Container<T, R> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T, R> std::fmt::Debug for Container<T, R> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Container")
                .field("live", &self.is_live_raw())
                .finish_non_exhaustive()
        }
    }

    impl<T, R> Container<T, R> {
        fn is_live_raw(&self) -> bool {
            self.inner.live.load(Ordering::Acquire)
        }
    }

    /// Weak back-reference to a container.
    ///
    /// Held by the gateway (and any other deferred continuation) so a
    /// settled operation can consult the liveness flag and dispatch
    /// without owning the container.
    pub struct ContainerHandle<T, R = TransitionReducer<T>> {
        inner: Weak<ContainerInner<T, R>>,
    }

    impl<T, R> ContainerHandle<T, R>
    where
        T: Clone,
        R: Reducer<State = Snapshot<T>, Action = Action<T>>,
    {
        /// Dispatch through the weak reference.
        ///
        /// If the container has been dropped or torn down the action is
        /// discarded and [`Dispatched::Suppressed`] is reported; otherwise
        /// this behaves exactly like [`Container::dispatch`].
        ///
        /// # Errors
        ///
        /// Returns [`TransitionError::InvalidTransition`] when the
        /// container is live but the action is illegal for the current
        /// status.
        pub fn dispatch(&self, action: Action<T>) -> Result<Dispatched<T>, TransitionError> {
            match self.inner.upgrade() {
                Some(inner) => Container { inner }.dispatch(action),
                None => Ok(Dispatched::Suppressed),
            }
        }

        /// Check whether the container is still around and live.
        #[must_use]
        pub fn is_live(&self) -> bool {
            self.inner
                .upgrade()
                .is_some_and(|inner| inner.live.load(Ordering::Acquire))
        }
    }

    impl<T, R> Clone for ContainerHandle<T, R> {
        fn clone(&self) -> Self {
            Self {
                inner: Weak::clone(&self.inner),
            }
        }
    }

    impl<T, R> std::fmt::Debug for ContainerHandle<T, R> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ContainerHandle")
                .field("live", &self.inner.upgrade().is_some())
                .finish_non_exhaustive()
        }
    }
}

// Re-export for convenience
pub use container::{Container, ContainerHandle, Dispatched};
pub use gateway::Gateway;
pub use subscription::Subscription;

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;
    use livestate_core::action::{Action, ActionKind};
    use livestate_core::error::{OperationError, TransitionError};
    use livestate_core::state::Status;
    use livestate_testing::mocks::{EchoBackend, FailingBackend, GatedBackend};
    use livestate_testing::recording_listener;
    use std::sync::Arc;

    #[test]
    fn dispatch_walks_the_happy_path() {
        let container = Container::new("v1".to_string());
        assert_eq!(container.state(|s| s.status()), Status::Idle);

        container
            .dispatch(Action::Pending)
            .expect("idle -> pending is legal");
        assert_eq!(container.state(|s| s.status()), Status::Pending);
        // Data keeps the confirmed value while pending.
        assert_eq!(container.state(|s| s.data().clone()), "v1");

        container
            .dispatch(Action::Resolved {
                payload: "v2".to_string(),
            })
            .expect("pending -> resolved is legal");
        assert_eq!(container.state(|s| s.status()), Status::Resolved);
        assert_eq!(container.state(|s| s.data().clone()), "v2");
    }

    #[test]
    fn double_pending_fails_without_mutating() {
        let container = Container::new(1_i64);
        container.dispatch(Action::Pending).expect("first pending");

        let before = container.snapshot();
        let err = container
            .dispatch(Action::Pending)
            .expect_err("second pending must fail");

        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: Status::Pending,
                action: ActionKind::Pending,
            }
        );
        assert_eq!(container.snapshot(), before);
    }

    #[test]
    fn failed_dispatch_does_not_notify() {
        let container = Container::new(1_i64);
        let (listener, log) = recording_listener();
        let _subscription = container.subscribe(listener);

        container.dispatch(Action::Pending).expect("first pending");
        assert_eq!(log.len(), 1);

        let _ = container.dispatch(Action::Pending);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn subscribers_see_every_applied_snapshot() {
        let container = Container::new("base".to_string());
        let (listener, log) = recording_listener();
        let _subscription = container.subscribe(listener);

        container.dispatch(Action::Pending).expect("pending");
        container
            .dispatch(Action::Rejected {
                error: OperationError::new("boom"),
            })
            .expect("rejected");
        container
            .dispatch(Action::Reset {
                baseline: "base".to_string(),
            })
            .expect("reset");

        let statuses: Vec<Status> = log
            .snapshots()
            .iter()
            .map(livestate_core::state::Snapshot::status)
            .collect();
        assert_eq!(
            statuses,
            vec![Status::Pending, Status::Rejected, Status::Idle]
        );
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let container = Container::new(0_i64);
        let (listener, log) = recording_listener();
        let subscription = container.subscribe(listener);

        container.dispatch(Action::Pending).expect("pending");
        assert_eq!(log.len(), 1);

        subscription.unsubscribe();
        subscription.unsubscribe();

        container
            .dispatch(Action::Resolved { payload: 9 })
            .expect("resolved");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn teardown_flips_once() {
        let container = Container::new(0_i64);
        assert!(container.is_live());
        assert!(container.teardown());
        assert!(!container.teardown());
        assert!(!container.is_live());
    }

    #[test]
    fn dispatch_after_teardown_is_suppressed() {
        let container = Container::new(0_i64);
        let (listener, log) = recording_listener();
        let _subscription = container.subscribe(listener);

        container.teardown();
        let outcome = container
            .dispatch(Action::Pending)
            .expect("suppression is not an error");

        assert_eq!(outcome, Dispatched::Suppressed);
        assert_eq!(container.state(|s| s.status()), Status::Idle);
        assert!(log.is_empty());
    }

    #[test]
    fn handle_suppresses_after_container_dropped() {
        let container = Container::new(0_i64);
        let handle = container.handle();
        assert!(handle.is_live());

        drop(container);

        assert!(!handle.is_live());
        let outcome = handle
            .dispatch(Action::Pending)
            .expect("suppression is not an error");
        assert_eq!(outcome, Dispatched::Suppressed);
    }

    #[test]
    fn containers_are_isolated() {
        let a = Container::new(0_i64);
        let b = Container::new(0_i64);

        a.dispatch(Action::Pending).expect("pending on a");
        assert_eq!(a.state(|s| s.status()), Status::Pending);
        assert_eq!(b.state(|s| s.status()), Status::Idle);
    }

    #[test]
    fn clones_share_state() {
        let a = Container::new(0_i64);
        let b = a.clone();

        a.dispatch(Action::Pending).expect("pending");
        assert_eq!(b.state(|s| s.status()), Status::Pending);
    }

    #[tokio::test]
    async fn gateway_resolves_with_backend_payload() {
        let container = Container::new(1_i64);
        let gateway = Gateway::new(&container, Arc::new(EchoBackend::new()));

        gateway.run(5_i64).await.expect("run succeeds");

        assert_eq!(container.state(|s| s.status()), Status::Resolved);
        assert_eq!(container.state(|s| *s.data()), 5);
    }

    #[tokio::test]
    async fn gateway_captures_backend_failure_into_state() {
        let container = Container::new(1_i64);
        let gateway = Gateway::new(
            &container,
            Arc::new(FailingBackend::<i64, i64>::new("backend down")),
        );

        gateway.run(5_i64).await.expect("run itself succeeds");

        assert_eq!(container.state(|s| s.status()), Status::Rejected);
        assert_eq!(container.state(|s| *s.data()), 1);
        assert_eq!(
            container.state(|s| s.error().map(OperationError::message).map(String::from)),
            Some("backend down".to_string())
        );
    }

    #[tokio::test]
    async fn gateway_rejects_overlapping_runs() {
        let container = Container::new(1_i64);
        let backend = Arc::new(GatedBackend::<i64, i64>::resolving(2));
        let gateway = Gateway::new(&container, Arc::clone(&backend));

        let first = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.run(2_i64).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(container.state(|s| s.status()), Status::Pending);

        // Second run while the first is still in flight hits the
        // double-submit guard synchronously.
        let err = gateway.run(3_i64).await.expect_err("double submit");
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: Status::Pending,
                action: ActionKind::Pending,
            }
        );

        backend.release();
        first
            .await
            .expect("task join")
            .expect("first run succeeds");
        assert_eq!(container.state(|s| s.status()), Status::Resolved);
    }

    #[tokio::test]
    async fn gateway_suppresses_settlement_after_teardown() {
        let container = Container::new(1_i64);
        let (listener, log) = recording_listener();
        let _subscription = container.subscribe(listener);

        let backend = Arc::new(GatedBackend::<i64, i64>::resolving(99));
        let gateway = Gateway::new(&container, Arc::clone(&backend));

        let run = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.run(99_i64).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(container.state(|s| s.status()), Status::Pending);
        let notified_before = log.len();

        container.teardown();
        backend.release();
        run.await.expect("task join").expect("run succeeds");

        // The settlement changed nothing and woke nobody.
        assert_eq!(container.state(|s| s.status()), Status::Pending);
        assert_eq!(container.state(|s| *s.data()), 1);
        assert_eq!(log.len(), notified_before);
    }

    #[tokio::test]
    async fn gateway_run_on_torn_down_container_is_noop() {
        let container = Container::new(1_i64);
        let backend = Arc::new(EchoBackend::new());
        let gateway = Gateway::new(&container, backend);

        container.teardown();
        gateway.run(5_i64).await.expect("no-op run");

        assert_eq!(container.state(|s| s.status()), Status::Idle);
        assert_eq!(container.state(|s| *s.data()), 1);
    }

    #[tokio::test]
    async fn gateway_allows_retry_after_rejection() {
        let container = Container::new(1_i64);
        let failing = Gateway::new(
            &container,
            Arc::new(FailingBackend::<i64, i64>::new("first try fails")),
        );
        failing.run(2_i64).await.expect("run succeeds");
        assert_eq!(container.state(|s| s.status()), Status::Rejected);

        let succeeding = Gateway::new(&container, Arc::new(EchoBackend::new()));
        succeeding.run(2_i64).await.expect("retry succeeds");

        assert_eq!(container.state(|s| s.status()), Status::Resolved);
        assert_eq!(container.state(|s| *s.data()), 2);
        assert!(container.state(|s| s.error().is_none()));
    }
}
