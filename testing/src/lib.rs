//! # Livestate Testing
//!
//! Testing utilities and mock backends for the livestate state container.
//!
//! This crate provides:
//! - Mock [`Backend`](livestate_core::backend::Backend) implementations
//!   (echoing, failing, and gated-for-race-tests)
//! - A recording listener for asserting on notification sequences
//! - A fluent Given/When/Then harness for transition reducers
//!
//! ## Example
//!
//! ```
//! use livestate_testing::TransitionTest;
//! use livestate_core::action::Action;
//! use livestate_core::reducer::TransitionReducer;
//! use livestate_core::state::{Snapshot, Status};
//!
//! TransitionTest::new(TransitionReducer::new())
//!     .given_state(Snapshot::idle(0_i64))
//!     .when_action(Action::Pending)
//!     .then_state(|state| {
//!         assert_eq!(state.status(), Status::Pending);
//!     })
//!     .run();
//! ```

use livestate_core::state::Snapshot;
use std::sync::{Arc, Mutex, PoisonError};


/// Mock backend implementations for testing.
///
/// All mocks are deterministic stand-ins behind the core
/// [`Backend`](livestate_core::backend::Backend) trait:
///
/// - [`EchoBackend`](mocks::EchoBackend): resolves immediately, echoing
///   the request
/// - [`FailingBackend`](mocks::FailingBackend): always rejects with a
///   fixed message
/// - [`GatedBackend`](mocks::GatedBackend): parks until released, the
///   instrument for teardown-race tests
pub mod mocks {
    use livestate_core::backend::{Backend, SubmitFuture};
    use livestate_core::error::OperationError;
    use std::marker::PhantomData;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Backend that resolves immediately, echoing the request back as the
    /// payload.
    #[derive(Debug)]
    pub struct EchoBackend<T> {
        calls: std::sync::Arc<AtomicUsize>,
        _payload: PhantomData<fn(T) -> T>,
    }

    impl<T> Clone for EchoBackend<T> {
        fn clone(&self) -> Self {
            Self {
                calls: std::sync::Arc::clone(&self.calls),
                _payload: PhantomData,
            }
        }
    }

    impl<T> Default for EchoBackend<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T> EchoBackend<T> {
        /// Create an echoing backend.
        #[must_use]
        pub fn new() -> Self {
            Self {
                calls: std::sync::Arc::new(AtomicUsize::new(0)),
                _payload: PhantomData,
            }
        }

        /// Number of `submit` calls seen so far.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl<T: Send + Sync + 'static> Backend for EchoBackend<T> {
        type Request = T;
        type Payload = T;

        fn submit(&self, request: Self::Request) -> SubmitFuture<'_, Self::Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(request) })
        }
    }

    /// Backend that always fails with a fixed message.
    #[derive(Debug)]
    pub struct FailingBackend<Req, P> {
        message: String,
        calls: AtomicUsize,
        _types: PhantomData<fn(Req) -> P>,
    }

    impl<Req, P> FailingBackend<Req, P> {
        /// Create a backend that rejects every request with `message`.
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
                calls: AtomicUsize::new(0),
                _types: PhantomData,
            }
        }

        /// Number of `submit` calls seen so far.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl<Req: Send, P: Send> Backend for FailingBackend<Req, P> {
        type Request = Req;
        type Payload = P;

        fn submit(&self, _request: Self::Request) -> SubmitFuture<'_, Self::Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let error = OperationError::new(self.message.clone());
            Box::pin(async move { Err(error) })
        }
    }

    /// Backend that parks every `submit` until [`GatedBackend::release`]
    /// is called, then settles with a preconfigured outcome.
    ///
    /// This is the instrument for racing a settlement against container
    /// teardown: start a run, assert on the pending state, tear down, then
    /// release the gate.
    #[derive(Debug)]
    pub struct GatedBackend<Req, P> {
        outcome: Result<P, OperationError>,
        gate: Notify,
        calls: AtomicUsize,
        _request: PhantomData<fn(Req)>,
    }

    impl<Req, P> GatedBackend<Req, P> {
        /// Create a gated backend that resolves with `payload` once
        /// released.
        #[must_use]
        pub fn resolving(payload: P) -> Self {
            Self {
                outcome: Ok(payload),
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                _request: PhantomData,
            }
        }

        /// Create a gated backend that fails with `message` once released.
        #[must_use]
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                outcome: Err(OperationError::new(message)),
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                _request: PhantomData,
            }
        }

        /// Release one parked `submit` call (or the next one to arrive).
        pub fn release(&self) {
            self.gate.notify_one();
        }

        /// Number of `submit` calls seen so far.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl<Req, P> Backend for GatedBackend<Req, P>
    where
        Req: Send,
        P: Clone + Send + Sync,
    {
        type Request = Req;
        type Payload = P;

        fn submit(&self, _request: Self::Request) -> SubmitFuture<'_, Self::Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                self.gate.notified().await;
                self.outcome.clone()
            })
        }
    }
}

/// Shared log of the snapshots a recording listener has observed.
#[derive(Debug, Clone)]
pub struct SnapshotLog<T> {
    entries: Arc<Mutex<Vec<Snapshot<T>>>>,
}

impl<T: Clone> SnapshotLog<T> {
    /// All recorded snapshots, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot<T>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recently recorded snapshot.
    #[must_use]
    pub fn last(&self) -> Option<Snapshot<T>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of recorded snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create a listener that records every snapshot it is notified with,
/// plus the shared [`SnapshotLog`] to assert against.
///
/// # Example
///
/// ```ignore
/// let (listener, log) = recording_listener();
/// let subscription = container.subscribe(listener);
/// container.dispatch(Action::Pending)?;
/// assert_eq!(log.len(), 1);
/// ```
#[must_use]
pub fn recording_listener<T: Clone + Send + Sync + 'static>()
-> (impl Fn(&Snapshot<T>) + Send + Sync + 'static, SnapshotLog<T>) {
    let log = SnapshotLog {
        entries: Arc::new(Mutex::new(Vec::new())),
    };
    let entries = Arc::clone(&log.entries);
    let listener = move |snapshot: &Snapshot<T>| {
        entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
    };
    (listener, log)
}

// Re-export commonly used items
pub use transition_test::TransitionTest;

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::mocks::{EchoBackend, FailingBackend, GatedBackend};
    use super::*;
    use livestate_core::backend::Backend;

    #[tokio::test]
    async fn echo_backend_echoes() {
        let backend = EchoBackend::new();
        let payload = backend.submit(7_i64).await.expect("echo succeeds");
        assert_eq!(payload, 7);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn failing_backend_fails_with_message() {
        let backend = FailingBackend::<i64, i64>::new("nope");
        let err = backend.submit(7).await.expect_err("must fail");
        assert_eq!(err.message(), "nope");
    }

    #[tokio::test]
    async fn gated_backend_waits_for_release() {
        let backend = std::sync::Arc::new(GatedBackend::<i64, i64>::resolving(3));

        let submit = {
            let backend = std::sync::Arc::clone(&backend);
            tokio::spawn(async move { backend.submit(0).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(backend.calls(), 1);

        backend.release();
        let payload = submit.await.expect("join").expect("resolves");
        assert_eq!(payload, 3);
    }

    #[test]
    fn recording_listener_records() {
        let (listener, log) = recording_listener::<i64>();
        assert!(log.is_empty());

        listener(&Snapshot::idle(1));
        listener(&Snapshot::idle(2));

        assert_eq!(log.len(), 2);
        assert_eq!(log.last().map(Snapshot::into_data), Some(2));
    }
}
