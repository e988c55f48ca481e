//! Backend abstraction: the seam to the external asynchronous collaborator.
//!
//! The container itself knows nothing about networks. Whatever supplies the
//! promise-like operation (an HTTP client, an IPC bridge, a simulated API
//! in tests) implements [`Backend`] and is injected where needed.
//!
//! # Contract
//!
//! `submit(request)` eventually settles with either the confirmed payload
//! or an [`OperationError`] carrying a human-readable message. The backend
//! is allowed to keep running after the owning container is torn down;
//! only its result gets suppressed. There is no cancellation signal.
//!
//! # Dyn Compatibility
//!
//! The trait uses an explicit `Pin<Box<dyn Future>>` return instead of
//! `async fn` to enable trait object usage (`Arc<dyn Backend<..>>`), which
//! the gateway relies on when it captures the backend in a deferred
//! continuation.

use crate::error::OperationError;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Backend::submit`].
pub type SubmitFuture<'a, P> =
    Pin<Box<dyn Future<Output = Result<P, OperationError>> + Send + 'a>>;

/// External asynchronous operation supplier.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the gateway shares the backend
/// across the await point inside spawned continuations.
pub trait Backend: Send + Sync {
    /// The update request submitted to the collaborator (e.g. a field
    /// patch).
    type Request: Send;

    /// The confirmed payload the collaborator settles with on success.
    type Payload: Send;

    /// Submit an update request.
    ///
    /// Settles with the confirmed payload on success or an
    /// [`OperationError`] on failure. Failures here are domain data, not
    /// exceptions: the gateway turns them into a `Rejected` transition.
    fn submit(&self, request: Self::Request) -> SubmitFuture<'_, Self::Payload>;
}
