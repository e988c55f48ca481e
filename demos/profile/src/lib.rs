//! # Profile Feature
//!
//! A user-profile feature built on the livestate container.
//!
//! This crate showcases the full update lifecycle:
//! - A [`User`] payload held by a [`ProfileContainer`]
//! - Diffing form input against the current user, restricted to the
//!   mutable fields (`tagline`, `bio`)
//! - [`update_user`]: a stateless orchestration helper that drives the
//!   gateway only when something actually changed
//! - [`SimulatedProfileApi`]: a network-like collaborator with a fixed
//!   failure policy, for demos and tests
//!
//! ## Example
//!
//! ```no_run
//! use profile::{ProfileContainer, SimulatedProfileApi, User, UserForm, update_user};
//! use livestate_runtime::Gateway;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let user = User::new("alice", "hello", "");
//! let container = ProfileContainer::new(user.clone());
//! let gateway = Gateway::new(&container, Arc::new(SimulatedProfileApi::new(user.clone())));
//!
//! let form = UserForm { tagline: "new tagline".to_string(), bio: user.bio.clone() };
//! update_user(&gateway, &user, &form).await.unwrap();
//! # }
//! ```

use livestate_core::backend::{Backend, SubmitFuture};
use livestate_core::error::{OperationError, TransitionError};
use livestate_runtime::{Container, Gateway};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// The literal marker that makes the simulated API reject an update.
pub const FAIL_MARKER: &str = "fail";

/// The fixed failure message of the simulated API.
pub const FAIL_MESSAGE: &str = "Bio and tagline may not include the word 'fail'";

/// A user profile.
///
/// `username` is immutable as far as updates are concerned; only
/// `tagline` and `bio` can be changed through [`update_user`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name; never touched by profile updates.
    pub username: String,
    /// Short one-line description.
    pub tagline: String,
    /// Longer free-form text.
    pub bio: String,
}

impl User {
    /// Create a user.
    pub fn new(
        username: impl Into<String>,
        tagline: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            tagline: tagline.into(),
            bio: bio.into(),
        }
    }
}

/// The editable fields as supplied by the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserForm {
    /// Edited tagline value.
    pub tagline: String,
    /// Edited bio value.
    pub bio: String,
}

impl UserForm {
    /// A form pre-filled from the current user, i.e. one with no edits.
    #[must_use]
    pub fn prefilled(user: &User) -> Self {
        Self {
            tagline: user.tagline.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// Diff between a user and edited form values, restricted to the mutable
/// fields. This is the request payload submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPatch {
    /// New tagline, present only when it differs from the current one.
    pub tagline: Option<String>,
    /// New bio, present only when it differs from the current one.
    pub bio: Option<String>,
}

impl UserPatch {
    /// Compute the patch taking `current` to `form`.
    #[must_use]
    pub fn diff(current: &User, form: &UserForm) -> Self {
        Self {
            tagline: (form.tagline != current.tagline).then(|| form.tagline.clone()),
            bio: (form.bio != current.bio).then(|| form.bio.clone()),
        }
    }

    /// Check whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tagline.is_none() && self.bio.is_none()
    }

    fn contains_fail_marker(&self) -> bool {
        [self.tagline.as_deref(), self.bio.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| value == FAIL_MARKER)
    }
}

/// Container alias for the profile feature.
pub type ProfileContainer = Container<User>;

/// What [`update_user`] did with the form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The form matched the current user; no dispatch, no backend call.
    NoChanges,
    /// A patch was submitted and has settled into the container.
    Submitted,
}

/// Drive one profile update from edited form values.
///
/// Stateless orchestration above the container: diffs `current` against
/// `form` over the mutable fields, short-circuits as a no-op when nothing
/// changed, and otherwise runs the gateway with the patch. Holds no state
/// of its own, so the asynchronous lifecycle is unit-testable without any
/// rendering layer.
///
/// A backend failure is not an error here; it surfaces as a `Rejected`
/// snapshot on the container.
///
/// # Errors
///
/// Returns [`TransitionError::InvalidTransition`] when an update is
/// already pending (double-submit guard).
pub async fn update_user<B>(
    gateway: &Gateway<B>,
    current: &User,
    form: &UserForm,
) -> Result<UpdateOutcome, TransitionError>
where
    B: Backend<Request = UserPatch, Payload = User>,
{
    let patch = UserPatch::diff(current, form);
    if patch.is_empty() {
        tracing::debug!("form matches current user, skipping update");
        return Ok(UpdateOutcome::NoChanges);
    }

    gateway.run(patch).await?;
    Ok(UpdateOutcome::Submitted)
}

/// Simulated profile API: the network-like collaborator.
///
/// Holds the server-side copy of the user. Every submit sleeps a short
/// simulated delay, then either fails with the fixed [`FAIL_MESSAGE`]
/// (when any submitted field equals [`FAIL_MARKER`]) or merges the patch
/// into the stored user, leaving `username` unchanged, and echoes the
/// merged user back.
#[derive(Debug)]
pub struct SimulatedProfileApi {
    user: Mutex<User>,
    delay: Duration,
    calls: AtomicUsize,
}

impl SimulatedProfileApi {
    /// Default simulated round-trip delay.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(20);

    /// Create an API holding `user` as the server-side copy.
    #[must_use]
    pub fn new(user: User) -> Self {
        Self::with_delay(user, Self::DEFAULT_DELAY)
    }

    /// Create an API with a custom simulated delay.
    #[must_use]
    pub fn with_delay(user: User, delay: Duration) -> Self {
        Self {
            user: Mutex::new(user),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `submit` calls seen so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The current server-side copy of the user.
    #[must_use]
    pub fn user(&self) -> User {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Backend for SimulatedProfileApi {
    type Request = UserPatch;
    type Payload = User;

    fn submit(&self, request: Self::Request) -> SubmitFuture<'_, Self::Payload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;

            if request.contains_fail_marker() {
                tracing::debug!("simulated API rejecting update");
                return Err(OperationError::new(FAIL_MESSAGE));
            }

            let mut user = self.user.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tagline) = request.tagline {
                user.tagline = tagline;
            }
            if let Some(bio) = request.bio {
                user.bio = bio;
            }
            Ok(user.clone())
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;

    fn alice() -> User {
        User::new("alice", "still learning", "likes rust")
    }

    #[test]
    fn diff_restricted_to_mutable_fields() {
        let user = alice();
        let form = UserForm {
            tagline: "shipping".to_string(),
            bio: user.bio.clone(),
        };

        let patch = UserPatch::diff(&user, &form);
        assert_eq!(patch.tagline.as_deref(), Some("shipping"));
        assert!(patch.bio.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn diff_of_prefilled_form_is_empty() {
        let user = alice();
        let patch = UserPatch::diff(&user, &UserForm::prefilled(&user));
        assert!(patch.is_empty());
    }

    #[test]
    fn fail_marker_matches_exact_value_only() {
        let patch = UserPatch {
            tagline: Some("fail".to_string()),
            bio: None,
        };
        assert!(patch.contains_fail_marker());

        let patch = UserPatch {
            tagline: Some("failing forward".to_string()),
            bio: None,
        };
        assert!(!patch.contains_fail_marker());
    }

    #[tokio::test]
    async fn api_merges_patch_and_keeps_username() {
        let api = SimulatedProfileApi::with_delay(alice(), Duration::ZERO);
        let merged = api
            .submit(UserPatch {
                tagline: Some("shipping".to_string()),
                bio: None,
            })
            .await
            .expect("update succeeds");

        assert_eq!(merged.username, "alice");
        assert_eq!(merged.tagline, "shipping");
        assert_eq!(merged.bio, "likes rust");
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn api_rejects_fail_marker_with_fixed_message() {
        let api = SimulatedProfileApi::with_delay(alice(), Duration::ZERO);
        let err = api
            .submit(UserPatch {
                tagline: None,
                bio: Some("fail".to_string()),
            })
            .await
            .expect_err("must fail");

        assert_eq!(err.message(), FAIL_MESSAGE);
        // The server-side copy is untouched.
        assert_eq!(api.user(), alice());
    }
}
