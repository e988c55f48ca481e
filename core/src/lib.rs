//! # Livestate Core
//!
//! Core types for the livestate asynchronous state container.
//!
//! This crate provides the pure, runtime-free half of the architecture:
//!
//! - **Snapshot**: an immutable view of container state at one point in time
//! - **Status**: the lifecycle of an asynchronous update (`Idle` → `Pending`
//!   → `Resolved` / `Rejected`)
//! - **Action**: the closed set of state transitions
//! - **Reducer**: pure function `(Snapshot, Action) → Snapshot` enforcing
//!   the transition table
//! - **Backend**: the seam to the external asynchronous collaborator
//!
//! ## Architecture Principles
//!
//! - Snapshots are values: every transition produces a fresh snapshot,
//!   nothing is mutated in place
//! - Illegal transitions fail fast with [`error::TransitionError`] instead
//!   of silently no-opping
//! - Asynchronous failures are data ([`error::OperationError`] captured in
//!   the snapshot), never exceptions crossing the async boundary
//! - No global state: everything is owned per container instance
//!
//! ## Example
//!
//! ```
//! use livestate_core::action::Action;
//! use livestate_core::reducer::{Reducer, TransitionReducer};
//! use livestate_core::state::{Snapshot, Status};
//!
//! let reducer = TransitionReducer::new();
//! let idle = Snapshot::idle("hello".to_string());
//!
//! let pending = reducer.reduce(&idle, Action::Pending).unwrap();
//! assert_eq!(pending.status(), Status::Pending);
//! // Data keeps the last confirmed value while pending.
//! assert_eq!(pending.data(), "hello");
//!
//! let resolved = reducer
//!     .reduce(&pending, Action::Resolved { payload: "world".to_string() })
//!     .unwrap();
//! assert_eq!(resolved.status(), Status::Resolved);
//! assert_eq!(resolved.data(), "world");
//! ```

pub mod action;
pub mod backend;
pub mod error;
pub mod reducer;
pub mod state;

pub use action::{Action, ActionKind};
pub use backend::Backend;
pub use error::{OperationError, TransitionError};
pub use reducer::{Reducer, TransitionReducer};
pub use state::{Snapshot, Status};
