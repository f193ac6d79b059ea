//! Query and action orchestration for the cookai teaching assistant.
//!
//! - [`ActionExecutor`] runs one user-triggered fallible operation at a time
//!   and exposes its lifecycle.
//! - [`RequestController`] owns the single live request of a channel and
//!   supersedes it when a new one starts.
//! - [`ChatSession`] combines the controller with response classification
//!   and an append-only transcript.

pub mod action;
pub mod backend;
pub mod chat;
pub mod controller;

pub use action::{ActionExecutor, ActionState, Activation};
pub use backend::QueryBackend;
pub use chat::{ChatSession, SessionState, SubmitOutcome, ValidationError};
pub use controller::{RequestController, RequestHandle, RequestOutcome, Started};
