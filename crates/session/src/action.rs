use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Lifecycle of one user-triggered action, for driving button/spinner feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl ActionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What a call to [`ActionExecutor::activate`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum Activation<T> {
    /// Another run was still pending; the action was not invoked.
    Rejected,
    Succeeded(T),
    Failed(String),
}

/// Runs a fallible async action at most once at a time and publishes its state.
///
/// Failures (including panics) of the action are folded into
/// [`ActionState::Failed`]; `activate` itself never fails.
#[derive(Debug)]
pub struct ActionExecutor {
    state: watch::Sender<ActionState>,
    epoch: AtomicU64,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(ActionState::Idle),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ActionState {
        self.state.borrow().clone()
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ActionState> {
        self.state.subscribe()
    }

    /// Force `Idle`, e.g. because the action's input changed.
    ///
    /// A run that is still pending keeps going, but its completion no longer
    /// touches the state.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(ActionState::Idle);
    }

    pub async fn activate<F, Fut, T, E>(&self, action: F) -> Activation<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut epoch = 0;
        let started = self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = ActionState::Pending;
            epoch = self.epoch.load(Ordering::SeqCst);
            true
        });
        if !started {
            debug!("action already pending, ignoring activation");
            return Activation::Rejected;
        }

        let outcome = AssertUnwindSafe(async move { action().await })
            .catch_unwind()
            .await;
        let (next, activation) = match outcome {
            Ok(Ok(value)) => (ActionState::Succeeded, Activation::Succeeded(value)),
            Ok(Err(e)) => {
                let message = e.to_string();
                debug!(error = %message, "action failed");
                (
                    ActionState::Failed(message.clone()),
                    Activation::Failed(message),
                )
            }
            Err(_) => {
                warn!("action panicked");
                let message = "action panicked".to_string();
                (
                    ActionState::Failed(message.clone()),
                    Activation::Failed(message),
                )
            }
        };

        if self.epoch.load(Ordering::SeqCst) == epoch {
            self.state.send_replace(next);
        } else {
            debug!("action settled after reset, state left as is");
        }
        activation
    }
}
