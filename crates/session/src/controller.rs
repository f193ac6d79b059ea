//! Single-slot request channel with supersession.
//!
//! Every request gets a [`RequestHandle`] carrying a monotonically increasing
//! generation and a cancellation token. Only the handle in the slot is live.
//! Starting a new request cancels the live one first; a result is surfaced
//! only if its handle is still the live one when it resolves, so transports
//! that ignore the token still cannot leak stale results.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cookai_api_client::ApiError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RequestHandle {
    generation: u64,
    token: CancellationToken,
}

impl RequestHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of [`RequestController::start`].
#[derive(Debug)]
pub struct Started {
    pub handle: RequestHandle,
    /// The previously live handle, already cancelled.
    pub superseded: Option<RequestHandle>,
}

#[derive(Debug)]
pub enum RequestOutcome<T> {
    Completed(T),
    Failed(ApiError),
    /// The request reported an abort while its handle was still live.
    Aborted,
    /// The handle was superseded or cancelled before the result arrived; the
    /// result has been discarded.
    Stale,
}

#[derive(Debug, Default)]
struct Slot {
    last_generation: u64,
    live: Option<RequestHandle>,
}

/// Owns at most one live request for one logical channel.
#[derive(Debug, Default)]
pub struct RequestController {
    slot: Mutex<Slot>,
}

impl RequestController {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new live handle, cancelling the previous one first.
    pub fn start(&self) -> Started {
        let mut slot = self.slot();
        let superseded = slot.live.take();
        if let Some(previous) = &superseded {
            previous.token.cancel();
            debug!(generation = previous.generation, "superseding live request");
        }
        slot.last_generation += 1;
        let handle = RequestHandle {
            generation: slot.last_generation,
            token: CancellationToken::new(),
        };
        slot.live = Some(handle.clone());
        Started { handle, superseded }
    }

    /// Cancel and release the live handle without starting a new one.
    pub fn cancel_current(&self) -> Option<RequestHandle> {
        let cancelled = self.slot().live.take();
        if let Some(handle) = &cancelled {
            handle.token.cancel();
            debug!(generation = handle.generation, "cancelled live request");
        }
        cancelled
    }

    pub fn is_current(&self, handle: &RequestHandle) -> bool {
        self.slot()
            .live
            .as_ref()
            .is_some_and(|live| live.generation == handle.generation)
    }

    pub fn live(&self) -> Option<RequestHandle> {
        self.slot().live.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.slot().live.is_some()
    }

    /// Release `handle` if it is still live. Returns whether it was.
    fn finish(&self, handle: &RequestHandle) -> bool {
        let mut slot = self.slot();
        let current = slot
            .live
            .as_ref()
            .is_some_and(|live| live.generation == handle.generation);
        if current {
            slot.live = None;
        }
        current
    }

    /// Drive the request for `handle` to completion.
    ///
    /// `factory` is called once with the handle's token. If the token fires
    /// first, the factory's future is dropped, which aborts the underlying
    /// transport call. Dropping the returned future before it resolves
    /// cancels the token and releases the slot if `handle` still holds it.
    pub async fn run<T, F, Fut>(&self, handle: &RequestHandle, factory: F) -> RequestOutcome<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut guard = ReleaseOnDrop {
            controller: self,
            handle,
            armed: true,
        };
        let request = factory(handle.token.clone());
        let result = tokio::select! {
            biased;
            _ = handle.token.cancelled() => Err(ApiError::Aborted),
            result = request => result,
        };
        guard.armed = false;

        if !self.finish(handle) {
            debug!(generation = handle.generation, "discarding result of stale request");
            return RequestOutcome::Stale;
        }
        match result {
            Ok(value) => RequestOutcome::Completed(value),
            Err(e) if e.is_abort() => RequestOutcome::Aborted,
            Err(e) => RequestOutcome::Failed(e),
        }
    }
}

/// Releases the slot of a [`RequestController::run`] that was dropped while
/// its request was still in flight.
struct ReleaseOnDrop<'a> {
    controller: &'a RequestController,
    handle: &'a RequestHandle,
    armed: bool,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.handle.token.cancel();
        if self.controller.finish(self.handle) {
            debug!(
                generation = self.handle.generation,
                "request dropped by caller, slot released"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn decode_error() -> ApiError {
        ApiError::Decode("unexpected end of input".to_string())
    }

    #[test]
    fn start_supersedes_and_cancels_previous() {
        let controller = RequestController::new();
        let first = controller.start();
        assert!(first.superseded.is_none());
        assert!(controller.is_current(&first.handle));

        let second = controller.start();
        let superseded = second.superseded.expect("first handle superseded");
        assert_eq!(superseded.generation(), first.handle.generation());
        assert!(first.handle.is_cancelled());
        assert!(!second.handle.is_cancelled());
        assert!(!controller.is_current(&first.handle));
        assert!(controller.is_current(&second.handle));
        assert!(second.handle.generation() > first.handle.generation());
    }

    #[test]
    fn cancel_current_releases_slot() {
        let controller = RequestController::new();
        assert!(controller.cancel_current().is_none());

        let started = controller.start();
        let cancelled = controller.cancel_current().expect("live handle");
        assert_eq!(cancelled.generation(), started.handle.generation());
        assert!(started.handle.is_cancelled());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn completion_clears_slot() {
        let controller = RequestController::new();
        let started = controller.start();
        let outcome = controller
            .run(&started.handle, |_| async { Ok::<_, ApiError>("answer") })
            .await;
        assert!(matches!(outcome, RequestOutcome::Completed("answer")));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn failures_are_passed_through() {
        let controller = RequestController::new();
        let started = controller.start();
        let outcome = controller
            .run(&started.handle, |_| async { Err::<(), _>(decode_error()) })
            .await;
        assert!(matches!(outcome, RequestOutcome::Failed(ApiError::Decode(_))));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn abort_reported_by_live_request_is_distinct() {
        let controller = RequestController::new();
        let started = controller.start();
        let outcome = controller
            .run(&started.handle, |_| async { Err::<(), _>(ApiError::Aborted) })
            .await;
        assert!(matches!(outcome, RequestOutcome::Aborted));
    }

    #[tokio::test]
    async fn superseded_request_is_stale_and_keeps_newer_handle() {
        let controller = RequestController::new();
        let first = controller.start();
        let (tx, rx) = oneshot::channel::<&'static str>();

        let stale = controller.run(&first.handle, |_| async move {
            rx.await.map_err(|_| ApiError::Aborted)
        });
        let supersede = async {
            tokio::task::yield_now().await;
            let second = controller.start();
            // Resolve the old request anyway, as a transport without abort
            // support would.
            let _ = tx.send("late answer");
            second
        };

        let (outcome, second) = tokio::join!(stale, supersede);
        assert!(matches!(outcome, RequestOutcome::Stale));
        assert!(controller.is_current(&second.handle));
        assert!(controller.is_busy());
    }

    #[tokio::test]
    async fn late_result_of_ignored_token_is_discarded() {
        let controller = RequestController::new();
        let first = controller.start();
        let second = controller.start();

        // `first` was cancelled before it ran; even a factory that ignores
        // the token and resolves successfully must not be surfaced.
        let outcome = controller
            .run(&first.handle, |_| async { Ok::<_, ApiError>("late") })
            .await;
        assert!(matches!(outcome, RequestOutcome::Stale));
        assert!(controller.is_current(&second.handle));

        let outcome = controller
            .run(&second.handle, |_| async { Ok::<_, ApiError>("fresh") })
            .await;
        assert!(matches!(outcome, RequestOutcome::Completed("fresh")));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn dropped_run_releases_slot_and_cancels() {
        let controller = RequestController::new();
        let started = controller.start();
        let run = controller.run(&started.handle, |_| std::future::pending::<Result<(), ApiError>>());
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), run).await;
        assert!(timed_out.is_err());

        assert!(!controller.is_busy());
        assert!(started.handle.is_cancelled());
        assert!(controller.start().superseded.is_none());
    }

    #[tokio::test]
    async fn factory_receives_handle_token() {
        let controller = RequestController::new();
        let started = controller.start();
        let expected = started.handle.generation();
        let outcome = controller
            .run(&started.handle, |token| async move {
                assert!(!token.is_cancelled());
                Ok::<_, ApiError>(expected)
            })
            .await;
        assert!(matches!(outcome, RequestOutcome::Completed(g) if g == expected));
    }
}
