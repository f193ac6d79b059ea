use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cookai_api::{GenerateRequest, GenerateResponse};
use cookai_core::{
    ChatMessage, Classification, ContentId, SkipReason, SourceSelectionSet, Transcript, UserId,
    classify,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::QueryBackend;
use crate::controller::{RequestController, RequestOutcome};

pub const CANCELLED_TEXT: &str = "Generation cancelled.";
pub const SUPERSEDED_TEXT: &str = "Previous generation cancelled.";

/// Input rejected before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a query.")]
    EmptyQuery,
    #[error("Please select at least one source.")]
    NoSources,
}

/// How a submitted query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An `ai` entry was appended.
    Answered,
    /// A response arrived but was not renderable; nothing was appended.
    Skipped(SkipReason),
    /// An `error` entry was appended.
    Failed,
    /// The request was aborted while still live; an `info` entry was appended.
    Cancelled,
    /// A newer query or an explicit cancel replaced this one; its result was
    /// discarded.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// One conversation with the teaching assistant.
///
/// All methods take `&self`, so one session can be driven from several
/// concurrent tasks (e.g. a prompt loop and a "stop" key). Locks are never
/// held across an await.
pub struct ChatSession<B> {
    backend: B,
    user_id: UserId,
    controller: RequestController,
    transcript: Mutex<Transcript>,
    sources: Mutex<SourceSelectionSet>,
    draft: Mutex<String>,
    display: Option<mpsc::UnboundedSender<ChatMessage>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<B: QueryBackend> ChatSession<B> {
    pub fn new(backend: B, user_id: UserId) -> Self {
        Self {
            backend,
            user_id,
            controller: RequestController::new(),
            transcript: Mutex::new(Transcript::new()),
            sources: Mutex::new(SourceSelectionSet::new()),
            draft: Mutex::new(String::new()),
            display: None,
        }
    }

    /// Forward every appended entry, in order, to `display`.
    pub fn with_display(mut self, display: mpsc::UnboundedSender<ChatMessage>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_sources(self, sources: SourceSelectionSet) -> Self {
        *lock(&self.sources) = sources;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.controller.is_busy() {
            SessionState::AwaitingResponse
        } else {
            SessionState::Idle
        }
    }

    pub fn controller(&self) -> &RequestController {
        &self.controller
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock(&self.transcript).entries().to_vec()
    }

    pub fn transcript_len(&self) -> usize {
        lock(&self.transcript).len()
    }

    pub fn toggle_source(&self, id: ContentId) -> bool {
        lock(&self.sources).toggle(id)
    }

    pub fn selected_sources(&self) -> SourceSelectionSet {
        lock(&self.sources).clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *lock(&self.draft) = text.into();
    }

    pub fn draft(&self) -> String {
        lock(&self.draft).clone()
    }

    /// Submit the draft buffer against the session's own source selection.
    ///
    /// The draft and selection are read when this is called, not when the
    /// returned future is first polled, so a draft set right after a spawned
    /// `submit_draft` does not replace the one it was spawned for.
    pub fn submit_draft(
        &self,
    ) -> impl Future<Output = Result<SubmitOutcome, ValidationError>> + '_ {
        let query = self.draft();
        let sources = self.selected_sources();
        async move { self.submit(&query, sources.ids()).await }
    }

    /// Send `query` about `source_ids` and append the outcome to the transcript.
    ///
    /// A query still in flight is cancelled first. Only the first source id
    /// reaches the backend; extra ids produce an `info` warning.
    pub async fn submit(
        &self,
        query: &str,
        source_ids: &[ContentId],
    ) -> Result<SubmitOutcome, ValidationError> {
        let prompt = query.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        let Some(&content_id) = source_ids.first() else {
            return Err(ValidationError::NoSources);
        };

        self.append(ChatMessage::user(query));
        lock(&self.draft).clear();

        let started = self.controller.start();
        if started.superseded.is_some() {
            self.append(ChatMessage::info(SUPERSEDED_TEXT));
        }
        if source_ids.len() > 1 {
            warn!(
                sources = source_ids.len(),
                content_id, "backend only honors the first source"
            );
            self.append(ChatMessage::info(format!(
                "Only the first selected source ({content_id}) is used; {} other source(s) are ignored.",
                source_ids.len() - 1
            )));
        }

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            unique_content_id: content_id,
            user_id: self.user_id,
        };
        debug!(generation = started.handle.generation(), content_id, "submitting query");
        let outcome = self
            .controller
            .run(&started.handle, |cancel| self.backend.query(request, cancel))
            .await;
        Ok(self.settle(outcome))
    }

    /// Stop the live query, if any, as if it had been superseded.
    pub fn cancel_current(&self) -> bool {
        if self.controller.cancel_current().is_some() {
            self.append(ChatMessage::info(CANCELLED_TEXT));
            true
        } else {
            false
        }
    }

    fn settle(&self, outcome: RequestOutcome<GenerateResponse>) -> SubmitOutcome {
        match outcome {
            RequestOutcome::Stale => SubmitOutcome::Superseded,
            RequestOutcome::Aborted => {
                self.append(ChatMessage::info(CANCELLED_TEXT));
                SubmitOutcome::Cancelled
            }
            RequestOutcome::Failed(e) => {
                warn!(error = %e, "query failed");
                self.append(ChatMessage::error(e.user_message()));
                SubmitOutcome::Failed
            }
            RequestOutcome::Completed(resp) => match classify(resp.envelope()) {
                Classification::Render(payload) => {
                    debug!(job_id = ?resp.job_id, display_type = %payload.display_type(), "rendering response");
                    self.append(ChatMessage::ai(payload));
                    SubmitOutcome::Answered
                }
                Classification::Skip(reason) => {
                    info!(job_id = ?resp.job_id, %reason, "dropping non-renderable response");
                    SubmitOutcome::Skipped(reason)
                }
            },
        }
    }

    fn append(&self, message: ChatMessage) {
        let mut transcript = lock(&self.transcript);
        if let Some(display) = &self.display {
            // A closed display only means nobody is watching any more.
            let _ = display.send(message.clone());
        }
        transcript.append(message);
    }
}
