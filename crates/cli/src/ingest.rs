use std::path::Path;

use anyhow::{Context, Result};
use cookai_api::{IngestForm, IngestResponse};
use cookai_api_client::{ApiClient, ApiError};
use cookai_runtime_config::ClientConfig;
use cookai_session::{ActionExecutor, ActionState, Activation};

const NO_FILE_TEXT: &str = "Please select a file first.";
const PENDING_TEXT: &str = "Uploading...";

#[derive(Debug, thiserror::Error)]
enum IngestError {
    #[error("{}", NO_FILE_TEXT)]
    NoFile,
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
}

/// Upload `file` through an [`ActionExecutor`], reporting progress on stderr.
pub async fn run_ingest(
    config: &ClientConfig,
    file: Option<&Path>,
    course_id: Option<i64>,
) -> Result<()> {
    let client = ApiClient::new(&config.server.url).context("Failed to create HTTP client")?;
    let form = IngestForm {
        course_id: course_id.unwrap_or(config.identity.course_id),
        uploader_id: config.identity.uploader_id,
    };

    let executor = ActionExecutor::new();
    let watcher = tokio::spawn(report_transitions(executor.subscribe()));
    // `watch` keeps only the latest state, so a fast failure can hide
    // `Pending` from the watcher. The pending line is printed up front.
    eprintln!("{PENDING_TEXT}");

    let (client, form) = (&client, &form);
    let activation = executor
        .activate(move || async move {
            let file = file.ok_or(IngestError::NoFile)?;
            tracing::info!(file = %file.display(), course_id = form.course_id, "ingesting");
            Ok::<IngestResponse, IngestError>(client.ingest_file(file, form).await?)
        })
        .await;
    drop(executor);
    let _ = watcher.await;

    match activation {
        Activation::Succeeded(resp) => {
            println!("Success! File ingested with ID: {}", resp.unique_content_id);
            if !resp.message.is_empty() {
                println!("{}", resp.message);
            }
            Ok(())
        }
        Activation::Failed(message) => anyhow::bail!("{message}"),
        Activation::Rejected => anyhow::bail!("An upload is already in progress."),
    }
}

/// Print a status line for each settled state the watcher observes, until
/// the executor is dropped.
async fn report_transitions(mut rx: tokio::sync::watch::Receiver<ActionState>) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        if let Some(line) = status_line(&state) {
            eprintln!("{line}");
        }
    }
}

fn status_line(state: &ActionState) -> Option<&'static str> {
    match state {
        ActionState::Failed(_) => Some("Upload failed."),
        ActionState::Idle | ActionState::Pending | ActionState::Succeeded => None,
    }
}
