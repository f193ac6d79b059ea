use anyhow::{Context, Result};
use cookai_api_client::ApiClient;
use cookai_core::ContentId;
use cookai_runtime_config::ClientConfig;
use cookai_session::{ChatSession, SubmitOutcome};

use crate::output::render_message;

/// Send a single query and print whatever the session appended for it.
pub async fn run_ask(config: &ClientConfig, query: &str, sources: &[ContentId]) -> Result<()> {
    let client = ApiClient::new(&config.server.url).context("Failed to create HTTP client")?;
    let session = ChatSession::new(client, config.identity.user_id);

    let outcome = session.submit(query, sources).await?;
    for message in session.transcript().iter().skip(1) {
        println!("{}", render_message(message));
    }
    match outcome {
        SubmitOutcome::Skipped(reason) => {
            println!("(no displayable answer: {reason})");
            Ok(())
        }
        SubmitOutcome::Failed => anyhow::bail!("query failed"),
        _ => Ok(()),
    }
}

/// Sources given on the command line win over `[chat] default_sources`.
pub fn effective_sources(config: &ClientConfig, sources: &[ContentId]) -> Vec<ContentId> {
    if sources.is_empty() {
        config.chat.default_sources.clone()
    } else {
        sources.to_vec()
    }
}
