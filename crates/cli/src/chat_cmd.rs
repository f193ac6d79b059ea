use std::sync::Arc;

use anyhow::{Context, Result};
use cookai_api_client::ApiClient;
use cookai_core::{ChatMessage, ContentId};
use cookai_runtime_config::ClientConfig;
use cookai_session::ChatSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::output::render_message;

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Query(&'a str),
    Stop,
    ToggleSource(ContentId),
    ListSources,
    Help,
    Quit,
    Blank,
    Invalid(String),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Query(line);
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("stop"), None, _) => Input::Stop,
        (Some("sources"), None, _) => Input::ListSources,
        (Some("help"), None, _) => Input::Help,
        (Some("quit" | "exit"), None, _) => Input::Quit,
        (Some("source"), Some(id), None) => match id.parse() {
            Ok(id) => Input::ToggleSource(id),
            Err(_) => Input::Invalid(format!("Not a content id: {id}")),
        },
        (Some("source"), _, _) => Input::Invalid("Usage: /source <id>".to_string()),
        _ => Input::Invalid(format!("Unknown command: /{command}. Try /help.")),
    }
}

const HELP: &str = "\
Type a question and press Enter. Commands:
  /source <id>  select or deselect a content source
  /sources      list selected sources
  /stop         cancel the answer being generated
  /quit         leave";

/// Interactive chat loop over stdin.
///
/// Queries run in the background so `/stop` and new questions are accepted
/// while an answer is pending; a new question supersedes the pending one.
pub async fn run_chat(config: &ClientConfig, sources: Vec<ContentId>) -> Result<()> {
    let client = ApiClient::new(&config.server.url).context("Failed to create HTTP client")?;
    let (display_tx, display_rx) = mpsc::unbounded_channel();
    let session = Arc::new(
        ChatSession::new(client, config.identity.user_id)
            .with_display(display_tx)
            .with_sources(sources.into_iter().collect()),
    );
    let printer = tokio::spawn(print_entries(display_rx));

    println!("Connected to {} as user {}.", config.server.url, config.identity.user_id);
    print_sources(&session);
    println!("Type /help for commands.");

    let mut queries = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Stop => {
                if !session.cancel_current() {
                    println!("Nothing to stop.");
                }
            }
            Input::ToggleSource(id) => {
                let state = if session.toggle_source(id) { "selected" } else { "deselected" };
                println!("Source {id} {state}.");
            }
            Input::ListSources => print_sources(&session),
            Input::Invalid(message) => eprintln!("{message}"),
            Input::Query(text) => {
                let query = text.to_string();
                let sources = session.selected_sources();
                let session = Arc::clone(&session);
                queries.spawn(async move {
                    if let Err(e) = session.submit(&query, sources.ids()).await {
                        eprintln!("{e}");
                    }
                });
            }
        }
        // Reap finished queries so the set does not grow for the whole session.
        while queries.try_join_next().is_some() {}
    }

    session.cancel_current();
    while queries.join_next().await.is_some() {}
    drop(session);
    let _ = printer.await;
    Ok(())
}

fn print_sources(session: &ChatSession<ApiClient>) {
    let selection = session.selected_sources();
    if selection.is_empty() {
        println!("No sources selected. Use /source <id>.");
    } else {
        let ids: Vec<String> = selection.ids().iter().map(ToString::to_string).collect();
        println!("Selected sources: {}", ids.join(", "));
    }
}

/// Print transcript entries as they are appended. The user's own lines are
/// already on screen.
async fn print_entries(mut rx: mpsc::UnboundedReceiver<ChatMessage>) {
    while let Some(message) = rx.recv().await {
        if !matches!(message, ChatMessage::User { .. }) {
            println!("{}", render_message(&message));
        }
    }
}
