mod ask;
mod chat_cmd;
mod config;
mod health;
mod ingest;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cookai", about = "cookai CLI - ask the course teaching assistant")]
struct Cli {
    /// Use this config file instead of ~/.config/cookai/cookai.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question about one or more sources
    Ask {
        /// Content id to ask about (repeatable; only the first is used by the server)
        #[arg(short, long = "source")]
        sources: Vec<i64>,

        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Start an interactive chat
    Chat {
        /// Content id to pre-select (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<i64>,
    },

    /// Upload a document so it can be used as a source
    Ingest {
        /// Path to the document
        file: Option<PathBuf>,

        /// Course to attach the document to
        #[arg(long)]
        course_id: Option<i64>,
    },

    /// Check that the server is reachable
    Health,

    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the user id (also used as uploader id)
        #[arg(long)]
        user_id: Option<i64>,

        /// Set the default course id for uploads
        #[arg(long)]
        course_id: Option<i64>,

        /// Set the sources pre-selected in chat (comma separated)
        #[arg(long, value_delimiter = ',')]
        default_sources: Option<Vec<i64>>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_override = cli.config.as_deref();
    match cli.command {
        Commands::Config {
            server,
            user_id,
            course_id,
            default_sources,
        } => {
            let update = config::ConfigUpdate {
                server,
                user_id,
                course_id,
                default_sources,
            };
            if update.is_empty() {
                config::show_config(config_override)
            } else {
                config::set_config(config_override, update)
            }
        }
        Commands::Ask { sources, query } => {
            let config = config::load_config(config_override)?;
            let sources = ask::effective_sources(&config, &sources);
            ask::run_ask(&config, &query.join(" "), &sources).await
        }
        Commands::Chat { sources } => {
            let config = config::load_config(config_override)?;
            let sources = ask::effective_sources(&config, &sources);
            chat_cmd::run_chat(&config, sources).await
        }
        Commands::Ingest { file, course_id } => {
            let config = config::load_config(config_override)?;
            ingest::run_ingest(&config, file.as_deref(), course_id).await
        }
        Commands::Health => health::run_health(&config::load_config(config_override)?).await,
    }
}
