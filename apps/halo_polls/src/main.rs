use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{LoadReport, LocalPollStore, PollStore, RemotePollStore};
use shared::domain::PollId;
use storage::LocalStorage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod shell;
mod ui;

use config::{load_settings, normalize_database_url, Backend, Settings};
use controller::{events::NoticeLevel, Outcome, PollApp};

#[derive(Parser, Debug)]
#[command(
    name = "halo-polls",
    about = "Two-option polls backed by local storage or a polling service"
)]
struct Cli {
    /// Persistence backend; overrides the config file and environment.
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    #[arg(long)]
    database_url: Option<String>,
    /// Base url of the polling service used by the remote backend.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all polls, oldest first.
    List,
    /// Create a poll with two options.
    Create {
        question: String,
        option1: String,
        option2: String,
    },
    /// Vote for option 0 or 1 of a poll.
    Vote { poll_id: String, option_index: usize },
    /// Show a poll's results.
    Results { poll_id: String },
    /// Interactive session (the default).
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("halo-polls: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }

    let store = build_store(&settings).await?;
    let mut app = PollApp::new(store);

    let outcome = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            shell::run(app).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::List => app.refresh().await,
        Command::Create {
            question,
            option1,
            option2,
        } => app.submit_poll(&question, &option1, &option2).await,
        Command::Vote {
            poll_id,
            option_index,
        } => {
            load_cache(&mut app).await;
            app.cast_vote(&PollId::from(poll_id.as_str()), option_index)
                .await
        }
        Command::Results { poll_id } => app.show_results(&PollId::from(poll_id.as_str())).await,
    };

    print_outcome(&outcome);
    Ok(if outcome.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn build_store(settings: &Settings) -> Result<Arc<dyn PollStore>> {
    match settings.backend {
        Backend::Local => {
            let database_url = normalize_database_url(&settings.database_url);
            let storage = LocalStorage::new(&database_url)
                .await
                .with_context(|| format!("failed to open local storage '{database_url}'"))?;
            let store =
                LocalPollStore::open_with_key(Arc::new(storage), settings.storage_key.clone())
                    .await?;
            if let LoadReport::Recovered { reason } = store.load_report() {
                warn!(%reason, "saved polls were unreadable; starting with an empty collection");
            }
            info!(%database_url, "using local poll store");
            Ok(Arc::new(store))
        }
        Backend::Remote => {
            let store = RemotePollStore::new(&settings.api_base_url)?;
            info!(base_url = %store.base_url(), "using remote poll store");
            Ok(Arc::new(store))
        }
    }
}

/// Remote stores start empty; pull the listing so a vote can be checked
/// against the cached copy.
async fn load_cache(app: &mut PollApp) {
    let outcome = app.refresh().await;
    for notice in outcome.notices {
        eprintln!("{notice}");
    }
}

pub(crate) fn print_outcome(outcome: &Outcome) {
    for screen in &outcome.screens {
        print!("{screen}");
    }
    for notice in &outcome.notices {
        match notice.level() {
            NoticeLevel::Success => println!("{notice}"),
            NoticeLevel::Error => eprintln!("{notice}"),
        }
    }
}
