//! # todo - Smart To-Do terminal client
//!
//! A command-line and terminal dashboard client for an AI-assisted to-do
//! service. Tasks live on the remote service; this client fetches them,
//! derives the displayed list (search, priority tier, sort), and sends
//! edits, completion toggles, deletions, context entries and suggestion
//! requests back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the dashboard
//! todo ui
//!
//! # List high-priority tasks by deadline
//! todo list --priority high --sort deadline
//!
//! # Let the service draft a task, then save it
//! todo suggest "meeting with the team tomorrow, need slides" --save
//! ```
//!
//! ## Priority
//!
//! The service stores a score in `[0, 1]`. It is shown as a tier:
//! `High` at 0.8 and above, `Medium` at 0.5 and above, `Low` otherwise.
//! Saving a tier writes its canonical score (1.0, 0.5, 0.1).
//!
//! Configuration lives in `~/.smart-todo/config.json`; see [`config`].

use anyhow::{Context, Result};
use clap::Parser;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod display;
pub mod error;
pub mod fields;
pub mod form;
pub mod logging;
pub mod task;
pub mod theme;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod context_form;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use api::ApiClient;
use cli::Cli;
use cmd::*;
use config::Settings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Completions need neither config nor a client.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref(), cli.api_url.as_deref())
        .context("failed to load configuration")?;

    if matches!(cli.command, Commands::Ui) {
        // The dashboard owns the terminal, so logs go to a file.
        if let Err(e) = logging::init_file(&config::app_dir()) {
            eprintln!("Warning: file logging disabled: {e}");
        }
    } else {
        logging::init_stderr();
    }

    let api = ApiClient::with_timeout(&settings.api_url, settings.request_timeout())?;
    tracing::debug!("using task service at {}", api.base_url());

    match cli.command {
        Commands::Ui => cmd_ui(api, settings).await,
        Commands::List { search, priority, sort, limit, json } => {
            cmd_list(&api, search, priority, sort.unwrap_or(settings.sort), limit, json).await
        }
        Commands::View { id } => cmd_view(&api, id).await,
        Commands::Add { title, desc, priority, deadline, category } => {
            cmd_add(&api, title, desc, priority, deadline, category).await
        }
        Commands::Update { id, title, desc, priority, deadline, clear_deadline, category } => {
            cmd_update(&api, id, title, desc, priority, deadline, clear_deadline, category).await
        }
        Commands::Toggle { id } => cmd_toggle(&api, id).await,
        Commands::Delete { id, yes } => cmd_delete(&api, id, yes).await,
        Commands::Suggest { text, save } => cmd_suggest(&api, text, save).await,
        Commands::Context { content, source } => cmd_context(&api, content, source).await,
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
