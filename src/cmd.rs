//! Command implementations for the CLI interface.
//!
//! Each handler issues its requests through [`ApiClient`], one at a time,
//! and prints a plain-text result. Failures propagate as `anyhow` errors to
//! `main`, which reports them and exits non-zero.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::display::*;
use crate::fields::*;
use crate::form::{validate_context, validate_suggestion_input, TaskDraft};
use crate::task::NewContext;
use crate::tui::run::run_tui;
use crate::view::{derive, ViewParams};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui,

    /// List tasks with optional search, filter and sort.
    List {
        /// Case-insensitive text matched against title and description.
        #[arg(long)]
        search: Option<String>,
        /// Priority filter.
        #[arg(long, value_enum, default_value_t = PriorityArg::All)]
        priority: PriorityArg,
        /// Sort mode (defaults to the configured one).
        #[arg(long, value_enum)]
        sort: Option<SortMode>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Print the derived list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// View a single task by ID.
    View {
        id: u64,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum, default_value_t = Tier::Medium)]
        priority: Tier,
        /// Deadline: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Tier>,
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        /// Remove the deadline.
        #[arg(long)]
        clear_deadline: bool,
        #[arg(long)]
        category: Option<String>,
    },

    /// Flip a task between pending and done.
    Toggle {
        id: u64,
    },

    /// Delete a task.
    Delete {
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Ask the service to draft a task from free text.
    Suggest {
        /// What you are planning, in your own words.
        text: String,
        /// Create the suggested task instead of only printing it.
        #[arg(long)]
        save: bool,
    },

    /// Store a context entry (a note, message or email excerpt).
    Context {
        content: String,
        #[arg(long, value_enum, default_value_t = ContextSource::Note)]
        source: ContextSource,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the dashboard on a blocking thread; requests run on this runtime.
pub async fn cmd_ui(api: ApiClient, settings: Settings) -> Result<()> {
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || run_tui(api, &settings, handle))
        .await
        .context("dashboard thread panicked")?
        .context("UI error")?;
    Ok(())
}

/// Fetch, derive and print the task list.
pub async fn cmd_list(
    api: &ApiClient,
    search: Option<String>,
    priority: PriorityArg,
    sort: SortMode,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let tasks = api.list_tasks().await.context("failed to load tasks")?;
    let params = ViewParams::new(search.unwrap_or_default(), priority.into(), sort);
    let mut view = derive(&tasks, &params);
    if let Some(n) = limit {
        view.truncate(n);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if view.is_empty() {
        println!("No tasks found.");
    } else {
        print_table(&view);
    }
    Ok(())
}

pub async fn cmd_view(api: &ApiClient, id: u64) -> Result<()> {
    let task = api.get_task(id).await.with_context(|| format!("failed to load task {id}"))?;
    print_task_detail(&task);
    Ok(())
}

/// Create a task from command-line fields.
pub async fn cmd_add(
    api: &ApiClient,
    title: String,
    desc: Option<String>,
    priority: Tier,
    deadline: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let mut draft = TaskDraft {
        title,
        description: desc.unwrap_or_default(),
        tier: priority,
        deadline: deadline.unwrap_or_default(),
        category: category.unwrap_or_default(),
    };
    draft.normalise_deadline()?;
    draft.validate()?;

    let task = api.create_task(&draft.to_create_payload()).await.context("failed to save task")?;
    tracing::info!("created task {}", task.id);
    println!("Added {}: {}", task.id, task.title);
    Ok(())
}

/// Fetch a task, apply the given fields to its draft and send the edit.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_update(
    api: &ApiClient,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Tier>,
    deadline: Option<String>,
    clear_deadline: bool,
    category: Option<String>,
) -> Result<()> {
    let task = api.get_task(id).await.with_context(|| format!("failed to load task {id}"))?;
    let mut draft = TaskDraft::from_task(&task);

    if let Some(v) = title {
        draft.title = v;
    }
    if let Some(v) = desc {
        draft.description = v;
    }
    if let Some(v) = priority {
        draft.tier = v;
    }
    if let Some(v) = category {
        draft.category = v;
    }
    if clear_deadline {
        draft.deadline.clear();
    } else if let Some(v) = deadline {
        draft.deadline = v;
        draft.normalise_deadline()?;
    }
    draft.validate()?;

    api.update_task(id, &draft.to_update_payload())
        .await
        .with_context(|| format!("failed to update task {id}"))?;
    println!("Updated {}", id);
    Ok(())
}

/// Flip completion using the status the server currently reports.
pub async fn cmd_toggle(api: &ApiClient, id: u64) -> Result<()> {
    let task = api.get_task(id).await.with_context(|| format!("failed to load task {id}"))?;
    let next = task.status.toggled();
    api.set_status(id, next)
        .await
        .with_context(|| format!("failed to update task {id}"))?;
    println!("{} {} is now {}", id, task.title, format_status(next));
    Ok(())
}

pub async fn cmd_delete(api: &ApiClient, id: u64, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete task {id}? [y/N] "))? {
        println!("Cancelled.");
        return Ok(());
    }
    api.delete_task(id).await.with_context(|| format!("failed to delete task {id}"))?;
    println!("Deleted {}", id);
    Ok(())
}

/// Request a suggestion, merge it into an empty draft and print it.
pub async fn cmd_suggest(api: &ApiClient, text: String, save: bool) -> Result<()> {
    validate_suggestion_input(&text)?;
    let suggestion = api.suggest(&text).await.context("failed to get suggestion")?;

    let mut draft = TaskDraft::default();
    draft.apply_suggestion(suggestion, &text);
    print_draft(&draft);

    if save {
        draft.validate().context("suggestion has no title")?;
        let task = api.create_task(&draft.to_create_payload()).await.context("failed to save task")?;
        println!("Added {}: {}", task.id, task.title);
    }
    Ok(())
}

pub async fn cmd_context(api: &ApiClient, content: String, source: ContextSource) -> Result<()> {
    let entry = NewContext { source, content };
    validate_context(&entry)?;
    api.create_context(&entry).await.context("failed to save context")?;
    println!("Context saved.");
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

fn print_draft(draft: &TaskDraft) {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    println!("Title:       {}", or_dash(&draft.title));
    println!("Priority:    {}", format_tier(draft.tier));
    println!("Deadline:    {}", or_dash(&draft.deadline));
    println!("Category:    {}", or_dash(&draft.category));
    println!("Description: {}", or_dash(&draft.description));
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no confirmation given (use --yes to skip the prompt)");
    }
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
