use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal client for the Smart To-Do task service.
/// The service URL comes from config, `SMART_TODO_API_URL`, or --api-url.
#[derive(Parser)]
#[command(name = "todo", version, about = "AI-assisted to-do list client")]
pub struct Cli {
    /// Base URL of the task service API.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to a JSON config file (default ~/.smart-todo/config.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{PriorityArg, SortMode, Tier};

    #[test]
    fn test_parses_list_flags() {
        let cli = Cli::try_parse_from([
            "todo", "list", "--search", "slides", "--priority", "high", "--sort", "deadline",
            "--api-url", "http://x/api/",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x/api/"));
        match cli.command {
            Commands::List { search, priority, sort, json, .. } => {
                assert_eq!(search.as_deref(), Some("slides"));
                assert_eq!(priority, PriorityArg::High);
                assert_eq!(sort, Some(SortMode::Deadline));
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_add_defaults_to_medium() {
        let cli = Cli::try_parse_from(["todo", "add", "Write report"]).unwrap();
        match cli.command {
            Commands::Add { title, priority, .. } => {
                assert_eq!(title, "Write report");
                assert_eq!(priority, Tier::Medium);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_clear_deadline_conflicts_with_deadline() {
        let res = Cli::try_parse_from([
            "todo", "update", "3", "--deadline", "today", "--clear-deadline",
        ]);
        assert!(res.is_err());
    }
}
