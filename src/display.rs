//! Plain-text formatting shared by the CLI and the dashboard.

use chrono::{Local, NaiveDate};

use crate::fields::*;
use crate::task::Task;

/// Format a priority tier for display.
pub fn format_tier(t: Tier) -> &'static str {
    match t {
        Tier::High => "High",
        Tier::Medium => "Medium",
        Tier::Low => "Low",
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Open => "Pending",
        Status::Done => "Done",
    }
}

/// Label of the action button for a task in this status.
pub fn toggle_label(s: Status) -> &'static str {
    match s {
        Status::Open => "Mark Done",
        Status::Done => "Undo",
    }
}

pub fn format_sort(s: SortMode) -> &'static str {
    match s {
        SortMode::Latest => "Latest",
        SortMode::Deadline => "Deadline",
        SortMode::Priority => "Priority",
    }
}

pub fn format_filter(f: TierFilter) -> &'static str {
    match f {
        TierFilter::All => "All",
        TierFilter::Only(t) => format_tier(t),
    }
}

pub fn format_source(s: ContextSource) -> &'static str {
    match s {
        ContextSource::Note => "Note",
        ContextSource::Whatsapp => "WhatsApp",
        ContextSource::Email => "Email",
    }
}

/// Format a deadline relative to today ("today", "tomorrow", "in 3d", "2d late").
///
/// Strings that are not ISO dates are shown as they are.
pub fn format_deadline_relative(deadline: Option<&str>, today: NaiveDate) -> String {
    let Some(raw) = deadline else {
        return "-".into();
    };
    let date_part = raw.get(..10).unwrap_or(raw);
    let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
        return raw.to_string();
    };
    let days = (d - today).num_days();
    if days == 0 {
        "today".into()
    } else if days == 1 {
        "tomorrow".into()
    } else if days > 1 {
        format!("in {}d", days)
    } else {
        format!("{}d late", -days)
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<5} {:<8} {:<7} {:<11} {:<12} {}",
        "ID", "Status", "Pri", "Deadline", "Category", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let category = t.category_name().unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<8} {:<7} {:<11} {:<12} {}",
            t.id,
            format_status(t.status),
            format_tier(t.priority()),
            format_deadline_relative(t.deadline.as_deref(), today),
            truncate(&category, 12),
            t.title
        );
    }
}

/// Print every field of one task.
pub fn print_task_detail(t: &Task) {
    println!("ID:          {}", t.id);
    println!("Title:       {}", t.title);
    println!("Status:      {}", format_status(t.status));
    println!("Priority:    {} ({:.2})", format_tier(t.priority()), t.priority_score);
    println!("Deadline:    {}", t.deadline.as_deref().unwrap_or("-"));
    println!("Category:    {}", t.category_name().unwrap_or_else(|| "-".into()));
    if let Some(desc) = &t.description {
        println!("Description:");
        for line in desc.lines() {
            println!("  {}", line);
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_deadline_relative() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        assert_eq!(format_deadline_relative(None, today), "-");
        assert_eq!(format_deadline_relative(Some("2025-01-30"), today), "today");
        assert_eq!(format_deadline_relative(Some("2025-01-31T09:00:00Z"), today), "tomorrow");
        assert_eq!(format_deadline_relative(Some("2025-02-04"), today), "in 5d");
        assert_eq!(format_deadline_relative(Some("2025-01-28"), today), "2d late");
        assert_eq!(format_deadline_relative(Some("soon"), today), "soon");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 12), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_labels() {
        assert_eq!(toggle_label(Status::Open), "Mark Done");
        assert_eq!(toggle_label(Status::Done), "Undo");
        assert_eq!(format_filter(TierFilter::Only(Tier::Low)), "Low");
    }
}
