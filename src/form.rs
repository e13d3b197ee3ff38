//! Task drafts: the editable form state shared by the CLI and the dashboard.
//!
//! A `TaskDraft` is what a human fills in before saving. It is pre-filled
//! from an existing task for edits or from an AI suggestion, validated, and
//! finally turned into a request body.

use chrono::{Duration, Local, NaiveDate};

use crate::error::{ApiError, ApiResult};
use crate::fields::*;
use crate::task::{NewContext, Suggestion, Task, TaskPayload};

/// Editable task fields. Text fields hold exactly what the user typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub tier: Tier,
    pub deadline: String,
    pub category: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            tier: Tier::Medium,
            deadline: String::new(),
            category: String::new(),
        }
    }
}

impl TaskDraft {
    /// Pre-fill a draft for editing an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            tier: task.priority(),
            deadline: task.deadline.clone().unwrap_or_default(),
            category: task.category_name().unwrap_or_default(),
        }
    }

    /// Merge a suggestion into the draft.
    ///
    /// Returned values win; absent ones keep the current value. A missing
    /// description falls back to the current one and then to `input`, the
    /// text the suggestion was requested for.
    pub fn apply_suggestion(&mut self, suggestion: Suggestion, input: &str) {
        if let Some(title) = suggestion.title {
            self.title = title;
        }
        if let Some(name) = suggestion.category.map(|c| c.name()).filter(|n| !n.is_empty()) {
            self.category = name;
        }
        if let Some(deadline) = suggestion.deadline {
            self.deadline = deadline;
        }
        if let Some(description) = suggestion.description {
            self.description = description;
        } else if self.description.is_empty() {
            self.description = input.to_string();
        }

        let tier = suggestion
            .priority
            .as_deref()
            .and_then(Tier::parse)
            .or_else(|| suggestion.priority_score.map(Tier::from_score));
        if let Some(tier) = tier {
            self.tier = tier;
        }
    }

    /// Check the draft before any request is sent.
    pub fn validate(&self) -> ApiResult<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("Title is required".into()));
        }
        Ok(())
    }

    /// Body of `POST /tasks/`; new tasks always start open.
    pub fn to_create_payload(&self) -> TaskPayload {
        TaskPayload { status: Some(Status::Open), ..self.to_update_payload() }
    }

    /// Body of a full-edit `PATCH /tasks/{id}/`.
    pub fn to_update_payload(&self) -> TaskPayload {
        let deadline = self.deadline.trim();
        TaskPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            priority_score: self.tier.canonical_score(),
            deadline: if deadline.is_empty() { None } else { Some(deadline.to_string()) },
            status: None,
        }
    }

    /// Normalise a human-entered deadline in place.
    pub fn normalise_deadline(&mut self) -> ApiResult<()> {
        if self.deadline.trim().is_empty() {
            self.deadline.clear();
            return Ok(());
        }
        match parse_deadline_input(&self.deadline) {
            Some(date) => {
                self.deadline = date.format("%Y-%m-%d").to_string();
                Ok(())
            }
            None => Err(ApiError::Validation(format!(
                "Unrecognised deadline '{}'. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.",
                self.deadline.trim()
            ))),
        }
    }
}

/// Reject empty intent text before asking for a suggestion.
pub fn validate_suggestion_input(input: &str) -> ApiResult<()> {
    if input.trim().is_empty() {
        return Err(ApiError::Validation("Please enter what you want help with.".into()));
    }
    Ok(())
}

/// Reject empty content before storing a context entry.
pub fn validate_context(context: &NewContext) -> ApiResult<()> {
    if context.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".into()));
    }
    Ok(())
}

/// Parse human-readable deadline input.
///
/// Supports "today", "tomorrow", "in 3d", "in 2w" and `YYYY-MM-DD`. A full
/// ISO timestamp is accepted and truncated to its date.
pub fn parse_deadline_input(s: &str) -> Option<NaiveDate> {
    parse_deadline_relative_to(s, Local::now().date_naive())
}

fn parse_deadline_relative_to(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Some(today + Duration::days(n));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Some(today + Duration::weeks(n));
        }
        return None;
    }

    let date_part = s.get(..10).unwrap_or(s.as_str());
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
