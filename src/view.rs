//! Task list view pipeline.
//!
//! Derives the list actually displayed from the raw collection and the three
//! user-controlled view parameters. Derivation is pure: the raw collection is
//! never touched and every call returns a fresh sequence.

use std::cmp::Ordering;

use crate::fields::*;
use crate::task::Task;

/// User-controlled parameters of the task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewParams {
    pub search: String,
    pub tier: TierFilter,
    pub sort: SortMode,
}

impl ViewParams {
    pub fn new(search: impl Into<String>, tier: TierFilter, sort: SortMode) -> Self {
        Self { search: search.into(), tier, sort }
    }
}

/// Derive the displayed task list.
pub fn derive(tasks: &[Task], params: &ViewParams) -> Vec<Task> {
    let mut result: Vec<Task> = filter(tasks, params).into_iter().cloned().collect();
    sort_tasks(&mut result, params.sort);
    result
}

/// Search and tier filtering, preserving input order.
pub fn filter<'a>(tasks: &'a [Task], params: &ViewParams) -> Vec<&'a Task> {
    let needle = params.search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| needle.is_empty() || matches_search(t, &needle))
        .filter(|t| params.tier.admits(t.priority()))
        .collect()
}

/// Case-insensitive substring match on title or description.
/// `needle` must already be lowercased.
fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Apply exactly one stable sort.
pub fn sort_tasks(tasks: &mut [Task], mode: SortMode) {
    match mode {
        SortMode::Latest => tasks.sort_by(|a, b| b.id.cmp(&a.id)),
        SortMode::Deadline => tasks.sort_by(|a, b| compare_deadlines(&a.deadline, &b.deadline)),
        SortMode::Priority => tasks.sort_by(|a, b| b.priority().rank().cmp(&a.priority().rank())),
    }
}

/// ISO strings compare chronologically; a missing deadline sorts after any date.
fn compare_deadlines(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
