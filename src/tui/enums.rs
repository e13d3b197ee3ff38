//! Enumerations for TUI state management.

use crate::error::ApiResult;
use crate::task::{ContextEntry, Suggestion, Task};

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    AddContext,
    Help,
    Confirm,
    /// A blocking error dialog; must be dismissed before anything else.
    Alert,
}

/// Input mode for the task list.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputMode {
    None,
    Search,
}

/// Completion of a request spawned onto the runtime.
#[derive(Debug)]
pub enum ApiEvent {
    TasksLoaded(ApiResult<Vec<Task>>),
    /// A single task fetched to pre-fill the edit form.
    TaskFetched(ApiResult<Task>),
    TaskSaved { created: bool, result: ApiResult<Task> },
    StatusChanged(ApiResult<Task>),
    TaskDeleted(ApiResult<()>),
    ContextSaved(ApiResult<ContextEntry>),
    Suggested { input: String, result: ApiResult<Suggestion> },
}
