//! Task form handling for the terminal user interface.
//!
//! `TaskForm` holds the on-screen state of the add/edit form. It converts to
//! and from [`TaskDraft`], which owns validation and request mapping.

use crate::fields::Tier;
use crate::form::TaskDraft;
use crate::task::Task;
use crate::tui::input::InputField;

/// Global order constants for task form fields.
pub const AI_INPUT_GLOBAL_ORDER: usize = 0;
pub const TITLE_GLOBAL_ORDER: usize = 1;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 2;
pub const PRIORITY_GLOBAL_ORDER: usize = 3;
pub const DEADLINE_GLOBAL_ORDER: usize = 4;
pub const CATEGORY_GLOBAL_ORDER: usize = 5;
const FIELD_COUNT: usize = 6;

/// Task form for adding or editing a task.
pub struct TaskForm {
    /// Free text for the suggestion request; only shown when adding.
    pub ai_input: InputField,
    pub title: InputField,
    pub description: InputField,
    pub deadline: InputField,
    pub category: InputField,
    pub tier: Tier,
    pub current_field: usize,
    /// Id of the task being edited, `None` when adding.
    pub task_id: Option<u64>,
}

impl TaskForm {
    /// Empty add form, focused on the suggestion input.
    pub fn new() -> Self {
        let mut form = Self::with_draft(&TaskDraft::default(), None);
        form.current_field = AI_INPUT_GLOBAL_ORDER;
        form.update_active_field();
        form
    }

    /// Edit form pre-filled from a task.
    pub fn from_task(task: &Task) -> Self {
        Self::with_draft(&TaskDraft::from_task(task), Some(task.id))
    }

    fn with_draft(draft: &TaskDraft, task_id: Option<u64>) -> Self {
        let mut form = Self {
            ai_input: InputField::new(),
            title: InputField::new(),
            description: InputField::new(),
            deadline: InputField::new(),
            category: InputField::new(),
            tier: Tier::Medium,
            current_field: TITLE_GLOBAL_ORDER,
            task_id,
        };
        form.set_draft(draft);
        form.update_active_field();
        form
    }

    pub fn is_edit(&self) -> bool {
        self.task_id.is_some()
    }

    /// Current field values as a draft.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.value.clone(),
            description: self.description.value.clone(),
            tier: self.tier,
            deadline: self.deadline.value.clone(),
            category: self.category.value.clone(),
        }
    }

    /// Overwrite field values from a draft.
    pub fn set_draft(&mut self, draft: &TaskDraft) {
        self.title.set_value(&draft.title);
        self.description.set_value(&draft.description);
        self.deadline.set_value(&draft.deadline);
        self.category.set_value(&draft.category);
        self.tier = draft.tier;
    }

    fn first_field(&self) -> usize {
        if self.is_edit() {
            TITLE_GLOBAL_ORDER
        } else {
            AI_INPUT_GLOBAL_ORDER
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field += 1;
        if self.current_field >= FIELD_COUNT {
            self.current_field = self.first_field();
        }
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field <= self.first_field() {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        let current = self.current_field;
        self.ai_input.active = current == AI_INPUT_GLOBAL_ORDER;
        self.title.active = current == TITLE_GLOBAL_ORDER;
        self.description.active = current == DESCRIPTION_GLOBAL_ORDER;
        self.deadline.active = current == DEADLINE_GLOBAL_ORDER;
        self.category.active = current == CATEGORY_GLOBAL_ORDER;
    }

    /// The focused text input, or `None` on the priority selector.
    pub fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            AI_INPUT_GLOBAL_ORDER => Some(&mut self.ai_input),
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            DEADLINE_GLOBAL_ORDER => Some(&mut self.deadline),
            CATEGORY_GLOBAL_ORDER => Some(&mut self.category),
            _ => None,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.current_input() {
            field.handle_char(c);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == PRIORITY_GLOBAL_ORDER {
            self.tier = self.tier.cycle(right);
        } else if let Some(field) = self.current_input() {
            if right {
                field.move_cursor_right();
            } else {
                field.move_cursor_left();
            }
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
