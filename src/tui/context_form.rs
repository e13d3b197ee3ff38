//! Context entry form: a source selector and a content field.

use crate::fields::ContextSource;
use crate::task::NewContext;
use crate::tui::input::InputField;

pub const SOURCE_GLOBAL_ORDER: usize = 0;
pub const CONTENT_GLOBAL_ORDER: usize = 1;

pub struct ContextForm {
    pub source: ContextSource,
    pub content: InputField,
    pub current_field: usize,
}

impl ContextForm {
    pub fn new() -> Self {
        let mut content = InputField::new();
        content.active = true;
        Self { source: ContextSource::default(), content, current_field: CONTENT_GLOBAL_ORDER }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % 2;
        self.content.active = self.current_field == CONTENT_GLOBAL_ORDER;
    }

    /// Left/right cycle the source or move the content cursor.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            SOURCE_GLOBAL_ORDER => {
                // Three sources, so two steps forward is one step back.
                self.source = if right { self.source.cycle() } else { self.source.cycle().cycle() };
            }
            _ if right => self.content.move_cursor_right(),
            _ => self.content.move_cursor_left(),
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if self.current_field == CONTENT_GLOBAL_ORDER {
            self.content.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.current_field == CONTENT_GLOBAL_ORDER {
            self.content.handle_backspace();
        }
    }

    pub fn to_new_context(&self) -> NewContext {
        NewContext { source: self.source, content: self.content.value.trim().to_string() }
    }
}

impl Default for ContextForm {
    fn default() -> Self {
        Self::new()
    }
}
