//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the dashboard state,
//! handles user input, renders the interface and coordinates with the task
//! service. Requests are spawned onto the tokio runtime; their results come
//! back as [`ApiEvent`]s drained once per frame, so the interface never
//! blocks on the network.

use std::future::Future;
use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::display::*;
use crate::error::ApiError;
use crate::fields::*;
use crate::form::{validate_context, validate_suggestion_input};
use crate::task::Task;
use crate::theme::Theme;
use crate::tui::{
    colors::Palette,
    context_form::{ContextForm, SOURCE_GLOBAL_ORDER},
    enums::{ApiEvent, AppState, InputMode},
    input::InputField,
    task_form::{TaskForm, AI_INPUT_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER},
    utils::centered_rect,
};
use crate::view::{derive, ViewParams};

/// Main application state for the dashboard.
pub struct App {
    state: AppState,
    /// Screen to return to when an alert is dismissed.
    previous_state: AppState,
    api: ApiClient,
    runtime: Handle,
    tx: UnboundedSender<ApiEvent>,
    rx: UnboundedReceiver<ApiEvent>,
    /// Raw collection as last fetched; only replaced by a fetch.
    tasks: Vec<Task>,
    /// Derived list currently displayed.
    view: Vec<Task>,
    params: ViewParams,
    task_list_state: TableState,
    search: InputField,
    input_mode: InputMode,
    theme: Theme,
    loading: bool,
    saving_task: bool,
    saving_context: bool,
    suggesting: bool,
    pending_edit: Option<u64>,
    task_form: TaskForm,
    context_form: ContextForm,
    confirm_target: Option<(u64, String)>,
    alert_message: String,
    status_message: String,
}

impl App {
    /// Create the dashboard and start the initial fetch.
    pub fn new(api: ApiClient, settings: &Settings, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        let mut app = App {
            state: AppState::TaskList,
            previous_state: AppState::TaskList,
            api,
            runtime,
            tx,
            rx,
            tasks: Vec::new(),
            view: Vec::new(),
            params: ViewParams::new("", TierFilter::All, settings.sort),
            task_list_state: TableState::default(),
            search: InputField::new(),
            input_mode: InputMode::None,
            theme: settings.theme,
            loading: false,
            saving_task: false,
            saving_context: false,
            suggesting: false,
            pending_edit: None,
            task_form: TaskForm::new(),
            context_form: ContextForm::new(),
            confirm_target: None,
            alert_message: String::new(),
            status_message: String::new(),
        };
        app.load_tasks();
        app
    }

    /// Run a request on the runtime and deliver its event to this app.
    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = ApiEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            // The receiver is gone only after the app has quit.
            let _ = tx.send(request.await);
        });
    }

    fn load_tasks(&mut self) {
        self.loading = true;
        let api = self.api.clone();
        self.spawn(async move { ApiEvent::TasksLoaded(api.list_tasks().await) });
    }

    /// Recompute the displayed list, keeping the selected task if it is still visible.
    fn refresh_view(&mut self) {
        let selected_id = self.selected_task().map(|t| t.id);
        self.view = derive(&self.tasks, &self.params);

        let index = selected_id
            .and_then(|id| self.view.iter().position(|t| t.id == id))
            .or_else(|| self.task_list_state.selected().map(|i| i.min(self.view.len().saturating_sub(1))));
        self.task_list_state.select(if self.view.is_empty() { None } else { Some(index.unwrap_or(0)) });
    }

    fn selected_task(&self) -> Option<&Task> {
        self.task_list_state.selected().and_then(|i| self.view.get(i))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Log a failure and open the blocking alert.
    fn show_error(&mut self, context: &str, err: &ApiError) {
        tracing::error!("{}: {}", context, err);
        self.alert_message = format!("{context}: {err}");
        if self.state != AppState::Alert {
            self.previous_state = self.state;
            self.state = AppState::Alert;
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_api_event(event);
        }
    }

    fn handle_api_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::TasksLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(tasks) => {
                        tracing::debug!("loaded {} tasks", tasks.len());
                        self.tasks = tasks;
                        self.refresh_view();
                    }
                    Err(e) => self.show_error("Failed to load tasks", &e),
                }
            }
            ApiEvent::TaskFetched(result) => {
                match result {
                    Ok(task) if self.pending_edit == Some(task.id) => {
                        self.pending_edit = None;
                        if self.state == AppState::TaskList {
                            self.task_form = TaskForm::from_task(&task);
                            self.state = AppState::EditTask;
                        }
                    }
                    // A newer edit request is still outstanding; keep waiting for it.
                    Ok(task) => tracing::debug!("discarding stale fetch of task {}", task.id),
                    Err(e) => {
                        self.pending_edit = None;
                        self.show_error("Failed to load task", &e);
                    }
                }
            }
            ApiEvent::TaskSaved { created, result } => {
                self.saving_task = false;
                match result {
                    Ok(task) => {
                        tracing::info!("saved task {}", task.id);
                        if matches!(self.state, AppState::AddTask | AppState::EditTask) {
                            self.state = AppState::TaskList;
                        }
                        self.set_status_message(if created { "Task created" } else { "Task updated" });
                        self.load_tasks();
                    }
                    Err(e) => self.show_error("Failed to save task", &e),
                }
            }
            ApiEvent::StatusChanged(result) => match result {
                Ok(task) => {
                    self.set_status_message(format!("'{}' is now {}", task.title, format_status(task.status)));
                    self.load_tasks();
                }
                Err(e) => self.show_error("Failed to update task", &e),
            },
            ApiEvent::TaskDeleted(result) => match result {
                Ok(()) => {
                    self.set_status_message("Task deleted");
                    self.load_tasks();
                }
                Err(e) => self.show_error("Failed to delete task", &e),
            },
            ApiEvent::ContextSaved(result) => {
                self.saving_context = false;
                match result {
                    Ok(_) => {
                        if self.state == AppState::AddContext {
                            self.context_form = ContextForm::new();
                            self.state = AppState::TaskList;
                        }
                        self.set_status_message("Context saved");
                    }
                    Err(e) => self.show_error("Failed to save context", &e),
                }
            }
            ApiEvent::Suggested { input, result } => {
                self.suggesting = false;
                match result {
                    Ok(suggestion) if self.state == AppState::AddTask => {
                        let mut draft = self.task_form.to_draft();
                        draft.apply_suggestion(suggestion, &input);
                        self.task_form.set_draft(&draft);
                        self.set_status_message("Suggestion applied - review and press Enter to save");
                    }
                    Ok(_) => tracing::debug!("add form closed, discarding suggestion"),
                    Err(e) => self.show_error("Failed to get suggestion", &e),
                }
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, next) = (task.id, task.status.toggled());
        let api = self.api.clone();
        self.spawn(async move { ApiEvent::StatusChanged(api.set_status(id, next).await) });
    }

    fn request_edit(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        self.pending_edit = Some(id);
        self.set_status_message("Loading task...");
        let api = self.api.clone();
        self.spawn(async move { ApiEvent::TaskFetched(api.get_task(id).await) });
    }

    fn delete_confirmed(&mut self) {
        if let Some((id, _)) = self.confirm_target.take() {
            let api = self.api.clone();
            self.spawn(async move { ApiEvent::TaskDeleted(api.delete_task(id).await) });
        }
    }

    fn submit_task_form(&mut self) {
        if self.saving_task {
            self.set_status_message("Still saving...");
            return;
        }
        let mut draft = self.task_form.to_draft();
        if let Err(e) = draft.normalise_deadline().and_then(|_| draft.validate()) {
            self.show_error("Cannot save task", &e);
            return;
        }
        self.task_form.deadline.set_value(&draft.deadline);
        self.saving_task = true;

        let api = self.api.clone();
        match self.task_form.task_id {
            Some(id) => {
                let payload = draft.to_update_payload();
                self.spawn(async move {
                    ApiEvent::TaskSaved { created: false, result: api.update_task(id, &payload).await }
                });
            }
            None => {
                let payload = draft.to_create_payload();
                self.spawn(async move {
                    ApiEvent::TaskSaved { created: true, result: api.create_task(&payload).await }
                });
            }
        }
    }

    /// One suggestion at a time; the field is disabled while generating.
    fn request_suggestion(&mut self) {
        if self.suggesting {
            return;
        }
        let input = self.task_form.ai_input.value.trim().to_string();
        if let Err(e) = validate_suggestion_input(&input) {
            self.show_error("Cannot ask for a suggestion", &e);
            return;
        }
        self.suggesting = true;
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.suggest(&input).await;
            ApiEvent::Suggested { input, result }
        });
    }

    fn submit_context_form(&mut self) {
        if self.saving_context {
            self.set_status_message("Still saving...");
            return;
        }
        let entry = self.context_form.to_new_context();
        if let Err(e) = validate_context(&entry) {
            self.show_error("Cannot save context", &e);
            return;
        }
        self.saving_context = true;
        let api = self.api.clone();
        self.spawn(async move { ApiEvent::ContextSaved(api.create_context(&entry).await) });
    }

    fn move_selection(&mut self, down: bool) {
        if self.view.is_empty() {
            return;
        }
        let next = match self.task_list_state.selected() {
            Some(i) if down => (i + 1).min(self.view.len() - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.task_list_state.select(Some(next));
    }

    /// Handle keyboard input on the task list.
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Search {
            match key {
                KeyCode::Esc => {
                    self.search.clear();
                    self.input_mode = InputMode::None;
                }
                KeyCode::Enter => self.input_mode = InputMode::None,
                KeyCode::Backspace => self.search.handle_backspace(),
                KeyCode::Delete => self.search.handle_delete(),
                KeyCode::Left => self.search.move_cursor_left(),
                KeyCode::Right => self.search.move_cursor_right(),
                KeyCode::Char(c) => self.search.handle_char(c),
                _ => return false,
            }
            self.search.active = self.input_mode == InputMode::Search;
            self.params.search = self.search.value.clone();
            self.refresh_view();
            return false;
        }

        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.search.value.is_empty() {
                    return true;
                }
                self.search.clear();
                self.params.search.clear();
                self.refresh_view();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.search.active = true;
                self.search.move_end();
            }
            KeyCode::Char('f') => {
                self.params.tier = self.params.tier.next();
                self.refresh_view();
            }
            KeyCode::Char('o') => {
                self.params.sort = self.params.sort.next();
                self.refresh_view();
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') | KeyCode::Enter => self.request_edit(),
            KeyCode::Char('d') => {
                if let Some(target) = self.selected_task().map(|t| (t.id, t.title.clone())) {
                    self.confirm_target = Some(target);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('x') => {
                self.context_form = ContextForm::new();
                self.state = AppState::AddContext;
            }
            KeyCode::Char('T') => self.theme = self.theme.toggled(),
            KeyCode::Char('r') => self.load_tasks(),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Home => {
                if let Some(field) = self.task_form.current_input() {
                    field.move_home();
                }
            }
            KeyCode::End => {
                if let Some(field) = self.task_form.current_input() {
                    field.move_end();
                }
            }
            KeyCode::Enter if self.task_form.current_field == AI_INPUT_GLOBAL_ORDER => {
                self.request_suggestion()
            }
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Char(c) => {
                if !(self.suggesting && self.task_form.current_field == AI_INPUT_GLOBAL_ORDER) {
                    self.task_form.handle_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_context_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.context_form.next_field(),
            KeyCode::Left => self.context_form.handle_left_right(false),
            KeyCode::Right => self.context_form.handle_left_right(true),
            KeyCode::Backspace => self.context_form.handle_backspace(),
            KeyCode::Enter => self.submit_context_form(),
            KeyCode::Char(c) => self.context_form.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.delete_confirmed();
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_target = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    fn handle_alert_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.alert_message.clear();
            self.state = self.previous_state;
        }
    }

    /// Dispatch one key press. Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.status_message.clear();

        match self.state {
            AppState::TaskList => return self.handle_task_list_input(key.code),
            AppState::AddTask | AppState::EditTask => self.handle_form_input(key.code),
            AppState::AddContext => self.handle_context_input(key.code),
            AppState::Confirm => self.handle_confirm_input(key.code),
            AppState::Alert => self.handle_alert_input(key.code),
            AppState::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
                    self.state = AppState::TaskList;
                }
            }
        }
        false
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect, p: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let done = self.tasks.iter().filter(|t| t.status.is_done()).count();
        let header = Paragraph::new(Line::from(vec![
            Span::styled("SMART TO-DO", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {} tasks, {} done  ", self.tasks.len(), done)),
            Span::styled(
                format!("[T] {}", self.theme.toggle_label()),
                Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let toolbar = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(20), Constraint::Percentage(20)])
            .split(chunks[1]);
        render_input(f, toolbar[0], &self.search, "Search (/)", p);
        let filter = Paragraph::new(format!("< {} >", format_filter(self.params.tier)))
            .block(Block::default().borders(Borders::ALL).title("Priority (f)"));
        f.render_widget(filter, toolbar[1]);
        let sort = Paragraph::new(format!("< {} >", format_sort(self.params.sort)))
            .block(Block::default().borders(Borders::ALL).title("Sort (o)"));
        f.render_widget(sort, toolbar[2]);

        let block = Block::default().borders(Borders::ALL).title(format!(
            "Tasks ({}/{}) - Press 'h' for help",
            self.view.len(),
            self.tasks.len()
        ));
        if self.view.is_empty() {
            let text = if self.loading { "Loading tasks..." } else { "No tasks found." };
            let empty = Paragraph::new(text)
                .style(Style::default().fg(p.muted))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(empty, chunks[2]);
            return;
        }

        let today = Local::now().date_naive();
        let header_cells = ["", "Title", "Priority", "Category", "Deadline", "Action"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(p.header_bg).fg(p.header_fg))
            .height(1);

        let rows: Vec<Row> = self
            .view
            .iter()
            .map(|task| {
                let tier = task.priority();
                let deadline = match &task.deadline {
                    Some(d) => format!("{} ({})", d, format_deadline_relative(Some(d.as_str()), today)),
                    None => "-".into(),
                };
                let (mark, title_style) = if task.status.is_done() {
                    ("[x]", Style::default().fg(p.muted).add_modifier(Modifier::CROSSED_OUT))
                } else {
                    ("[ ]", Style::default().fg(p.fg))
                };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(task.title.clone()).style(title_style),
                    Cell::from(format_tier(tier)).style(Style::default().fg(p.tier(tier))),
                    Cell::from(task.category_name().unwrap_or_else(|| "-".into())),
                    Cell::from(deadline),
                    Cell::from(toggle_label(task.status)).style(Style::default().fg(p.muted)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(25),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(24),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(p.highlight_bg).fg(p.highlight_fg))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[2], &mut self.task_list_state);
    }

    fn render_task_form(&mut self, f: &mut Frame, area: Rect, p: &Palette) {
        let is_edit = self.task_form.is_edit();
        let mut constraints = Vec::new();
        if !is_edit {
            constraints.push(Constraint::Length(3));
        }
        constraints.extend([
            Constraint::Length(3), // Title
            Constraint::Length(5), // Description
            Constraint::Length(3), // Priority
            Constraint::Length(3), // Deadline
            Constraint::Length(3), // Category
            Constraint::Min(1),
        ]);

        let outer = Block::default().borders(Borders::ALL).title(match self.task_form.task_id {
            Some(id) => format!("Edit Task #{id}"),
            None => "Add Task".to_string(),
        });
        let inner = outer.inner(area);
        f.render_widget(outer, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let form = &self.task_form;
        let current = form.current_field;
        let mut slot = chunks.iter().copied();
        let mut next_area = || slot.next().unwrap_or_default();

        if !is_edit {
            let title = if self.suggesting {
                "Tell me what you're planning - Generating..."
            } else {
                "Tell me what you're planning (Enter: AI suggestion)"
            };
            render_input(f, next_area(), &form.ai_input, title, p);
        }
        render_input(f, next_area(), &form.title, "Title *", p);
        render_input(f, next_area(), &form.description, "Description", p);

        let priority = Paragraph::new(Span::styled(
            format!("< {} >", format_tier(form.tier)),
            Style::default().fg(p.tier(form.tier)).add_modifier(Modifier::BOLD),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Priority")
                .border_style(focus_style(current == PRIORITY_GLOBAL_ORDER, p)),
        );
        f.render_widget(priority, next_area());

        render_input(
            f,
            next_area(),
            &form.deadline,
            "Deadline (YYYY-MM-DD, today, tomorrow, in 3d)",
            p,
        );
        render_input(f, next_area(), &form.category, "Category", p);

        let hint = if self.saving_task {
            "Saving..."
        } else {
            "Tab/Up/Down move  Left/Right change priority  Enter save  Esc cancel"
        };
        let instructions = Paragraph::new(hint).style(Style::default().fg(p.muted)).alignment(Alignment::Center);
        f.render_widget(instructions, next_area());
    }

    fn render_context_form(&mut self, f: &mut Frame, area: Rect, p: &Palette) {
        let area = centered_rect(70, 60, area);
        f.render_widget(Clear, area);
        let outer = Block::default()
            .borders(Borders::ALL)
            .title("Add Context")
            .style(Style::default().bg(p.bg).fg(p.fg));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(1)])
            .split(inner);

        let form = &self.context_form;
        let source = Paragraph::new(format!("< {} >", format_source(form.source))).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Source")
                .border_style(focus_style(form.current_field == SOURCE_GLOBAL_ORDER, p)),
        );
        f.render_widget(source, chunks[0]);
        render_input(f, chunks[1], &form.content, "Content *", p);

        let hint = if self.saving_context { "Saving..." } else { "Tab switch field  Enter save  Esc cancel" };
        f.render_widget(
            Paragraph::new(hint).style(Style::default().fg(p.muted)).alignment(Alignment::Center),
            chunks[2],
        );
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Smart To-Do Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  Up/k, Down/j   Navigate tasks"),
            Line::from("  /              Search title and description"),
            Line::from("  f              Cycle priority filter (All, High, Medium, Low)"),
            Line::from("  o              Cycle sort (Latest, Deadline, Priority)"),
            Line::from("  c/Space        Mark done / undo"),
            Line::from("  a              Add task"),
            Line::from("  e/Enter        Edit selected task"),
            Line::from("  d              Delete selected task"),
            Line::from("  x              Add context entry"),
            Line::from("  T              Toggle light/dark theme"),
            Line::from("  r              Reload from server"),
            Line::from("  h/F1           Show this help"),
            Line::from("  q/Esc/Ctrl+C   Quit"),
            Line::from(""),
            Line::from(Span::styled("Task Form:", bold)),
            Line::from("  Tab/Up/Down    Move between fields"),
            Line::from("  Left/Right     Change priority"),
            Line::from("  Enter          Save (on the planning field: ask for a suggestion)"),
            Line::from("  Esc            Cancel"),
            Line::from(""),
            Line::from(Span::styled("Priority:", bold)),
            Line::from("  High >= 0.8, Medium >= 0.5, Low otherwise"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Esc to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect, p: &Palette) {
        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let target = self
            .confirm_target
            .as_ref()
            .map(|(id, title)| format!("Delete task {id}: {title}"))
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Are you sure you want to:", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(target),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Confirm Action").borders(Borders::ALL))
            .style(Style::default().bg(p.alert_bg).fg(p.fg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_alert(&self, f: &mut Frame, area: Rect, p: &Palette) {
        let area = centered_rect(60, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(self.alert_message.as_str()),
            Line::from(""),
            Line::from(Span::styled("Press Enter to dismiss", Style::default().add_modifier(Modifier::ITALIC))),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Error").borders(Borders::ALL))
            .style(Style::default().bg(p.alert_bg).fg(p.fg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect, p: &Palette) {
        let mut status = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList if self.input_mode == InputMode::Search => {
                    "Search: type to filter (Enter to confirm, Esc to clear)".to_string()
                }
                AppState::TaskList => format!(
                    "Tasks: {} | Filter: {} | Sort: {} | Press 'h' for help",
                    self.view.len(),
                    format_filter(self.params.tier),
                    format_sort(self.params.sort)
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::AddContext => "Add Context".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Alert => "Error".to_string(),
            }
        };
        if self.loading {
            status.push_str(" | Syncing...");
        }
        if self.suggesting {
            status.push_str(" | Generating...");
        }

        let bar = Paragraph::new(status).style(Style::default().bg(p.header_bg).fg(p.header_fg));
        f.render_widget(bar, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let p = Palette::for_theme(self.theme);
        f.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        let screen = if self.state == AppState::Alert { self.previous_state } else { self.state };
        match screen {
            AppState::AddTask | AppState::EditTask => self.render_task_form(f, chunks[0], &p),
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::AddContext => {
                self.render_task_list(f, chunks[0], &p);
                self.render_context_form(f, chunks[0], &p);
            }
            AppState::TaskList | AppState::Confirm | AppState::Alert => {
                self.render_task_list(f, chunks[0], &p)
            }
        }
        match self.state {
            AppState::Confirm => self.render_confirm(f, chunks[0], &p),
            AppState::Alert => self.render_alert(f, chunks[0], &p),
            _ => {}
        }

        self.render_status_bar(f, chunks[1], &p);
    }

    /// Main event loop for the dashboard.
    ///
    /// Handles request completions, rendering and input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.drain_events();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn focus_style(focused: bool, p: &Palette) -> Style {
    if focused {
        Style::default().fg(p.focus)
    } else {
        Style::default()
    }
}

/// Render a bordered single-line input, placing the cursor when the field is active.
fn render_input(f: &mut Frame, area: Rect, field: &InputField, title: &str, p: &Palette) {
    let focused = field.active;
    let widget = Paragraph::new(field.value.as_str())
        .block(Block::default().borders(Borders::ALL).title(title).border_style(focus_style(focused, p)))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);

    if focused && area.width > 2 && area.height > 2 {
        let x = (field.cursor as u16).min(area.width - 3);
        f.set_cursor_position((area.x + 1 + x, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use crate::task::Suggestion;

    fn task(id: u64, title: &str, score: f64) -> Task {
        Task {
            id,
            title: title.into(),
            description: None,
            status: Status::Open,
            priority_score: score,
            deadline: None,
            category: None,
        }
    }

    fn app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api/").unwrap();
        let mut app = App::new(api, &Settings::default(), Handle::current());
        app.handle_api_event(ApiEvent::TasksLoaded(Ok(vec![
            task(1, "Buy milk", 0.2),
            task(2, "Prepare slides", 0.9),
            task(3, "Pay rent", 0.6),
        ])));
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_loaded_tasks_are_derived_newest_first() {
        let app = app();
        assert!(!app.loading);
        let ids: Vec<u64> = app.view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(app.task_list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_search_filter_and_sort_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        for c in "SLI".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.view.len(), 1);
        assert_eq!(app.view[0].id, 2);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view.len(), 3);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.params.tier, TierFilter::Only(Tier::High));
        assert_eq!(app.view.len(), 1);
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.params.tier, TierFilter::All);

        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.params.sort, SortMode::Priority);
        let ids: Vec<u64> = app.view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(app.tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_selection_follows_task_across_resort() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_task().map(|t| t.id), Some(2));
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.selected_task().map(|t| t.id), Some(2));
    }

    #[tokio::test]
    async fn test_theme_toggle_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('T'));
        assert_eq!(app.theme, Theme::Light);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[tokio::test]
    async fn test_error_opens_blocking_alert_over_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Alert);
        assert!(app.alert_message.contains("Title is required"));
        assert!(!app.saving_task);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.state, AppState::Alert);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);
    }

    #[tokio::test]
    async fn test_failed_load_clears_loading_and_alerts() {
        let mut app = app();
        app.loading = true;
        app.handle_api_event(ApiEvent::TasksLoaded(Err(ApiError::Status {
            status: 500,
            body: String::new(),
        })));
        assert!(!app.loading);
        assert_eq!(app.state, AppState::Alert);
        assert_eq!(app.tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_suggestion_fills_open_add_form_only() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        app.suggesting = true;
        app.handle_api_event(ApiEvent::Suggested {
            input: "slides for friday".into(),
            result: Ok(Suggestion {
                title: Some("Prepare slides".into()),
                priority: Some("high".into()),
                ..Suggestion::default()
            }),
        });
        assert!(!app.suggesting);
        assert_eq!(app.task_form.title.value, "Prepare slides");
        assert_eq!(app.task_form.tier, Tier::High);
        assert_eq!(app.task_form.description.value, "slides for friday");

        press(&mut app, KeyCode::Esc);
        app.handle_api_event(ApiEvent::Suggested {
            input: "x".into(),
            result: Ok(Suggestion { title: Some("Late".into()), ..Suggestion::default() }),
        });
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.task_form.title.value, "Prepare slides");
    }

    #[tokio::test]
    async fn test_only_one_suggestion_in_flight() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        for c in "plan trip".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.suggesting);
        press(&mut app, KeyCode::Char('!'));
        assert_eq!(app.task_form.ai_input.value, "plan trip");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        assert_eq!(app.confirm_target.as_ref().map(|(id, _)| *id), Some(3));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state, AppState::TaskList);
        assert!(app.confirm_target.is_none());
    }

    #[tokio::test]
    async fn test_latest_edit_request_wins() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.pending_edit, Some(3));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.pending_edit, Some(2));

        app.handle_api_event(ApiEvent::TaskFetched(Ok(task(3, "Pay rent", 0.6))));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.pending_edit, Some(2));

        app.handle_api_event(ApiEvent::TaskFetched(Ok(task(2, "Prepare slides", 0.9))));
        assert_eq!(app.state, AppState::EditTask);
        assert_eq!(app.task_form.task_id, Some(2));
        assert_eq!(app.task_form.tier, Tier::High);
        assert!(app.pending_edit.is_none());
    }

    #[tokio::test]
    async fn test_context_submit_not_blocked_by_task_save() {
        let mut app = app();
        app.saving_task = true;
        press(&mut app, KeyCode::Char('x'));
        for c in "call mum".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.saving_context);
        assert_eq!(app.state, AppState::AddContext);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message, "Still saving...");
        app.handle_api_event(ApiEvent::ContextSaved(Ok(crate::task::ContextEntry {
            id: Some(1),
            source: Some("note".into()),
            content: "call mum".into(),
        })));
        assert!(!app.saving_context);
        assert!(app.saving_task);
        assert_eq!(app.state, AppState::TaskList);
    }

    #[tokio::test]
    async fn test_search_field_is_active_only_while_searching() {
        let mut app = app();
        assert!(!app.search.active);
        press(&mut app, KeyCode::Char('/'));
        assert!(app.search.active);
        press(&mut app, KeyCode::Enter);
        assert!(!app.search.active);
    }
}
