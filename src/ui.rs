use crate::commands::{plural, short_id, Session};
use crate::model::{ColumnChoice, DragEnd, Task, TaskFilter};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{error, info};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListState;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(session: Session) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(session);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    info!("tui closed");
    result
}

struct App {
    session: Session,
    selected_column: usize,
    selected_task: usize,
    scroll_offsets: Vec<usize>,
    last_save: Instant,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    AddingTask { column_id: String, field: FieldValue },
    EditingTask { task_id: String, field: FieldValue },
    RenamingColumn { column_id: String, field: FieldValue },
    ConfirmDelete(DeleteTarget),
    PickingColumn { choices: Vec<ColumnChoice>, idx: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum DeleteTarget {
    Task { column_id: String, task_id: String },
    Column { column_id: String },
    Selected,
}

#[derive(Debug, PartialEq, Eq)]
enum InputOutcome {
    Pending,
    Submit,
    Cancel,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_char_boundary(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

/// Single-line editing shared by every text popup.
fn edit_field(field: &mut FieldValue, key: KeyEvent) -> InputOutcome {
    match key.code {
        KeyCode::Esc => return InputOutcome::Cancel,
        KeyCode::Enter => return InputOutcome::Submit,
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Char(c) => {
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                field.insert_char(c);
            }
        }
        _ => {}
    }
    InputOutcome::Pending
}

impl App {
    fn new(session: Session) -> Self {
        let status = format!("Loaded board from {}", session.location.dir.display());
        let column_count = session.state.board().columns.len();
        App {
            session,
            selected_column: 0,
            selected_task: 0,
            scroll_offsets: vec![0; column_count],
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::AddingTask { .. } | Mode::EditingTask { .. } | Mode::RenamingColumn { .. } => {
                self.handle_input_key(key)
            }
            Mode::ConfirmDelete(_) => self.handle_confirm_key(key),
            Mode::PickingColumn { .. } => self.handle_picker_key(key),
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Left | KeyCode::Char('h') => self.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_task(),
            KeyCode::Down | KeyCode::Char('j') => self.next_task(),
            KeyCode::Char('H') => self.drag_column(-1),
            KeyCode::Char('L') => self.drag_column(1),
            KeyCode::Char('b') | KeyCode::Char('<') => self.drag_task_across(-1),
            KeyCode::Char('m') | KeyCode::Char('>') => self.drag_task_across(1),
            KeyCode::Char('K') => self.drag_task_within(-1),
            KeyCode::Char('J') => self.drag_task_within(1),
            KeyCode::Char('n') => self.start_add_task(),
            KeyCode::Char('e') => self.start_edit_task(),
            KeyCode::Char('x') | KeyCode::Enter => self.toggle_current_task(),
            KeyCode::Char('d') => self.confirm_delete_task(),
            KeyCode::Char('C') => self.add_column(),
            KeyCode::Char('r') => self.start_rename_column(),
            KeyCode::Char('X') => self.confirm_delete_column(),
            KeyCode::Char(' ') => self.select_current_task(),
            KeyCode::Char('a') => self.select_all_in_column(),
            KeyCode::Esc => self.clear_selection(),
            KeyCode::Char('c') => self.complete_selected(),
            KeyCode::Char('u') => self.incomplete_selected(),
            KeyCode::Char('D') => self.confirm_delete_selected(),
            KeyCode::Char('M') => self.start_move_selected(),
            KeyCode::Char('f') => self.set_filter(self.session.state.task_filter().next()),
            KeyCode::Char('1') => self.set_filter(TaskFilter::All),
            KeyCode::Char('2') => self.set_filter(TaskFilter::Completed),
            KeyCode::Char('3') => self.set_filter(TaskFilter::Uncompleted),
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::AddingTask {
                column_id,
                mut field,
            } => match edit_field(&mut field, key) {
                InputOutcome::Pending => Mode::AddingTask { column_id, field },
                InputOutcome::Submit => {
                    self.submit_new_task(&column_id, &field.value);
                    Mode::Normal
                }
                InputOutcome::Cancel => {
                    self.status = "Canceled".into();
                    Mode::Normal
                }
            },
            Mode::EditingTask { task_id, mut field } => match edit_field(&mut field, key) {
                InputOutcome::Pending => Mode::EditingTask { task_id, field },
                InputOutcome::Submit => {
                    self.submit_task_edit(&task_id, &field.value);
                    Mode::Normal
                }
                InputOutcome::Cancel => {
                    self.status = "Canceled".into();
                    Mode::Normal
                }
            },
            Mode::RenamingColumn {
                column_id,
                mut field,
            } => match edit_field(&mut field, key) {
                InputOutcome::Pending => Mode::RenamingColumn { column_id, field },
                InputOutcome::Submit => {
                    self.submit_column_rename(&column_id, &field.value);
                    Mode::Normal
                }
                InputOutcome::Cancel => {
                    self.status = "Canceled".into();
                    Mode::Normal
                }
            },
            other => other,
        };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let target = match &self.mode {
            Mode::ConfirmDelete(target) => target.clone(),
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.delete_target(target);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Mode::PickingColumn { choices, idx } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if *idx > 0 {
                    *idx -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *idx + 1 < choices.len() {
                    *idx += 1;
                }
            }
            KeyCode::Enter => {
                let choice = choices.get(*idx).cloned();
                self.mode = Mode::Normal;
                if let Some(choice) = choice {
                    self.move_selected_to(choice);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.status = "Move canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn current_column_id(&self) -> Option<String> {
        self.session
            .state
            .board()
            .columns
            .get(self.selected_column)
            .map(|c| c.id.clone())
    }

    fn visible_task_ids(&self, column_idx: usize) -> Vec<String> {
        self.session
            .state
            .board()
            .columns
            .get(column_idx)
            .map(|c| {
                self.session
                    .state
                    .visible_tasks(&c.id)
                    .iter()
                    .map(|t| t.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn current_task(&self) -> Option<&Task> {
        let column = self.session.state.board().columns.get(self.selected_column)?;
        self.session
            .state
            .visible_tasks(&column.id)
            .get(self.selected_task)
            .copied()
    }

    /// Column id and task id under the cursor.
    fn current_target(&self) -> Option<(String, String)> {
        let column_id = self.current_column_id()?;
        let task_id = self.current_task()?.id.clone();
        Some((column_id, task_id))
    }

    /// Puts the cursor on `task_id` if it is visible under the current filter.
    fn focus_task(&mut self, task_id: &str) {
        let board = self.session.state.board();
        let Some(column_id) = board.column_of(task_id) else {
            return;
        };
        let Some(column_idx) = board.find_column_index(column_id) else {
            return;
        };
        if let Some(pos) = self
            .visible_task_ids(column_idx)
            .iter()
            .position(|id| id == task_id)
        {
            self.selected_column = column_idx;
            self.selected_task = pos;
        }
    }

    fn clamp_cursor(&mut self) {
        let column_count = self.session.state.board().columns.len();
        if self.scroll_offsets.len() != column_count {
            self.scroll_offsets.resize(column_count, 0);
        }
        if column_count == 0 {
            self.selected_column = 0;
            self.selected_task = 0;
            return;
        }
        self.selected_column = self.selected_column.min(column_count - 1);
        let visible = self.visible_task_ids(self.selected_column).len();
        self.selected_task = self.selected_task.min(visible.saturating_sub(1));
    }

    fn prev_column(&mut self) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.selected_task = 0;
        }
    }

    fn next_column(&mut self) {
        if self.selected_column + 1 < self.session.state.board().columns.len() {
            self.selected_column += 1;
            self.selected_task = 0;
        }
    }

    fn prev_task(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    fn next_task(&mut self) {
        if self.selected_task + 1 < self.visible_task_ids(self.selected_column).len() {
            self.selected_task += 1;
        }
    }

    fn drag_column(&mut self, delta: isize) {
        let columns = &self.session.state.board().columns;
        let Some(target) = neighbour_index(self.selected_column, delta, columns.len()) else {
            return;
        };
        let (Some(active), Some(over)) = (
            columns.get(self.selected_column).map(|c| c.id.clone()),
            columns.get(target).map(|c| c.id.clone()),
        ) else {
            return;
        };
        if self.session.state.handle_drag_end(DragEnd::Column {
            active,
            over: Some(over),
        }) {
            if target < self.scroll_offsets.len() && self.selected_column < self.scroll_offsets.len()
            {
                self.scroll_offsets.swap(self.selected_column, target);
            }
            self.selected_column = target;
            self.persist(format!("Moved column to position {}", target + 1));
        }
    }

    fn drag_task_across(&mut self, delta: isize) {
        let Some((_, task_id)) = self.current_target() else {
            self.status = "No task selected to move".into();
            return;
        };
        let columns = &self.session.state.board().columns;
        let Some(target) = neighbour_index(self.selected_column, delta, columns.len()) else {
            return;
        };
        let Some(over) = columns.get(target).map(|c| c.id.clone()) else {
            return;
        };
        let dest_name = columns[target].name.clone();
        if self.session.state.handle_drag_end(DragEnd::Task {
            active: task_id.clone(),
            over: Some(over),
        }) {
            self.selected_column = target;
            self.focus_task(&task_id);
            self.clamp_cursor();
            self.persist(format!("Moved to {}", dest_name));
        }
    }

    fn drag_task_within(&mut self, delta: isize) {
        let Some((_, task_id)) = self.current_target() else {
            return;
        };
        let visible = self.visible_task_ids(self.selected_column);
        let Some(target) = neighbour_index(self.selected_task, delta, visible.len()) else {
            return;
        };
        if self.session.state.handle_drag_end(DragEnd::Task {
            active: task_id.clone(),
            over: Some(visible[target].clone()),
        }) {
            self.focus_task(&task_id);
            self.persist("Reordered task");
        }
    }

    fn start_add_task(&mut self) {
        match self.current_column_id() {
            Some(column_id) => {
                self.mode = Mode::AddingTask {
                    column_id,
                    field: FieldValue::new(""),
                };
                self.status = "New task (Enter save, Esc cancel)".into();
            }
            None => self.status = "Add a column first (C)".into(),
        }
    }

    fn submit_new_task(&mut self, column_id: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.status = "Empty task not added".into();
            return;
        }
        let id = self.session.state.add_task(column_id, text);
        self.focus_task(&id);
        self.persist(format!("Added \"{}\"", truncate_text(text, 40)));
    }

    fn start_edit_task(&mut self) {
        match self.current_task() {
            Some(task) => {
                let task_id = task.id.clone();
                let field = FieldValue::new(&task.text);
                self.mode = Mode::EditingTask { task_id, field };
                self.status = "Editing task (Enter save, Esc cancel)".into();
            }
            None => self.status = "No task selected to edit".into(),
        }
    }

    fn submit_task_edit(&mut self, task_id: &str, text: &str) {
        let unchanged = self
            .session
            .state
            .board()
            .find_task(task_id)
            .is_some_and(|t| t.text == text);
        if unchanged {
            self.status = "No changes".into();
            return;
        }
        if self.session.state.edit_task(task_id, text) {
            self.persist(format!("Updated {}", short_id(task_id)));
        }
    }

    fn toggle_current_task(&mut self) {
        let Some((column_id, task_id)) = self.current_target() else {
            self.status = "No task selected".into();
            return;
        };
        if !self.session.state.toggle_task(&column_id, &task_id) {
            return;
        }
        let completed = self
            .session
            .state
            .board()
            .find_task(&task_id)
            .is_some_and(|t| t.completed);
        self.clamp_cursor();
        self.persist(if completed { "Completed task" } else { "Reopened task" });
    }

    fn confirm_delete_task(&mut self) {
        match self.current_target() {
            Some((column_id, task_id)) => {
                self.mode = Mode::ConfirmDelete(DeleteTarget::Task { column_id, task_id });
                self.status = "Delete task? (y to confirm, n/Esc to cancel)".into();
            }
            None => self.status = "No task selected to delete".into(),
        }
    }

    fn add_column(&mut self) {
        let id = self.session.state.add_column();
        self.selected_column = self.session.state.board().columns.len().saturating_sub(1);
        self.selected_task = 0;
        self.clamp_cursor();
        self.persist("Added column");
        let name = self
            .session
            .state
            .board()
            .find_column(&id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        self.mode = Mode::RenamingColumn {
            column_id: id,
            field: FieldValue::new(&name),
        };
    }

    fn start_rename_column(&mut self) {
        let column = self
            .session
            .state
            .board()
            .columns
            .get(self.selected_column)
            .map(|c| (c.id.clone(), c.name.clone()));
        match column {
            Some((column_id, name)) => {
                self.mode = Mode::RenamingColumn {
                    column_id,
                    field: FieldValue::new(&name),
                };
                self.status = "Renaming column (Enter save, Esc cancel)".into();
            }
            None => self.status = "No column selected".into(),
        }
    }

    fn submit_column_rename(&mut self, column_id: &str, name: &str) {
        let name = name.trim();
        let current = self
            .session
            .state
            .board()
            .find_column(column_id)
            .map(|c| c.name.clone());
        if name.is_empty() || current.as_deref() == Some(name) {
            self.status = "Name unchanged".into();
            return;
        }
        if self.session.state.edit_column_name(column_id, name) {
            self.persist(format!("Renamed column to {}", name));
        }
    }

    fn confirm_delete_column(&mut self) {
        match self.current_column_id() {
            Some(column_id) => {
                self.mode = Mode::ConfirmDelete(DeleteTarget::Column { column_id });
                self.status = "Delete column? (y to confirm, n/Esc to cancel)".into();
            }
            None => self.status = "No column selected".into(),
        }
    }

    fn select_current_task(&mut self) {
        let Some(task_id) = self.current_task().map(|t| t.id.clone()) else {
            return;
        };
        let selected = self.session.state.select_task(&task_id);
        self.status = format!(
            "{} ({} selected)",
            if selected { "Selected" } else { "Deselected" },
            self.session.state.selection_count()
        );
    }

    fn select_all_in_column(&mut self) {
        let ids = self.visible_task_ids(self.selected_column);
        if self.session.state.toggle_select_all(&ids) {
            self.status = format!("{} selected", self.session.state.selection_count());
        }
    }

    fn clear_selection(&mut self) {
        if self.session.state.clear_selection() {
            self.status = "Selection cleared".into();
        }
    }

    fn has_selection(&mut self) -> bool {
        if self.session.state.selection_count() == 0 {
            self.status = "No tasks selected (Space to select)".into();
            return false;
        }
        true
    }

    fn complete_selected(&mut self) {
        if !self.has_selection() {
            return;
        }
        let count = self.session.state.complete_selected();
        self.clamp_cursor();
        self.persist(format!("Marked {} task{} complete", count, plural(count)));
    }

    fn incomplete_selected(&mut self) {
        if !self.has_selection() {
            return;
        }
        let count = self.session.state.incomplete_selected();
        self.clamp_cursor();
        self.persist(format!("Marked {} task{} incomplete", count, plural(count)));
    }

    fn confirm_delete_selected(&mut self) {
        if !self.has_selection() {
            return;
        }
        self.mode = Mode::ConfirmDelete(DeleteTarget::Selected);
        self.status = "Delete selected tasks? (y to confirm, n/Esc to cancel)".into();
    }

    fn start_move_selected(&mut self) {
        if !self.has_selection() {
            return;
        }
        let choices = self.session.state.column_choices();
        if choices.is_empty() {
            self.status = "No columns to move to".into();
            return;
        }
        let idx = self.selected_column.min(choices.len() - 1);
        self.mode = Mode::PickingColumn { choices, idx };
        self.status = "Move selected tasks to... (Enter pick, Esc cancel)".into();
    }

    fn move_selected_to(&mut self, choice: ColumnChoice) {
        let count = self.session.state.move_selected(&choice.id);
        if let Some(idx) = self.session.state.board().find_column_index(&choice.id) {
            self.selected_column = idx;
        }
        self.clamp_cursor();
        self.persist(format!(
            "Moved {} task{} to {}",
            count,
            plural(count),
            choice.name
        ));
    }

    fn delete_target(&mut self, target: DeleteTarget) {
        match target {
            DeleteTarget::Task { column_id, task_id } => {
                if self.session.state.delete_task(&column_id, &task_id) {
                    self.clamp_cursor();
                    self.persist(format!("Deleted {}", short_id(&task_id)));
                }
            }
            DeleteTarget::Column { column_id } => {
                let board = self.session.state.board();
                let idx = board.find_column_index(&column_id);
                let name = board
                    .find_column(&column_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                if self.session.state.delete_column(&column_id) {
                    if let Some(idx) = idx.filter(|i| *i < self.scroll_offsets.len()) {
                        self.scroll_offsets.remove(idx);
                    }
                    self.clamp_cursor();
                    self.persist(format!("Deleted column {}", name));
                }
            }
            DeleteTarget::Selected => {
                let count = self.session.state.delete_selected();
                self.clamp_cursor();
                self.persist(format!("Deleted {} task{}", count, plural(count)));
            }
        }
    }

    fn set_filter(&mut self, filter: TaskFilter) {
        if self.session.state.set_task_filter(filter) {
            self.selected_task = 0;
            self.clamp_cursor();
            self.status = format!("Showing {} tasks", filter.label());
        }
    }

    /// Saves after a change. A failed write is reported but never ends the session.
    fn persist(&mut self, message: impl Into<String>) {
        match self.session.save() {
            Ok(()) => {
                self.last_save = Instant::now();
                self.status = message.into();
            }
            Err(err) => {
                error!("save failed: {:#}", err);
                self.status = format!("Save failed: {}", err);
            }
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let selection = self.session.state.selection_count();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(if selection > 0 { 2 } else { 0 }),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        if selection > 0 {
            draw_action_bar(f, layout[1], selection);
        }
        self.draw_board(f, layout[2]);
        self.draw_footer(f, layout[3]);

        match &self.mode {
            Mode::AddingTask { field, .. } => draw_input(f, "New Task", "Text", field),
            Mode::EditingTask { field, .. } => draw_input(f, "Edit Task", "Text", field),
            Mode::RenamingColumn { field, .. } => draw_input(f, "Rename Column", "Name", field),
            Mode::ConfirmDelete(target) => self.draw_confirm(f, target),
            Mode::PickingColumn { choices, idx } => draw_picker(f, choices, *idx),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let state = &self.session.state;
        let title = Line::from(vec![
            Span::styled(
                "kanban ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.session.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.session.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("filter {}", state.task_filter().label()),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{} selected", state.selection_count()),
                Style::default().fg(Color::LightBlue),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let column_count = self.session.state.board().columns.len();
        if column_count == 0 {
            let msg = Paragraph::new("No columns yet. Press C to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("kanban"));
            f.render_widget(Clear, area);
            f.render_widget(msg, area);
            return;
        }

        if self.scroll_offsets.len() < column_count {
            self.scroll_offsets.resize(column_count, 0);
        }

        let chunk_constraints = (0..column_count)
            .map(|_| Constraint::Percentage((100 / column_count as u16).max(1)))
            .collect::<Vec<_>>();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(chunk_constraints)
            .split(area);

        let state = &self.session.state;
        for (idx, column) in state.board().columns.iter().enumerate() {
            let accent = color_for_index(idx);
            let task_width = chunks[idx].width.saturating_sub(2);
            let visible = state.visible_tasks(&column.id);
            let total = state.board().tasks_in(&column.id).len();
            let focused = idx == self.selected_column;
            let items = if visible.is_empty() {
                vec![ListItem::new(Line::from(Span::styled(
                    "  (drop tasks here)",
                    Style::default().fg(Color::DarkGray),
                )))]
            } else {
                visible
                    .iter()
                    .enumerate()
                    .map(|(t_idx, task)| {
                        task_item(
                            task,
                            task_width,
                            focused && t_idx == self.selected_task,
                            state.is_selected(&task.id),
                        )
                    })
                    .collect::<Vec<_>>()
            };

            let mut list_state = ListState::default();
            let mut offset = *self.scroll_offsets.get(idx).unwrap_or(&0);
            let viewport = chunks[idx].height.saturating_sub(2) as usize;
            if focused && !visible.is_empty() {
                offset = adjust_offset(self.selected_task, offset, viewport, 1, visible.len());
                self.scroll_offsets[idx] = offset;
                list_state.select(Some(self.selected_task));
                *list_state.offset_mut() = offset;
            } else {
                *list_state.offset_mut() = offset.min(visible.len().saturating_sub(1));
            }

            let title = if visible.len() == total {
                format!("{} [{}] ({})", column.name, short_id(&column.id), total)
            } else {
                format!(
                    "{} [{}] ({}/{})",
                    column.name,
                    short_id(&column.id),
                    visible.len(),
                    total
                )
            };

            let block = Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(accent).add_modifier(if focused {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(Color::Rgb(16, 18, 24)));

            let list = List::new(items).block(block);
            f.render_stateful_widget(list, chunks[idx], &mut list_state);
        }
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail_line = match self.current_task() {
            Some(task) => selected_task_detail(task, self.session.state.is_selected(&task.id)),
            None => Line::from("No task selected"),
        };
        let detail = Paragraph::new(detail_line)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, target: &DeleteTarget) {
        let area = centered_rect(50, 30, f.size());
        let board = self.session.state.board();
        let question = match target {
            DeleteTarget::Task { task_id, .. } => {
                let text = board
                    .find_task(task_id)
                    .map(|t| truncate_text(&t.text, 40))
                    .unwrap_or_else(|| task_id.clone());
                format!("Delete \"{}\"?", text)
            }
            DeleteTarget::Column { column_id } => {
                let name = board
                    .find_column(column_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| column_id.clone());
                let count = board.tasks_in(column_id).len();
                format!(
                    "Delete column \"{}\" and its {} task{}?",
                    name,
                    count,
                    plural(count)
                )
            }
            DeleteTarget::Selected => {
                let count = self.session.state.selection_count();
                format!("Delete {} selected task{}?", count, plural(count))
            }
        };
        let body = vec![
            Line::from(Span::styled(
                question,
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Confirm Delete",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightRed)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn draw_action_bar(f: &mut ratatui::Frame<'_>, area: Rect, selected: usize) {
    let line = Line::from(vec![
        Span::styled(
            format!("{} task{} selected   ", selected, plural(selected)),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("c", Style::default().fg(Color::LightGreen)),
        Span::raw(" mark complete  "),
        Span::styled("u", Style::default().fg(Color::LightYellow)),
        Span::raw(" mark incomplete  "),
        Span::styled("D", Style::default().fg(Color::LightRed)),
        Span::raw(" delete  "),
        Span::styled("M", Style::default().fg(Color::LightCyan)),
        Span::raw(" move to column  "),
        Span::styled("Esc", Style::default().fg(Color::Gray)),
        Span::raw(" clear"),
    ]);
    let bar = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(Color::Rgb(30, 34, 44))),
    );
    f.render_widget(bar, area);
}

fn draw_input(f: &mut ratatui::Frame<'_>, title: &str, label: &str, field: &FieldValue) {
    let area = centered_rect(60, 20, f.size());
    let lines = vec![
        field_line(label, field),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to save • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    ];
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn draw_picker(f: &mut ratatui::Frame<'_>, choices: &[ColumnChoice], idx: usize) {
    let area = centered_rect(40, 50, f.size());
    let items = choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            ListItem::new(format!("{} [{}]", choice.name, short_id(&choice.id)))
                .style(Style::default().fg(color_for_index(i)))
        })
        .collect::<Vec<_>>();
    let mut state = ListState::default();
    state.select(Some(idx));
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    "Move to column",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn footer_help_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
        Span::raw(" move  "),
        Span::styled("H/L", Style::default().fg(Color::LightGreen)),
        Span::raw(" drag column  "),
        Span::styled("</>", Style::default().fg(Color::LightGreen)),
        Span::raw(" drag task  "),
        Span::styled("J/K", Style::default().fg(Color::LightGreen)),
        Span::raw(" reorder  "),
        Span::styled("n", Style::default().fg(Color::LightMagenta)),
        Span::raw(" new  "),
        Span::styled("e", Style::default().fg(Color::LightYellow)),
        Span::raw(" edit  "),
        Span::styled("x", Style::default().fg(Color::LightYellow)),
        Span::raw(" toggle  "),
        Span::styled("d", Style::default().fg(Color::LightRed)),
        Span::raw(" delete  "),
        Span::styled("Space/a", Style::default().fg(Color::LightBlue)),
        Span::raw(" select  "),
        Span::styled("C/r/X", Style::default().fg(Color::LightMagenta)),
        Span::raw(" column add/rename/delete  "),
        Span::styled("f/1/2/3", Style::default().fg(Color::Magenta)),
        Span::raw(" filter  "),
        Span::styled("q", Style::default().fg(Color::LightRed)),
        Span::raw(" quit"),
    ])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn color_for_index(idx: usize) -> Color {
    let palette = [
        Color::Cyan,
        Color::LightGreen,
        Color::LightMagenta,
        Color::LightBlue,
        Color::LightYellow,
        Color::LightRed,
    ];
    palette[idx % palette.len()]
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn neighbour_index(current: usize, delta: isize, len: usize) -> Option<usize> {
    let target = current as isize + delta;
    (target >= 0 && (target as usize) < len).then_some(target as usize)
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor.min(text.len())]
        .char_indices()
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    text[cursor.min(text.len())..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out.chars().take(max).collect()
}

fn task_item(task: &Task, width: u16, cursor: bool, selected: bool) -> ListItem<'static> {
    let text_width = width.saturating_sub(8).max(6) as usize;
    let mut text_style = Style::default().fg(Color::White);
    if task.completed {
        text_style = text_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let line = Line::from(vec![
        Span::styled(
            if selected { "◆ " } else { "  " },
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            if task.completed { "[x] " } else { "[ ] " },
            Style::default().fg(if task.completed {
                Color::LightGreen
            } else {
                Color::Gray
            }),
        ),
        Span::styled(truncate_text(&task.text, text_width), text_style),
    ]);
    let mut item = ListItem::new(line).style(Style::default().bg(Color::Rgb(22, 24, 30)));
    if cursor {
        item = item.style(
            Style::default()
                .bg(Color::Rgb(252, 214, 112))
                .add_modifier(Modifier::BOLD),
        );
    }
    item
}

fn field_line(label: &str, field: &FieldValue) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD | Modifier::DIM),
        ),
        Span::styled(field.with_caret(), Style::default().fg(Color::Cyan)),
    ])
}

fn selected_task_detail(task: &Task, selected: bool) -> Line<'static> {
    let mut spans = vec![Span::styled(
        task.text.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        if task.completed { "done" } else { "open" },
        Style::default().fg(if task.completed {
            Color::LightGreen
        } else {
            Color::LightRed
        }),
    ));
    if selected {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "selected",
            Style::default().fg(Color::LightBlue),
        ));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        task.id.clone(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
    ));
    Line::from(spans)
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::{BoardLocation, BoardScope};
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn app_in(dir: &TempDir) -> App {
        let location = BoardLocation {
            dir: dir.path().to_path_buf(),
            scope: BoardScope::Override,
        };
        App::new(Session::open(location, &Config::default()))
    }

    fn column_texts(app: &App, column_idx: usize) -> Vec<String> {
        let board = app.session.state.board();
        board
            .tasks_in(&board.columns[column_idx].id)
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    /// Two columns, "Todo" with tasks one/two and an empty "Done".
    fn seeded_app(dir: &TempDir) -> App {
        let mut app = app_in(dir);
        app.handle_key(key(KeyCode::Char('C')));
        app.handle_key(key(KeyCode::Home));
        for _ in 0.."New Column".len() {
            app.handle_key(key(KeyCode::Delete));
        }
        type_text(&mut app, "Todo");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('C')));
        app.handle_key(key(KeyCode::End));
        for _ in 0.."New Column".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "Done");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('h')));
        for text in ["one", "two"] {
            app.handle_key(key(KeyCode::Char('n')));
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Enter));
        }
        app
    }

    #[test]
    fn adding_columns_and_tasks_persists() {
        let dir = TempDir::new().unwrap();
        let app = seeded_app(&dir);
        let names: Vec<String> = app
            .session
            .state
            .board()
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["Todo".to_string(), "Done".to_string()]);
        assert_eq!(column_texts(&app, 0), vec!["one", "two"]);

        let reopened = app_in(&dir);
        assert_eq!(reopened.session.state.snapshot(), app.session.state.snapshot());
    }

    #[test]
    fn keyboard_drags_move_and_reorder() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        assert_eq!(app.current_task().unwrap().text, "two");

        app.handle_key(key(KeyCode::Char('K')));
        assert_eq!(column_texts(&app, 0), vec!["two", "one"]);
        assert_eq!(app.selected_task, 0);

        app.handle_key(key(KeyCode::Char('>')));
        assert_eq!(column_texts(&app, 0), vec!["one"]);
        assert_eq!(column_texts(&app, 1), vec!["two"]);
        assert_eq!(app.selected_column, 1);

        app.handle_key(key(KeyCode::Char('H')));
        assert_eq!(app.session.state.board().columns[0].name, "Done");
        assert_eq!(app.selected_column, 0);
    }

    #[test]
    fn bulk_move_through_picker_clears_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.session.state.selection_count(), 2);

        app.handle_key(key(KeyCode::Char('M')));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(column_texts(&app, 0).is_empty());
        assert_eq!(column_texts(&app, 1), vec!["one", "two"]);
        assert_eq!(app.session.state.selection_count(), 0);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn blank_task_text_adds_nothing() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char('n')));
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(column_texts(&app, 0), vec!["one", "two"]);
        assert!(matches!(app.mode, Mode::Normal));

        app.handle_key(key(KeyCode::Char('n')));
        type_text(&mut app, "  three  ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(column_texts(&app, 0), vec!["one", "two", "three"]);
    }

    #[test]
    fn column_rename_is_trimmed_and_blank_keeps_old_name() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        let column_name = |app: &App| app.session.state.board().columns[0].name.clone();

        app.handle_key(key(KeyCode::Char('r')));
        for _ in 0.."Todo".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "  ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(column_name(&app), "Todo");

        app.handle_key(key(KeyCode::Char('r')));
        for _ in 0.."Todo".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "  Doing  ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(column_name(&app), "Doing");

        let reopened = app_in(&dir);
        assert_eq!(reopened.session.state.board().columns[0].name, "Doing");
    }

    #[test]
    fn deleting_a_selected_task_clears_it_from_the_action_bar() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.state.selection_count(), 1);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(column_texts(&app, 0), vec!["one"]);
        assert_eq!(app.session.state.selection_count(), 0);
    }

    #[test]
    fn delete_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(column_texts(&app, 0).len(), 2);

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(column_texts(&app, 0), vec!["one"]);
    }

    #[test]
    fn filter_hides_tasks_and_keeps_cursor_in_range() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.visible_task_ids(0).len(), 1);
        assert_eq!(app.current_task().unwrap().text, "one");
        assert_eq!(column_texts(&app, 0).len(), 2);
    }

    #[test]
    fn draws_columns_and_action_bar() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded_app(&dir);
        app.handle_key(key(KeyCode::Char(' ')));
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Todo"));
        assert!(rendered.contains("Done"));
        assert!(rendered.contains("1 task selected"));
    }

    #[test]
    fn field_editing_handles_multibyte_text() {
        let mut field = FieldValue::new("héllo");
        field.move_left();
        field.move_left();
        field.move_left();
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "éllo");
        field.delete();
        assert_eq!(field.value, "llo");
        assert_eq!(edit_field(&mut field, key(KeyCode::Enter)), InputOutcome::Submit);
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer sentence", 8), "a lon...");
        assert_eq!(truncate_text("abc", 0), "");
    }

    #[test]
    fn adjust_offset_keeps_selection_visible() {
        assert_eq!(adjust_offset(0, 0, 5, 1, 20), 0);
        assert_eq!(adjust_offset(10, 0, 5, 1, 20), 7);
        assert_eq!(adjust_offset(19, 0, 5, 1, 20), 15);
    }
}
