use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ColumnId = String;
pub type TaskId = String;
pub type TasksMap = IndexMap<ColumnId, Vec<Task>>;

pub const DEFAULT_COLUMN_NAME: &str = "New Column";

/// The persisted part of the board: ordered columns plus each column's ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub columns: Vec<Column>,
    pub tasks: TasksMap,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Entry offered by the bulk "move to" picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChoice {
    pub id: ColumnId,
    pub name: String,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Uncompleted,
}

/// Result of a finished drag gesture. `over` is `None` when the item was dropped
/// outside any target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEnd {
    Column { active: ColumnId, over: Option<String> },
    Task { active: TaskId, over: Option<String> },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("id prefix {prefix} is ambiguous ({matches} matches)")]
    AmbiguousId { prefix: String, matches: usize },
}

/// Source of fresh, never reused identifiers for columns and tasks.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.completed,
            TaskFilter::Uncompleted => !task.completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Uncompleted => "uncompleted",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TaskFilter::All => TaskFilter::Completed,
            TaskFilter::Completed => TaskFilter::Uncompleted,
            TaskFilter::Uncompleted => TaskFilter::All,
        }
    }
}

impl Board {
    /// Board with the classic three columns, used by `init --seed`.
    pub fn seeded(ids: &mut dyn IdSource) -> Self {
        let columns = ["To Do", "Doing", "Done"]
            .iter()
            .map(|name| Column {
                id: ids.next_id(),
                name: name.to_string(),
            })
            .collect::<Vec<_>>();
        let tasks = columns
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();
        Board { columns, tasks }
    }

    pub fn find_column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn find_column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Tasks keyed under `column_id`; an absent sequence reads as empty.
    pub fn tasks_in(&self, column_id: &str) -> &[Task] {
        self.tasks
            .get(column_id)
            .map(|tasks| tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn column_of(&self, task_id: &str) -> Option<&str> {
        self.tasks
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|t| t.id == task_id))
            .map(|(column_id, _)| column_id.as_str())
    }

    /// Owning column id and position of a task.
    pub fn locate_task(&self, task_id: &str) -> Option<(&str, usize)> {
        self.tasks.iter().find_map(|(column_id, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|idx| (column_id.as_str(), idx))
        })
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|t| t.id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(|tasks| tasks.len()).sum()
    }

    pub fn column_choices(&self) -> Vec<ColumnChoice> {
        self.columns
            .iter()
            .map(|c| ColumnChoice {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect()
    }

    /// Resolves a full column id or a unique prefix of one.
    pub fn resolve_column(&self, prefix: &str) -> Result<&Column, BoardError> {
        let id = resolve_prefix(prefix, self.columns.iter().map(|c| c.id.as_str()))
            .map_err(|matches| match matches {
                0 => BoardError::ColumnNotFound(prefix.to_string()),
                n => BoardError::AmbiguousId {
                    prefix: prefix.to_string(),
                    matches: n,
                },
            })?;
        self.find_column(id)
            .ok_or_else(|| BoardError::ColumnNotFound(prefix.to_string()))
    }

    /// Resolves a full task id or a unique prefix of one.
    pub fn resolve_task(&self, prefix: &str) -> Result<&Task, BoardError> {
        let all = self.tasks.values().flat_map(|tasks| tasks.iter());
        let id = resolve_prefix(prefix, all.map(|t| t.id.as_str())).map_err(|matches| {
            match matches {
                0 => BoardError::TaskNotFound(prefix.to_string()),
                n => BoardError::AmbiguousId {
                    prefix: prefix.to_string(),
                    matches: n,
                },
            }
        })?;
        self.find_task(id)
            .ok_or_else(|| BoardError::TaskNotFound(prefix.to_string()))
    }
}

/// Exact match wins; otherwise the prefix must select exactly one id.
/// The error carries the number of prefix matches.
fn resolve_prefix<'a, I>(prefix: &str, ids: I) -> Result<&'a str, usize>
where
    I: Iterator<Item = &'a str>,
{
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(0);
    }
    let mut matches = Vec::new();
    for id in ids {
        if id == prefix {
            return Ok(id);
        }
        if id.starts_with(prefix) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [only] => Ok(*only),
        _ => Err(matches.len()),
    }
}

/// Owned board state: the persisted snapshot plus session-only selection and filter.
///
/// Every operation is total. Missing ids are no-ops and the return value tells
/// the caller whether anything changed (and therefore needs saving).
pub struct BoardState {
    board: Board,
    selection: IndexSet<TaskId>,
    filter: TaskFilter,
    default_column_name: String,
    ids: Box<dyn IdSource>,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        BoardState {
            board,
            selection: IndexSet::new(),
            filter: TaskFilter::All,
            default_column_name: DEFAULT_COLUMN_NAME.to_string(),
            ids: Box::new(UuidIds),
        }
    }

    pub fn with_ids(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_default_column_name(mut self, name: impl Into<String>) -> Self {
        self.default_column_name = name.into();
        self
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn add_column(&mut self) -> ColumnId {
        let id = self.ids.next_id();
        self.board.columns.push(Column {
            id: id.clone(),
            name: self.default_column_name.clone(),
        });
        id
    }

    pub fn edit_column_name(&mut self, column_id: &str, new_name: impl Into<String>) -> bool {
        match self.board.columns.iter_mut().find(|c| c.id == column_id) {
            Some(column) => {
                column.name = new_name.into();
                true
            }
            None => false,
        }
    }

    /// Removes the column and every task keyed under it.
    pub fn delete_column(&mut self, column_id: &str) -> bool {
        let before = self.board.columns.len();
        self.board.columns.retain(|c| c.id != column_id);
        let removed_tasks = self.board.tasks.shift_remove(column_id);
        if let Some(tasks) = &removed_tasks {
            for task in tasks {
                self.selection.shift_remove(&task.id);
            }
        }
        before != self.board.columns.len() || removed_tasks.is_some()
    }

    /// Appends a task, creating the column's sequence when it has none.
    pub fn add_task(&mut self, column_id: &str, text: impl Into<String>) -> TaskId {
        let id = self.ids.next_id();
        self.board
            .tasks
            .entry(column_id.to_string())
            .or_default()
            .push(Task {
                id: id.clone(),
                text: text.into(),
                completed: false,
            });
        id
    }

    pub fn delete_task(&mut self, column_id: &str, task_id: &str) -> bool {
        let Some(tasks) = self.board.tasks.get_mut(column_id) else {
            return false;
        };
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if before == tasks.len() {
            return false;
        }
        self.selection.shift_remove(task_id);
        true
    }

    pub fn toggle_task(&mut self, column_id: &str, task_id: &str) -> bool {
        let task = self
            .board
            .tasks
            .get_mut(column_id)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id));
        match task {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Replaces the text of the task wherever it lives.
    pub fn edit_task(&mut self, task_id: &str, new_text: &str) -> bool {
        let mut changed = false;
        for task in self.board.tasks.values_mut().flat_map(|t| t.iter_mut()) {
            if task.id == task_id {
                task.text = new_text.to_string();
                changed = true;
            }
        }
        changed
    }

    /// Toggles membership; returns whether the task is selected afterwards.
    pub fn select_task(&mut self, task_id: &str) -> bool {
        if self.selection.shift_remove(task_id) {
            false
        } else {
            self.selection.insert(task_id.to_string());
            true
        }
    }

    /// "Select all" for a group of tasks: selects all of them unless they are all
    /// selected already, in which case they are all deselected.
    pub fn toggle_select_all(&mut self, task_ids: &[TaskId]) -> bool {
        if task_ids.is_empty() {
            return false;
        }
        if task_ids.iter().all(|id| self.selection.contains(id)) {
            for id in task_ids {
                self.selection.shift_remove(id);
            }
        } else {
            self.selection.extend(task_ids.iter().cloned());
        }
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        let had_any = !self.selection.is_empty();
        self.selection.clear();
        had_any
    }

    pub fn is_selected(&self, task_id: &str) -> bool {
        self.selection.contains(task_id)
    }

    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    /// Marks every selected task complete. The selection is kept.
    pub fn complete_selected(&mut self) -> usize {
        self.set_selected_completion(true)
    }

    /// Marks every selected task incomplete. The selection is kept.
    pub fn incomplete_selected(&mut self) -> usize {
        self.set_selected_completion(false)
    }

    fn set_selected_completion(&mut self, completed: bool) -> usize {
        let mut touched = 0;
        for task in self.board.tasks.values_mut().flat_map(|t| t.iter_mut()) {
            if self.selection.contains(&task.id) {
                task.completed = completed;
                touched += 1;
            }
        }
        touched
    }

    /// Deletes every selected task and clears the selection.
    pub fn delete_selected(&mut self) -> usize {
        let mut removed = 0;
        for tasks in self.board.tasks.values_mut() {
            let before = tasks.len();
            tasks.retain(|t| !self.selection.contains(&t.id));
            removed += before - tasks.len();
        }
        self.selection.clear();
        removed
    }

    /// Moves every selected task to the end of `target_column_id`, keeping their
    /// relative order, then clears the selection. Unknown targets are ignored.
    pub fn move_selected(&mut self, target_column_id: &str) -> usize {
        if self.board.find_column_index(target_column_id).is_none() {
            debug!("move_selected ignored: unknown column {}", target_column_id);
            return 0;
        }
        let mut moving = Vec::new();
        for tasks in self.board.tasks.values_mut() {
            let (selected, kept): (Vec<Task>, Vec<Task>) = std::mem::take(tasks)
                .into_iter()
                .partition(|t| self.selection.contains(&t.id));
            *tasks = kept;
            moving.extend(selected);
        }
        let moved = moving.len();
        self.board
            .tasks
            .entry(target_column_id.to_string())
            .or_default()
            .extend(moving);
        self.selection.clear();
        moved
    }

    pub fn handle_drag_end(&mut self, event: DragEnd) -> bool {
        match event {
            DragEnd::Column { active, over } => match over {
                Some(over) => self.reorder_column(&active, &over),
                None => false,
            },
            DragEnd::Task { active, over } => match over {
                Some(over) => self.drop_task(&active, &over),
                None => false,
            },
        }
    }

    fn reorder_column(&mut self, active: &str, over: &str) -> bool {
        if active == over {
            return false;
        }
        let (Some(from), Some(to)) = (
            self.board.find_column_index(active),
            self.board.find_column_index(over),
        ) else {
            debug!("column drag ignored: {} over {}", active, over);
            return false;
        };
        let column = self.board.columns.remove(from);
        self.board.columns.insert(to, column);
        true
    }

    /// Dropping on a column appends to it; dropping on a task takes that task's
    /// position, which also reorders within a single column.
    fn drop_task(&mut self, active: &str, over: &str) -> bool {
        let Some((source, from)) = self
            .board
            .locate_task(active)
            .map(|(column_id, idx)| (column_id.to_string(), idx))
        else {
            debug!("task drag ignored: unknown task {}", active);
            return false;
        };

        if self.board.find_column_index(over).is_some() {
            if over == source {
                return false;
            }
            let Some(task) = self.take_task(&source, from) else {
                return false;
            };
            self.board
                .tasks
                .entry(over.to_string())
                .or_default()
                .push(task);
            return true;
        }

        let Some((destination, to)) = self
            .board
            .locate_task(over)
            .map(|(column_id, idx)| (column_id.to_string(), idx))
        else {
            debug!("task drag ignored: unknown drop target {}", over);
            return false;
        };
        if active == over {
            return false;
        }
        let Some(task) = self.take_task(&source, from) else {
            return false;
        };
        let tasks = self.board.tasks.entry(destination).or_default();
        let to = to.min(tasks.len());
        tasks.insert(to, task);
        true
    }

    fn take_task(&mut self, column_id: &str, idx: usize) -> Option<Task> {
        let tasks = self.board.tasks.get_mut(column_id)?;
        (idx < tasks.len()).then(|| tasks.remove(idx))
    }

    pub fn set_task_filter(&mut self, filter: TaskFilter) -> bool {
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    pub fn task_filter(&self) -> TaskFilter {
        self.filter
    }

    /// Tasks of a column that pass the current filter, in board order.
    pub fn visible_tasks(&self, column_id: &str) -> Vec<&Task> {
        self.board
            .tasks_in(column_id)
            .iter()
            .filter(|t| self.filter.matches(t))
            .collect()
    }

    pub fn column_choices(&self) -> Vec<ColumnChoice> {
        self.board.column_choices()
    }
}
