use crate::cli::{BulkCommand, ColumnCommand, TaskCommand};
use crate::config::Config;
use crate::model::{Board, BoardError, BoardState, Column, DragEnd, Task, TaskFilter};
use crate::storage::{load_board, save_board, BoardLocation, FileStore};
use crate::ui;
use anyhow::{bail, Context, Result};
use log::info;

const SHORT_ID_LEN: usize = 8;

/// A loaded board together with where it came from and where it is saved.
pub struct Session {
    pub state: BoardState,
    pub location: BoardLocation,
    store: FileStore,
}

impl Session {
    pub fn open(location: BoardLocation, config: &Config) -> Self {
        let store = FileStore::at(&location);
        let board = load_board(&store);
        info!(
            "opened {} board at {} ({} columns, {} tasks)",
            location.scope.label(),
            location.dir.display(),
            board.columns.len(),
            board.task_count()
        );
        let state = BoardState::new(board)
            .with_default_column_name(config.default_column_name.clone())
            .with_filter(config.default_filter);
        Session {
            state,
            location,
            store,
        }
    }

    pub fn save(&self) -> Result<()> {
        save_board(&self.store, self.state.board())
            .with_context(|| format!("saving board to {}", self.location.dir.display()))
    }
}

pub fn init(session: &Session) -> Result<()> {
    println!(
        "Initialized board at {} ({} columns)",
        session.location.dir.display(),
        session.state.board().columns.len()
    );
    Ok(())
}

pub fn list(mut session: Session, column: Option<String>, filter: Option<TaskFilter>) -> Result<()> {
    if let Some(filter) = filter {
        session.state.set_task_filter(filter);
    }
    let only = match column {
        Some(prefix) => Some(session.state.board().resolve_column(&prefix)?.id.clone()),
        None => None,
    };
    let state = &session.state;
    println!(
        "Board: {} ({}) filter: {}",
        session.location.dir.display(),
        session.location.scope.label(),
        state.task_filter().label()
    );
    if state.board().columns.is_empty() {
        println!("  (no columns)");
    }
    for col in &state.board().columns {
        if only.as_ref().is_some_and(|id| id != &col.id) {
            continue;
        }
        print_column_header(col, state.board());
        let tasks = state.visible_tasks(&col.id);
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in tasks {
            print_task(task);
        }
        println!();
    }
    Ok(())
}

pub fn column(mut session: Session, command: ColumnCommand) -> Result<()> {
    match command {
        ColumnCommand::Add { name } => {
            let id = session.state.add_column();
            if let Some(name) = name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                session.state.edit_column_name(&id, name);
            }
            session.save()?;
            let name = column_name(session.state.board(), &id);
            info!("added column {} ({})", id, name);
            println!("Added column {} ({})", id, name);
        }
        ColumnCommand::Rename { column, name } => {
            let id = session.state.board().resolve_column(&column)?.id.clone();
            let name = name.trim();
            if name.is_empty() {
                bail!("column name cannot be empty");
            }
            session.state.edit_column_name(&id, name);
            session.save()?;
            info!("renamed column {} to {}", id, name);
            println!("Renamed column {} to {}", short_id(&id), name);
        }
        ColumnCommand::Delete { column } => {
            let col = session.state.board().resolve_column(&column)?.clone();
            let task_count = session.state.board().tasks_in(&col.id).len();
            session.state.delete_column(&col.id);
            session.save()?;
            info!("deleted column {} with {} tasks", col.id, task_count);
            println!(
                "Deleted column {} and {} task{}",
                col.name,
                task_count,
                plural(task_count)
            );
        }
        ColumnCommand::Move { column, over } => {
            let board = session.state.board();
            let active = board.resolve_column(&column)?.id.clone();
            let over = board.resolve_column(&over)?.id.clone();
            let moved = session.state.handle_drag_end(DragEnd::Column {
                active: active.clone(),
                over: Some(over),
            });
            if !moved {
                println!("Column already in place");
                return Ok(());
            }
            session.save()?;
            let position = session
                .state
                .board()
                .find_column_index(&active)
                .map(|idx| idx + 1)
                .unwrap_or_default();
            info!("moved column {} to position {}", active, position);
            println!(
                "Moved column {} to position {}",
                column_name(session.state.board(), &active),
                position
            );
        }
    }
    Ok(())
}

pub fn task(mut session: Session, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add { column, text } => {
            let col = session.state.board().resolve_column(&column)?.clone();
            let text = text.join(" ");
            let text = text.trim();
            if text.is_empty() {
                bail!("task text cannot be empty");
            }
            let id = session.state.add_task(&col.id, text);
            session.save()?;
            info!("added task {} to column {}", id, col.id);
            println!("Added task {} to {}", id, col.name);
        }
        TaskCommand::Edit { task, text } => {
            let id = session.state.board().resolve_task(&task)?.id.clone();
            let text = text.join(" ");
            session.state.edit_task(&id, &text);
            session.save()?;
            info!("edited task {}", id);
            println!("Updated task {}", short_id(&id));
        }
        TaskCommand::Toggle { task } => {
            let (column_id, id) = owning_column(session.state.board(), &task)?;
            session.state.toggle_task(&column_id, &id);
            session.save()?;
            let completed = session
                .state
                .board()
                .find_task(&id)
                .is_some_and(|t| t.completed);
            info!("toggled task {} (completed={})", id, completed);
            println!(
                "{} task {}",
                if completed { "Completed" } else { "Reopened" },
                short_id(&id)
            );
        }
        TaskCommand::Delete { task } => {
            let (column_id, id) = owning_column(session.state.board(), &task)?;
            session.state.delete_task(&column_id, &id);
            session.save()?;
            info!("deleted task {} from column {}", id, column_id);
            println!("Deleted task {}", short_id(&id));
        }
        TaskCommand::Move { task, over } => {
            let board = session.state.board();
            let active = board.resolve_task(&task)?.id.clone();
            let over = resolve_drop_target(board, &over)?;
            let moved = session.state.handle_drag_end(DragEnd::Task {
                active: active.clone(),
                over: Some(over),
            });
            if !moved {
                println!("Task already in place");
                return Ok(());
            }
            session.save()?;
            let column_id = session
                .state
                .board()
                .column_of(&active)
                .unwrap_or_default()
                .to_string();
            info!("moved task {} to column {}", active, column_id);
            println!(
                "Moved task {} to {}",
                short_id(&active),
                column_name(session.state.board(), &column_id)
            );
        }
    }
    Ok(())
}

pub fn bulk(mut session: Session, command: BulkCommand) -> Result<()> {
    let (tasks, verb) = match &command {
        BulkCommand::Complete { tasks } => (tasks, "Completed"),
        BulkCommand::Incomplete { tasks } => (tasks, "Reopened"),
        BulkCommand::Delete { tasks } => (tasks, "Deleted"),
        BulkCommand::Move { tasks, .. } => (tasks, "Moved"),
    };
    let ids = tasks
        .iter()
        .map(|prefix| {
            session
                .state
                .board()
                .resolve_task(prefix)
                .map(|t| t.id.clone())
        })
        .collect::<Result<Vec<_>, BoardError>>()?;
    for id in &ids {
        if !session.state.is_selected(id) {
            session.state.select_task(id);
        }
    }

    let affected = match &command {
        BulkCommand::Complete { .. } => session.state.complete_selected(),
        BulkCommand::Incomplete { .. } => session.state.incomplete_selected(),
        BulkCommand::Delete { .. } => session.state.delete_selected(),
        BulkCommand::Move { to, .. } => {
            let target = session.state.board().resolve_column(to)?.id.clone();
            session.state.move_selected(&target)
        }
    };
    session.save()?;
    info!("bulk {} applied to {} tasks", verb.to_lowercase(), affected);
    println!("{} {} task{}", verb, affected, plural(affected));
    Ok(())
}

pub fn tui(session: Session) -> Result<()> {
    ui::run(session)
}

/// A drop target is a column when one matches, otherwise a task.
fn resolve_drop_target(board: &Board, prefix: &str) -> Result<String> {
    match board.resolve_column(prefix) {
        Ok(column) => Ok(column.id.clone()),
        Err(BoardError::ColumnNotFound(_)) => match board.resolve_task(prefix) {
            Ok(task) => Ok(task.id.clone()),
            Err(BoardError::TaskNotFound(_)) => {
                bail!("no column or task matches {}", prefix)
            }
            Err(err) => Err(err.into()),
        },
        Err(err) => Err(err.into()),
    }
}

fn owning_column(board: &Board, prefix: &str) -> Result<(String, String)> {
    let id = board.resolve_task(prefix)?.id.clone();
    let column_id = board
        .column_of(&id)
        .ok_or_else(|| BoardError::TaskNotFound(prefix.to_string()))?
        .to_string();
    Ok((column_id, id))
}

fn column_name(board: &Board, column_id: &str) -> String {
    board
        .find_column(column_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| column_id.to_string())
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn print_column_header(column: &Column, board: &Board) {
    let tasks = board.tasks_in(&column.id);
    let done = tasks.iter().filter(|t| t.completed).count();
    println!(
        "{} [{}] ({}/{} done)",
        column.name,
        short_id(&column.id),
        done,
        tasks.len()
    );
}

fn print_task(task: &Task) {
    println!(
        "  - [{}] {}: {}",
        if task.completed { "x" } else { " " },
        short_id(&task.id),
        task.text
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_keeps_short_values() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
    }

    #[test]
    fn drop_target_prefers_columns_then_tasks() {
        let mut board = Board::default();
        board.columns.push(Column {
            id: "col-1".into(),
            name: "A".into(),
        });
        board.tasks.insert(
            "col-1".into(),
            vec![Task {
                id: "task-1".into(),
                text: "t".into(),
                completed: false,
            }],
        );
        assert_eq!(resolve_drop_target(&board, "col").unwrap(), "col-1");
        assert_eq!(resolve_drop_target(&board, "task").unwrap(), "task-1");
        let err = resolve_drop_target(&board, "zzz").unwrap_err();
        assert!(err.to_string().contains("no column or task matches zzz"));
    }
}
