use crate::model::{Board, Column, TasksMap, UuidIds};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const COLUMNS_SLOT: &str = "columns";
pub const TASKS_SLOT: &str = "tasks";
pub const DIR_ENV: &str = "KANBAN_DIR";
const PROJECT_DIR: &str = ".kanban";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardScope {
    Project,
    Global,
    Override,
}

#[derive(Debug, Clone)]
pub struct BoardLocation {
    pub dir: PathBuf,
    pub scope: BoardScope,
}

impl BoardScope {
    pub fn label(&self) -> &'static str {
        match self {
            BoardScope::Project => "project",
            BoardScope::Global => "global",
            BoardScope::Override => DIR_ENV,
        }
    }
}

/// String-keyed durable slots, one serialized value per key.
pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Keeps each slot in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn at(location: &BoardLocation) -> Self {
        FileStore::new(location.dir.clone())
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
        Ok(Some(data))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;
        let path = self.slot_path(key);
        fs::write(&path, value).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

/// Where `init` puts the board: `KANBAN_DIR` when set, otherwise `<cwd>/.kanban`.
pub fn init_location(cwd: &Path) -> BoardLocation {
    match override_dir() {
        Some(dir) => BoardLocation {
            dir,
            scope: BoardScope::Override,
        },
        None => BoardLocation {
            dir: cwd.join(PROJECT_DIR),
            scope: BoardScope::Project,
        },
    }
}

/// Creates the board directory and writes an empty (or seeded) board unless one
/// is already there.
pub fn init_board(location: &BoardLocation, seed: bool) -> Result<()> {
    fs::create_dir_all(&location.dir)
        .with_context(|| format!("creating board directory {:?}", location.dir))?;
    let store = FileStore::at(location);
    if store.read(COLUMNS_SLOT)?.is_none() {
        let board = if seed {
            Board::seeded(&mut UuidIds)
        } else {
            Board::default()
        };
        save_board(&store, &board)?;
    }
    Ok(())
}

/// `KANBAN_DIR` wins, then the nearest `.kanban` directory above `start`, then the
/// per-user data directory.
pub fn locate_board(start: &Path) -> Result<BoardLocation> {
    if let Some(dir) = override_dir() {
        return Ok(BoardLocation {
            dir,
            scope: BoardScope::Override,
        });
    }
    if let Some(dir) = find_project_board(start) {
        return Ok(BoardLocation {
            dir,
            scope: BoardScope::Project,
        });
    }
    Ok(BoardLocation {
        dir: global_board_dir()?,
        scope: BoardScope::Global,
    })
}

/// Reads both slots independently. An absent, unreadable or malformed slot falls
/// back to its empty value.
pub fn load_board(store: &dyn SlotStore) -> Board {
    let columns: Vec<Column> = load_slot(store, COLUMNS_SLOT);
    let tasks: TasksMap = load_slot(store, TASKS_SLOT);
    debug!(
        "loaded {} columns and {} task lists",
        columns.len(),
        tasks.len()
    );
    Board { columns, tasks }
}

fn load_slot<T: DeserializeOwned + Default>(store: &dyn SlotStore, key: &str) -> T {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!("slot {} unreadable, starting empty: {:#}", key, err);
            return T::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("slot {} malformed, starting empty: {}", key, err);
        T::default()
    })
}

pub fn save_board(store: &dyn SlotStore, board: &Board) -> Result<()> {
    let columns = serde_json::to_string(&board.columns).context("serializing columns")?;
    let tasks = serde_json::to_string(&board.tasks).context("serializing tasks")?;
    store.write(COLUMNS_SLOT, &columns)?;
    store.write(TASKS_SLOT, &tasks)?;
    debug!(
        "saved {} columns and {} tasks",
        board.columns.len(),
        board.task_count()
    );
    Ok(())
}

fn override_dir() -> Option<PathBuf> {
    env::var_os(DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn find_project_board(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_board_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "kanban").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
