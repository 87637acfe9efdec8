use crate::model::TaskFilter;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kanban", version, about = "Terminal kanban board")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a board in ./.kanban (or in KANBAN_DIR when it is set)
    Init {
        /// Start with To Do / Doing / Done columns
        #[arg(long)]
        seed: bool,
    },
    /// List columns and their tasks
    List {
        /// Only show this column (id or id prefix)
        #[arg(long)]
        column: Option<String>,
        /// Which tasks to show
        #[arg(long, value_enum)]
        filter: Option<TaskFilter>,
    },
    /// Manage columns
    #[command(subcommand)]
    Column(ColumnCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Apply one action to several tasks at once
    #[command(subcommand)]
    Bulk(BulkCommand),
    /// Launch the interactive TUI
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// Append a new column
    Add {
        /// Name for the column (defaults to the configured default name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename a column
    Rename {
        /// Column id or prefix
        column: String,
        /// New name
        name: String,
    },
    /// Delete a column and all of its tasks
    Delete {
        /// Column id or prefix
        column: String,
    },
    /// Move a column to the position of another one
    Move {
        /// Column id or prefix to move
        column: String,
        /// Column id or prefix whose position it takes
        over: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Append a task to a column
    Add {
        /// Column id or prefix
        column: String,
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Replace a task's text
    Edit {
        /// Task id or prefix
        task: String,
        /// New text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Flip a task between complete and incomplete
    Toggle {
        /// Task id or prefix
        task: String,
    },
    /// Delete a task
    Delete {
        /// Task id or prefix
        task: String,
    },
    /// Drop a task onto a column (appends) or onto another task (takes its place)
    Move {
        /// Task id or prefix
        task: String,
        /// Column or task id (or prefix)
        over: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BulkCommand {
    /// Mark tasks complete
    Complete {
        #[arg(required = true, num_args = 1..)]
        tasks: Vec<String>,
    },
    /// Mark tasks incomplete
    Incomplete {
        #[arg(required = true, num_args = 1..)]
        tasks: Vec<String>,
    },
    /// Delete tasks
    Delete {
        #[arg(required = true, num_args = 1..)]
        tasks: Vec<String>,
    },
    /// Move tasks to the end of a column
    Move {
        /// Destination column id or prefix
        #[arg(long)]
        to: String,
        #[arg(required = true, num_args = 1..)]
        tasks: Vec<String>,
    },
}
