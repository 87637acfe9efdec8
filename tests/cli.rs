//! Integration tests for the `kanban` CLI.
//!
//! Each test points `KANBAN_DIR` at a temp directory, runs `kanban` as a
//! subprocess, and checks stdout and the saved slot files.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_kanban(board: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_kanban"))
        .args(args)
        .current_dir(board)
        .env("KANBAN_DIR", board)
        .env("KANBAN_CONFIG", board.join("missing-config.yml"))
        .env("KANBAN_LOG", "off")
        .output()
        .expect("failed to run kanban");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `kanban` expecting success, return stdout.
fn run_ok(board: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_kanban(board, args);
    if !success {
        panic!(
            "kanban {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Pulls the id out of "Added column <id> (<name>)".
fn add_column(board: &Path, name: &str) -> String {
    let out = run_ok(board, &["column", "add", "--name", name]);
    let rest = out
        .trim()
        .strip_prefix("Added column ")
        .unwrap_or_else(|| panic!("unexpected output: {}", out));
    rest.split(" (").next().unwrap().to_string()
}

/// Pulls the id out of "Added task <id> to <column>".
fn add_task(board: &Path, column: &str, text: &str) -> String {
    let out = run_ok(board, &["task", "add", column, text]);
    let rest = out
        .trim()
        .strip_prefix("Added task ")
        .unwrap_or_else(|| panic!("unexpected output: {}", out));
    rest.split(" to ").next().unwrap().to_string()
}

fn short(id: &str) -> &str {
    &id[..8]
}

#[test]
fn empty_board_lists_no_columns() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(dir.path(), &["list"]);
    assert!(out.contains("(no columns)"), "got: {}", out);
    assert!(out.contains("filter: all"));
}

#[test]
fn columns_and_tasks_round_trip_through_files() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let todo = add_column(board, "Todo");
    let first = add_task(board, &todo, "write docs");
    let second = add_task(board, &todo, "ship it");

    let out = run_ok(board, &["list"]);
    assert!(out.contains(&format!("Todo [{}] (0/2 done)", short(&todo))));
    assert!(out.contains(&format!("  - [ ] {}: write docs", short(&first))));
    assert!(out.contains(&format!("  - [ ] {}: ship it", short(&second))));

    let columns: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(board.join("columns.json")).unwrap()).unwrap();
    assert_eq!(columns[0]["name"], "Todo");
    let tasks: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(board.join("tasks.json")).unwrap()).unwrap();
    assert_eq!(tasks[&todo][1]["text"], "ship it");
    assert_eq!(tasks[&todo][1]["completed"], false);
}

#[test]
fn task_move_and_toggle() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let todo = add_column(board, "Todo");
    let done = add_column(board, "Done");
    let task = add_task(board, &todo, "review");

    let out = run_ok(board, &["task", "move", short(&task), short(&done)]);
    assert_eq!(out.trim(), format!("Moved task {} to Done", short(&task)));

    let out = run_ok(board, &["task", "toggle", short(&task)]);
    assert_eq!(out.trim(), format!("Completed task {}", short(&task)));

    let out = run_ok(board, &["list", "--column", short(&done)]);
    assert!(out.contains(&format!("  - [x] {}: review", short(&task))));
    assert!(!out.contains("Todo"));
}

#[test]
fn bulk_actions_apply_to_every_listed_task() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let todo = add_column(board, "Todo");
    let done = add_column(board, "Done");
    let a = add_task(board, &todo, "a");
    let b = add_task(board, &todo, "b");
    add_task(board, &todo, "c");

    let out = run_ok(board, &["bulk", "complete", short(&a), short(&b)]);
    assert_eq!(out.trim(), "Completed 2 tasks");

    let out = run_ok(board, &["list", "--filter", "uncompleted"]);
    assert!(out.contains(": c"));
    assert!(!out.contains(": a"));

    let out = run_ok(board, &["bulk", "move", "--to", short(&done), short(&a), short(&b)]);
    assert_eq!(out.trim(), "Moved 2 tasks");

    let out = run_ok(board, &["column", "delete", short(&done)]);
    assert_eq!(out.trim(), "Deleted column Done and 2 tasks");

    let out = run_ok(board, &["list"]);
    assert!(out.contains("Todo"));
    assert!(!out.contains("Done"));
}

#[test]
fn column_move_reorders_columns() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let first = add_column(board, "First");
    let second = add_column(board, "Second");

    let out = run_ok(board, &["column", "move", short(&second), short(&first)]);
    assert_eq!(out.trim(), "Moved column Second to position 1");

    let out = run_ok(board, &["list"]);
    let second_at = out.find("Second").unwrap();
    let first_at = out.find("First").unwrap();
    assert!(second_at < first_at);
}

#[test]
fn unknown_ids_fail_without_touching_the_board() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    add_column(board, "Todo");
    let before = fs::read_to_string(board.join("tasks.json")).unwrap();

    let (_, stderr, success) = run_kanban(board, &["task", "toggle", "zzzz"]);
    assert!(!success);
    assert!(stderr.contains("task not found: zzzz"), "got: {}", stderr);

    let (_, stderr, success) = run_kanban(board, &["task", "add", "nope", "text"]);
    assert!(!success);
    assert!(stderr.contains("column not found: nope"), "got: {}", stderr);

    assert_eq!(fs::read_to_string(board.join("tasks.json")).unwrap(), before);
}

#[test]
fn blank_text_and_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let todo = add_column(board, "Todo");
    add_task(board, &todo, "keep");
    let columns_before = fs::read_to_string(board.join("columns.json")).unwrap();
    let tasks_before = fs::read_to_string(board.join("tasks.json")).unwrap();

    let (_, stderr, success) = run_kanban(board, &["task", "add", short(&todo), "   "]);
    assert!(!success);
    assert!(stderr.contains("task text cannot be empty"), "got: {}", stderr);

    let (_, stderr, success) = run_kanban(board, &["column", "rename", short(&todo), "  "]);
    assert!(!success);
    assert!(stderr.contains("column name cannot be empty"), "got: {}", stderr);

    assert_eq!(
        fs::read_to_string(board.join("columns.json")).unwrap(),
        columns_before
    );
    assert_eq!(fs::read_to_string(board.join("tasks.json")).unwrap(), tasks_before);
}

#[test]
fn padded_input_is_trimmed() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    let todo = add_column(board, "Todo");
    let out = run_ok(board, &["column", "rename", short(&todo), "  Doing  "]);
    assert_eq!(out.trim(), format!("Renamed column {} to Doing", short(&todo)));
    let task = add_task(board, &todo, "  spaced  ");

    let out = run_ok(board, &["list"]);
    assert!(out.contains(&format!("Doing [{}]", short(&todo))));
    assert!(out.contains(&format!("  - [ ] {}: spaced\n", short(&task))));
}

#[test]
fn init_honors_board_dir_override() {
    let dir = TempDir::new().unwrap();
    let board = dir.path().join("board");
    fs::create_dir_all(&board).unwrap();
    let out = run_ok(&board, &["init", "--seed"]);
    assert!(out.contains("(3 columns)"), "got: {}", out);
    assert!(!board.join(".kanban").exists());

    let out = run_ok(&board, &["list"]);
    assert!(out.contains("To Do"));
    assert!(out.contains("Doing"));
}

#[test]
fn malformed_slot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let board = dir.path();
    fs::write(board.join("columns.json"), "{not json").unwrap();
    let out = run_ok(board, &["list"]);
    assert!(out.contains("(no columns)"));
}

#[test]
fn init_creates_seeded_project_board() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_kanban"))
        .args(["init", "--seed"])
        .current_dir(dir.path())
        .env_remove("KANBAN_DIR")
        .env("KANBAN_CONFIG", dir.path().join("missing-config.yml"))
        .env("KANBAN_LOG", "off")
        .output()
        .expect("failed to run kanban");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(3 columns)"), "got: {}", stdout);

    let columns: Vec<serde_json::Value> = serde_json::from_str(
        &fs::read_to_string(dir.path().join(".kanban").join("columns.json")).unwrap(),
    )
    .unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["To Do", "Doing", "Done"]);
}
