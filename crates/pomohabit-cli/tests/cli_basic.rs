//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME, so the
//! data dir and database start empty.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomohabit"))
        .args(args)
        .env("HOME", home)
        .env_remove("POMOHABIT_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

fn add_habit(home: &Path, title: &str) -> String {
    let (code, stdout, stderr) = run_cli(home, &["habit", "add", title]);
    assert_eq!(code, 0, "habit add failed: {stderr}");
    stdout
        .trim()
        .strip_prefix("Habit created: ")
        .expect("id in output")
        .to_string()
}

#[test]
fn test_habit_add_and_list() {
    let home = TempDir::new().unwrap();
    let id = add_habit(home.path(), "Read");

    let habits = run_json(home.path(), &["habit", "list", "--json"]);
    let habits = habits.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], id.as_str());
    assert_eq!(habits[0]["title"], "Read");
    assert_eq!(habits[0]["dailyPomodoros"], serde_json::json!([]));

    let (code, stdout, _) = run_cli(home.path(), &["habit", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Read"));
    assert!(stdout.contains("0 Pomodoros today"));
}

#[test]
fn test_habit_add_rejects_blank_title() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["habit", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_habit_edit_by_prefix_and_delete_by_title() {
    let home = TempDir::new().unwrap();
    let id = add_habit(home.path(), "Read");
    add_habit(home.path(), "Run");

    let (code, _, stderr) = run_cli(
        home.path(),
        &["habit", "edit", &id[..8], "--title", "Read books"],
    );
    assert_eq!(code, 0, "{stderr}");

    let (code, _, stderr) = run_cli(home.path(), &["habit", "delete", "run"]);
    assert_eq!(code, 0, "{stderr}");

    let habits = run_json(home.path(), &["habit", "list", "--json"]);
    let titles: Vec<_> = habits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Read books".to_string()]);
}

#[test]
fn test_unknown_habit_fails() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["habit", "show", "nothing-here"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Habit not found"));
}

#[test]
fn test_notes_show_up_on_dashboard() {
    let home = TempDir::new().unwrap();
    add_habit(home.path(), "Read");
    add_habit(home.path(), "Run");

    assert_eq!(run_cli(home.path(), &["note", "set", "Read", "chapter 4"]).0, 0);
    assert_eq!(run_cli(home.path(), &["note", "set", "Run", "5k"]).0, 0);
    assert_eq!(run_cli(home.path(), &["note", "clear", "Run"]).0, 0);

    let summary = run_json(home.path(), &["dashboard", "--json"]);
    assert_eq!(summary["total_sessions"], 0);
    // A note alone creates today's record.
    assert_eq!(summary["habits_touched"], 2);
    let notes = summary["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["habit_title"], "Read");
    assert_eq!(notes[0]["note"], "chapter 4");

    let (code, stdout, _) = run_cli(home.path(), &["dashboard"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Today's Progress"));
    assert!(stdout.contains("Read: chapter 4"));
}

#[test]
fn test_habits_survive_between_runs() {
    let home = TempDir::new().unwrap();
    add_habit(home.path(), "Read");
    assert!(home
        .path()
        .join(".config/pomohabit/pomohabit.db")
        .exists());
    let habits = run_json(home.path(), &["habit", "list", "--json"]);
    assert_eq!(habits.as_array().unwrap().len(), 1);
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "calendar.utc_offset", "+09:00"]);
    assert_eq!(code, 0, "{stderr}");

    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "calendar.utc_offset"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "+09:00");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "calendar.utc_offset", "tomorrow"]);
    assert_eq!(code, 1);
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));

    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "calendar.utc_offset"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "local");
}

#[test]
fn test_config_reset() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["config", "set", "log.level", "debug"]);
    let (code, _, _) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let config = run_json(home.path(), &["config", "list"]);
    assert_eq!(config["log"]["level"], "warn");
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomohabit"));
}

#[test]
fn test_config_reset_repairs_unreadable_file() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".config/pomohabit");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "calendar = 5").unwrap();

    let (code, _, stderr) = run_cli(home.path(), &["habit", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("configuration"));

    let (code, stdout, stderr) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("config reset to defaults"));

    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "log.level"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "warn");
}

#[test]
fn test_hex_like_title_wins_over_id_prefix() {
    let home = TempDir::new().unwrap();
    let first = add_habit(home.path(), "Read");
    let prefix = first[..4].to_string();
    let titled = add_habit(home.path(), &prefix);

    let (code, stdout, stderr) = run_cli(home.path(), &["habit", "show", &prefix]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains(&titled));
}
