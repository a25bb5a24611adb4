//! Integration tests for the setlog binary.
//!
//! These tests drive the CLI end to end:
//! - Template listing and plate calculator
//! - Logging sets in an interactive session and finishing it
//! - History, export and delete of stored workouts

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary with an isolated data dir and config
fn cli(data_dir: &Path) -> Command {
    let config = data_dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "[timer]\nrest_seconds = 90\n").expect("Failed to write config");
    }
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("setlog"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .arg("--config")
        .arg(&config);
    cmd
}

fn stored_workouts(data_dir: &Path) -> Vec<serde_json::Value> {
    let path = data_dir.join("workouts.jsonl");
    if !path.exists() {
        return Vec::new();
    }
    fs::read_to_string(path)
        .expect("Failed to read workouts")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid workout line"))
        .collect()
}

fn live_session(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("session/active.json")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("setlog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout set logger"));
}

#[test]
fn test_templates_lists_builtin_days() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 1 (OH Press)"))
        .stdout(predicate::str::contains("Day 4 (Deadlift)"))
        .stdout(predicate::str::contains("Plank"));
}

#[test]
fn test_custom_templates_from_config() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[[templates.custom]]
id = "arms"
name = "Arm Day"
exercises = [{ exerciseId = "2", sets = 4, reps = 12 }]
"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("[arms] Arm Day"));
}

#[test]
fn test_plates() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["plates", "185"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plates per side: 45lb, 25lb"));

    cli(temp_dir.path())
        .args(["plates", "45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plates needed"));
}

#[test]
fn test_plates_rejects_unloadable_target() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["plates", "1e20"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("up to 2000"));
}

#[test]
fn test_exercises_library() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seated Overhead Press"))
        .stdout(predicate::str::contains("Weighted Bodyweight"));

    cli(temp_dir.path())
        .args(["exercises", "--body-part", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plank"))
        .stdout(predicate::str::contains("Hanging Leg Raise"))
        .stdout(predicate::str::contains("Bench Press").not());

    cli(temp_dir.path())
        .args(["exercises", "--category", "dumbbell", "row"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bent Over One Arm Row"))
        .stdout(predicate::str::contains("Lunge").not());

    cli(temp_dir.path())
        .args(["exercises", "--body-part", "chest", "squat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises match."));

    cli(temp_dir.path())
        .args(["exercises", "--body-part", "neck"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown body part 'neck'"));
}

#[test]
fn test_logged_workout_is_saved_once() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "Day 1"])
        .write_stdin("add 1\nset 1 1 w=95 r=8\ndone 1 1\nadd 3\nset 3 1 t=0:45\ndone 3 1\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Started Day 1 (OH Press)"))
        .stdout(predicate::str::contains("✓ Rest 1:30"))
        .stdout(predicate::str::contains("✓ Workout saved"));

    let workouts = stored_workouts(data_dir);
    assert_eq!(workouts.len(), 1);
    let workout = &workouts[0];
    assert_eq!(workout["name"], "Day 1 (OH Press)");
    assert_eq!(
        workout["exercises"][0]["sets"][0],
        serde_json::json!({"weight": 95.0, "reps": 8, "completed": true})
    );
    assert!(workout["exercises"][1]["sets"].as_array().unwrap().is_empty());
    assert_eq!(workout["exercises"][2]["sets"][0]["time"], "0:45");

    // Live session is gone once the workout is stored
    assert!(!live_session(data_dir).exists());
}

#[test]
fn test_invalid_entry_blocks_finish() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "1"])
        .write_stdin("add 1\nset 1 1 w=95 r=abc\nfinish\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cannot finish yet"))
        .stdout(predicate::str::contains("exercise 1 set 1"))
        .stdout(predicate::str::contains("abc"));

    assert!(stored_workouts(data_dir).is_empty());
    assert!(live_session(data_dir).exists());

    // Fix the entry after resuming and finish
    cli(data_dir)
        .arg("resume")
        .write_stdin("set 1 1 r=8\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Workout saved"));

    let workouts = stored_workouts(data_dir);
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0]["exercises"][0]["sets"][0]["reps"], 8);
}

#[test]
fn test_start_refuses_when_workout_in_progress() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "Day 2"])
        .write_stdin("quit\n")
        .assert()
        .success();

    cli(data_dir)
        .args(["start", "Day 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("setlog resume"));
}

#[test]
fn test_start_unknown_template() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "Leg Day"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template matches"));

    assert!(!live_session(temp_dir.path()).exists());
}

#[test]
fn test_resume_without_workout_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("resume")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active workout found"));
}

#[test]
fn test_end_of_input_keeps_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "Day 1"])
        .write_stdin("add 2\nset 2 1 w=45 r=10\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("setlog resume"));

    let live: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(live_session(data_dir)).unwrap()).unwrap();
    assert_eq!(live["exercises"][1]["sets"][0]["weight"], "45");
    assert_eq!(live["exercises"][1]["sets"][0]["reps"], "10");

    cli(data_dir)
        .arg("resume")
        .write_stdin("show\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("45 × 10"));
}

#[test]
fn test_abandon_in_session_discards_everything() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "Day 1"])
        .write_stdin("add 1\ndone 1 1\nabandon\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout abandoned"));

    assert!(!live_session(data_dir).exists());
    assert!(stored_workouts(data_dir).is_empty());
}

#[test]
fn test_abandon_command() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .arg("abandon")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout in progress"));

    cli(data_dir)
        .args(["start", "Day 1"])
        .write_stdin("quit\n")
        .assert()
        .success();

    cli(data_dir)
        .arg("abandon")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout abandoned"));
    assert!(!live_session(data_dir).exists());
}

#[test]
fn test_bad_commands_do_not_end_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "Day 1"])
        .write_stdin("jump\nadd 0\ndel 1 5\nadd 9\nadd 1\nfinish\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command 'jump'"))
        .stdout(predicate::str::contains("numbers start at 1"))
        .stdout(predicate::str::contains("No set 5 for exercise 1"))
        .stdout(predicate::str::contains("No exercise 9"))
        .stdout(predicate::str::contains("✓ Workout saved"));

    assert_eq!(stored_workouts(data_dir).len(), 1);
}

#[test]
fn test_history_export_and_delete() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts yet"));

    cli(data_dir)
        .args(["start", "Day 3"])
        .write_stdin("add 1\nset 1 1 w=135 r=8\ndone 1 1\nadd 1\nset 1 2 w=135 r=6\ndone 1 2\nfinish\n")
        .assert()
        .success();

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 3 (Bench)"))
        .stdout(predicate::str::contains("volume 1890 lb"))
        .stdout(predicate::str::contains("135 lb × 8"));

    let csv_path = data_dir.join("export/workouts.csv");
    cli(data_dir)
        .arg("export")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sets from 1 workouts"));
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("workout_id,workout_name,completed_at,exercise_id,set_number"));
    assert_eq!(csv.lines().count(), 3);

    let id = stored_workouts(data_dir)[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    cli(data_dir)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted workout"));
    assert!(stored_workouts(data_dir).is_empty());

    cli(data_dir)
        .args(["delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_history_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for template in ["Day 1", "Day 2"] {
        cli(data_dir)
            .args(["start", template])
            .write_stdin("finish\n")
            .assert()
            .success();
    }

    cli(data_dir)
        .args(["history", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 2 (Squat)"))
        .stdout(predicate::str::contains("Day 1 (OH Press)").not());
}
