use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("tests/fixtures").join(name)
}

fn scratch_copy(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("newgame.save");
    fs::copy(fixture_path(name), &path).expect("failed to copy fixture");
    (dir, path)
}

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patrol-se"));
    cmd.env_remove("PATROL_SE_SAVE").env_remove("RUST_LOG");
    cmd
}

fn run_cli(args: &[&str]) -> std::process::Output {
    cli().args(args).output().expect("failed to run patrol-se CLI")
}

#[test]
fn cli_prints_status_block_by_default() {
    let path = fixture_path("newgame.save");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&[&path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Current Levels Unlocked: 4"));
    assert!(stdout.contains("Number of Weapons Unlocked: 2"));
    assert!(stdout.contains("Current Money: 1500"));
}

#[test]
fn cli_prints_requested_fields_in_fixed_order() {
    let path = fixture_path("newgame.save");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--money", "--levels", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["levels_unlocked=4", "money=1500"]);
}

#[test]
fn cli_reads_path_from_env() {
    let output = cli()
        .env("PATROL_SE_SAVE", fixture_path("newgame.save"))
        .arg("--weapons")
        .output()
        .expect("failed to run patrol-se CLI");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["weapons_unlocked=2", "weapon_count=4"]
    );
}

#[test]
fn cli_json_output_is_valid() {
    let path = fixture_path("malformed.save");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--json", &path]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["money"], 200);
    assert_eq!(json["records"].as_array().map(Vec::len), Some(3));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not parse line 3"));
}

#[test]
fn cli_set_levels_writes_in_place() {
    let (_dir, path) = scratch_copy("newgame.save");
    let path_str = path.to_string_lossy().to_string();
    let output = run_cli(&["--set-levels", "19", "--levels", &path_str]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Levels unlocked updated to: 19"));
    assert!(stdout.contains("levels_unlocked=19"));

    let text = fs::read_to_string(&path).expect("read back");
    assert!(text.starts_with(
        "{\"type\":\"global\",\"money\":1500,\"levels_unlocked\":19,\"difficulty\":1}\n"
    ));
}

#[test]
fn cli_rejects_out_of_range_levels_without_writing() {
    let (_dir, path) = scratch_copy("newgame.save");
    let before = fs::read(&path).expect("read fixture");
    let path_str = path.to_string_lossy().to_string();

    for bad in ["0", "20", "-3"] {
        let output = run_cli(&["--set-levels", bad, &path_str]);
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("OutOfRange"));
    }
    assert_eq!(fs::read(&path).expect("read back"), before);
}

#[test]
fn cli_rejects_non_numeric_money() {
    let (_dir, path) = scratch_copy("newgame.save");
    let before = fs::read(&path).expect("read fixture");
    let path_str = path.to_string_lossy().to_string();

    let output = run_cli(&["--set-money", "abc", &path_str]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("NotANumber"));
    assert_eq!(fs::read(&path).expect("read back"), before);
}

#[test]
fn cli_accepts_negative_money() {
    let (_dir, path) = scratch_copy("newgame.save");
    let path_str = path.to_string_lossy().to_string();

    let output = run_cli(&["--set-money", "-5", "--money", &path_str]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("money=-5"));
}

#[test]
fn cli_unlock_all_weapons_then_reports_already_unlocked() {
    let (_dir, path) = scratch_copy("newgame.save");
    let path_str = path.to_string_lossy().to_string();

    let first = run_cli(&["--unlock-all-weapons", &path_str]);
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("Unlocked 2 additional weapons!"));
    let after_first = fs::read(&path).expect("read back");

    let second = run_cli(&["--unlock-all-weapons", &path_str]);
    assert!(second.status.success());
    assert!(
        String::from_utf8_lossy(&second.stdout).contains("All weapons are already unlocked.")
    );
    assert_eq!(fs::read(&path).expect("read back"), after_first);
}

#[test]
fn cli_unlock_with_no_weapons_does_not_save() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("newgame.save");
    // Padded JSON would be compacted by any save.
    fs::write(&path, "{ \"type\": \"global\", \"money\": 3 }\n").expect("write save");
    let path_str = path.to_string_lossy().to_string();

    let output = run_cli(&["--unlock-all-weapons", &path_str]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No weapons found in save file."));
    assert_eq!(
        fs::read_to_string(&path).expect("read back"),
        "{ \"type\": \"global\", \"money\": 3 }\n"
    );
}

#[test]
fn cli_global_fallback_modes() {
    let (_dir, path) = scratch_copy("no_global.save");
    let path_str = path.to_string_lossy().to_string();

    let rejected = run_cli(&["--global-fallback", "reject", "--set-money", "10", &path_str]);
    assert_eq!(rejected.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("MissingGlobal"));

    let detached = run_cli(&["--global-fallback", "detached", "--set-money", "10", &path_str]);
    assert!(detached.status.success());
    assert!(String::from_utf8_lossy(&detached.stdout).contains("change was not stored"));
    assert!(!fs::read_to_string(&path).expect("read back").contains("global"));

    let inserted = run_cli(&["--set-money", "10", "--money", &path_str]);
    assert!(inserted.status.success());
    assert!(String::from_utf8_lossy(&inserted.stdout).contains("money=10"));
    assert!(
        fs::read_to_string(&path)
            .expect("read back")
            .ends_with("{\"type\":\"global\",\"money\":10}\n")
    );
}

#[test]
fn cli_prompts_for_missing_path() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let missing = dir.path().join("missing.save");
    let missing = missing.to_string_lossy().to_string();
    let fallback = fixture_path("newgame.save");

    let mut child = cli()
        .args(["--money", missing.as_str()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn patrol-se CLI");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(format!("{}\n", fallback.display()).as_bytes())
        .expect("failed to write prompt answer");
    let output = child.wait_with_output().expect("failed to wait on CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "money=1500\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("was not found."));
    assert!(stderr.contains("Please enter the path to the save file: "));
}

#[test]
fn cli_prompt_keeps_json_stdout_clean() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let missing = dir.path().join("missing.save");
    let missing = missing.to_string_lossy().to_string();
    let fallback = fixture_path("newgame.save");

    let mut child = cli()
        .args(["--json", "--money", missing.as_str()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn patrol-se CLI");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(format!("{}\n", fallback.display()).as_bytes())
        .expect("failed to write prompt answer");
    let output = child.wait_with_output().expect("failed to wait on CLI");

    assert!(output.status.success());
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json, serde_json::json!({"money": 1500}));
}

#[test]
fn cli_logs_malformed_lines_at_default_level() {
    let path = fixture_path("malformed.save");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--money", &path]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARN"));
    assert!(stderr.contains("could not parse line"));
    assert!(stderr.contains("Warning: Could not parse line 3"));
}

#[test]
fn cli_missing_path_without_prompt_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let missing = dir.path().join("missing.save");

    let output = run_cli(&["--no-prompt", &missing.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("NotFound"));
}

#[test]
fn cli_backup_then_restore() {
    let (dir, path) = scratch_copy("newgame.save");
    let original = fs::read(&path).expect("read fixture");
    let path_str = path.to_string_lossy().to_string();

    let info = run_cli(&["--backup-info", &path_str]);
    assert!(String::from_utf8_lossy(&info.stdout).contains("No backup file found."));

    let backup = run_cli(&["--backup", "--set-money", "1", &path_str]);
    assert!(backup.status.success());
    assert_eq!(fs::read(dir.path().join("newgame.bak")).expect("backup"), original);
    assert_ne!(fs::read(&path).expect("edited"), original);

    let info = run_cli(&["--backup-info", "--records", &path_str]);
    assert!(String::from_utf8_lossy(&info.stdout).contains("Backup file created on "));

    let restore = run_cli(&["--restore", "--money", &path_str]);
    assert!(restore.status.success());
    assert!(String::from_utf8_lossy(&restore.stdout).contains("money=1500"));
    assert_eq!(fs::read(&path).expect("restored"), original);
}

#[test]
fn cli_backup_conflicts_with_restore() {
    let path = fixture_path("newgame.save");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--backup", "--restore", &path]);
    assert!(!output.status.success());
}
