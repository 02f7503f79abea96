//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str], stdin: Option<&str>) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_switchwise"))
        .args(args)
        .env("SWITCHWISE_HOME", home)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn home() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp home")
}

#[test]
fn test_classify_heuristic() {
    let home = home();
    let (code, stdout, _) = run_cli(home.path(), &["classify", "YouTube - funny cats"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "entertainment_video");
}

#[test]
fn test_classify_json() {
    let home = home();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["classify", "main.py", "--url", "https://github.com/x", "--json"],
        None,
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["category"], "deep_work_coding");
    assert_eq!(parsed["mode"], "heuristic");
}

#[test]
fn test_analyze_from_stdin() {
    let home = home();
    let payload = r#"{
        "current_state": "tired",
        "tasks": [{"title": "YouTube - funny cats", "url": "", "active": true}]
    }"#;
    let (code, stdout, _) = run_cli(home.path(), &["analyze"], Some(payload));
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["next_task_category"], "entertainment_video");
    assert_eq!(parsed["suitability"], "neutral");
    assert_eq!(parsed["recommendation"]["type"], "info");
}

#[test]
fn test_analyze_from_file() {
    let home = home();
    let path = home.path().join("payload.json");
    std::fs::write(
        &path,
        r#"{"current_state": "focused", "next_window_title": "Inbox - Gmail"}"#,
    )
    .unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["analyze", "--file", path.to_str().unwrap()],
        None,
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["recommendation"]["type"], "caution_communication");
}

#[test]
fn test_analyze_rejects_empty_tasks() {
    let home = home();
    let (code, _, stderr) = run_cli(home.path(), &["analyze"], Some(r#"{"tasks": []}"#));
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Request error: No tasks provided"));
}

#[test]
fn test_decide_json() {
    let home = home();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["decide", "tired", "entertainment_video", "harmful", "--json"],
        None,
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["rule_id"], 1);
    assert_eq!(parsed["recommendation"]["type"], "avoid_entertainment");
}

#[test]
fn test_decide_text() {
    let home = home();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["decide", "focused", "gaming", "meh"],
        None,
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("rule:    9"));
    assert!(stdout.contains("Transition from focused to gaming is meh."));
}

#[test]
fn test_decide_unknown_state() {
    let home = home();
    let (code, _, stderr) = run_cli(
        home.path(),
        &["decide", "sleepy", "other_unknown", "good"],
        None,
    );
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_models_json() {
    let home = home();
    let (code, stdout, _) = run_cli(home.path(), &["models", "--json"], None);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["classifier_mode"], "heuristic");
    assert_eq!(parsed["fusion_model_loaded"], false);
}

#[test]
fn test_config_roundtrip() {
    let home = home();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "server.bind"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "127.0.0.1:8000");

    let (code, _, _) = run_cli(
        home.path(),
        &["config", "set", "defaults.time_of_day", "21.5"],
        None,
    );
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "defaults.time_of_day"], None);
    assert_eq!(stdout.trim(), "21.5");

    let (code, _, _) = run_cli(home.path(), &["config", "reset"], None);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "defaults.time_of_day"], None);
    assert_eq!(stdout.trim(), "12.0");
}

#[test]
fn test_config_unknown_key() {
    let home = home();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "nope"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key: nope"));
}

#[test]
fn test_config_path() {
    let home = home();
    let (code, stdout, _) = run_cli(home.path(), &["config", "path"], None);
    assert_eq!(code, 0);
    assert_eq!(
        Path::new(stdout.trim()),
        home.path().join("config.toml").as_path()
    );
}
