//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary and verify outputs. Every invocation points
//! `--config` at a scratch directory so the user's config is never read.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("config.toml");
    run_cli_with_config(args, config.to_str().unwrap())
}

fn run_cli_with_config(args: &[&str], config: &str) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_belltimer"))
        .args(["--config", config])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Parse the last stdout line as JSON.
fn last_json(stdout: &str) -> serde_json::Value {
    let line = stdout.lines().last().expect("no output");
    serde_json::from_str(line).expect("Failed to parse JSON output")
}

#[test]
fn test_simulate_escalating_bells() {
    let (stdout, _, code) = run_cli(&[
        "simulate",
        "--preset",
        "bell_count=3&w1=5&w2=10&w3=15",
        "start; tick 10",
    ]);
    assert_eq!(code, 0);

    let fired: Vec<serde_json::Value> = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter(|v| v["type"] == "WarningFired")
        .collect();
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[0]["bell_count"], 1);
    assert_eq!(fired[1]["bell_count"], 2);

    let summary = last_json(&stdout);
    assert_eq!(summary["elapsed_secs"], 10);
    assert_eq!(summary["fired"], serde_json::json!([true, true, false]));
    assert_eq!(summary["bells_rung"], 3);
}

#[test]
fn test_simulate_laps_and_reset() {
    let (stdout, _, code) = run_cli(&[
        "simulate",
        "--quiet",
        "start; tick 30; lap; tick 45; lap; pause",
    ]);
    assert_eq!(code, 0);
    let summary = last_json(&stdout);
    assert_eq!(summary["laps"], serde_json::json!([75, 30]));
    assert_eq!(summary["running"], false);

    let (stdout, _, _) = run_cli(&["simulate", "--quiet", "start; tick 30; lap; reset"]);
    let summary = last_json(&stdout);
    assert_eq!(summary["elapsed_secs"], 0);
    assert_eq!(summary["laps"], serde_json::json!([]));
}

#[test]
fn test_simulate_rejects_resize_while_running() {
    let (stdout, stderr, code) = run_cli(&[
        "simulate",
        "--quiet",
        "--preset",
        "bell_count=3&w1=5&w2=10&w3=15",
        "start; count 2; pause; count 2",
    ]);
    assert_eq!(code, 0);
    assert!(stderr.contains("while the timer is running"));
    let summary = last_json(&stdout);
    assert_eq!(summary["thresholds"], serde_json::json!([5, 10]));
    assert_eq!(summary["rejected"], 1);
}

#[test]
fn test_simulate_bad_step_fails() {
    let (_, stderr, code) = run_cli(&["simulate", "start; jump"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_simulate_uses_configured_tick_period() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[timer]\ntick_ms = 500\n").unwrap();

    let (stdout, _, code) =
        run_cli_with_config(&["simulate", "--quiet", "start; tick 4"], config.to_str().unwrap());
    assert_eq!(code, 0);
    let summary = last_json(&stdout);
    assert_eq!(summary["elapsed_secs"], 4);
    assert_eq!(summary["virtual_ms"], 2000);
}

#[test]
fn test_preset_normalizes_invalid_values() {
    let (stdout, _, code) = run_cli(&["preset", "--from", "bell_count=2&w1=60&w2=abc"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "bell_count=2&w1=60&w2=600");
}

#[test]
fn test_preset_url() {
    let (stdout, _, code) = run_cli(&[
        "preset",
        "-w",
        "90",
        "-w",
        "180",
        "--base",
        "https://example.com/timer/",
    ]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim(),
        "https://example.com/timer/?bell_count=2&w1=90&w2=180"
    );
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let config = config.to_str().unwrap();

    let (_, _, code) = run_cli_with_config(&["config", "init"], config);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli_with_config(&["config", "init"], config);
    assert_eq!(code, 1);

    let (stdout, _, code) = run_cli_with_config(&["config", "get", "bells.interval_ms"], config);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "80");

    let (_, stderr, code) = run_cli_with_config(&["config", "get", "bells.nope"], config);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_run_reads_commands_until_eof() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let mut child = Command::new(env!("CARGO_BIN_EXE_belltimer"))
        .args(["--config", config.to_str().unwrap(), "run", "--silent"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"lap\nstatus\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let kinds: Vec<String> = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .map(|v| v["type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(kinds, vec!["StateSnapshot", "LapsChanged", "StateSnapshot"]);
}
