mod common;

use common::{run_command, run_with_stdin};

fn statuses(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.split_once("Status: ").map(|(_, s)| s.to_string()))
        .collect()
}

#[test]
fn auto_start_alternates_phases() {
    let output = run_command(&[
        "simulate",
        "--forward",
        "200ms",
        "--lateral",
        "100ms",
        "--auto-start",
        "--duration",
        "450ms",
    ]);
    assert!(
        output.status.success(),
        "simulate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let statuses = statuses(&output.stdout);
    assert!(statuses.len() >= 4, "too few reports: {statuses:?}");
    assert_eq!(
        statuses[..4],
        ["Started", "Swiping forward", "Swiping left", "Swiping forward"]
    );
}

#[test]
fn scripted_stop_key() {
    let output = run_with_stdin(&["simulate"], "press\nL\nquit\n");
    assert!(output.status.success());
    assert_eq!(
        statuses(&output.stdout),
        ["Started", "Swiping forward", "Stopped"]
    );
}

#[test]
fn scripted_tab_return() {
    let output = run_with_stdin(&["simulate"], "press\nhide\nshow\nquit\n");
    assert!(output.status.success());
    assert_eq!(
        statuses(&output.stdout),
        ["Started", "Swiping forward", "Stopped (tab return)"]
    );
}

#[test]
fn json_format_emits_report_objects() {
    let output = run_with_stdin(&["simulate", "--format", "json"], "press\nstop\nquit\n");
    assert!(output.status.success());

    let reports: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let statuses: Vec<&str> = reports
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["started", "swiping_forward", "stopped"]);
    assert!(reports.iter().all(|r| r["elapsed_ms"].is_u64()));
}

#[test]
fn zero_forward_duration_is_rejected() {
    let output = run_command(&["simulate", "--forward", "0s"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("forward"));
}
