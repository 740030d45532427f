// SPDX-License-Identifier: PMPL-1.0-or-later

//! Driver-level tests: listing and sweeping the corpus

use booby_trap::types::{ScenarioInfo, SweepReport};
use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_booby-trap"))
}

#[test]
fn test_list_json_enumerates_the_corpus() {
    let output = binary()
        .args(["list", "--json"])
        .output()
        .expect("list should spawn");
    assert!(output.status.success());

    let infos: Vec<ScenarioInfo> =
        serde_json::from_slice(&output.stdout).expect("listing should be valid JSON");
    assert_eq!(infos.len(), 26);
}

#[test]
fn test_describe_known_scenario() {
    let output = binary()
        .args(["describe", "free_not_at_buffer_start__straightline"])
        .output()
        .expect("describe should spawn");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CWE761"));
    assert!(stdout.contains("straightline"));
}

#[test]
fn test_sweep_reports_every_scenario_reached() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report_path = dir.path().join("sweep.json");

    let output = binary()
        .args(["sweep", "--output"])
        .arg(&report_path)
        .output()
        .expect("sweep should spawn");
    assert!(
        output.status.success(),
        "sweep itself must survive its children: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = std::fs::read_to_string(&report_path).expect("report file");
    let report: SweepReport = serde_json::from_str(&json).expect("report should parse");

    assert_eq!(report.outcomes.len(), 26);
    assert!(!report.timestamp.is_empty());
    for outcome in &report.outcomes {
        assert!(
            outcome.fault_site_reached,
            "scenario {} never reached its fault site",
            outcome.id
        );
    }
}
