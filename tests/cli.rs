use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Run the binary from a scratch directory so no stray config is picked up.
fn cxx_clippy(args: &[&str], fixtures: &[&str]) -> (Output, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in fixtures {
        std::fs::copy(fixture(name), dir.path().join(name)).expect("copy fixture");
    }
    let output = Command::new(env!("CARGO_BIN_EXE_cxx-clippy"))
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("binary should run");
    (output, dir)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn json_output_lists_findings() {
    let (output, _dir) = cxx_clippy(
        &["--format", "json", "modernize.ast.json"],
        &["modernize.ast.json"],
    );
    assert!(output.status.success());

    let findings: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    let checks: Vec<&str> = findings
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|f| f["check"].as_str())
        .collect();
    assert_eq!(
        checks,
        [
            "standard-upgrade.prefer-contains",
            "baseline-performance.prefer-string-view",
            "standard-upgrade.prefer-starts-ends-with",
        ]
    );
    assert_eq!(findings[0]["legacy_name"], "hl-modernize-prefer-contains");
    assert_eq!(findings[0]["row"], 5);
}

#[test]
fn std_flag_overrides_recorded_language() {
    let (output, _dir) = cxx_clippy(
        &["--format", "json", "--std", "c++17", "."],
        &["modernize.ast.json", "suppressed.ast.json"],
    );
    assert!(output.status.success());

    let findings: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    let ids: Vec<&str> = findings
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|f| f["check"].as_str())
        .collect();
    assert!(ids.iter().all(|id| id.starts_with("baseline-performance.")));
    assert!(ids.contains(&"baseline-performance.avoid-std-endl"));
}

#[test]
fn github_format_emits_annotations() {
    let (output, _dir) = cxx_clippy(
        &["--format", "github", "--only", "avoid-std-endl", "suppressed.ast.json"],
        &["suppressed.ast.json"],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with(
        "::warning file=src/log.cpp,line=4,col=21,title=baseline-performance.avoid-std-endl::"
    ));
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn list_checks_prints_the_catalog() {
    let (output, _dir) = cxx_clippy(&["list-checks"], &[]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 31);
    assert!(out.contains("standard-upgrade.prefer-hive\tstandard-upgrade\tC++26\t"));
}

#[test]
fn explain_accepts_legacy_names() {
    let (output, _dir) = cxx_clippy(&["explain", "hl-perf-avoid-std-endl"], &[]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("id: baseline-performance.avoid-std-endl"));
    assert!(out.contains("fix: available (safe)"));
}

#[test]
fn unknown_check_names_fail() {
    let (output, _dir) = cxx_clippy(
        &["--only", "prefer-teleport", "modernize.ast.json"],
        &["modernize.ast.json"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown check: prefer-teleport"));
}
