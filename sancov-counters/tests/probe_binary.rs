use std::process::{Command, Output};

fn run_probe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sancov-probe"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run sancov-probe")
}

#[test]
fn test_prints_host_counters() {
    let output = run_probe(&["--host-counters", "3", "--hits", "1,0,2"]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Results\nhit: 1\nhit: 0\nhit: 2\n"
    );
}

#[test]
fn test_unregistered_prints_header_only() {
    let output = run_probe(&["some", "arguments"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "Results\n");
}

#[test]
fn test_one_line_per_counter() {
    let output = run_probe(&["--host-counters", "64", "--summary"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("Results"));
    assert_eq!(lines.filter(|line| *line == "hit: 0").count(), 64);
}

#[test]
fn test_logs_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("probe.log");
    let log_path = log_file.to_str().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sancov-probe"))
        .args(["--host-counters", "2", "--log-file", log_path])
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run sancov-probe");

    assert!(output.status.success());
    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("Printed 2 counters"));
}

#[test]
fn test_reports_registration() {
    let output = run_probe(&["--host-counters", "3", "-x"]);

    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Registered 8-bit counters, len: 3"));
}
