//! End-to-end runs of the `bgrunner` binary

use std::fs;

use bgrunner_config::CONCURRENCY_ENV_VAR;

use crate::common::{bgrunner, stderr, stdout};

#[test]
fn finite_run_reports_summary() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .args(["--concurrency", "2", "-n", "5", "--duration-ms", "1"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "launched 5, succeeded 5, failed 0");
}

#[test]
fn failures_are_reported_but_not_fatal() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .args(["-c", "3", "-n", "6", "--duration-ms", "0", "--fail-every", "2"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "launched 6, succeeded 3, failed 3");
    assert!(stderr(&output).contains("error in attempt"));
}

#[test]
fn invalid_concurrency_hint_halts_the_process() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .env(CONCURRENCY_ENV_VAR, "many")
        .args(["--concurrency", "0", "-n", "3", "--duration-ms", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(CONCURRENCY_ENV_VAR));
    assert!(!stdout(&output).contains("launched"));
}

#[test]
fn whitespace_concurrency_hint_halts_the_process() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .env(CONCURRENCY_ENV_VAR, "   ")
        .args(["-n", "3", "--duration-ms", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("is not an integer"));
    assert!(!stdout(&output).contains("launched"));
}

#[test]
fn valid_concurrency_hint_is_used() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .env(CONCURRENCY_ENV_VAR, "4")
        .env("RUST_LOG", "info")
        .args(["-n", "4", "--duration-ms", "0"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("setting concurrency from environment hint"));
    assert_eq!(stdout(&output).trim(), "launched 4, succeeded 4, failed 0");
}

#[test]
fn explicit_concurrency_ignores_a_bad_hint() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .env(CONCURRENCY_ENV_VAR, "many")
        .args(["--concurrency", "2", "-n", "2", "--duration-ms", "0"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn zero_iterations_launch_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let output = bgrunner(scratch.path())
        .args(["-n", "0"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "launched 0, succeeded 0, failed 0");
}

#[test]
fn config_file_supplies_run_settings() {
    let scratch = tempfile::tempdir().unwrap();
    let config = scratch.path().join("config.toml");
    fs::write(
        &config,
        "[runner]\nconcurrency = 2\niterations = 3\nadmission = \"before-spawn\"\n\n[work]\nduration_ms = 0\nfail_every = 3\n",
    )
    .unwrap();

    let output = bgrunner(scratch.path())
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "launched 3, succeeded 2, failed 1");
}

#[test]
fn malformed_config_is_an_error() {
    let scratch = tempfile::tempdir().unwrap();
    let config = scratch.path().join("config.toml");
    fs::write(&config, "[runner]\nconcurrency = \"lots\"\n").unwrap();

    let output = bgrunner(scratch.path())
        .arg("--config")
        .arg(&config)
        .args(["-n", "1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to load bgrunner config"));
}
