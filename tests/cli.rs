//! End-to-end tests for the `uibridge` binary, with the test playing host.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from any user config.
fn uibridge(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("uibridge").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("UIBRIDGE_CONFIG")
        .env_remove("UIBRIDGE_REQUEST_TIMEOUT_MS")
        .env_remove("UIBRIDGE_RENDER_DATA_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_reads_pushed_story() {
    let home = TempDir::new().unwrap();
    let push = concat!(
        r#"{"type":"ui-lifecycle-iframe-render-data","payload":{"renderData":"#,
        r#"{"title":"Welcome aboard","slides":[{"text":"Day one"}],"newHireName":"Sam"}}}"#,
        "\n"
    );

    uibridge(&home)
        .args(["render", "--height", "480", "--width", "270"])
        .write_stdin(push)
        .assert()
        .success()
        .stdout(predicate::str::contains("ui-lifecycle-iframe-ready"))
        .stdout(predicate::str::contains(r#""height":480"#))
        .stderr(predicate::str::contains("Welcome aboard"))
        .stderr(predicate::str::contains("Welcome to Postman, Sam!"));
}

#[test]
fn test_render_rejects_invalid_story() {
    let home = TempDir::new().unwrap();
    let push = r#"{"type":"ui-lifecycle-iframe-render-data","payload":{"renderData":{"slides":[]}}}"#;

    uibridge(&home)
        .arg("render")
        .write_stdin(format!("{push}\n"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation"));
}

#[test]
fn test_prompt_times_out_without_response() {
    let home = TempDir::new().unwrap();

    uibridge(&home)
        .args(["--timeout-ms", "100", "prompt", "hi"])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""type":"prompt""#))
        .stderr(predicate::str::contains("Timed out"));
}

#[test]
fn test_tool_is_sent_as_prompt() {
    let home = TempDir::new().unwrap();

    uibridge(&home)
        .args(["--timeout-ms", "100", "tool", "search", "--params", r#"{"q":"docs"}"#])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Please call the tool search"))
        .stdout(predicate::str::contains(r#""type":"tool""#).not());
}

#[test]
fn test_tool_rejects_bad_params() {
    let home = TempDir::new().unwrap();

    uibridge(&home)
        .args(["tool", "search", "--params", "not json"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--params"));
}

#[test]
fn test_config_file_timeout_applies() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bridge.json");
    std::fs::write(&config, r#"{"request_timeout_ms": 50}"#).unwrap();

    uibridge(&home)
        .arg("--config")
        .arg(&config)
        .args(["link", "https://example.com"])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""url":"https://example.com""#))
        .stderr(predicate::str::contains("Timed out"));
}
