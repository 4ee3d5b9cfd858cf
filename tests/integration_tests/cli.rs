//! Integration tests for the extlatency binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use rstest::rstest;

const GATEWAY_LOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/gateway.log");

/// Command isolated from the user's config, environment and working directory.
fn extlatency(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_extlatency"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("CLICOLOR_FORCE")
        .env_remove("RUST_LOG")
        .env_remove("EXTLATENCY_CONFIG_PATH")
        .env_remove("EXTLATENCY_DESCRIPTIONS_PATH");
    cmd
}

fn run_with_stdin(mut cmd: Command, input: impl AsRef<[u8]>) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn extlatency");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_ref())
        .expect("Failed to write to stdin");

    child.wait_with_output().expect("Failed to read output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_single_line_tree() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path())
        .args(["--line", "ExtLatency: TS=0,A=1,PS=1,B=3,PC=4,TC=5 [/x]"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "single-trace [/x]
Transaction          5  Total transaction time
├── A                1
└── Processing Rule  3  Processing rule execution
    └── B            2

"
    );
}

#[test]
fn test_log_file_reports_failing_lines() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path()).arg(GATEWAY_LOG).output().unwrap();

    assert!(!output.status.success(), "A failing line should fail the run");

    let stdout = stdout(&output);
    assert!(stdout.contains("single-trace [https://api.example.com/orders]"));
    assert!(stdout.contains("dual-trace [https://api.example.com/stock]"));
    assert!(!stdout.contains("broken"));
    // Records are printed in input order
    assert!(stdout.find("/orders").unwrap() < stdout.find("/stock").unwrap());

    let stderr = stderr(&output);
    assert!(stderr.contains("Line 5:"), "{stderr}");
    assert!(stderr.contains("Unbalanced processing rules at index 2"), "{stderr}");
}

#[test]
fn test_stdin_with_only_valid_lines_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let log = std::fs::read_to_string(GATEWAY_LOG).unwrap();
    let valid: String = log
        .lines()
        .filter(|line| !line.contains("broken"))
        .map(|line| format!("{line}\n"))
        .collect();

    let output = run_with_stdin(extlatency(dir.path()), &valid);

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("├── Front Side Processing   4  Front side (client-facing) processing"));
    assert!(stdout.contains("└── Back Side Processing    8  Back side (server-facing) processing"));
}

#[test]
fn test_dash_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = extlatency(dir.path());
    cmd.arg("-");
    let output = run_with_stdin(cmd, "ExtLatency: TS=0,A=2,TC=2 [/dash]\n");

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("single-trace [/dash]"));
}

#[test]
fn test_invalid_utf8_outside_extlatency_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("binary.log");
    let mut bytes = b"garbage \xff\xfe from a binary payload\n".to_vec();
    bytes.extend_from_slice(b"ExtLatency: TS=0,A=1,TC=2 [/utf8]\n");
    std::fs::write(&log, &bytes).unwrap();

    let output = extlatency(dir.path()).arg(&log).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("single-trace [/utf8]"));

    let output = run_with_stdin(extlatency(dir.path()), &bytes);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn test_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path())
        .args([GATEWAY_LOG, "--format", "json"])
        .output()
        .unwrap();

    let stdout = stdout(&output);
    let documents: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&stdout)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(documents.len(), 2);

    let dual = &documents[1];
    assert_eq!(dual["layout"], "dual-trace");
    assert_eq!(dual["url"], "https://api.example.com/stock");
    assert_eq!(dual["root"]["keyword"], "Transaction");
    assert_eq!(dual["root"]["duration"], 12);
    let back = &dual["root"]["children"][1];
    assert_eq!(back["keyword"], "Back Side Processing");
    assert_eq!(back["children"][0]["keyword"], "BR");
    assert_eq!(back["children"][0]["duration"], 5);
    assert!(back["children"][0].get("children").is_none());
}

#[test]
fn test_summary_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path())
        .args([
            "--format",
            "summary",
            "--line",
            "ExtLatency: TS=0,HR=1,PS=1,XSL=4,PS=5,GS=15,PC=15,PC=16,BS=18,TC=18 [/orders]",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("EXTLATENCY ANALYSIS"), "Should have header");
    assert!(stdout.contains("KEYWORD BREAKDOWN"));
    assert!(stdout.contains("TOP 10 SLOWEST ACTIONS"));
    assert!(stdout.contains("Actions:   4 in 2 processing rules (max depth 2)"));
}

#[rstest]
#[case::not_extlatency("GET /orders 200", "Not an ExtLatency log line")]
#[case::malformed_token("ExtLatency: TS=0,A=x,TC=2 [/]", "Malformed token")]
#[case::missing_bounds("ExtLatency: PS=1,A=2 [/]", "Log does not start with TS and end with TC")]
#[case::multiple_transactions("ExtLatency: TS=0,TC=1,TS=2,TC=3 [/]", "more than one transaction")]
fn test_line_errors(#[case] line: &str, #[case] message: &str) {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path()).args(["--line", line]).output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.contains(message), "{stderr}");
}

#[test]
fn test_no_entries() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_stdin(extlatency(dir.path()), "just some\nunrelated log lines\n");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No ExtLatency entries found"));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path())
        .arg("/nonexistent/path/to/gateway.log")
        .output()
        .unwrap();

    assert!(!output.status.success(), "Should fail with non-existent file");
    assert!(stderr(&output).contains("Failed to read /nonexistent/path/to/gateway.log"));
}

#[test]
fn test_descriptions_flag() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("keywords.json");
    std::fs::write(&table, r#"{"XSL": "Stylesheet transform"}"#).unwrap();

    let output = extlatency(dir.path())
        .arg("--descriptions")
        .arg(&table)
        .args(["--line", "ExtLatency: TS=0,XSL=3,TC=3 [/]"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("└── XSL      3  Stylesheet transform"));
}

#[test]
fn test_descriptions_from_environment_and_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("descriptions.json"),
        r#"{"XSL": "From working directory"}"#,
    )
    .unwrap();
    let line = ["--line", "ExtLatency: TS=0,XSL=3,TC=3 [/]"];

    let output = extlatency(dir.path()).args(line).output().unwrap();
    assert!(stdout(&output).contains("From working directory"));

    let table = dir.path().join("env.json");
    std::fs::write(&table, r#"{"XSL": "From environment"}"#).unwrap();
    let output = extlatency(dir.path())
        .env("EXTLATENCY_DESCRIPTIONS_PATH", &table)
        .args(line)
        .output()
        .unwrap();
    assert!(stdout(&output).contains("From environment"));
}

#[test]
fn test_config_labels_and_max_depth() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("extlatency.toml");
    std::fs::write(
        &config,
        r#"
max-depth = 1

[labels]
transaction = "Whole request"
"#,
    )
    .unwrap();

    let output = extlatency(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--line", "ExtLatency: TS=0,PS=1,A=2,PC=3,TC=4 [/]"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Whole request"));

    let output = extlatency(dir.path())
        .env("EXTLATENCY_CONFIG_PATH", &config)
        .args(["--line", "ExtLatency: TS=0,PS=1,PS=2,PC=3,PC=4,TC=5 [/]"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Processing rules nest deeper than 1 at index 2"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = extlatency(dir.path())
        .args(["--config", "/nonexistent/extlatency.toml"])
        .args(["--line", "ExtLatency: TS=0,TC=1 [/]"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read config file /nonexistent/extlatency.toml"));
}

#[test]
fn test_verbose_logs_skipped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = extlatency(dir.path());
    cmd.arg("-vv");
    let output = run_with_stdin(cmd, "noise\nExtLatency: TS=0,TC=1 [/]\n");

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Skipping line 1"));
}
