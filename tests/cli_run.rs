// tests/cli_run.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use flowrun::cli::CliArgs;
use serde_json::{json, Value};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

const CYCLE: &str = r#"
[task.A]
cmd = "cat"
inputs = { v = "B.out" }
outputs = ["out"]

[task.B]
cmd = "cat"
inputs = { v = "A.out" }
outputs = ["out"]
"#;

// `cat` echoes its stdin inputs back as outputs.
const ECHO: &str = r#"
[workflow]
inputs = ["x"]

[workflow.outputs]
z = "T1.x"

[task.T1]
cmd = "cat"
inputs = { x = "input.x" }
outputs = ["x"]
"#;

const FAILING: &str = r#"
[workflow.outputs]
z = "T1.y"

[task.T1]
cmd = "cat > /dev/null; echo broken >&2; exit 3"
outputs = ["y"]
"#;

fn write_workflow(dir: &TempDir, file: &str, contents: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join(file);
    fs::write(&path, contents)?;
    Ok(path)
}

fn args_for(path: &Path, extra: &[&str]) -> Result<CliArgs, Box<dyn Error>> {
    let mut argv = vec!["flowrun".to_string(), "--workflow".to_string()];
    argv.push(path.display().to_string());
    argv.extend(extra.iter().map(|s| s.to_string()));
    Ok(CliArgs::try_parse_from(argv)?)
}

#[tokio::test]
async fn dry_run_reports_cycle_without_failing() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write_workflow(&dir, "cycle.toml", CYCLE)?;

    let mut out = Vec::new();
    flowrun::run_to(args_for(&path, &["--dry-run"])?, &mut out).await?;

    let report = String::from_utf8(out)?;
    assert!(report.contains("flowrun dry-run: cycle"), "{report}");
    assert!(report.contains("in:  v <- B.out"), "{report}");
    assert!(report.contains("blocked (cycle involving"), "{report}");
    assert!(report.contains("A, B"), "{report}");
    assert!(!report.contains("round 1"), "{report}");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn run_prints_outputs_as_json_and_last_input_wins() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write_workflow(&dir, "echo.toml", ECHO)?;

    let mut out = Vec::new();
    let args = args_for(&path, &["-i", "x=1", "--input", "x={\"n\": 2}"])?;
    flowrun::run_to(args, &mut out).await?;

    let printed: Value = serde_json::from_slice(&out)?;
    assert_eq!(printed, json!({ "z": { "n": 2 } }));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_task_is_an_error_and_prints_nothing() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let path = write_workflow(&dir, "failing.toml", FAILING)?;

    let mut out = Vec::new();
    let err = flowrun::run_to(args_for(&path, &[])?, &mut out)
        .await
        .expect_err("task exits with status 3");

    let message = format!("{err:#}");
    assert!(message.contains("Task 'T1' failed"), "{message}");
    assert!(message.contains("exit code 3"), "{message}");
    assert!(out.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_workflow_file_names_the_path() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("absent.toml");

    let mut out = Vec::new();
    let err = flowrun::run_to(args_for(&path, &[])?, &mut out)
        .await
        .expect_err("file does not exist");

    assert!(format!("{err:#}").contains("absent.toml"));
    Ok(())
}
