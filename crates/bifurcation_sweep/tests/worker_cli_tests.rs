use std::path::Path;
use std::process::{Command, Output};

use bifurcation_core::contract::DEFAULT_OUTPUT_DIR;
use bifurcation_sweep::read_artifact;

fn run_worker(working_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sweep_worker"))
        .args(args)
        .current_dir(working_dir)
        .env("RUST_LOG", "info")
        .output()
        .expect("sweep_worker should launch")
}

#[test]
fn missing_arguments_are_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir should be created");

    let output = run_worker(temp.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {stderr}");
    assert!(!temp.path().join(DEFAULT_OUTPUT_DIR).exists());
}

#[test]
fn non_numeric_arguments_are_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir should be created");

    let output = run_worker(temp.path(), &["first", "500"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!temp.path().join(DEFAULT_OUTPUT_DIR).exists());
}

#[test]
fn out_of_range_job_fails_without_creating_output() {
    let temp = tempfile::tempdir().expect("tempdir should be created");

    let output = run_worker(temp.path(), &["3", "3"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("out of range"), "stderr was: {stderr}");
    assert!(!temp.path().join(DEFAULT_OUTPUT_DIR).exists());
}

#[test]
fn valid_job_writes_its_artifact_under_the_working_directory() {
    let temp = tempfile::tempdir().expect("tempdir should be created");

    let output = run_worker(temp.path(), &["1", "500"]);

    assert!(output.status.success(), "status was {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Job 1 finished"), "stdout was: {stdout}");

    // Default sweep: 5000 r-values over 500 jobs, 100 samples each.
    let artifact = temp.path().join(DEFAULT_OUTPUT_DIR).join("results_1.parquet");
    let loaded = read_artifact(&artifact).expect("artifact should load");
    assert_eq!(loaded.job_index, Some(1));
    assert_eq!(loaded.total_jobs, Some(500));
    assert_eq!(loaded.x.len(), 10 * 100);
}
