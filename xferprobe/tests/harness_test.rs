#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use xferprobe::{run_harness, HarnessSpec, ProbeError};

#[tokio::test]
async fn test_zero_exit_passes_and_captures_output() {
    let spec = HarnessSpec::new("sh").args(["-c", "echo frames ok; echo warn >&2"]);
    let outcome = run_harness(&spec).await.unwrap();

    assert!(outcome.passed());
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.stdout.trim(), "frames ok");
    assert_eq!(outcome.stderr.trim(), "warn");
}

#[tokio::test]
async fn test_nonzero_exit_fails() {
    let spec = HarnessSpec::new("sh").args(["-c", "exit 3"]);
    let outcome = run_harness(&spec).await.unwrap();

    assert!(!outcome.passed());
    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.to_outcome(5).passed);
}

#[tokio::test]
async fn test_timeout_kills_child() {
    let spec = HarnessSpec::new("sh")
        .args(["-c", "sleep 10"])
        .timeout(Duration::from_millis(200));
    let outcome = run_harness(&spec).await.unwrap();

    assert!(outcome.timed_out);
    assert!(!outcome.passed());
    assert!(outcome.duration_ms < 5_000);
}

#[tokio::test]
async fn test_missing_program_is_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let spec = HarnessSpec::new(dir.path().join("AutoTest.exe"));
    let err = run_harness(&spec).await.unwrap_err();
    assert!(matches!(err, ProbeError::Spawn { .. }));
}

#[tokio::test]
async fn test_working_dir_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "present").unwrap();
    let spec = HarnessSpec::new("sh")
        .args(["-c", "cat marker.txt"])
        .working_dir(dir.path());
    let outcome = run_harness(&spec).await.unwrap();
    assert_eq!(outcome.stdout, "present");
}

#[tokio::test]
async fn test_relative_program_runs_from_its_own_directory() {
    let scratch = tempfile::tempdir_in(".").unwrap();
    let release = scratch.path().join("build").join("Release");
    std::fs::create_dir_all(&release).unwrap();
    let script = release.join("AutoTest.exe");
    std::fs::write(&script, "#!/bin/sh\npwd -P\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    // relative path with a directory part, no explicit working dir
    let program = Path::new(".")
        .join(scratch.path().file_name().unwrap())
        .join("build/Release/AutoTest.exe");
    assert!(program.is_relative());

    let spec = HarnessSpec::new(&program);
    let outcome = run_harness(&spec).await.unwrap();

    assert!(outcome.passed(), "stderr: {}", outcome.stderr);
    assert_eq!(
        Path::new(outcome.stdout.trim()),
        std::fs::canonicalize(&release).unwrap()
    );
}
