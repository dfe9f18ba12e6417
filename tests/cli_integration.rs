//! Integration tests driving the compiled binary.
//!
//! None of these touch the network: they exercise argument handling,
//! configuration validation, and the early per-file checks.

use std::process::Command;

fn run_cli(args: &[&str], api_key: Option<&str>) -> std::process::Output {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--quiet", "--"]).args(args);
    match api_key {
        Some(key) => {
            cmd.env("OPENAI_API_KEY", key);
        }
        None => {
            cmd.env_remove("OPENAI_API_KEY");
        }
    }
    cmd.output().expect("failed to run command")
}

#[test]
fn test_help_exits_zero() {
    let output = run_cli(&["--help"], None);
    assert!(output.status.success(), "help failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recordings"), "unexpected help text: {}", stdout);
    assert!(stdout.contains("--output-dir"));
}

#[test]
fn test_missing_api_key_is_fatal() {
    let output = run_cli(&["meeting.wav"], None);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OPENAI_API_KEY"),
        "expected configuration error, got: {}",
        stderr
    );
}

#[test]
fn test_missing_file_fails() {
    let output = run_cli(&["definitely_not_here.wav"], Some("sk-test"));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not found"),
        "expected 'not found' error, got: {}",
        stderr
    );
}

#[test]
fn test_unsupported_format_fails() {
    let path = std::env::temp_dir().join("recap_test_unsupported.xyz");
    std::fs::write(&path, b"test").unwrap();

    let output = run_cli(&[path.to_str().unwrap()], Some("sk-test"));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unsupported format"),
        "expected 'unsupported format' error, got: {}",
        stderr
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_one_bad_file_does_not_stop_the_rest() {
    let good_is_still_checked = std::env::temp_dir().join("recap_test_second.xyz");
    std::fs::write(&good_is_still_checked, b"test").unwrap();

    let output = run_cli(
        &[
            "definitely_not_here.wav",
            good_is_still_checked.to_str().unwrap(),
        ],
        Some("sk-test"),
    );
    assert!(!output.status.success());

    // both files were attempted and both failures reported
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
    assert!(stderr.contains("unsupported format"), "stderr: {}", stderr);
    assert!(stderr.contains("Processed 0/2"), "stderr: {}", stderr);

    std::fs::remove_file(&good_is_still_checked).ok();
}

#[test]
fn test_version_flag() {
    let output = run_cli(&["--version"], None);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recap"));
}
