// tests/binary_signals.rs
//
// Drives the compiled binary and delivers real signals.
#![cfg(unix)]

use std::error::Error;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn spawn_rerun(check_dir: &Path, watch_dir: &Path) -> std::io::Result<Child> {
    Command::new(env!("CARGO_BIN_EXE_rerun"))
        .arg("--check-dir")
        .arg(check_dir)
        .arg("--watch-dir")
        .arg(watch_dir)
        .args(["--no-clear", "--no-self-reload", "--interval", "0.1", "true"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn wait_for(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

fn send_signal(pid: u32, name: &str) -> std::io::Result<()> {
    let status = Command::new("kill")
        .arg(format!("-{name}"))
        .arg(pid.to_string())
        .status()?;
    assert!(status.success(), "kill -{name} {pid} failed");
    Ok(())
}

fn assert_signal_cleans_up(signal: &str, expected_code: i32) -> TestResult {
    let check = tempdir()?;
    let watch = tempdir()?;

    let mut child = spawn_rerun(check.path(), watch.path())?;
    let pid = child.id();
    let check_marker = check.path().join(format!("rerun-check.{pid}"));
    let exec_marker = check.path().join(format!("rerun-exec.{pid}"));

    if !wait_for(&check_marker, Duration::from_secs(10)) {
        let _ = child.kill();
        panic!("rerun never created {check_marker:?}");
    }
    assert!(exec_marker.exists());

    send_signal(pid, signal)?;
    let status = child.wait()?;

    assert_eq!(status.code(), Some(expected_code));
    assert!(!check_marker.exists());
    assert!(!exec_marker.exists());
    Ok(())
}

#[test]
fn sigterm_exits_143_and_removes_markers() -> TestResult {
    assert_signal_cleans_up("TERM", 143)
}

#[test]
fn sigint_exits_130_and_removes_markers() -> TestResult {
    assert_signal_cleans_up("INT", 130)
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|text| text.lines().count())
        .unwrap_or(0)
}

fn wait_for_lines(path: &Path, lines: usize, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if line_count(path) >= lines {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn rewriting_self_path_restarts_with_the_same_arguments() -> TestResult {
    let check = tempdir()?;
    let watch = tempdir()?;
    let out = tempdir()?;
    let self_file = out.path().join("self-bin");
    let log = out.path().join("runs.log");
    std::fs::write(&self_file, "v1")?;

    let mut child = Command::new(env!("CARGO_BIN_EXE_rerun"))
        .arg("--check-dir")
        .arg(check.path())
        .arg("--watch-dir")
        .arg(watch.path())
        .arg("--self-path")
        .arg(&self_file)
        .args(["--no-clear", "--interval", "0.2"])
        .arg(format!("echo run >> '{}'", log.display()))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();
    let check_marker = check.path().join(format!("rerun-check.{pid}"));

    if !wait_for(&check_marker, Duration::from_secs(10)) {
        let _ = child.kill();
        panic!("rerun never created {check_marker:?}");
    }
    assert_eq!(line_count(&log), 1);

    // Strictly newer than the exec marker even on 1 s mtime granularity.
    std::thread::sleep(Duration::from_millis(1100));
    std::fs::write(&self_file, "v2")?;

    // The restarted process starts with no check marker, so it runs again.
    if !wait_for_lines(&log, 2, Duration::from_secs(10)) {
        let _ = child.kill();
        panic!("command did not run again after the restart");
    }
    assert!(wait_for(&check_marker, Duration::from_secs(10)));
    assert!(check.path().join(format!("rerun-exec.{pid}")).exists());

    send_signal(pid, "TERM")?;
    let status = child.wait()?;
    assert_eq!(status.code(), Some(143));
    assert!(!check_marker.exists());
    Ok(())
}

#[test]
fn missing_command_is_a_usage_error() -> TestResult {
    let status = Command::new(env!("CARGO_BIN_EXE_rerun"))
        .arg("--once")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    assert_eq!(status.code(), Some(2));
    Ok(())
}
