// tests/rerun_loop.rs

use rerun_test_utils::builders::LoopConfigBuilder;
use rerun_test_utils::capture::SharedBuffer;
use rerun_test_utils::fake_runner::FakeRunner;
use rerun_test_utils::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::{tempdir, TempDir};

use rerun::config::LoopConfig;
use rerun::engine::{CycleOutcome, RerunLoop};
use rerun::exec::CommandOutcome;
use rerun::fs::{FileSystem, RealFileSystem};
use rerun::marker::MarkerGuard;

type TestResult = Result<(), Box<dyn Error>>;

/// Longer than the coarsest common mtime granularity (1 s), so anything
/// written after this is strictly newer than anything written before.
const SETTLE: Duration = Duration::from_millis(1100);

struct Harness {
    watch: TempDir,
    check: TempDir,
    runner: FakeRunner,
    output: SharedBuffer,
}

impl Harness {
    fn new() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            watch: tempdir()?,
            check: tempdir()?,
            runner: FakeRunner::new(),
            output: SharedBuffer::new(),
        })
    }

    fn config(&self) -> LoopConfigBuilder {
        LoopConfigBuilder::new(self.watch.path(), self.check.path())
    }

    fn build(&self, config: LoopConfig, pid: u32) -> Result<RerunLoop<FakeRunner>, Box<dyn Error>> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let markers = MarkerGuard::create(fs, self.check.path(), pid)?;
        Ok(RerunLoop::new(
            config,
            markers,
            self.runner.clone(),
            self.output.reporter(),
        )?)
    }

    fn write(&self, rel: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.watch.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}

fn changed_names(outcome: &CycleOutcome) -> Vec<String> {
    match outcome {
        CycleOutcome::Ran { changed, .. } => changed
            .iter()
            .map(|e| e.path.to_string_lossy().into_owned())
            .collect(),
        other => panic!("expected a run, got {other:?}"),
    }
}

fn settle() {
    std::thread::sleep(SETTLE);
}

#[tokio::test]
async fn first_run_then_idle_then_rerun_on_new_file() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    let mut rerun = h.build(h.config().build(), 41001)?;
    let check_marker = rerun.markers().check().path().to_path_buf();

    // Cycle 1: no marker yet, so the command runs.
    let first = rerun.cycle().await?;
    assert!(matches!(first, CycleOutcome::Ran { first: true, .. }));
    assert_eq!(h.runner.run_count(), 1);
    assert!(check_marker.exists());
    assert!(h.output.take().contains("==== finished"));

    // Cycle 2: nothing changed.
    assert_eq!(rerun.cycle().await?, CycleOutcome::Idle);
    assert_eq!(h.runner.run_count(), 1);
    assert!(h.output.take().contains("no changes found"));

    // Cycle 3: a new file triggers a rerun and is reported.
    settle();
    let new_file = h.write("newfile.txt", "")?;
    let third = rerun.cycle().await?;
    assert_eq!(changed_names(&third), vec!["newfile.txt"]);
    assert_eq!(h.runner.run_count(), 2);
    assert_eq!(
        h.runner.executed().lock().unwrap().clone(),
        vec!["echo hi".to_string(), "echo hi".to_string()]
    );

    let report = h.output.take();
    assert!(report.contains("changed since last run:"));
    assert!(report.contains("newfile.txt"));
    assert!(report.contains("rerun-check.41001"));

    // The marker now covers the triggering file.
    let marker_time = fs::metadata(&check_marker)?.modified()?;
    let file_time = fs::metadata(&new_file)?.modified()?;
    assert!(marker_time >= file_time);
    assert_eq!(rerun.state().last_run(), Some(marker_time));

    // And the same file does not trigger twice.
    assert_eq!(rerun.cycle().await?, CycleOutcome::Idle);
    Ok(())
}

#[tokio::test]
async fn hidden_and_excluded_files_do_not_trigger() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    let mut rerun = h.build(h.config().exclude_suffix(".log").build(), 41002)?;

    rerun.cycle().await?;
    settle();

    h.write(".env", "SECRET=1")?;
    h.write(".git/HEAD", "ref: refs/heads/main")?;
    h.write("pkg/__pycache__/mod.cpython-312.pyc", "bytecode")?;
    h.write("pkg/mod.pyo", "bytecode")?;
    h.write("build.log", "noise")?;

    assert_eq!(rerun.cycle().await?, CycleOutcome::Idle);
    assert_eq!(h.runner.run_count(), 1);

    h.write("pkg/mod.py", "print('hi')")?;
    let outcome = rerun.cycle().await?;
    assert_eq!(changed_names(&outcome), vec!["pkg/mod.py"]);
    Ok(())
}

#[tokio::test]
async fn modified_files_in_nested_directories_are_found() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    h.write("src/a/b/deep.rs", "fn a() {}")?;
    h.write("src/top.rs", "fn b() {}")?;

    let mut rerun = h.build(h.config().build(), 41003)?;
    rerun.cycle().await?;
    settle();

    h.write("src/a/b/deep.rs", "fn a() { changed() }")?;
    h.write("README.md", "# docs")?;

    let outcome = rerun.cycle().await?;
    assert_eq!(changed_names(&outcome), vec!["README.md", "src/a/b/deep.rs"]);
    Ok(())
}

#[tokio::test]
async fn failing_command_does_not_stop_the_loop() -> TestResult {
    init_tracing();
    let mut h = Harness::new()?;
    h.runner = FakeRunner::new().with_outcome(CommandOutcome::Failed(1));
    let mut rerun = h.build(h.config().command(&["false"]).build(), 41004)?;

    match rerun.cycle().await? {
        CycleOutcome::Ran { outcome, .. } => assert_eq!(outcome, CommandOutcome::Failed(1)),
        other => panic!("expected a run, got {other:?}"),
    }
    assert!(h.output.take().contains("[exit 1]"));

    // The marker was still touched, so the next cycle is idle.
    assert!(rerun.state().last_run().is_some());
    assert_eq!(rerun.cycle().await?, CycleOutcome::Idle);
    Ok(())
}

#[tokio::test]
async fn self_change_reloads_before_running_the_command() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    let bin_dir = tempdir()?;
    let self_path = bin_dir.path().join("rerun-script");
    fs::write(&self_path, "v1")?;

    let mut rerun = h.build(h.config().self_path(&self_path).build(), 41005)?;
    assert!(matches!(rerun.cycle().await?, CycleOutcome::Ran { .. }));

    settle();
    fs::write(&self_path, "v2")?;
    h.write("also-changed.txt", "x")?;

    assert_eq!(rerun.cycle().await?, CycleOutcome::Reload);
    assert_eq!(h.runner.run_count(), 1, "command must not run in a reload cycle");
    assert!(h.output.text().contains("own program changed"));
    Ok(())
}

#[tokio::test]
async fn missing_self_path_never_reloads() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    let config = h
        .config()
        .self_path(Path::new("/definitely/not/a/binary"))
        .build();
    let mut rerun = h.build(config, 41006)?;

    assert!(matches!(rerun.cycle().await?, CycleOutcome::Ran { .. }));
    assert_eq!(rerun.cycle().await?, CycleOutcome::Idle);
    Ok(())
}

#[tokio::test]
async fn vanished_watch_root_is_reported_as_cycle_error() -> TestResult {
    init_tracing();
    let h = Harness::new()?;
    let watch_dir = h.watch.path().join("sub");
    fs::create_dir_all(&watch_dir)?;
    let config = LoopConfigBuilder::new(&watch_dir, h.check.path()).build();
    let mut rerun = h.build(config, 41007)?;

    rerun.cycle().await?;
    fs::remove_dir_all(&watch_dir)?;

    let err = rerun.cycle().await.unwrap_err();
    assert!(format!("{err:#}").contains("scanning watch root"));
    Ok(())
}
