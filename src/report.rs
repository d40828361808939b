// src/report.rs

//! Console status output.
//!
//! Everything the loop prints between command runs goes through
//! [`Reporter`]. The text is meant for humans; nothing parses it.

use std::io::{self, Write};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::exec::CommandOutcome;
use crate::watch::FileEntry;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Reporter {
    out: Box<dyn Write + Send>,
    clear_screen: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("clear_screen", &self.clear_screen)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, clear_screen: bool) -> Self {
        Self { out, clear_screen }
    }

    pub fn stdout(clear_screen: bool) -> Self {
        Self::new(Box::new(io::stdout()), clear_screen)
    }

    /// Start-of-cycle status, left open so the outcome lands on the same line.
    pub fn checking(&mut self) -> io::Result<()> {
        write!(self.out, "CHECKING... ")?;
        self.out.flush()
    }

    pub fn no_changes(&mut self, at: DateTime<Local>) -> io::Result<()> {
        writeln!(self.out, "no changes found {}", at.format(TIMESTAMP_FORMAT))?;
        self.out.flush()
    }

    /// Wipe the screen before a run.
    ///
    /// Issued twice: some terminals leave the previous screen in scrollback
    /// after a single clear.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.clear_screen {
            for _ in 0..2 {
                execute!(self.out, Clear(ClearType::All), Clear(ClearType::Purge), MoveTo(0, 0))?;
            }
        } else {
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    pub fn run_finished(
        &mut self,
        at: DateTime<Local>,
        outcome: &CommandOutcome,
    ) -> io::Result<()> {
        let status = match outcome {
            CommandOutcome::Success => "ok".to_string(),
            CommandOutcome::Failed(code) => format!("exit {code}"),
            CommandOutcome::NotStarted(reason) => format!("not started: {reason}"),
        };
        writeln!(
            self.out,
            "==== finished {} [{}] ====",
            at.format(TIMESTAMP_FORMAT),
            status
        )?;
        self.out.flush()
    }

    /// The files that caused this rerun, then the previous run's marker for
    /// reference.
    pub fn triggered_by(
        &mut self,
        changed: &[FileEntry],
        previous: Option<&FileEntry>,
    ) -> io::Result<()> {
        writeln!(self.out, "changed since last run:")?;
        for entry in changed {
            writeln!(self.out, "  {}", format_listing(entry))?;
        }
        if let Some(marker) = previous {
            writeln!(self.out, "last run:")?;
            writeln!(self.out, "  {}", format_listing(marker))?;
        }
        self.out.flush()
    }

    pub fn reloading(&mut self) -> io::Result<()> {
        writeln!(self.out, "own program changed, restarting")?;
        self.out.flush()
    }

    pub fn cycle_error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "error: {message}")?;
        self.out.flush()
    }
}

pub fn format_timestamp(at: SystemTime) -> String {
    DateTime::<Local>::from(at).format(TIMESTAMP_FORMAT).to_string()
}

/// `ls -l` style permission string, e.g. `-rw-r--r--`.
pub fn format_mode(mode: Option<u32>) -> String {
    let Some(mode) = mode else {
        return "----------".to_string();
    };

    let kind = match mode & 0o170000 {
        0o040000 => 'd',
        0o120000 => 'l',
        _ => '-',
    };

    let mut s = String::with_capacity(10);
    s.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

/// One long-format listing line: permissions, size, mtime, path.
pub fn format_listing(entry: &FileEntry) -> String {
    format!(
        "{} {:>10} {} {}",
        format_mode(entry.mode),
        entry.len,
        format_timestamp(entry.modified),
        entry.path.display()
    )
}
