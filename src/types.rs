use std::fmt;

/// Suffixes ignored by change detection unless overridden on the command line.
///
/// These are interpreter bytecode caches that get rewritten as a side effect
/// of running the watched command, so watching them would rerun forever.
pub const DEFAULT_EXCLUDED_SUFFIXES: &[&str] = &[".pyc", ".pyo"];

/// Which of the two per-process marker files a [`crate::marker::Marker`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Touched after every command run; the change-detection baseline.
    Check,
    /// Written once at startup; the baseline for self-reload detection.
    Exec,
}

impl MarkerKind {
    /// File name stem, before the `.<pid>` suffix.
    pub fn stem(self) -> &'static str {
        match self {
            MarkerKind::Check => "rerun-check",
            MarkerKind::Exec => "rerun-exec",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// How the command vector is handed to the operating system.
///
/// - `Shell`: the words are joined with spaces and evaluated by the platform
///   shell (`sh -c` / `cmd /C`), so pipes, globs and `&&` work (default).
/// - `Direct`: the first word is the program, the rest its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellMode {
    #[default]
    Shell,
    Direct,
}
