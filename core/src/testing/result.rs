use std::time::Duration;

use super::diff::Diff;
use crate::corpus::TestCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// `None` when the process was terminated by a signal.
    Exited(Option<i32>),
    TimedOut,
    LaunchFailed(String),
}

/// What was observed when running the program under test once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub termination: Termination,
    pub stdout: Vec<String>,
    pub stderr: String,
    pub elapsed: Duration,
}

impl Execution {
    pub fn launch_failed(msg: impl Into<String>) -> Self {
        Self {
            termination: Termination::LaunchFailed(msg.into()),
            stdout: Vec::new(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.termination {
            Termination::Exited(code) => code,
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumIter,
)]
pub enum Status {
    #[strum(serialize = "passed")]
    Passed,
    #[strum(serialize = "failed")]
    Failed,
    #[strum(serialize = "errored")]
    Errored,
    #[strum(serialize = "timed out")]
    TimedOut,
    /// Not graded (`makeit` and `timeit`)
    #[strum(serialize = "recorded")]
    Recorded,
}

impl Status {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Errored | Self::TimedOut)
    }

    /// Short label used in badges.
    pub fn code(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Errored => "ERR",
            Self::TimedOut => "TLE",
            Self::Recorded => "DONE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult<'t> {
    pub testcase: &'t TestCase,
    pub actual_output: Vec<String>,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub launch_error: Option<String>,
    pub status: Status,
    /// Only present when the run was graded and completed.
    pub diff: Option<Diff>,
}

impl<'t> ExecutionResult<'t> {
    pub fn new(testcase: &'t TestCase, execution: Execution, status: Status) -> Self {
        let exit_code = execution.exit_code();
        let launch_error = match execution.termination {
            Termination::LaunchFailed(msg) => Some(msg),
            _ => None,
        };
        Self {
            testcase,
            actual_output: execution.stdout,
            stderr: execution.stderr,
            exit_code,
            elapsed: execution.elapsed,
            launch_error,
            status,
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: Diff) -> Self {
        self.diff = Some(diff);
        self
    }
}

/// Split captured output into lines.
///
/// A trailing newline does not produce an empty final line. Nothing else is
/// normalized (`\r` is kept).
pub fn split_lines(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    let s = s.strip_suffix('\n').unwrap_or(s);
    s.split('\n').map(str::to_owned).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_lines_ignores_single_trailing_newline() {
        assert_eq!(split_lines(""), Vec::<String>::new());
        assert_eq!(split_lines("\n"), [""]);
        assert_eq!(split_lines("a"), ["a"]);
        assert_eq!(split_lines("a\n"), ["a"]);
        assert_eq!(split_lines("a\n\n"), ["a", ""]);
        assert_eq!(split_lines("a \r\nb"), ["a \r", "b"]);
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::TimedOut.to_string(), "timed out");
        assert_eq!(Status::Passed.code(), "PASS");
        assert!(Status::Errored.is_failure());
        assert!(!Status::Recorded.is_failure());
    }
}
