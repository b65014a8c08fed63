use super::{diff, result::*};
use crate::corpus::TestCase;

/// How a run treats the output of the program under test.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Grade the output against the expected output.
    Testit,
    /// Harvest the output as new expected output.
    Makeit,
    /// Show the output together with the elapsed time.
    Timeit,
}

impl Mode {
    pub fn is_graded(self) -> bool {
        self == Self::Testit
    }

    pub fn judge<'t>(self, testcase: &'t TestCase, execution: Execution) -> ExecutionResult<'t> {
        if !self.is_graded() {
            return ExecutionResult::new(testcase, execution, Status::Recorded);
        }
        match execution.termination {
            Termination::LaunchFailed(_) => {
                ExecutionResult::new(testcase, execution, Status::Errored)
            }
            Termination::TimedOut => ExecutionResult::new(testcase, execution, Status::TimedOut),
            // the exit code does not take part in grading
            Termination::Exited(_) => {
                let d = diff::compare(testcase.expected_output(), &execution.stdout);
                ExecutionResult::new(testcase, execution, d.verdict()).with_diff(d)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::corpus::{Process, SchedulerInput};

    fn testcase() -> TestCase {
        TestCase::new(
            "Basic",
            "Two Processes",
            SchedulerInput {
                quantum: 2,
                processes: vec![
                    Process {
                        arrival: 0,
                        burst: 4,
                    },
                    Process {
                        arrival: 1,
                        burst: 3,
                    },
                ],
            },
            vec![],
            vec!["P1 P2 P1 P2 P1 P2 P1".into()],
        )
    }

    fn exited(code: i32, stdout: &[&str]) -> Execution {
        Execution {
            termination: Termination::Exited(Some(code)),
            stdout: stdout.iter().map(|s| s.to_string()).collect(),
            stderr: "trace\n".into(),
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn mode_names() {
        assert_eq!(Mode::Testit.to_string(), "testit");
        assert_eq!("makeit".parse::<Mode>(), Ok(Mode::Makeit));
        assert!("runit".parse::<Mode>().is_err());
    }

    #[test]
    fn testit_passes_on_equal_output() {
        let t = testcase();
        let r = Mode::Testit.judge(&t, exited(0, &["P1 P2 P1 P2 P1 P2 P1"]));
        assert_eq!(r.status, Status::Passed);
        assert_eq!(r.diff.unwrap().verdict(), Status::Passed);
        assert_eq!(r.exit_code, Some(0));
        assert_eq!(r.stderr, "trace\n");
    }

    #[test]
    fn testit_ignores_exit_code() {
        let t = testcase();
        let r = Mode::Testit.judge(&t, exited(7, &["P1 P2 P1 P2 P1 P2 P1"]));
        assert_eq!(r.status, Status::Passed);
        assert_eq!(r.exit_code, Some(7));
    }

    #[test]
    fn testit_fails_on_different_output() {
        let t = testcase();
        let r = Mode::Testit.judge(&t, exited(0, &["P1 P2 P1 P2 P1"]));
        assert_eq!(r.status, Status::Failed);
    }

    #[test]
    fn testit_maps_launch_failure_and_timeout() {
        let t = testcase();
        let r = Mode::Testit.judge(&t, Execution::launch_failed("No such file"));
        assert_eq!(r.status, Status::Errored);
        assert_eq!(r.launch_error.as_deref(), Some("No such file"));
        assert_eq!(r.diff, None);

        let mut exe = exited(0, &["P1"]);
        exe.termination = Termination::TimedOut;
        let r = Mode::Testit.judge(&t, exe);
        assert_eq!(r.status, Status::TimedOut);
        assert_eq!(r.actual_output, ["P1"]);
        assert_eq!(r.exit_code, None);
    }

    #[test]
    fn makeit_and_timeit_only_record() {
        let t = testcase();
        for mode in [Mode::Makeit, Mode::Timeit] {
            let r = mode.judge(&t, exited(0, &["whatever"]));
            assert_eq!(r.status, Status::Recorded);
            assert_eq!(r.diff, None);
            assert_eq!(r.actual_output, ["whatever"]);
        }
    }
}
