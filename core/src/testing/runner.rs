use std::{
    ffi::OsString,
    io::Write as _,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::result::*;
use crate::corpus::TestCase;

/// How to start the program under test.
///
/// `args` come before the generated arguments, so an interpreter can be used as
/// `program` with the script in `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ProgramCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Runs the program under test for a single test case.
#[async_trait]
pub trait Executor {
    async fn execute(&self, testcase: &TestCase, extra_args: &[String]) -> Execution;
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    cmd: ProgramCommand,
    execution_time_limit: Duration,
}

impl TestRunner {
    pub const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_secs(10);

    pub fn new(cmd: ProgramCommand) -> Self {
        Self {
            cmd,
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
        }
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    pub fn get_command(&self) -> &ProgramCommand {
        &self.cmd
    }

    pub fn get_exec_time_limit(&self) -> Duration {
        self.execution_time_limit
    }

    fn make_args(
        &self,
        input_file: &Path,
        testcase: &TestCase,
        extra_args: &[String],
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.cmd.args.iter().map(OsString::from).collect();
        args.push(input_file.into());
        args.push(testcase.input().quantum.to_string().into());
        args.extend(testcase.extra_args().iter().map(OsString::from));
        args.extend(extra_args.iter().map(OsString::from));
        args
    }

    /// Run the program once. `Err` means it could not be started or talked to.
    pub async fn run(&self, testcase: &TestCase, extra_args: &[String]) -> anyhow::Result<Execution> {
        // Removed when dropped, whichever way this function returns.
        let mut input_file =
            NamedTempFile::new().context("Failed to create temporary input file")?;
        input_file
            .write_all(testcase.input().to_input_file().as_bytes())
            .and_then(|_| input_file.flush())
            .context("Failed to write temporary input file")?;

        let args = self.make_args(input_file.path(), testcase, extra_args);
        log::debug!("Running {:?} {:?}", self.cmd.program, args);

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let mut cmd = Command::new(&self.cmd.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // own process group, so that a timeout also reaches whatever it spawned
        #[cfg(unix)]
        cmd.process_group(0);

        let mut proc = cmd.spawn().with_context(|| {
            format!("Failed to spawn '{}'", self.cmd.program.to_string_lossy())
        })?;
        let pid = proc.id();
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let start_at = tokio::time::Instant::now();
        let res = {
            let fut_stdout = tokio::io::copy(&mut stdout, &mut stdout_buf);
            let fut_stderr = tokio::io::copy(&mut stderr, &mut stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.execution_time_limit, async {
                tokio::try_join!(fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await
        };
        let elapsed = start_at.elapsed();

        let termination = match res {
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                // kill() also reaps the child
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill timed out process: {:#}", e));
                Termination::TimedOut
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok((_, _, exit_status))) => Termination::Exited(exit_status.code()),
        };

        Ok(Execution {
            termination,
            stdout: split_lines(&String::from_utf8_lossy(&stdout_buf)),
            stderr: String::from_utf8_lossy(&stderr_buf).into(),
            elapsed,
        })
    }
}

#[async_trait]
impl Executor for TestRunner {
    async fn execute(&self, testcase: &TestCase, extra_args: &[String]) -> Execution {
        self.run(testcase, extra_args)
            .await
            .unwrap_or_else(|e| Execution::launch_failed(format!("{:#}", e)))
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: killpg has no memory-safety preconditions
    let ret = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if ret != 0 {
        log::warn!(
            "Failed to kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Run `cmd` in `dir` with `<shell> -c <cmd>`, failing unless it exits with 0.
pub async fn run_shell(shell: &Path, cmd: &str, dir: &Path) -> anyhow::Result<()> {
    let status = Command::new(shell)
        .args(["-c", cmd])
        .current_dir(dir)
        .status()
        .await
        .with_context(|| format!("Failed to spawn '{} -c {}'", shell.to_string_lossy(), cmd))?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => bail!("'{}' failed: exitcode={}", cmd, code),
        None => bail!("'{}' failed: process terminated by signal", cmd),
    }
}
