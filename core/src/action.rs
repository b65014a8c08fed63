pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};

    use std::path::PathBuf;

    /// Problems that abort a run before any test case executes.
    #[derive(Debug, thiserror::Error)]
    pub enum PreflightError {
        #[error("Missing {role} '{}': {source}", .path.to_string_lossy())]
        MissingCollaborator {
            role: &'static str,
            path: PathBuf,
            #[source]
            source: fsutil::Error,
        },

        #[error("Build failed: {0}")]
        BuildFailed(String),
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use error::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::corpus::{self, Corpus, TestCase};
use crate::report::{format_elapsed, Report};
use crate::style;
use crate::testing::{run_shell, Executor, Mode, TestRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: Mode,
    /// Empty means every section.
    pub sections: Vec<String>,
    pub verbose: bool,
    /// Forwarded to every run, after the test case's own extra args.
    pub extra_args: Vec<String>,
}

impl RunOptions {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            sections: Vec::new(),
            verbose: false,
            extra_args: Vec::new(),
        }
    }
}

fn require_file(role: &'static str, path: PathBuf) -> StdResult<(), PreflightError> {
    fsutil::ensure_file(&path)
        .map_err(|source| PreflightError::MissingCollaborator { role, path, source })
}

type StdResult<T, E> = std::result::Result<T, E>;

/// Check that every file needed before building is present.
pub fn preflight(cfg: &Config) -> StdResult<(), PreflightError> {
    for path in cfg.required_file_paths() {
        require_file("required file", path)?;
    }
    require_file("corpus document", cfg.corpus_path())
}

pub fn ensure_program(cfg: &Config) -> StdResult<(), PreflightError> {
    if cfg.is_program_on_path() {
        return Ok(());
    }
    require_file("program under test", cfg.program_path())
}

pub async fn build(cfg: &Config) -> StdResult<(), PreflightError> {
    let b = &cfg.build;
    log::info!("Building: {}", b.command);
    run_shell(&b.shell, &b.command, &cfg.base_dir())
        .await
        .map_err(|e| PreflightError::BuildFailed(format!("{:#}", e)))
}

/// Failures are only logged; the report has already been written.
pub async fn clean(cfg: &Config) {
    let b = &cfg.build;
    let Some(cmd) = &b.clean else {
        return;
    };
    log::info!("Cleaning: {}", cmd);
    if let Err(e) = run_shell(&b.shell, cmd, &cfg.base_dir()).await {
        log::warn!("Clean command failed: {:#}", e);
    }
}

pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus> {
    let text = fsutil::read_to_string(&path).context("Failed to load test corpus")?;
    let corpus = corpus::parse(&text);
    log::info!(
        "Loaded {} test cases in {} sections from {}",
        corpus.num_testcases(),
        corpus.sections.len(),
        path.as_ref().to_string_lossy()
    );
    for e in &corpus.errors {
        log::warn!("{}", e);
    }
    Ok(corpus)
}

fn spinner(t: &TestCase) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(format!("{} / {} ...", t.section(), t.title()));
    bar.enable_steady_tick(Duration::from_millis(50));
    bar
}

/// Run the selected test cases one after another, in corpus order.
pub async fn run_suite<'c, E>(corpus: &'c Corpus, executor: &E, opts: &RunOptions) -> Report<'c>
where
    E: Executor + ?Sized,
{
    let filtered = corpus::filter(corpus, &opts.sections);
    if let Some(e) = &filtered.error {
        log::warn!("{}", e);
    }

    let mut report = Report::new(opts.mode, opts.verbose)
        .corpus_errors(&corpus.errors)
        .unknown_sections(filtered.error.clone());

    for section in filtered.sections {
        let mut results = Vec::with_capacity(section.testcases.len());
        for t in &section.testcases {
            let bar = spinner(t);
            let execution = executor.execute(t, &opts.extra_args).await;
            let res = opts.mode.judge(t, execution);
            bar.finish_with_message(
                format!(
                    "{} / {} ... {} [{}]",
                    t.section(),
                    t.title(),
                    style::status_badge(res.status),
                    format_elapsed(res.elapsed),
                )
                .cyan()
                .to_string(),
            );
            results.push(res);
        }
        report.push_section(&section.name, results);
    }
    report
}

/// Preflight, build, run, write the report, clean.
///
/// Returns whether the run counts as successful (see [`Report::is_success`]).
pub async fn do_run(cfg: &Config, opts: &RunOptions, output: Option<&Path>) -> Result<bool> {
    preflight(cfg)?;
    if cfg.build.enabled {
        build(cfg).await?;
    }

    let res = run_and_report(cfg, opts, output).await;

    if cfg.build.enabled {
        clean(cfg).await;
    }
    res
}

async fn run_and_report(cfg: &Config, opts: &RunOptions, output: Option<&Path>) -> Result<bool> {
    ensure_program(cfg)?;
    let corpus = load_corpus(cfg.corpus_path())?;

    let runner = TestRunner::new(cfg.program_command()).execution_time_limit(cfg.timeout());
    log::info!(
        "Running ({}): {} [time limit {}]",
        opts.mode,
        runner.get_command().program.to_string_lossy(),
        format_elapsed(runner.get_exec_time_limit()),
    );

    let report = run_suite(&corpus, &runner, opts)
        .await
        .suite(cfg.corpus_path());
    let text = report.render();
    match output {
        Some(path) => {
            fsutil::write_with_mkdir(path, &text).context("Failed to write report")?;
            log::info!("Report written to {}", path.to_string_lossy());
        }
        None => print!("{}", text),
    }

    if opts.mode.is_graded() {
        eprintln!(
            "{}",
            style::summary_line(&report.tally(), report.num_malformed())
        );
    } else {
        log::info!("Recorded {} test cases", report.tally().total());
    }
    Ok(report.is_success())
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_dir() -> tempfile::TempDir {
        tempfile::Builder::new().prefix("rrtest-action").tempdir().unwrap()
    }

    #[test]
    fn preflight_reports_missing_corpus() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let mut cfg = Config::default();
        cfg.source_config_file = Some(dir.join(Config::FILENAME));

        match preflight(&cfg) {
            Err(PreflightError::MissingCollaborator { role, path, .. }) => {
                assert_eq!(role, "corpus document");
                assert_eq!(path, dir.join("unit_tests.md"));
            }
            r => panic!("unexpected {:?}", r),
        }

        fsutil::write(dir.join("unit_tests.md"), "# S\n").unwrap();
        assert!(preflight(&cfg).is_ok());

        cfg.required_files = vec!["README.md".into()];
        assert!(matches!(
            preflight(&cfg),
            Err(PreflightError::MissingCollaborator { role: "required file", .. })
        ));
    }

    #[test]
    fn program_on_path_is_not_checked() {
        let mut cfg = Config::default();
        cfg.source_config_file = Some(PathBuf::from("/surely/not/here/rrtest.toml"));
        assert!(ensure_program(&cfg).is_err());
        cfg.program.path = "sh".into();
        assert!(ensure_program(&cfg).is_ok());
    }

    #[tokio::test]
    async fn build_failure_is_fatal() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let mut cfg = Config::default();
        cfg.source_config_file = Some(dir.join(Config::FILENAME));
        cfg.build.command = "echo built > built.txt".to_owned();
        build(&cfg).await.unwrap();
        assert!(dir.join("built.txt").is_file());

        cfg.build.command = "exit 4".to_owned();
        let e = build(&cfg).await.unwrap_err();
        assert!(matches!(e, PreflightError::BuildFailed(_)));
        assert_eq!(e.to_string(), "Build failed: 'exit 4' failed: exitcode=4");
    }
}
