pub mod table;

use std::path::{Path, PathBuf};
use std::time::Duration;

use strum::IntoEnumIterator as _;

use self::table::{markdown_table, Align};
use crate::corpus::{self, CorpusError, UnknownSectionError};
use crate::testing::{ExecutionResult, Mode, Status};

/// Elapsed time in milliseconds with microsecond resolution.
pub fn format_elapsed(d: Duration) -> String {
    format!("{:.3} ms", d.as_secs_f64() * 1000.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub timed_out: usize,
    pub recorded: usize,
}

impl Tally {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Errored => self.errored += 1,
            Status::TimedOut => self.timed_out += 1,
            Status::Recorded => self.recorded += 1,
        }
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Passed => self.passed,
            Status::Failed => self.failed,
            Status::Errored => self.errored,
            Status::TimedOut => self.timed_out,
            Status::Recorded => self.recorded,
        }
    }

    pub fn total(&self) -> usize {
        Status::iter().map(|s| self.get(s)).sum()
    }

    pub fn num_failures(&self) -> usize {
        self.failed + self.errored + self.timed_out
    }

    fn of<'a, 't: 'a>(results: impl IntoIterator<Item = &'a ExecutionResult<'t>>) -> Self {
        results.into_iter().fold(Self::default(), |mut t, r| {
            t.add(r.status);
            t
        })
    }
}

#[derive(Debug, Clone)]
pub struct SectionReport<'t> {
    pub name: String,
    pub results: Vec<ExecutionResult<'t>>,
}

impl<'t> SectionReport<'t> {
    pub fn tally(&self) -> Tally {
        Tally::of(&self.results)
    }
}

/// Markdown report of one run.
#[derive(Debug, Clone)]
pub struct Report<'t> {
    mode: Mode,
    verbose: bool,
    sections: Vec<SectionReport<'t>>,
    corpus_errors: Vec<CorpusError>,
    unknown_sections: Option<UnknownSectionError>,
    suite: Option<PathBuf>,
}

impl<'t> Report<'t> {
    pub fn new(mode: Mode, verbose: bool) -> Self {
        Self {
            mode,
            verbose,
            sections: Vec::new(),
            corpus_errors: Vec::new(),
            unknown_sections: None,
            suite: None,
        }
    }

    /// Corpus document the report was made from.
    pub fn suite(mut self, corpus_path: impl AsRef<Path>) -> Self {
        self.suite = Some(corpus_path.as_ref().to_owned());
        self
    }

    pub fn corpus_errors(mut self, errors: &[CorpusError]) -> Self {
        self.corpus_errors = errors.to_vec();
        self
    }

    pub fn unknown_sections(mut self, error: Option<UnknownSectionError>) -> Self {
        self.unknown_sections = error;
        self
    }

    pub fn push_section(&mut self, name: impl Into<String>, results: Vec<ExecutionResult<'t>>) {
        self.sections.push(SectionReport {
            name: name.into(),
            results,
        });
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sections(&self) -> &[SectionReport<'t>] {
        &self.sections
    }

    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult<'t>> {
        self.sections.iter().flat_map(|s| s.results.iter())
    }

    pub fn tally(&self) -> Tally {
        Tally::of(self.results())
    }

    pub fn num_malformed(&self) -> usize {
        self.corpus_errors.len()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.results().map(|r| r.elapsed).sum()
    }

    /// False when grading found a failing test case or malformed corpus entries.
    pub fn is_success(&self) -> bool {
        !self.mode.is_graded() || (self.tally().num_failures() == 0 && self.num_malformed() == 0)
    }

    pub fn render(&self) -> String {
        let mut out: Vec<String> = Vec::new();
        self.render_notices(&mut out);

        if self.tally().total() == 0 {
            out.push("No test cases were run.".to_owned());
            out.push(String::new());
        }

        match self.mode {
            Mode::Testit => self.render_testit(&mut out),
            Mode::Makeit => self.render_makeit(&mut out),
            Mode::Timeit => self.render_timeit(&mut out),
        }

        while out.last().map_or(false, |l| l.is_empty()) {
            out.pop();
        }
        let mut s = out.join("\n");
        s.push('\n');
        s
    }

    // Quote lines are ignored by the corpus parser, so `makeit` output stays parsable.
    fn render_notices(&self, out: &mut Vec<String>) {
        let before = out.len();
        if let Some(e) = &self.unknown_sections {
            out.push(format!("> {}", e));
        }
        for e in &self.corpus_errors {
            out.push(format!("> {}", e));
        }
        if out.len() > before {
            out.push(String::new());
        }
    }

    fn render_testit(&self, out: &mut Vec<String>) {
        for section in &self.sections {
            out.push(format!("# {}", section.name));
            out.push(String::new());

            let mut shown = 0;
            for r in &section.results {
                if r.status == Status::Passed && !self.verbose {
                    continue;
                }
                shown += 1;
                render_graded_result(r, out);
            }
            if shown == 0 && !section.results.is_empty() {
                out.push(format!(
                    "All {} test cases passed.",
                    section.results.len()
                ));
                out.push(String::new());
            }
        }
        self.render_tally(out);
    }

    fn render_tally(&self, out: &mut Vec<String>) {
        let columns = [Status::Passed, Status::Failed, Status::Errored, Status::TimedOut];
        let header: Vec<String> = std::iter::once("section".to_owned())
            .chain(columns.iter().map(Status::to_string))
            .collect();
        let header: Vec<&str> = header.iter().map(String::as_str).collect();

        let row = |name: String, t: Tally| {
            std::iter::once(name)
                .chain(columns.iter().map(|&s| t.get(s).to_string()))
                .collect::<Vec<_>>()
        };
        let mut rows: Vec<Vec<String>> = self
            .sections
            .iter()
            .map(|s| row(s.name.clone(), s.tally()))
            .collect();
        let total = self.tally();
        rows.push(row("**total**".to_owned(), total));

        out.push("# Summary".to_owned());
        out.push(String::new());
        out.extend(markdown_table(
            &header,
            &rows,
            &[Align::Left, Align::Right, Align::Right, Align::Right, Align::Right],
        ));
        out.push(String::new());
        self.push_suite(out);
        out.push(format!("- score: {}/{}", total.passed, total.total()));
        out.push(format!("- malformed corpus entries: {}", self.num_malformed()));
        if let Some(e) = &self.unknown_sections {
            out.push(format!("- unknown sections: {}", e.names.join(", ")));
        }
        out.push(String::new());
    }

    fn push_suite(&self, out: &mut Vec<String>) {
        if let Some(path) = &self.suite {
            out.push(format!("- suite: {}", path.to_string_lossy()));
        }
    }

    fn render_makeit(&self, out: &mut Vec<String>) {
        for section in &self.sections {
            out.push(corpus::render_section_heading(&section.name).trim_end().to_owned());
            out.push(String::new());
            for r in &section.results {
                let t = r.testcase;
                out.push(format!("## {}", t.title()));
                out.push(String::new());
                if let Some(notice) = run_problem(r) {
                    out.push(format!("> {}", notice));
                    out.push(String::new());
                }
                let body = corpus::render_testcase_body(t.input(), t.extra_args(), &r.actual_output);
                // `lines()` would swallow the trailing blank line of the body
                out.extend(body.trim_end_matches('\n').split('\n').map(str::to_owned));
                out.push(String::new());
            }
        }
    }

    fn render_timeit(&self, out: &mut Vec<String>) {
        for section in &self.sections {
            out.push(format!("# {}", section.name));
            out.push(String::new());
            for r in &section.results {
                let t = r.testcase;
                out.push(format!("## {}", t.title()));
                out.push(String::new());

                let rows: Vec<Vec<String>> = t
                    .input()
                    .processes
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        vec![
                            (i + 1).to_string(),
                            p.arrival.to_string(),
                            p.burst.to_string(),
                        ]
                    })
                    .collect();
                out.push(format!("quantum: {}", t.input().quantum));
                out.push(String::new());
                if !rows.is_empty() {
                    out.extend(markdown_table(
                        &["pid", "arrival", "burst"],
                        &rows,
                        &[Align::Right, Align::Right, Align::Right],
                    ));
                    out.push(String::new());
                }

                if let Some(notice) = run_problem(r) {
                    out.push(format!("> {}", notice));
                    out.push(String::new());
                }
                push_fenced(out, "text", &r.actual_output);
                out.push(format!("elapsed: {}", format_elapsed(r.elapsed)));
                out.push(String::new());
            }
        }

        let n = self.tally().total();
        let total = self.total_elapsed();
        out.push("# Timing".to_owned());
        out.push(String::new());
        self.push_suite(out);
        out.push(format!("- test cases: {}", n));
        out.push(format!("- total time: {}", format_elapsed(total)));
        if n > 0 {
            out.push(format!("- average time: {}", format_elapsed(total.div_f64(n as f64))));
        }
        out.push(String::new());
    }
}

/// Why a run produced no regular output, if it did not.
fn run_problem(r: &ExecutionResult) -> Option<String> {
    if let Some(e) = &r.launch_error {
        return Some(format!("Failed to run: {}", e));
    }
    match r.exit_code {
        None => Some(format!(
            "Terminated without exit code after {} (timed out or killed by a signal)",
            format_elapsed(r.elapsed)
        )),
        Some(0) => None,
        Some(code) => Some(format!("Exited with code {}", code)),
    }
}

fn push_fenced<S: AsRef<str>>(out: &mut Vec<String>, tag: &str, lines: &[S]) {
    out.push(format!("```{}", tag));
    out.extend(lines.iter().map(|l| l.as_ref().to_owned()));
    out.push("```".to_owned());
    out.push(String::new());
}

fn render_graded_result(r: &ExecutionResult, out: &mut Vec<String>) {
    out.push(format!("## {}", r.testcase.title()));
    out.push(String::new());

    let exit = match r.exit_code {
        Some(code) => format!("exit code: {}", code),
        None => "exit code: none".to_owned(),
    };
    out.push(format!(
        "**{}** ({}, elapsed: {})",
        r.status.to_string().to_uppercase(),
        exit,
        format_elapsed(r.elapsed)
    ));
    out.push(String::new());

    match r.status {
        Status::Passed => return,
        Status::Errored => {
            if let Some(e) = &r.launch_error {
                out.push(format!("> {}", e));
                out.push(String::new());
            }
        }
        Status::TimedOut => {
            out.push("> Time limit exceeded; the process was killed. Partial output:".to_owned());
            out.push(String::new());
            push_fenced(out, "text", &r.actual_output);
        }
        Status::Failed | Status::Recorded => {}
    }

    if let Some(diff) = &r.diff {
        push_fenced(out, "diff", &diff.to_unified_lines());
    }
    if !r.stderr.is_empty() {
        let stderr: Vec<&str> = r.stderr.trim_end_matches('\n').split('\n').collect();
        push_fenced(out, "stderr", &stderr);
    }
}
