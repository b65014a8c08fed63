use std::collections::{HashMap, HashSet};

use lazy_regex::{lazy_regex, Lazy, Regex};

use super::{error::CorpusError, model::*};

static RE_SECTION: Lazy<Regex> = lazy_regex!(r"^#[ \t]+(.*\S)\s*$");
static RE_TESTCASE: Lazy<Regex> = lazy_regex!(r"^##[ \t]+(.*\S)\s*$");
static RE_FENCE_OPEN: Lazy<Regex> = lazy_regex!(r"^(`{3,})([^`]*)$");
static RE_FENCE_CLOSE: Lazy<Regex> = lazy_regex!(r"^(`{3,})\s*$");

fn capture<'l>(re: &Regex, line: &'l str) -> Option<&'l str> {
    re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// The backtick run and the tag of an opening fence.
fn fence_open(line: &str) -> Option<(&str, &str)> {
    let c = RE_FENCE_OPEN.captures(line)?;
    Some((c.get(1)?.as_str(), c.get(2)?.as_str()))
}

/// Parse a markdown test corpus.
///
/// ````text
/// # Basic
///
/// ## Two Processes
///
/// ```input
/// 2
/// 0, 4
/// 1, 3
/// ```
///
/// ```output
/// P1 P2 P1 P2 P1 P2 P1
/// ```
/// ````
///
/// Malformed entries are dropped and reported in [`Corpus::errors`]; they never
/// stop the remaining entries from being parsed.
pub fn parse(text: &str) -> Corpus {
    let mut p = Parser::default();
    for (i, line) in text.split('\n').enumerate() {
        p.feed(i + 1, line);
    }
    p.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Input,
    Output,
    Args,
    Other,
}

impl BlockKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "input" => Self::Input,
            "output" => Self::Output,
            "args" => Self::Args,
            _ => Self::Other,
        }
    }

    fn field(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Args => "args",
            Self::Other => "block",
        }
    }
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    /// Number of backticks of the opening fence; a closing fence needs at least as many.
    fence: usize,
    line: usize,
    lines: Vec<String>,
}

#[derive(Debug)]
struct Pending {
    section: Option<String>,
    title: String,
    line: usize,
    input: Option<Block>,
    output: Option<Block>,
    args: Option<Block>,
    /// First structural problem found while reading the entry: (field, line, reason)
    defect: Option<(String, usize, String)>,
}

#[derive(Debug, Default)]
struct Parser {
    corpus: Corpus,
    current_section: Option<String>,
    pending: Option<Pending>,
    block: Option<Block>,
    seen_titles: HashMap<String, HashSet<String>>,
}

impl Parser {
    fn feed(&mut self, lineno: usize, line: &str) {
        if let Some(block) = &mut self.block {
            let closes = RE_FENCE_CLOSE
                .captures(line)
                .and_then(|c| c.get(1))
                .map_or(false, |m| m.as_str().len() >= block.fence);
            if closes {
                self.close_block();
            } else {
                block.lines.push(line.to_owned());
            }
            return;
        }

        if let Some(title) = capture(&RE_TESTCASE, line) {
            self.flush_pending();
            self.pending = Some(Pending {
                section: self.current_section.clone(),
                title: title.to_owned(),
                line: lineno,
                input: None,
                output: None,
                args: None,
                defect: None,
            });
        } else if let Some(name) = capture(&RE_SECTION, line) {
            self.flush_pending();
            self.open_section(name);
        } else if let Some((fence, tag)) = fence_open(line) {
            self.block = Some(Block {
                kind: BlockKind::from_tag(tag.trim()),
                fence: fence.len(),
                line: lineno,
                lines: Vec::new(),
            });
        }
        // Anything else outside a block is prose.
    }

    fn finish(mut self) -> Corpus {
        let unterminated = self.block.take().filter(|b| b.kind != BlockKind::Other);
        if let (Some(block), Some(pending)) = (unterminated, &mut self.pending) {
            pending.defect.get_or_insert((
                block.kind.field().to_owned(),
                block.line,
                "unterminated block (missing closing ```)".to_owned(),
            ));
        }
        self.flush_pending();
        self.corpus
    }

    fn open_section(&mut self, name: &str) {
        if self.corpus.section(name).is_none() {
            self.corpus.sections.push(Section::new(name));
        }
        self.current_section = Some(name.to_owned());
    }

    fn close_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        let Some(pending) = &mut self.pending else {
            return; // a code block outside of any test case
        };
        let slot = match block.kind {
            BlockKind::Input => &mut pending.input,
            BlockKind::Output => &mut pending.output,
            BlockKind::Args => &mut pending.args,
            BlockKind::Other => return,
        };
        if slot.is_some() {
            pending.defect.get_or_insert((
                block.kind.field().to_owned(),
                block.line,
                format!("more than one `{}` block", block.kind.field()),
            ));
        } else {
            *slot = Some(block);
        }
    }

    fn flush_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let section_name = pending.section.clone().unwrap_or_default();
        let title = pending.title.clone();
        let line = pending.line;

        let seen = self
            .seen_titles
            .entry(section_name.clone())
            .or_default();
        if !seen.insert(title.clone()) {
            self.corpus.errors.push(CorpusError::DuplicateTestCase {
                section: section_name,
                title,
                line,
            });
            return;
        }

        match build_testcase(pending) {
            Ok(t) => {
                // the section was registered when its heading was read
                if let Some(section) = self
                    .corpus
                    .sections
                    .iter_mut()
                    .find(|s| s.name == section_name)
                {
                    section.testcases.push(t);
                }
            }
            Err((field, line, reason)) => self.corpus.errors.push(CorpusError::Format {
                section: section_name,
                title,
                field,
                line,
                reason,
            }),
        }
    }
}

type Defect = (String, usize, String);

fn build_testcase(pending: Pending) -> Result<TestCase, Defect> {
    let Some(section) = pending.section else {
        return Err((
            "section".to_owned(),
            pending.line,
            "test case appears before any section heading".to_owned(),
        ));
    };
    if let Some(defect) = pending.defect {
        return Err(defect);
    }
    let Some(input) = pending.input else {
        return Err(missing_block("input", pending.line));
    };
    let Some(output) = pending.output else {
        return Err(missing_block("output", pending.line));
    };

    let input = parse_input(&input)?;
    let extra_args = pending
        .args
        .map(|b| {
            b.lines
                .iter()
                .flat_map(|l| l.split_whitespace())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let mut expected = output.lines;
    if expected.last().map_or(false, |l| l.is_empty()) {
        expected.pop();
    }

    Ok(TestCase::new(
        section,
        pending.title,
        input,
        extra_args,
        expected,
    ))
}

fn missing_block(field: &str, line: usize) -> Defect {
    (
        field.to_owned(),
        line,
        format!("missing ```{} block", field),
    )
}

fn tokens(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_input(block: &Block) -> Result<SchedulerInput, Defect> {
    let mut rows = block
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| (block.line + i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((qline, first)) = rows.next() else {
        return Err((
            "quantum".to_owned(),
            block.line,
            "input block is empty, expected a quantum".to_owned(),
        ));
    };
    let quantum = match tokens(first).as_slice() {
        [q] => match q.parse::<u32>() {
            Ok(0) => Err("quantum must be positive".to_owned()),
            Ok(q) => Ok(q),
            Err(_) => Err(format!("`{}` is not a positive integer", q)),
        },
        _ => Err(format!(
            "expected a single quantum value, found `{}`",
            first.trim()
        )),
    }
    .map_err(|reason| ("quantum".to_owned(), qline, reason))?;

    let mut processes = Vec::new();
    for (nth, (lineno, row)) in rows.enumerate() {
        let field = format!("process {}", nth + 1);
        let cols = tokens(row);
        let [arrival, burst] = cols.as_slice() else {
            return Err((
                field,
                lineno,
                format!("expected `arrival, burst`, found `{}`", row.trim()),
            ));
        };
        let num = |name: &str, s: &str| {
            s.parse::<u64>().map_err(|_| {
                (
                    field.clone(),
                    lineno,
                    format!("{} `{}` is not a non-negative integer", name, s),
                )
            })
        };
        processes.push(Process {
            arrival: num("arrival time", *arrival)?,
            burst: num("burst time", *burst)?,
        });
    }

    Ok(SchedulerInput { quantum, processes })
}
