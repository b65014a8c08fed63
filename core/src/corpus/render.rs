use super::model::*;

pub fn render_section_heading(name: &str) -> String {
    format!("# {}\n\n", name)
}

pub fn render_input(input: &SchedulerInput) -> String {
    let mut s = format!("```input\n{}\n", input.quantum);
    for p in &input.processes {
        s += &format!("{}, {}\n", p.arrival, p.burst);
    }
    s += "```\n";
    s
}

/// Render one test case in corpus format, with `output` as its expected output.
pub fn render_testcase<S: AsRef<str>>(
    title: &str,
    input: &SchedulerInput,
    extra_args: &[String],
    output: &[S],
) -> String {
    format!("## {}\n\n", title) + &render_testcase_body(input, extra_args, output)
}

/// The fenced blocks of a test case, without its heading.
///
/// `parse` drops one trailing blank line of an output block, so an extra one is
/// written when `output` itself ends with an empty line.
pub fn render_testcase_body<S: AsRef<str>>(
    input: &SchedulerInput,
    extra_args: &[String],
    output: &[S],
) -> String {
    let mut s = render_input(input);
    s += "\n";

    if !extra_args.is_empty() {
        s += &format!("```args\n{}\n```\n\n", extra_args.join(" "));
    }

    let fence = fence_for(output);
    s += &format!("{}output\n", fence);
    for line in output {
        s += line.as_ref();
        s += "\n";
    }
    if output.last().map_or(false, |l| l.as_ref().is_empty()) {
        s += "\n";
    }
    s += &format!("{}\n\n", fence);
    s
}

/// A backtick fence longer than any backtick run at the start of a line.
fn fence_for<S: AsRef<str>>(lines: &[S]) -> String {
    let longest = lines
        .iter()
        .map(|l| l.as_ref().chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::corpus::parse;

    fn sample_input() -> SchedulerInput {
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
        }
    }

    #[test]
    fn render_testcase_layout() {
        let s = render_testcase("Two Processes", &sample_input(), &[], &["P1 P2"]);
        assert_eq!(
            s,
            "## Two Processes\n\n```input\n2\n0, 4\n1, 3\n```\n\n```output\nP1 P2\n```\n\n"
        );
    }

    #[test]
    fn fence_grows_past_backtick_lines() {
        let s = render_testcase("T", &sample_input(), &[], &["a", "```", "b"]);
        assert!(s.ends_with("````output\na\n```\nb\n````\n\n"), "{}", s);
    }

    #[test]
    fn rendered_testcase_parses_back() {
        let args = vec!["--trace".to_owned()];
        let outputs: [&[&str]; 6] = [
            &[],
            &["a", "b  "],
            &["a", ""],
            &["", "", ""],
            &["a", "```", "b"],
            &["````", "```rust", ""],
        ];
        for output in outputs {
            let text = render_section_heading("S")
                + &render_testcase("T", &sample_input(), &args, output);
            let corpus = parse(&text);
            assert!(corpus.errors.is_empty(), "{}", text);
            let t = &corpus.sections[0].testcases[0];
            assert_eq!(t.input(), &sample_input());
            assert_eq!(t.extra_args(), args.as_slice());
            assert_eq!(t.expected_output(), output, "{}", text);
        }
    }
}
