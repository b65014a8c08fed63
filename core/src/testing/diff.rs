use super::result::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LineTag {
    Match,
    /// Both sides have a line and they differ.
    Mismatch,
    /// Only the expected output has a line here.
    Missing,
    /// Only the actual output has a line here.
    Extra,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub index: usize,
    pub tag: LineTag,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub lines: Vec<DiffLine>,
}

/// Positional line-by-line comparison, up to the length of the longer side.
pub fn compare<E, A>(expected: &[E], actual: &[A]) -> Diff
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    let len = expected.len().max(actual.len());
    let lines = (0..len)
        .map(|index| {
            let e = expected.get(index).map(|s| s.as_ref());
            let a = actual.get(index).map(|s| s.as_ref());
            let tag = match (e, a) {
                (Some(e), Some(a)) if e == a => LineTag::Match,
                (Some(_), Some(_)) => LineTag::Mismatch,
                (Some(_), None) => LineTag::Missing,
                (None, _) => LineTag::Extra,
            };
            DiffLine {
                index,
                tag,
                expected: e.map(str::to_owned),
                actual: a.map(str::to_owned),
            }
        })
        .collect();
    Diff { lines }
}

impl Diff {
    pub fn verdict(&self) -> Status {
        if self.lines.iter().all(|l| l.tag == LineTag::Match) {
            Status::Passed
        } else {
            Status::Failed
        }
    }

    pub fn count(&self, tag: LineTag) -> usize {
        self.lines.iter().filter(|l| l.tag == tag).count()
    }

    pub fn first(&self, tag: LineTag) -> Option<&DiffLine> {
        self.lines.iter().find(|l| l.tag == tag)
    }

    /// Body of a fenced `diff` block: `  ` for matching lines, `-` expected, `+` actual.
    pub fn to_unified_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len());
        for l in &self.lines {
            let e = l.expected.as_deref().unwrap_or_default();
            let a = l.actual.as_deref().unwrap_or_default();
            match l.tag {
                LineTag::Match => out.push(format!("  {}", e)),
                LineTag::Mismatch => {
                    out.push(format!("- {}", e));
                    out.push(format!("+ {}", a));
                }
                LineTag::Missing => out.push(format!("- {}", e)),
                LineTag::Extra => out.push(format!("+ {}", a)),
            }
        }
        out
    }
}
