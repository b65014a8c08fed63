use super::{error::UnknownSectionError, model::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered<'c> {
    pub sections: Vec<&'c Section>,
    pub error: Option<UnknownSectionError>,
}

impl<'c> Filtered<'c> {
    pub fn num_testcases(&self) -> usize {
        self.sections.iter().map(|s| s.testcases.len()).sum()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Keep only the sections named in `requested`, in corpus order.
///
/// Names are matched case-insensitively. An empty request selects every section.
/// Requested names that match nothing are reported in [`Filtered::error`].
pub fn filter<'c, S: AsRef<str>>(corpus: &'c Corpus, requested: &[S]) -> Filtered<'c> {
    if requested.is_empty() {
        return Filtered {
            sections: corpus.sections.iter().collect(),
            error: None,
        };
    }

    let sections = corpus
        .sections
        .iter()
        .filter(|s| requested.iter().any(|r| same_name(&s.name, r.as_ref())))
        .collect();

    let mut unknown: Vec<String> = Vec::new();
    for r in requested.iter().map(AsRef::as_ref) {
        let matched = corpus.sections.iter().any(|s| same_name(&s.name, r));
        if !matched && !unknown.iter().any(|u| u == r) {
            unknown.push(r.to_owned());
        }
    }

    Filtered {
        sections,
        error: (!unknown.is_empty()).then(|| UnknownSectionError { names: unknown }),
    }
}
