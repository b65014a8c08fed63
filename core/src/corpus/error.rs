/// An entry of the corpus document that could not be turned into a test case.
///
/// These never abort parsing; they are collected into [`super::Corpus::errors`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorpusError {
    #[error("Malformed test case '{title}' in section '{section}' (line {line}, field `{field}`): {reason}")]
    Format {
        section: String,
        title: String,
        field: String,
        line: usize,
        reason: String,
    },

    #[error("Duplicate test case '{title}' in section '{section}' (line {line})")]
    DuplicateTestCase {
        section: String,
        title: String,
        line: usize,
    },
}

impl CorpusError {
    pub fn section(&self) -> &str {
        match self {
            Self::Format { section, .. } | Self::DuplicateTestCase { section, .. } => section,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Format { title, .. } | Self::DuplicateTestCase { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown section(s): {}", .names.iter().map(|n| format!("'{}'", n)).collect::<Vec<_>>().join(", "))]
pub struct UnknownSectionError {
    pub names: Vec<String>,
}
