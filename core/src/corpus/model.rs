use super::error::CorpusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Process {
    pub arrival: u64,
    pub burst: u64,
}

/// The scheduling scenario handed to the program under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchedulerInput {
    pub quantum: u32,
    pub processes: Vec<Process>,
}

impl SchedulerInput {
    /// Contents of the input file given to the program under test.
    ///
    /// The first line is the number of processes, then one `pid, arrival, burst`
    /// row per process with 1-based pids.
    pub fn to_input_file(&self) -> String {
        let mut s = format!("{}\n", self.processes.len());
        for (i, p) in self.processes.iter().enumerate() {
            s += &format!("{}, {}, {}\n", i + 1, p.arrival, p.burst);
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    title: String,
    section: String,
    input: SchedulerInput,
    extra_args: Vec<String>,
    expected_output: Vec<String>,
}

impl TestCase {
    pub fn new(
        section: impl Into<String>,
        title: impl Into<String>,
        input: SchedulerInput,
        extra_args: Vec<String>,
        expected_output: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            section: section.into(),
            input,
            extra_args,
            expected_output,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn input(&self) -> &SchedulerInput {
        &self.input
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn expected_output(&self) -> &[String] {
        &self.expected_output
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub testcases: Vec<TestCase>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            testcases: Vec::new(),
        }
    }

    pub fn find(&self, title: &str) -> Option<&TestCase> {
        self.testcases.iter().find(|t| t.title() == title)
    }
}

/// All sections of a corpus document plus the entries that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub sections: Vec<Section>,
    pub errors: Vec<CorpusError>,
}

impl Corpus {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn num_testcases(&self) -> usize {
        self.sections.iter().map(|s| s.testcases.len()).sum()
    }

    pub fn testcases(&self) -> impl Iterator<Item = &TestCase> {
        self.sections.iter().flat_map(|s| s.testcases.iter())
    }
}
