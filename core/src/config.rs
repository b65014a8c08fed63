use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::testing::ProgramCommand;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub corpus: PathBuf,
    pub required_files: Vec<PathBuf>,
    pub program: ProgramConfig,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub enabled: bool,
    pub shell: PathBuf,
    pub command: String,
    pub clean: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_config_file: None,
            corpus: "unit_tests.md".into(),
            required_files: Vec::new(),
            program: ProgramConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            path: "./rr".into(),
            args: Vec::new(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shell: "/bin/sh".into(),
            command: "make".to_owned(),
            clean: Some("make clean".to_owned()),
        }
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "rrtest.toml";

    pub fn example_toml() -> String {
        Asset::get(Self::FILENAME)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
            .unwrap_or_default()
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Like [`Config::from_toml_file`] on the nearest config file, or the defaults
    /// (relative to `cur_dir`) when there is none.
    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(&cur_dir) {
            Some(path) => {
                log::info!("Using config {}", path.to_string_lossy());
                Self::from_toml_file(path)
            }
            None => {
                log::debug!("No {} found, using defaults", Self::FILENAME);
                Ok(Self {
                    source_config_file: Some(cur_dir.as_ref().join(Self::FILENAME)),
                    ..Self::default()
                })
            }
        }
    }

    /// Directory that relative paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.source_config_file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_owned)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn corpus_path(&self) -> PathBuf {
        fsutil::resolve_path(self.base_dir(), &self.corpus)
    }

    pub fn required_file_paths(&self) -> Vec<PathBuf> {
        self.required_files
            .iter()
            .map(|p| fsutil::resolve_path(self.base_dir(), p))
            .collect()
    }

    /// A bare program name (no directory part) is left for `PATH` lookup.
    pub fn program_path(&self) -> PathBuf {
        if self.is_program_on_path() {
            self.program.path.clone()
        } else {
            fsutil::resolve_path(self.base_dir(), &self.program.path)
        }
    }

    pub fn is_program_on_path(&self) -> bool {
        self.program.path.components().count() == 1 && !self.program.path.is_absolute()
    }

    pub fn program_command(&self) -> ProgramCommand {
        ProgramCommand::new(self.program_path()).args(self.program.args.iter().cloned())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.program.timeout_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml();
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();

        let Config {
            source_config_file,
            corpus,
            required_files,
            program,
            build,
        } = cfg;

        assert_eq!(source_config_file, None);
        assert_eq!(corpus, Path::new("unit_tests.md"));
        assert_eq!(required_files, [Path::new("README.md")]);
        assert_eq!(program, ProgramConfig::default());
        assert_eq!(build, BuildConfig::default());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = Config::from_toml("[program]\ntimeout_ms = 500\n").unwrap();
        assert_eq!(cfg.timeout(), Duration::from_millis(500));
        assert_eq!(cfg.program.path, Path::new("./rr"));
        assert_eq!(cfg.corpus, Path::new("unit_tests.md"));
        assert!(cfg.build.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("corpuss = \"x.md\"\n").is_err());
    }

    #[test]
    fn paths_are_resolved_against_config_dir() {
        let mut cfg = Config::from_toml("corpus = \"tests/cases.md\"\nrequired_files = [\"/abs/README\"]\n").unwrap();
        cfg.source_config_file = Some(PathBuf::from("/proj/rrtest.toml"));
        assert_eq!(cfg.base_dir(), Path::new("/proj"));
        assert_eq!(cfg.corpus_path(), Path::new("/proj/tests/cases.md"));
        assert_eq!(cfg.required_file_paths(), [Path::new("/abs/README")]);
        assert_eq!(cfg.program_path(), Path::new("/proj/rr"));

        cfg.program.path = "python3".into();
        assert!(cfg.is_program_on_path());
        assert_eq!(cfg.program_path(), Path::new("python3"));
    }
}
