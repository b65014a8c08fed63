use std::{
    path::{Path, PathBuf},
    process::exit,
};

use rrtest_core::Config;

use crate::cmd::GlobalArgs;

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

/// Paths given on the command line are relative to the current dir.
pub fn absolutize(path: impl AsRef<Path>) -> PathBuf {
    fsutil::resolve_path(current_dir(), path)
}

pub fn load_config(global_args: &GlobalArgs) -> anyhow::Result<Config> {
    match &global_args.config {
        Some(path) => Config::from_toml_file(absolutize(path)),
        None => Config::from_file_finding_in_ancestors(current_dir()),
    }
}
