use std::process::ExitCode;

use colored::Colorize as _;
use rrtest_core::Config;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {}

pub fn exec(_args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let path = util::current_dir().join(Config::FILENAME);
    fsutil::write_new(&path, Config::example_toml())?;
    println!(
        "{}",
        format!("Created {}", path.to_string_lossy()).green()
    );
    Ok(ExitCode::SUCCESS)
}
