pub mod init;
pub mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use rrtest_core::testing::Mode;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of the nearest rrtest.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Grade the program under test against the expected outputs
    #[command(alias("t"))]
    Testit(run::Args),

    /// Run every test case and print its output as a new corpus
    #[command(alias("m"))]
    Makeit(run::Args),

    /// Run every test case and show its output with the elapsed time
    #[command(alias("p"))]
    Timeit(run::Args),

    /// Write an example rrtest.toml into the current dir
    Init(init::Args),
}

pub type SubcmdResult = anyhow::Result<ExitCode>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Testit(args) => run::exec(Mode::Testit, args, self).await,
            Makeit(args) => run::exec(Mode::Makeit, args, self).await,
            Timeit(args) => run::exec(Mode::Timeit, args, self).await,
            Init(args) => init::exec(args, self),
        }
    }
}
