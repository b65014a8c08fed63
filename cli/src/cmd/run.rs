use std::path::PathBuf;
use std::process::ExitCode;

use rrtest_core::{
    action::{self, RunOptions},
    testing::Mode,
    Config,
};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Only run these sections (case-insensitive)
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    pub section: Vec<String>,

    /// Also list passing test cases
    #[arg(short, long)]
    pub verbose: bool,

    /// Test corpus document
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Program under test
    #[arg(long)]
    pub program: Option<PathBuf>,

    /// Time limit per test case
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the build and clean commands
    #[arg(long)]
    pub no_build: bool,

    /// Forwarded verbatim to the program under test
    #[arg(last = true, value_name = "EXTRA_ARGS")]
    pub extra_args: Vec<String>,
}

impl Args {
    pub fn apply_to(&self, mut cfg: Config) -> Config {
        let Args {
            section: _,
            verbose: _,
            corpus,
            program,
            timeout,
            output: _,
            no_build,
            extra_args: _,
        } = self;

        if let Some(p) = corpus {
            cfg.corpus = util::absolutize(p);
        }
        if let Some(p) = program {
            // a bare name stays a PATH lookup, like in the config file
            let is_bare = p.components().count() == 1 && p.is_relative();
            cfg.program.path = if is_bare { p.clone() } else { util::absolutize(p) };
        }
        if let Some(ms) = timeout {
            cfg.program.timeout_ms = *ms;
        }
        if *no_build {
            cfg.build.enabled = false;
        }
        cfg
    }

    pub fn run_options(&self, mode: Mode) -> RunOptions {
        RunOptions {
            mode,
            sections: self.section.clone(),
            verbose: self.verbose,
            extra_args: self.extra_args.clone(),
        }
    }
}

pub async fn exec(mode: Mode, args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = args.apply_to(util::load_config(global_args)?);
    log::debug!("{:?}", cfg);

    let output = args.output.as_ref().map(util::absolutize);
    let ok = action::do_run(&cfg, &args.run_options(mode), output.as_deref()).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::*;
    use crate::cmd::Subcommand;

    fn parse(argv: &[&str]) -> GlobalArgs {
        GlobalArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_sections_flags_and_extra_args() {
        let g = parse(&[
            "rrtest", "t", "-s", "Basic", "Idle Gaps", "-v", "--timeout", "250", "--", "-x", "1",
        ]);
        let Subcommand::Testit(args) = &g.subcmd else {
            panic!("unexpected {:?}", g.subcmd);
        };
        assert_eq!(args.section, ["Basic", "Idle Gaps"]);
        assert!(args.verbose);
        assert_eq!(args.timeout, Some(250));
        assert_eq!(args.extra_args, ["-x", "1"]);

        let opts = args.run_options(Mode::Testit);
        assert_eq!(opts.sections, ["Basic", "Idle Gaps"]);
        assert_eq!(opts.extra_args, ["-x", "1"]);
    }

    #[test]
    fn overrides_config() {
        let g = parse(&[
            "rrtest", "makeit", "--program", "python3", "--timeout", "99", "--no-build",
        ]);
        let Subcommand::Makeit(args) = &g.subcmd else {
            panic!("unexpected {:?}", g.subcmd);
        };
        let cfg = args.apply_to(Config::default());
        assert_eq!(cfg.program.path, PathBuf::from("python3"));
        assert_eq!(cfg.program.timeout_ms, 99);
        assert!(!cfg.build.enabled);
        assert_eq!(cfg.corpus, PathBuf::from("unit_tests.md"));
    }

    #[test]
    fn program_paths_are_made_absolute() {
        let g = parse(&["rrtest", "timeit", "--program", "./rr"]);
        let Subcommand::Timeit(args) = &g.subcmd else {
            panic!("unexpected {:?}", g.subcmd);
        };
        let cfg = args.apply_to(Config::default());
        assert_eq!(cfg.program.path, util::current_dir().join("rr"));
    }
}
