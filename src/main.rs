use clap::Parser;
use stratscript::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
