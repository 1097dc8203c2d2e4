//! paddock CLI entry point

// The binary renders errors to stderr - this is intentional
#![allow(clippy::print_stderr)]

use clap::Parser;
use paddock::cli::{Cli, Command};
use paddock::commands::{self, EXIT_OK};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logging goes to stderr so command output stays scriptable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Prune(args) => commands::prune::run(&args),
    };

    let code = match result {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
