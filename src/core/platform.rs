//! Process-level error handling and argument parsing

use clap::Parser;

use crate::core::cli::CliArgs;

/// Print a fatal error and exit with status 1.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("Error: {error}");
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

pub fn get_cli_args() -> CliArgs {
    CliArgs::parse()
}
