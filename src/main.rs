//! # Casely Command-Line Entry Point
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Load configuration (file, then flags)
//!   ├─> Initialise logging (stderr, optional rolling files)
//!   └─> Run the command and map its outcome to an exit code
//! ```
//!
//! Exit codes: `0` everything succeeded, `1` some artifacts failed while the
//! rest were processed, `2` the command could not run at all.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod logging;

use clap::Parser as _;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let log_options = logging::LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        to_file: config.log_to_file,
    };
    let logging_ready = match logging::init(log_options) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Warning: logging is disabled: {e:#}");
            false
        }
    };

    match cli::run_command(cli, &config) {
        Ok(cli::Outcome::Success) => ExitCode::SUCCESS,
        Ok(cli::Outcome::PartialFailure) => ExitCode::from(1),
        Err(e) => {
            if logging_ready {
                tracing::error!("{e:#}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(2)
        }
    }
}
