//! csvgen CLI
//!
//! Synthetic CSV generation and emptiness-based row filtering.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod args;
mod logging;
mod run;

use args::Cli;

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = logging::init_logging(args.log_level) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let format = args.summary;
    let result = run::build_config(args.command)
        .map_err(anyhow::Error::from)
        .and_then(|config| run::execute(&config));

    match result.and_then(|reports| {
        for report in reports {
            println!("{}", report.render(format)?);
        }
        Ok(())
    }) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            if run::is_usage_error(&e) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
