use std::io;
use std::process::ExitCode;

use anyhow::Context;
use bin2mif::{Args, Config, Error};
use clap::Parser;
use tracing::{error, Level};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(Error::InvalidArguments.exit_code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Only fails when a global subscriber is already installed.
    if let Err(e) = init_logging(&args) {
        eprintln!("bin2mif: {e:#}");
    }

    match Config::try_from(&args).and_then(|config| bin2mif::run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            error!("{:#}", anyhow::Error::new(e));
            ExitCode::from(code)
        }
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(anyhow::Error::msg)
        .context("Failed to install logger")
}
