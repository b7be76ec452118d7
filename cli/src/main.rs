#![forbid(unsafe_code)]

use std::process::exit;

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod interactive;

use crate::commands::Subcommand;

#[derive(Parser)]
#[command(version, about = "Emulator for the mmach family of teaching model machines")]
struct Opt {
    /// Increase the level of verbosity. Can be used multiple times.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Subcommand,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "mmach_emulator=debug,info",
            3..=u8::MAX => "trace",
        }
    }
}

fn main() {
    let opt = Opt::parse();

    // Parse the log level from the env, or infer it from the arguments
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(opt.log_filter()))
        .unwrap();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    exit(opt.command.exec());
}
