// SPDX-License-Identifier: Apache-2.0

mod dump;
mod error;
mod formats;
mod info;
mod topology;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;

/// uvcgraph CLI - UVC descriptor inspection tool
#[derive(Parser)]
#[command(name = "uvcgraph")]
#[command(version)]
#[command(about = "uvcgraph CLI - Inspect UVC descriptor dumps and video topology")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=debug for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a device dump: identity, clock, entities
    Info(info::Args),

    /// Resolve and display the device's video chain
    Topology(topology::Args),

    /// List pixel formats, frame sizes and frame rates
    Formats(formats::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Info(args) => info::execute(args, cli.json),
        Commands::Topology(args) => topology::execute(args, cli.json),
        Commands::Formats(args) => formats::execute(args, cli.json),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("warn")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None) // cleaner CLI output
        .format_target(false)
        .init();

    log::debug!("Logging initialized");
}
