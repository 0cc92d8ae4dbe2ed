//! evmix CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod inspect;
mod mix;

#[derive(Parser)]
#[command(name = "evmix")]
#[command(about = "evmix - pooled event mixing for combinatorial-background estimation")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mix daughter particles across events into synthetic candidates
    Mix {
        /// Input event table (Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output candidate dataset (Parquet)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of events retained in the mixing pool
        #[arg(long, default_value = "50")]
        train_length: usize,

        /// Combination to mix, as NAME:stem1,stem2,... (repeatable)
        #[arg(long = "combination", value_name = "SPEC", required = true)]
        combinations: Vec<String>,

        /// Partner selection policy: recent, rotating, or seeded
        #[arg(long, default_value = "recent")]
        policy: String,

        /// RNG seed (required for --policy seeded)
        #[arg(long)]
        seed: Option<u64>,

        /// Display a progress indicator. Minimal performance impact.
        #[arg(long)]
        progress: bool,

        /// Log every particle being mixed. Huge performance impact.
        #[arg(long)]
        verbose: bool,

        /// Output file for the mixing report (pretty JSON). Defaults to stdout.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Summarize an event table (rows, identity range, columns) as JSON
    Inspect {
        /// Input event table (Parquet)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mix {
            input,
            output,
            train_length,
            combinations,
            policy,
            seed,
            progress,
            verbose,
            report,
        } => mix::cmd_mix(
            &input,
            &output,
            train_length,
            &combinations,
            &policy,
            seed,
            progress,
            verbose,
            report.as_deref(),
        ),
        Commands::Inspect { input } => inspect::cmd_inspect(&input),
    }
}
