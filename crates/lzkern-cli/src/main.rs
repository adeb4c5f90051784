//! lzkern CLI - compress, decompress, checksum and benchmark with the
//! SIMD-dispatched LZ77 kernels.

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]

mod commands;
mod config;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// lzkern: SIMD-dispatched LZ77 toolkit
#[derive(Parser)]
#[command(name = "lzkern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Configuration file (default: $LZKERN_CONFIG, then /etc/lzkern.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force a SIMD backend instead of the configured one
    #[arg(long, global = true)]
    backend: Option<config::BackendChoice>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into an lzkern frame
    Compress(commands::CompressArgs),

    /// Decompress an lzkern frame
    Decompress(commands::DecompressArgs),

    /// Print Adler-32 checksums
    Checksum(commands::ChecksumArgs),

    /// Show CPU features and dispatch tables
    Info,

    /// Measure primitive and engine throughput
    Benchmark(commands::BenchmarkArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    match cli.command {
        Commands::Compress(args) => commands::compress(&args, config, cli.format),
        Commands::Decompress(args) => commands::decompress(&args, &config, cli.format),
        Commands::Checksum(args) => commands::checksum(&args, &config, cli.format),
        Commands::Info => commands::info(&config, cli.format),
        Commands::Benchmark(args) => commands::benchmark(&args, config, cli.format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
