//! Compress and decompress commands.

use crate::config::{Config, StrategyName};
use crate::output::{format_rate, format_size, print_json, OutputFormat};
use anyhow::Context;
use clap::Args;
use lzkern_core::{EngineBuilder, EngineStats};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Arguments for the compress command.
#[derive(Args)]
pub struct CompressArgs {
    /// Input file.
    pub input: PathBuf,

    /// Output file (default: input with `.lzk` appended).
    pub output: Option<PathBuf>,

    /// Compression level (0-9), overrides the configuration.
    #[arg(short, long)]
    pub level: Option<u8>,

    /// Match strategy, overrides the configuration.
    #[arg(short, long)]
    pub strategy: Option<StrategyName>,

    /// Window size as a power of two (9-15), overrides the configuration.
    #[arg(short, long)]
    pub window_bits: Option<u8>,
}

/// Arguments for the decompress command.
#[derive(Args)]
pub struct DecompressArgs {
    /// Input frame.
    pub input: PathBuf,

    /// Output file (default: input without `.lzk`, or with `.out` appended).
    pub output: Option<PathBuf>,
}

/// Summary of one compress or decompress run.
#[derive(Serialize)]
struct Report {
    operation: &'static str,
    input: String,
    output: String,
    backend: &'static str,
    level: u8,
    strategy: &'static str,
    window_bits: u8,
    bytes_in: u64,
    bytes_out: u64,
    ratio: f64,
    throughput: f64,
    matches: u64,
    literals: u64,
}

/// Compress a file.
pub fn compress(args: &CompressArgs, mut config: Config, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(level) = args.level {
        config.level = level;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(bits) = args.window_bits {
        config.window_bits = bits;
    }
    let engine = config.engine_builder().build()?;

    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let frame = engine.compress(&data)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| append_extension(&args.input, "lzk"));
    std::fs::write(&output, &frame).with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        input = %args.input.display(),
        output = %output.display(),
        bytes_in = data.len(),
        bytes_out = frame.len(),
        "compressed"
    );

    let stats = engine.stats();
    let params = engine.params();
    let report = Report {
        operation: "compress",
        input: args.input.display().to_string(),
        output: output.display().to_string(),
        backend: engine.backend().as_str(),
        level: params.level,
        strategy: params.strategy.as_str(),
        window_bits: params.window_bits,
        bytes_in: stats.bytes_in,
        bytes_out: stats.bytes_out,
        ratio: stats.overall_ratio(),
        throughput: stats.compress_throughput(),
        matches: stats.matches,
        literals: stats.literals,
    };
    print_report(&report, format)
}

/// Decompress a frame.
pub fn decompress(args: &DecompressArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let mut builder = EngineBuilder::new();
    if let Some(backend) = config.backend.backend() {
        builder = builder.prefer_backend(backend);
    }
    let engine = builder.build()?;

    let frame = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let data = engine
        .decompress(&frame)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| strip_extension(&args.input));
    std::fs::write(&output, &data).with_context(|| format!("writing {}", output.display()))?;

    let stats: EngineStats = engine.stats();
    let params = engine.params();
    let report = Report {
        operation: "decompress",
        input: args.input.display().to_string(),
        output: output.display().to_string(),
        backend: engine.backend().as_str(),
        level: params.level,
        strategy: params.strategy.as_str(),
        window_bits: params.window_bits,
        bytes_in: frame.len() as u64,
        bytes_out: stats.bytes_decompressed,
        ratio: if frame.is_empty() {
            0.0
        } else {
            stats.bytes_decompressed as f64 / frame.len() as f64
        },
        throughput: stats.decompress_throughput(),
        matches: 0,
        literals: 0,
    };
    print_report(&report, format)
}

fn print_report(report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{:<12} {}", "Operation:", report.operation);
            println!("{:<12} {}", "Input:", report.input);
            println!("{:<12} {}", "Output:", report.output);
            println!("{:<12} {}", "Backend:", report.backend);
            if report.operation == "compress" {
                println!(
                    "{:<12} level {} / {} / {}-bit window",
                    "Params:", report.level, report.strategy, report.window_bits
                );
                println!(
                    "{:<12} {} matches, {} literals",
                    "Tokens:", report.matches, report.literals
                );
            }
            println!(
                "{:<12} {} -> {}",
                "Size:",
                format_size(report.bytes_in),
                format_size(report.bytes_out)
            );
            println!("{:<12} {:.2}x", "Ratio:", report.ratio);
            println!("{:<12} {}", "Throughput:", format_rate(report.throughput));
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Raw => {
            println!("{} {}", report.bytes_in, report.bytes_out);
            Ok(())
        }
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn strip_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == "lzk") {
        path.with_extension("")
    } else {
        append_extension(path, "out")
    }
}
