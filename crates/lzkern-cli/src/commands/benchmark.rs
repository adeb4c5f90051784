//! Benchmark command for primitive and engine throughput.

use crate::config::Config;
use crate::output::{format_rate, print_json, OutputFormat};
use anyhow::{bail, Context};
use clap::Args;
use lzkern_core::chunkset::copy_match;
use lzkern_core::hash_chain::HashChains;
use lzkern_core::insert_string::HASH_SIZE;
use lzkern_core::{simd, Engine, Functable, SimdBackend, MAX_MATCH};
use rayon::prelude::*;
use serde::Serialize;
use std::hint::black_box;
use std::time::Instant;

/// Arguments for the benchmark command.
#[derive(Args)]
pub struct BenchmarkArgs {
    /// Bytes of input per iteration.
    #[arg(short, long, default_value = "1048576")]
    pub size: usize,

    /// Iterations per measurement.
    #[arg(short, long, default_value = "20")]
    pub iterations: usize,

    /// Data pattern (zero, random, text, mixed).
    #[arg(short = 'p', long, default_value = "mixed")]
    pub pattern: String,

    /// Backend to measure, or "all".
    #[arg(short, long, default_value = "all")]
    pub backends: String,

    /// Also run independent engine sessions on a rayon pool of this many
    /// threads (0 = configured thread count).
    #[arg(short, long)]
    pub threads: Option<usize>,
}

#[derive(Serialize)]
struct Measurement {
    backend: &'static str,
    kernel: String,
    bytes_per_sec: f64,
}

/// Bytes processed by `f` per second over `iterations` calls.
fn measure(iterations: usize, bytes: usize, mut f: impl FnMut()) -> f64 {
    f();
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let secs = start.elapsed().as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    (bytes * iterations) as f64 / secs
}

fn generate(size: usize, pattern: &str) -> anyhow::Result<Vec<u8>> {
    let mut state = 12345u64;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (state >> 33) as u8
    };
    let text = b"The quick brown fox jumps over the lazy dog. ";
    let data = match pattern {
        "zero" => vec![0u8; size],
        "random" => (0..size).map(|_| next()).collect(),
        "text" => (0..size).map(|i| text[i % text.len()]).collect(),
        "mixed" => (0..size)
            .map(|i| match (i / 4096) % 4 {
                0 => 0,
                1 => next(),
                2 => (i % 16) as u8,
                _ => text[i % text.len()],
            })
            .collect(),
        other => bail!("unknown pattern {other:?}"),
    };
    Ok(data)
}

fn selected_backends(names: &str) -> anyhow::Result<Vec<SimdBackend>> {
    if names.eq_ignore_ascii_case("all") {
        return Ok(simd::available_backends());
    }
    names.split(',')
        .map(|name| {
            let backend = SimdBackend::parse(name).with_context(|| format!("unknown backend {name:?}"))?;
            if !simd::backend_available(backend) {
                bail!("backend {backend} not available on this CPU");
            }
            Ok(backend)
        })
        .collect()
}

fn primitives(ft: &Functable, data: &[u8], iterations: usize) -> anyhow::Result<Vec<Measurement>> {
    let backend = ft.backend().as_str();
    let mut out = Vec::new();
    let mut push = |kernel: String, bytes_per_sec: f64| {
        out.push(Measurement {
            backend,
            kernel,
            bytes_per_sec,
        });
    };

    push(
        "adler32".to_string(),
        measure(iterations, data.len(), || {
            black_box(ft.adler32(1, black_box(data)));
        }),
    );

    let mut a = [0u8; MAX_MATCH];
    a.copy_from_slice(&data[..MAX_MATCH]);
    let b = a;
    push(
        "compare258".to_string(),
        measure(iterations * 1000, MAX_MATCH, || {
            black_box(ft.compare258(black_box(&a), black_box(&b)));
        }),
    );

    let mut chains = HashChains::new(1 << 15);
    push(
        "slide_hash".to_string(),
        measure(iterations, (HASH_SIZE + (1 << 15)) * 2, || {
            chains.slide(ft, 1 << 15);
        }),
    );

    for dist in [1usize, 3, 16, 300] {
        let mut buf = data.to_vec();
        let len = buf.len() - dist;
        let mut run = Ok(0);
        let rate = measure(iterations, len, || {
            run = copy_match(ft, &mut buf, dist, dist, len);
        });
        run?;
        push(format!("copy_match/{dist}"), rate);
    }

    Ok(out)
}

fn engine_runs(engine: &Engine, data: &[u8], iterations: usize) -> anyhow::Result<Vec<Measurement>> {
    let frame = engine.compress(data)?;
    let mut compressed = Ok(Vec::new());
    let compress = measure(iterations, data.len(), || {
        compressed = engine.compress(black_box(data));
    });
    compressed?;
    let mut restored = Ok(Vec::new());
    let decompress = measure(iterations, data.len(), || {
        restored = engine.decompress(black_box(&frame));
    });
    if restored? != data {
        bail!("round trip mismatch on {}", engine.backend());
    }

    let backend = engine.backend().as_str();
    let level = engine.params().level;
    Ok(vec![
        Measurement {
            backend,
            kernel: format!("compress/l{level}"),
            bytes_per_sec: compress,
        },
        Measurement {
            backend,
            kernel: format!("decompress/l{level}"),
            bytes_per_sec: decompress,
        },
    ])
}

/// Independent sessions sharing one engine across a rayon pool.
fn parallel_runs(engine: &Engine, data: &[u8], threads: usize) -> anyhow::Result<Measurement> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("building thread pool")?;
    let chunk = data.len().div_ceil(threads).max(1);

    let start = Instant::now();
    pool.install(|| {
        data.par_chunks(chunk).try_for_each(|part| -> anyhow::Result<()> {
            let frame = engine.compress(part)?;
            if engine.decompress(&frame)? != part {
                bail!("parallel round trip mismatch");
            }
            Ok(())
        })
    })?;
    let secs = start.elapsed().as_secs_f64();

    Ok(Measurement {
        backend: engine.backend().as_str(),
        kernel: format!("parallel/{threads}t"),
        bytes_per_sec: if secs == 0.0 { 0.0 } else { data.len() as f64 / secs },
    })
}

/// Run throughput benchmarks.
pub fn benchmark(args: &BenchmarkArgs, config: Config, format: OutputFormat) -> anyhow::Result<()> {
    if args.size < 1024 {
        bail!("benchmark size must be at least 1024 bytes");
    }
    let data = generate(args.size, &args.pattern)?;
    let iterations = args.iterations.max(1);
    let backends = selected_backends(&args.backends)?;

    let mut results = Vec::new();
    for backend in backends {
        tracing::info!(backend = backend.as_str(), "benchmarking");
        let ft = Functable::for_backend(backend)?;
        results.extend(primitives(&ft, &data, iterations)?);

        let engine = Config {
            backend: backend.into(),
            ..config.clone()
        }
        .engine_builder()
        .build()?;
        results.extend(engine_runs(&engine, &data, iterations)?);
        if let Some(threads) = args.threads {
            let threads = if threads == 0 { config.threads() } else { threads };
            results.push(parallel_runs(&engine, &data, threads)?);
        }
    }

    match format {
        OutputFormat::Table => {
            println!("lzkern Benchmark");
            println!("================");
            println!("Size: {} bytes", args.size);
            println!("Pattern: {}", args.pattern);
            println!();
            println!("{:<8} {:<18} {:>14}", "Backend", "Kernel", "Throughput");
            println!("{}", "-".repeat(42));
            for m in &results {
                println!(
                    "{:<8} {:<18} {:>14}",
                    m.backend,
                    m.kernel,
                    format_rate(m.bytes_per_sec)
                );
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&results),
        OutputFormat::Raw => {
            for m in &results {
                println!("{} {} {:.0}", m.backend, m.kernel, m.bytes_per_sec);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_patterns() {
        for pattern in ["zero", "random", "text", "mixed"] {
            assert_eq!(generate(5000, pattern).unwrap().len(), 5000);
        }
        assert!(generate(10, "sparse").is_err());
    }

    #[test]
    fn test_selected_backends() {
        assert_eq!(selected_backends("all").unwrap(), simd::available_backends());
        assert_eq!(selected_backends("scalar").unwrap(), vec![SimdBackend::Scalar]);
        assert!(selected_backends("mmx").is_err());
    }

    #[test]
    fn test_primitives_report_every_kernel() {
        let ft = Functable::for_backend(SimdBackend::Scalar).unwrap();
        let data = generate(4096, "mixed").unwrap();
        let results = primitives(&ft, &data, 1).unwrap();
        let kernels: Vec<_> = results.iter().map(|m| m.kernel.as_str()).collect();
        assert_eq!(
            kernels,
            [
                "adler32",
                "compare258",
                "slide_hash",
                "copy_match/1",
                "copy_match/3",
                "copy_match/16",
                "copy_match/300"
            ]
        );
    }

    #[test]
    fn test_parallel_runs() {
        let engine = lzkern_core::EngineBuilder::new().level(1).build().unwrap();
        let data = generate(64 * 1024, "text").unwrap();
        let m = parallel_runs(&engine, &data, 2).unwrap();
        assert_eq!(m.kernel, "parallel/2t");
        assert_eq!(engine.stats().compress_calls, 2);
    }
}
