//! Adler-32 checksum command.

use crate::config::Config;
use crate::output::{print_json, OutputFormat};
use anyhow::Context;
use clap::Args;
use lzkern_core::Functable;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Arguments for the checksum command.
#[derive(Args)]
pub struct ChecksumArgs {
    /// Files to checksum.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Read buffer size in bytes.
    #[arg(long, default_value = "65536")]
    pub buffer_size: usize,
}

#[derive(Serialize)]
struct FileChecksum {
    path: String,
    adler32: String,
    bytes: u64,
}

#[derive(Serialize)]
struct ChecksumReport {
    backend: &'static str,
    files: Vec<FileChecksum>,
}

/// Stream `reader` through the dispatched Adler-32 kernel.
fn checksum_reader(ft: &Functable, mut reader: impl Read, buffer_size: usize) -> std::io::Result<(u32, u64)> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut adler = 1u32;
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok((adler, total));
        }
        adler = ft.adler32(adler, &buf[..n]);
        total += n as u64;
    }
}

fn checksum_file(ft: &Functable, path: &Path, buffer_size: usize) -> anyhow::Result<FileChecksum> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let (adler, bytes) = checksum_reader(ft, file, buffer_size)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(FileChecksum {
        path: path.display().to_string(),
        adler32: format!("{adler:08x}"),
        bytes,
    })
}

/// Print the Adler-32 of each file.
pub fn checksum(args: &ChecksumArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let ft = config.functable()?;
    let files = args
        .files
        .iter()
        .map(|path| checksum_file(&ft, path, args.buffer_size))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = ChecksumReport {
        backend: ft.backend().as_str(),
        files,
    };
    match format {
        OutputFormat::Table => {
            println!("Backend: {}", report.backend);
            println!("{:<10} {:>12}  Path", "Adler32", "Bytes");
            println!("{}", "-".repeat(40));
            for file in &report.files {
                println!("{:<10} {:>12}  {}", file.adler32, file.bytes, file.path);
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&report),
        OutputFormat::Raw => {
            for file in &report.files {
                println!("{}  {}", file.adler32, file.path);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lzkern_core::simd::available_backends;

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i * 7 + i / 13) as u8).collect();
        for backend in available_backends() {
            let ft = Functable::for_backend(backend).unwrap();
            for buffer_size in [1, 7, 4096, 1 << 20] {
                let (adler, bytes) = checksum_reader(&ft, data.as_slice(), buffer_size).unwrap();
                assert_eq!(bytes, data.len() as u64);
                assert_eq!(adler, lzkern_core::adler32::adler32(1, &data), "{backend:?}");
            }
        }
    }

    #[test]
    fn test_empty_reader() {
        let ft = *lzkern_core::functable();
        assert_eq!(checksum_reader(&ft, &b""[..], 16).unwrap(), (1, 0));
    }
}
