//! CPU feature and dispatch information.

use crate::config::Config;
use crate::output::{print_json, OutputFormat};
use lzkern_core::simd::{self, SimdFeatures};
use lzkern_core::{Functable, SimdBackend};
use serde::Serialize;

#[derive(Serialize)]
struct Features {
    sse2: bool,
    ssse3: bool,
    sse42: bool,
    avx2: bool,
    neon: bool,
    crc32: bool,
}

impl From<SimdFeatures> for Features {
    fn from(f: SimdFeatures) -> Self {
        Self {
            sse2: f.sse2,
            ssse3: f.ssse3,
            sse42: f.sse42,
            avx2: f.avx2,
            neon: f.neon,
            crc32: f.crc32,
        }
    }
}

#[derive(Serialize)]
struct BackendInfo {
    backend: &'static str,
    available: bool,
    chunk_size: Option<usize>,
    hash: Option<&'static str>,
}

#[derive(Serialize)]
struct Info {
    version: &'static str,
    arch: &'static str,
    features: Features,
    selected: &'static str,
    configured: &'static str,
    backends: Vec<BackendInfo>,
}

fn backend_info(backend: SimdBackend) -> BackendInfo {
    match Functable::for_backend(backend) {
        Ok(ft) => BackendInfo {
            backend: backend.as_str(),
            available: true,
            chunk_size: Some(ft.chunk_size()),
            hash: Some(ft.hash_kind().as_str()),
        },
        Err(_) => BackendInfo {
            backend: backend.as_str(),
            available: false,
            chunk_size: None,
            hash: None,
        },
    }
}

/// Show detected CPU features and what each backend installs.
pub fn info(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let info = Info {
        version: env!("CARGO_PKG_VERSION"),
        arch: std::env::consts::ARCH,
        features: SimdFeatures::detect().into(),
        selected: simd::best_backend().as_str(),
        configured: config.backend.as_str(),
        backends: SimdBackend::ALL.into_iter().map(backend_info).collect(),
    };

    match format {
        OutputFormat::Table => {
            println!("lzkern {} ({})", info.version, info.arch);
            println!("Selected backend: {}", info.selected);
            println!("Configured backend: {}", info.configured);
            println!();
            let f = &info.features;
            println!(
                "Features: sse2={} ssse3={} sse4.2={} avx2={} neon={} crc32={}",
                f.sse2, f.ssse3, f.sse42, f.avx2, f.neon, f.crc32
            );
            println!();
            println!("{:<8} {:>9} {:>6} {:>15}", "Backend", "Available", "Chunk", "Hash");
            println!("{}", "-".repeat(41));
            for b in &info.backends {
                println!(
                    "{:<8} {:>9} {:>6} {:>15}",
                    b.backend,
                    if b.available { "yes" } else { "no" },
                    b.chunk_size.map_or_else(|| "-".to_string(), |c| c.to_string()),
                    b.hash.unwrap_or("-"),
                );
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&info),
        OutputFormat::Raw => {
            println!("{}", info.selected);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_always_listed_available() {
        let info = backend_info(SimdBackend::Scalar);
        assert!(info.available);
        assert_eq!(info.chunk_size, Some(8));
        assert_eq!(info.hash, Some("multiplicative"));
    }

    #[test]
    fn test_availability_matches_detection() {
        for backend in SimdBackend::ALL {
            assert_eq!(backend_info(backend).available, simd::backend_available(backend));
        }
    }
}
