//! Configuration file support.
//!
//! ```toml
//! level = 6
//! strategy = "default"   # default | filtered | rle
//! window_bits = 15       # 9..=15
//! backend = "auto"       # auto | scalar | sse2 | sse42 | avx2 | neon
//! threads = 0            # 0 = one per CPU
//! ```

use anyhow::Context;
use clap::ValueEnum;
use lzkern_core::deflate::MAX_WINDOW_BITS;
use lzkern_core::{EngineBuilder, Functable, SimdBackend, Strategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "LZKERN_CONFIG";
/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/lzkern.toml";

/// Match strategy as spelled in configuration and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    /// Lazy or greedy matching by level.
    #[default]
    Default,
    /// Drop short matches.
    Filtered,
    /// Distance-1 runs only.
    Rle,
}

impl From<StrategyName> for Strategy {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::Default => Self::Default,
            StrategyName::Filtered => Self::Filtered,
            StrategyName::Rle => Self::Rle,
        }
    }
}

/// Backend selection: detect, or force one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Best backend the CPU supports.
    #[default]
    Auto,
    /// Portable scalar kernels.
    #[serde(alias = "generic")]
    #[value(alias = "generic")]
    Scalar,
    /// SSE2.
    Sse2,
    /// SSE4.2 with SSSE3.
    #[serde(alias = "sse4.2")]
    #[value(alias = "sse4.2")]
    Sse42,
    /// AVX2.
    Avx2,
    /// ARM NEON.
    Neon,
}

impl BackendChoice {
    /// Forced backend, `None` for auto-detection.
    pub fn backend(self) -> Option<SimdBackend> {
        match self {
            Self::Auto => None,
            Self::Scalar => Some(SimdBackend::Scalar),
            Self::Sse2 => Some(SimdBackend::Sse2),
            Self::Sse42 => Some(SimdBackend::Sse42),
            Self::Avx2 => Some(SimdBackend::Avx2),
            Self::Neon => Some(SimdBackend::Neon),
        }
    }

    /// Name for reports.
    pub fn as_str(self) -> &'static str {
        self.backend().map_or("auto", |b| b.as_str())
    }
}

impl From<SimdBackend> for BackendChoice {
    fn from(backend: SimdBackend) -> Self {
        match backend {
            SimdBackend::Scalar => Self::Scalar,
            SimdBackend::Sse2 => Self::Sse2,
            SimdBackend::Sse42 => Self::Sse42,
            SimdBackend::Avx2 => Self::Avx2,
            SimdBackend::Neon => Self::Neon,
        }
    }
}

/// Engine and runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Compression level (0-9).
    #[serde(default = "default_level")]
    pub level: u8,

    /// Match strategy.
    #[serde(default)]
    pub strategy: StrategyName,

    /// Window size as a power of two.
    #[serde(default = "default_window_bits")]
    pub window_bits: u8,

    /// Backend, or auto-detection.
    #[serde(default)]
    pub backend: BackendChoice,

    /// Worker threads for parallel benchmarks.
    #[serde(default)]
    pub threads: usize,
}

fn default_level() -> u8 {
    6
}

fn default_window_bits() -> u8 {
    MAX_WINDOW_BITS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: default_level(),
            strategy: StrategyName::default(),
            window_bits: default_window_bits(),
            backend: BackendChoice::default(),
            threads: 0,
        }
    }
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Builder carrying these settings. Range checks happen in `build`.
    pub fn engine_builder(&self) -> EngineBuilder {
        let builder = EngineBuilder::new()
            .level(self.level)
            .strategy(self.strategy.into())
            .window_bits(self.window_bits);
        match self.backend.backend() {
            Some(backend) => builder.prefer_backend(backend),
            None => builder,
        }
    }

    /// Dispatch table for the configured backend.
    pub fn functable(&self) -> anyhow::Result<Functable> {
        match self.backend.backend() {
            Some(backend) => Ok(Functable::for_backend(backend)?),
            None => Ok(*lzkern_core::functable()),
        }
    }

    /// Effective worker count.
    pub fn threads(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.threads
        }
    }
}

/// Resolve the configuration file to use, if any.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let system = Path::new(SYSTEM_CONFIG);
    system.is_file().then(|| system.to_path_buf())
}

/// Load configuration from `explicit`, `$LZKERN_CONFIG` or `/etc/lzkern.toml`,
/// falling back to defaults when none is present.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = config_path(explicit) else {
        tracing::debug!("no configuration file, using defaults");
        return Ok(Config::default());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = Config::from_toml(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}
