//! CPU feature detection for SIMD backends.

use crate::SimdBackend;

/// Detected CPU SIMD features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimdFeatures {
    /// SSE2 support (baseline on `x86_64`).
    pub sse2: bool,
    /// SSSE3 support (`pmaddubsw`, used by the Adler-32 kernel).
    pub ssse3: bool,
    /// SSE4.2 support (hardware CRC32 for string hashing).
    pub sse42: bool,
    /// AVX2 support.
    pub avx2: bool,
    /// ARM NEON support.
    pub neon: bool,
    /// ARM CRC32 extension.
    pub crc32: bool,
}

impl SimdFeatures {
    /// Detect features on the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                sse2: std::arch::is_x86_feature_detected!("sse2"),
                ssse3: std::arch::is_x86_feature_detected!("ssse3"),
                sse42: std::arch::is_x86_feature_detected!("sse4.2"),
                avx2: std::arch::is_x86_feature_detected!("avx2"),
                neon: false,
                crc32: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                sse2: false,
                ssse3: false,
                sse42: false,
                avx2: false,
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                crc32: std::arch::is_aarch64_feature_detected!("crc"),
            }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::default()
        }
    }

    /// Whether a hardware CRC32 instruction can drive string hashing.
    #[must_use]
    pub fn has_crc_hash(&self) -> bool {
        self.sse42 || self.crc32
    }
}

/// Detect the best available SIMD backend.
#[must_use]
pub fn detect_backend() -> SimdBackend {
    backend_for(&SimdFeatures::detect())
}

/// Pick the best backend for an explicit feature set.
#[must_use]
pub fn backend_for(features: &SimdFeatures) -> SimdBackend {
    if features.avx2 {
        SimdBackend::Avx2
    } else if features.sse42 && features.ssse3 {
        SimdBackend::Sse42
    } else if features.sse2 {
        SimdBackend::Sse2
    } else if features.neon {
        SimdBackend::Neon
    } else {
        SimdBackend::Scalar
    }
}

/// Check if a specific backend is available.
#[must_use]
pub fn is_available(backend: SimdBackend) -> bool {
    let features = SimdFeatures::detect();

    match backend {
        SimdBackend::Scalar => true,
        SimdBackend::Sse2 => features.sse2,
        SimdBackend::Sse42 => features.sse42 && features.ssse3,
        SimdBackend::Avx2 => features.avx2,
        SimdBackend::Neon => features.neon,
    }
}
