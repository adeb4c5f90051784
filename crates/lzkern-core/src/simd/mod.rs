//! SIMD detection.

mod detect;

pub use detect::{backend_for, detect_backend, is_available, SimdFeatures};

use crate::SimdBackend;

/// Get the best available SIMD backend for this CPU.
#[must_use]
pub fn best_backend() -> SimdBackend {
    detect_backend()
}

/// Check if a specific backend is available.
#[must_use]
pub fn backend_available(backend: SimdBackend) -> bool {
    is_available(backend)
}

/// All backends this CPU can run, slowest first.
#[must_use]
pub fn available_backends() -> Vec<SimdBackend> {
    SimdBackend::ALL
        .into_iter()
        .filter(|b| backend_available(*b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_always_available() {
        assert!(backend_available(SimdBackend::Scalar));
    }

    #[test]
    fn test_best_backend_returns_valid() {
        let backend = best_backend();
        assert!(backend_available(backend));
    }

    #[test]
    fn test_available_backends_contains_best() {
        let backends = available_backends();
        assert_eq!(backends[0], SimdBackend::Scalar);
        assert!(backends.contains(&best_backend()));
    }
}
