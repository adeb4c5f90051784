//! Error types for lzkern-core.
//!
//! The kernels themselves never fail; errors only surface where untrusted
//! input or configuration crosses into the driver, the frame codec or the
//! engine facade.

use thiserror::Error;

/// Errors that can occur at the driver and frame boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied arguments violate a documented precondition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A frame is corrupted, truncated or fails its checksum.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// Output buffer is too small.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Compression parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// SIMD backend not available on this CPU.
    #[error("SIMD backend {0:?} not available on this CPU")]
    SimdNotAvailable(crate::SimdBackend),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for lzkern operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("distance 0".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("distance 0"));
    }

    #[test]
    fn test_error_display_corrupted_data() {
        let err = Error::CorruptedData("adler32 mismatch".to_string());
        assert!(err.to_string().contains("corrupted data"));
    }

    #[test]
    fn test_error_display_buffer_too_small() {
        let err = Error::BufferTooSmall {
            needed: 4096,
            available: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("4096"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_error_display_simd_not_available() {
        let err = Error::SimdNotAvailable(crate::SimdBackend::Avx2);
        assert!(err.to_string().contains("Avx2"));
    }

    #[test]
    fn test_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
