//! Error types for the deferred lighting core.
//!
//! This module provides a unified error type [`LightingError`] and a convenient [`Result`] alias.

use std::fmt;

/// Main error type for the lighting core.
///
/// The lighting core itself has no recoverable failure modes; everything that
/// can fail lives in the external facilities it drives (rasterization, compute
/// execution, shadow rendering). Their failures surface through this type.
#[derive(Debug)]
pub enum LightingError {
    /// An external backend (raster, compute, or shadow facility) reported a failure.
    Backend(String),
    /// The G-buffer pass could not produce surface data this frame.
    GBufferUnavailable(String),
}

impl fmt::Display for LightingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "Backend error: {msg}"),
            Self::GBufferUnavailable(msg) => write!(f, "G-buffer unavailable: {msg}"),
        }
    }
}

impl std::error::Error for LightingError {}

/// Convenient Result type alias for lighting operations.
pub type Result<T> = std::result::Result<T, LightingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LightingError::Backend("test".to_string());
        assert!(err.to_string().contains("Backend error"));
    }

    #[test]
    fn test_gbuffer_error_display() {
        let err = LightingError::GBufferUnavailable("no visible geometry".to_string());
        assert!(err.to_string().contains("G-buffer unavailable"));
    }
}
