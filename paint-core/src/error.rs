//! Error types for paint operations.

use thiserror::Error;

/// Result type for paint operations.
pub type PaintResult<T> = Result<T, PaintError>;

/// Errors that can occur in paint operations.
///
/// Drawing input never produces one of these: out-of-range pointer
/// coordinates and invalid tool/phase combinations are silent no-ops.
#[derive(Debug, Error)]
pub enum PaintError {
    /// A pixel coordinate does not fit the two-hex-digit payload encoding.
    #[error("Coordinate ({x}, {y}) cannot be hex encoded (max 255)")]
    CoordinateOutOfRange {
        /// X coordinate of the offending pixel.
        x: u32,
        /// Y coordinate of the offending pixel.
        y: u32,
    },

    /// Session document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing persisted state failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Submitting a payload to the external paint call failed.
    #[error("Submission failed: {0}")]
    Submission(String),
}
