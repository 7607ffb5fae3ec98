//! Error types for magsq operations.
//!
//! The kernels themselves cannot fail; these errors are reported by the
//! checked entry points, which validate buffer sizes before touching memory,
//! and by the aligned buffer helper.

use std::fmt;

/// Errors that can occur during magsq operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagsqError {
    /// The accumulator holds fewer than `len` values.
    AccumulatorTooShort {
        /// Number of accumulator slots the call needs.
        required: usize,
        /// Number of accumulator slots provided.
        actual: usize,
    },
    /// The sample buffer holds fewer than `2 * len` values.
    SamplesTooShort {
        /// Number of interleaved values the call needs.
        required: usize,
        /// Number of interleaved values provided.
        actual: usize,
    },
    /// `2 * len` does not fit in a `usize`.
    LengthOverflow {
        /// The requested number of samples.
        len: usize,
    },
    /// Invalid layout parameters were provided.
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for MagsqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagsqError::AccumulatorTooShort { required, actual } => write!(
                f,
                "Accumulator too short: {} slots required, {} provided",
                required, actual
            ),
            MagsqError::SamplesTooShort { required, actual } => write!(
                f,
                "Sample buffer too short: {} values required, {} provided",
                required, actual
            ),
            MagsqError::LengthOverflow { len } => {
                write!(f, "Length overflow: {} samples span more than usize::MAX values", len)
            }
            MagsqError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "Invalid memory layout: {} (size: {}, alignment: {})",
                message, size, alignment
            ),
        }
    }
}

impl std::error::Error for MagsqError {}

/// Result type alias for magsq operations.
pub type Result<T> = std::result::Result<T, MagsqError>;

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> MagsqError {
    MagsqError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Checks that `ai` and `ef` can hold `len` samples.
///
/// Returns the number of interleaved values `ef` must provide (`2 * len`).
pub fn validate_buffers(len: usize, ai: &[f32], ef: &[f32]) -> Result<usize> {
    let required = len
        .checked_mul(2)
        .ok_or(MagsqError::LengthOverflow { len })?;

    if ai.len() < len {
        return Err(MagsqError::AccumulatorTooShort {
            required: len,
            actual: ai.len(),
        });
    }

    if ef.len() < required {
        return Err(MagsqError::SamplesTooShort {
            required,
            actual: ef.len(),
        });
    }

    Ok(required)
}
