//! Error types for Cut Detective.

use std::path::PathBuf;

use thiserror::Error;

use crate::frame::PixelFormat;

/// Main error type for Cut Detective operations.
#[derive(Error, Debug)]
pub enum CutDetectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("Frame {frame} buffer unavailable: {reason}")]
    BufferUnavailable { frame: u64, reason: String },

    #[error("Frame dimensions differ: {current_width}x{current_height} vs {previous_width}x{previous_height}")]
    DimensionMismatch {
        current_width: u32,
        current_height: u32,
        previous_width: u32,
        previous_height: u32,
    },

    #[error("Frame {width}x{height} is smaller than sampling stride {stride}")]
    FrameTooSmall { width: u32, height: u32, stride: u32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Could not write EDL to {}: {source}", path.display())]
    EdlWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("EDL parse error on line {line}: {message}")]
    EdlParse { line: usize, message: String },
}

impl CutDetectError {
    /// Whether the error only affects the frame being analysed.
    ///
    /// Recoverable errors skip one frame and let the pass continue; all other
    /// errors abort the operation that raised them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BufferUnavailable { .. }
                | Self::UnsupportedFormat(_)
                | Self::DimensionMismatch { .. }
                | Self::FrameTooSmall { .. }
        )
    }
}

/// Result type alias for Cut Detective operations.
pub type Result<T> = std::result::Result<T, CutDetectError>;
