//! Cut Detective Core - Foundation types for cut detection
//!
//! This crate provides the types shared by analysis and EDL output:
//! - Frame buffers and pixel formats
//! - Frame rates and non-drop-frame timecode
//! - Per-frame value curves
//! - Settings

pub mod curve;
pub mod error;
pub mod frame;
pub mod settings;
pub mod time;

pub use curve::{Curve, CurveId, CurveKey, CurveMode, CurveStore};
pub use error::{CutDetectError, Result};
pub use frame::{FrameBuffer, FramePlane, PixelFormat};
pub use settings::{normalize_destination, AnalysisSettings, CutDetectSettings, EdlSettings};
pub use time::{to_timecode, FrameRate, Timecode};
