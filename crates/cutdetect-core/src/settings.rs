//! User-facing settings for analysis and EDL output.
//!
//! Settings persist as JSON. Missing fields take their defaults, so older
//! settings files keep loading as fields are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CutDetectError, Result};
use crate::time::FrameRate;

pub const DEFAULT_CUT_THRESHOLD: f64 = 8.0;
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.20;
pub const DEFAULT_DOWNRES: u32 = 8;
pub const MAX_DOWNRES: u32 = 128;
pub const DEFAULT_FPS: u32 = 24;
pub const MAX_FPS: u32 = 99;
pub const DEFAULT_DESTINATION: &str = "/tmp/cutdetective.edl";

/// Settings for the analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Sampling stride in both axes; 1 samples every pixel.
    pub downres: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            downres: DEFAULT_DOWNRES,
        }
    }
}

/// Settings for EDL synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdlSettings {
    pub detect_cuts: bool,
    pub remove_duplicates: bool,
    /// Value the cut threshold curve reads until keyed.
    pub cut_threshold: f64,
    /// Value the duplicate threshold curve reads until keyed.
    pub duplicate_threshold: f64,
    /// Integer frames per second used for timecode.
    pub fps: u32,
    /// Where "Save EDL" writes.
    pub destination: PathBuf,
}

impl Default for EdlSettings {
    fn default() -> Self {
        Self {
            detect_cuts: true,
            remove_duplicates: false,
            cut_threshold: DEFAULT_CUT_THRESHOLD,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            fps: DEFAULT_FPS,
            destination: PathBuf::from(DEFAULT_DESTINATION),
        }
    }
}

impl EdlSettings {
    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::from_fps(self.fps)
    }
}

/// All Cut Detective settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutDetectSettings {
    pub analysis: AnalysisSettings,
    pub edl: EdlSettings,
}

impl CutDetectSettings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DOWNRES).contains(&self.analysis.downres) {
            return Err(CutDetectError::InvalidParameter(format!(
                "downres factor {} outside 1..={MAX_DOWNRES}",
                self.analysis.downres
            )));
        }
        if !(1..=MAX_FPS).contains(&self.edl.fps) {
            return Err(CutDetectError::InvalidParameter(format!(
                "fps {} outside 1..={MAX_FPS}",
                self.edl.fps
            )));
        }
        for (name, value) in [
            ("cut threshold", self.edl.cut_threshold),
            ("duplicate threshold", self.edl.duplicate_threshold),
        ] {
            if !value.is_finite() {
                return Err(CutDetectError::InvalidParameter(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.edl.destination.as_os_str().is_empty() {
            return Err(CutDetectError::InvalidParameter(
                "EDL destination is empty".into(),
            ));
        }
        Ok(())
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            CutDetectError::Serialization(format!("Failed to serialize settings: {e}"))
        })
    }

    /// Deserialize and validate from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let settings: Self = serde_json::from_slice(data)
            .map_err(|e| CutDetectError::Serialization(format!("Invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a file path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load settings from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Clean up a destination string typed into a host text control.
///
/// Host string controls sometimes hand back a trailing line break.
pub fn normalize_destination(raw: &str) -> PathBuf {
    let trimmed = raw
        .strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw);
    PathBuf::from(trimmed)
}
