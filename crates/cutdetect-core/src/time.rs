//! Frame rates and non-drop-frame timecode.
//!
//! Timecode is derived from a frame index with successive floored divisions
//! (hours, minutes, seconds, then frames), so it never drifts over long
//! sequences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CutDetectError, Result};

/// Frame rate as a rational number (e.g., 24000/1001 for 23.976 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 24000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Create an integer frame rate.
    #[inline]
    pub const fn from_fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Frames counted per timecode second.
    ///
    /// Non-integer rates count at their nominal rate (23.976 counts 24),
    /// which is what non-drop-frame timecode does.
    pub fn timebase(self) -> u32 {
        if self.denominator == 0 {
            return 1;
        }
        (self.to_fps_f64().round() as u32).max(1)
    }

    /// Whether this rate is a whole number of frames per second.
    pub fn is_integer(self) -> bool {
        self.denominator != 0 && self.numerator % self.denominator == 0
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_24
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// Non-drop-frame SMPTE-style timecode, `HH:MM:SS:FF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timecode {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub frames: i64,
}

impl Timecode {
    /// Convert a frame index to timecode at the given rate.
    pub fn from_frames(frame: i64, rate: FrameRate) -> Self {
        let fps = i64::from(rate.timebase());
        let per_hour = fps * 60 * 60;
        let per_minute = fps * 60;

        let hours = frame.div_euclid(per_hour);
        let minutes = (frame - hours * per_hour).div_euclid(per_minute);
        let seconds = (frame - hours * per_hour - minutes * per_minute).div_euclid(fps);
        let frames = frame - hours * per_hour - minutes * per_minute - seconds * fps;

        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// Convert back to a frame index at the given rate.
    pub fn to_frames(self, rate: FrameRate) -> i64 {
        let fps = i64::from(rate.timebase());
        ((self.hours * 60 + self.minutes) * 60 + self.seconds) * fps + self.frames
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = CutDetectError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 4 {
            return Err(CutDetectError::InvalidParameter(format!(
                "timecode '{s}' is not HH:MM:SS:FF"
            )));
        }
        let mut parsed = [0i64; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| {
                CutDetectError::InvalidParameter(format!("timecode '{s}' has a non-numeric field"))
            })?;
        }
        Ok(Self {
            hours: parsed[0],
            minutes: parsed[1],
            seconds: parsed[2],
            frames: parsed[3],
        })
    }
}

/// Format a frame index as `HH:MM:SS:FF` at an integer frame rate.
pub fn to_timecode(frame: i64, fps: u32) -> String {
    Timecode::from_frames(frame, FrameRate::from_fps(fps)).to_string()
}
