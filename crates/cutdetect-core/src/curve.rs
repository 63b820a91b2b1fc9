//! Per-frame value curves.
//!
//! The analysis pass writes one difference key per frame, and the two
//! threshold curves are authored by the user. Thresholds are animatable, so
//! readers must evaluate them at each frame rather than assume a constant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CutDetectError, Result};

/// Identifies one of the stored curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveId {
    /// Average luma difference to the previous frame, in percent.
    Difference,
    /// Difference above which a frame starts a new shot.
    CutThreshold,
    /// Difference below which a frame is a duplicate of its predecessor.
    DuplicateThreshold,
}

impl CurveId {
    pub const ALL: [Self; 3] = [Self::Difference, Self::CutThreshold, Self::DuplicateThreshold];

    /// Human-readable curve name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Difference => "Current difference",
            Self::CutThreshold => "Cut threshold",
            Self::DuplicateThreshold => "Duplicate threshold",
        }
    }
}

/// How a curve answers reads between and around its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveMode {
    /// Only exact keys count; every other frame reads the default.
    Sampled,
    /// Linear between keys, held flat before the first and after the last.
    Animated,
}

/// A single key at a frame index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub frame: i64,
    pub value: f64,
}

/// A frame-indexed curve of scalar values.
///
/// Keys are kept sorted by frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Human-readable parameter name.
    pub name: String,
    mode: CurveMode,
    default: f64,
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Create an empty curve.
    pub fn new(name: impl Into<String>, mode: CurveMode, default: f64) -> Self {
        Self {
            name: name.into(),
            mode,
            default,
            keys: Vec::new(),
        }
    }

    /// Insert or overwrite the key at `frame`. Maintains sorted order.
    pub fn set(&mut self, frame: i64, value: f64) {
        match self.keys.binary_search_by(|k| k.frame.cmp(&frame)) {
            Ok(pos) => self.keys[pos].value = value,
            Err(pos) => self.keys.insert(pos, CurveKey { frame, value }),
        }
    }

    /// Remove the key at `frame`.
    pub fn remove(&mut self, frame: i64) -> bool {
        match self.keys.binary_search_by(|k| k.frame.cmp(&frame)) {
            Ok(pos) => {
                self.keys.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Evaluate the curve at `frame`.
    pub fn get(&self, frame: i64) -> f64 {
        let pos = self.keys.binary_search_by(|k| k.frame.cmp(&frame));
        match (self.mode, pos) {
            (_, Ok(pos)) => self.keys[pos].value,
            (CurveMode::Sampled, Err(_)) => self.default,
            (CurveMode::Animated, Err(pos)) => self.interpolate(pos, frame),
        }
    }

    /// `pos` is where `frame` would be inserted.
    fn interpolate(&self, pos: usize, frame: i64) -> f64 {
        match (pos.checked_sub(1).map(|i| self.keys[i]), self.keys.get(pos)) {
            (None, None) => self.default,
            (None, Some(next)) => next.value,
            (Some(prev), None) => prev.value,
            (Some(a), Some(b)) => {
                let t = (frame - a.frame) as f64 / (b.frame - a.frame) as f64;
                a.value + (b.value - a.value) * t
            }
        }
    }

    /// Value of the key exactly at `frame`, if there is one.
    pub fn key_at(&self, frame: i64) -> Option<f64> {
        self.keys
            .binary_search_by(|k| k.frame.cmp(&frame))
            .ok()
            .map(|pos| self.keys[pos].value)
    }

    /// Whether a key exists exactly at `frame`.
    pub fn has_key(&self, frame: i64) -> bool {
        self.keys.binary_search_by(|k| k.frame.cmp(&frame)).is_ok()
    }

    /// Value read where no key applies.
    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn set_default_value(&mut self, value: f64) {
        self.default = value;
    }

    pub fn mode(&self) -> CurveMode {
        self.mode
    }

    /// Get all keys (read-only).
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the curve has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether this curve can vary over time (has more than one key).
    pub fn is_animated(&self) -> bool {
        self.keys.len() > 1
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Curve({}, {} keys)", self.name, self.keys.len())
    }
}

/// The three curves read by EDL synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStore {
    difference: Curve,
    cut_threshold: Curve,
    duplicate_threshold: Curve,
}

impl CurveStore {
    /// Create a store whose threshold curves read the given values until keyed.
    pub fn new(cut_threshold: f64, duplicate_threshold: f64) -> Self {
        Self {
            difference: Curve::new(CurveId::Difference.name(), CurveMode::Sampled, 0.0),
            cut_threshold: Curve::new(
                CurveId::CutThreshold.name(),
                CurveMode::Animated,
                cut_threshold,
            ),
            duplicate_threshold: Curve::new(
                CurveId::DuplicateThreshold.name(),
                CurveMode::Animated,
                duplicate_threshold,
            ),
        }
    }

    pub fn curve(&self, id: CurveId) -> &Curve {
        match id {
            CurveId::Difference => &self.difference,
            CurveId::CutThreshold => &self.cut_threshold,
            CurveId::DuplicateThreshold => &self.duplicate_threshold,
        }
    }

    pub fn curve_mut(&mut self, id: CurveId) -> &mut Curve {
        match id {
            CurveId::Difference => &mut self.difference,
            CurveId::CutThreshold => &mut self.cut_threshold,
            CurveId::DuplicateThreshold => &mut self.duplicate_threshold,
        }
    }

    /// Overwrite the value of `id` at `frame`.
    pub fn set(&mut self, id: CurveId, frame: i64, value: f64) {
        self.curve_mut(id).set(frame, value);
    }

    /// Read `id` at `frame`, falling back to the curve's default.
    pub fn get(&self, id: CurveId, frame: i64) -> f64 {
        self.curve(id).get(frame)
    }

    /// Read `id` at `frame` only if it was keyed there.
    pub fn key_at(&self, id: CurveId, frame: i64) -> Option<f64> {
        self.curve(id).key_at(frame)
    }

    /// Key frame 0 with the value it currently evaluates to.
    ///
    /// Makes a threshold visible as a persisted key even when the user never
    /// authored one.
    pub fn seed_frame_zero(&mut self, id: CurveId) {
        let value = self.get(id, 0);
        self.set(id, 0, value);
    }

    /// Serialize all curves to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| CutDetectError::Serialization(format!("Failed to serialize curves: {e}")))
    }

    /// Deserialize curves from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| CutDetectError::Serialization(format!("Failed to parse curves: {e}")))
    }
}

impl Default for CurveStore {
    fn default() -> Self {
        Self::new(
            crate::settings::DEFAULT_CUT_THRESHOLD,
            crate::settings::DEFAULT_DUPLICATE_THRESHOLD,
        )
    }
}
