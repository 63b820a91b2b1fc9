//! Frame-to-frame luma differencing.
//!
//! Samples both frames on a regular grid, normalizes each channel to `[0, 1]`
//! according to its pixel format, converts to Rec.709 luma and averages the
//! absolute luma differences. The result is a percentage in `[0, 100]` that is
//! comparable across resolutions and sampling strides.

use cutdetect_core::{CutDetectError, FrameBuffer, PixelFormat, Result};
use half::f16;
use rayon::prelude::*;

/// Rec.709 luma weights for R, G, B.
const REC709: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// How raw channel samples map to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Normalization {
    /// 8-bit unsigned, divided by 255.
    Unorm8,
    /// 10/12-bit stored in 16-bit words, divided by 65535.
    Unorm16,
    /// Half-float, already normalized.
    Half,
}

impl Normalization {
    fn for_format(format: PixelFormat) -> Result<Self> {
        match format {
            PixelFormat::Rgb8 => Ok(Self::Unorm8),
            PixelFormat::Rgb10 | PixelFormat::Rgb12 => Ok(Self::Unorm16),
            PixelFormat::RgbHalf => Ok(Self::Half),
            PixelFormat::Nv12 | PixelFormat::Yuv420P => {
                Err(CutDetectError::UnsupportedFormat(format))
            }
        }
    }

    #[inline]
    fn rgb(self, px: &[u8]) -> [f64; 3] {
        match self {
            Self::Unorm8 => [0, 1, 2].map(|c| f64::from(px[c]) / 255.0),
            Self::Unorm16 => {
                [0, 2, 4].map(|o| f64::from(u16::from_ne_bytes([px[o], px[o + 1]])) / 65535.0)
            }
            Self::Half => [0, 2, 4].map(|o| f16::from_ne_bytes([px[o], px[o + 1]]).to_f64()),
        }
    }

    #[inline]
    fn luma(self, px: &[u8]) -> f64 {
        let [r, g, b] = self.rgb(px);
        REC709[0] * r + REC709[1] * g + REC709[2] * b
    }
}

/// Scores the perceptual difference between consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceScorer {
    stride: u32,
}

impl DifferenceScorer {
    /// Create a scorer sampling every `stride`-th pixel in both axes.
    pub fn new(stride: u32) -> Result<Self> {
        if stride == 0 {
            return Err(CutDetectError::InvalidParameter(
                "sampling stride must be at least 1".into(),
            ));
        }
        Ok(Self { stride })
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Average absolute luma difference as a percentage.
    ///
    /// Rows of the sampling grid are summed in parallel; the result matches
    /// [`score_sequential`](Self::score_sequential) up to summation order.
    pub fn score(&self, current: &FrameBuffer, previous: &FrameBuffer) -> Result<f64> {
        let grid = self.prepare(current, previous)?;
        let total: f64 = (0..grid.rows)
            .into_par_iter()
            .map(|row| grid.row_difference(current, previous, row))
            .sum();
        Ok(grid.finish(total))
    }

    /// Same as [`score`](Self::score) on the calling thread only.
    pub fn score_sequential(&self, current: &FrameBuffer, previous: &FrameBuffer) -> Result<f64> {
        let grid = self.prepare(current, previous)?;
        let total: f64 = (0..grid.rows)
            .map(|row| grid.row_difference(current, previous, row))
            .sum();
        Ok(grid.finish(total))
    }

    fn prepare(&self, current: &FrameBuffer, previous: &FrameBuffer) -> Result<SampleGrid> {
        let current_norm = Normalization::for_format(current.format)?;
        let previous_norm = Normalization::for_format(previous.format)?;

        if !current.same_dimensions(previous) {
            return Err(CutDetectError::DimensionMismatch {
                current_width: current.width,
                current_height: current.height,
                previous_width: previous.width,
                previous_height: previous.height,
            });
        }

        // Partial cells at the right and bottom edges are not sampled
        let grid = SampleGrid {
            stride: self.stride,
            columns: current.width / self.stride,
            rows: current.height / self.stride,
            current_norm,
            previous_norm,
        };
        if grid.positions() == 0 {
            return Err(CutDetectError::FrameTooSmall {
                width: current.width,
                height: current.height,
                stride: self.stride,
            });
        }
        Ok(grid)
    }
}

/// Sampling positions shared by both frames of a pair.
struct SampleGrid {
    stride: u32,
    columns: u32,
    rows: u32,
    current_norm: Normalization,
    previous_norm: Normalization,
}

impl SampleGrid {
    fn positions(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    fn row_difference(&self, current: &FrameBuffer, previous: &FrameBuffer, row: u32) -> f64 {
        let y = row * self.stride;
        let cur = current.primary_plane();
        let prev = previous.primary_plane();
        (0..self.columns)
            .map(|column| {
                let x = column * self.stride;
                let l = self.current_norm.luma(cur.pixel(x, y));
                let prev_l = self.previous_norm.luma(prev.pixel(x, y));
                (l - prev_l).abs()
            })
            .sum()
    }

    fn finish(&self, total: f64) -> f64 {
        100.0 * total / self.positions() as f64
    }
}

/// Score a frame pair at the given sampling stride.
pub fn score(current: &FrameBuffer, previous: &FrameBuffer, stride: u32) -> Result<f64> {
    DifferenceScorer::new(stride)?.score(current, previous)
}
