//! Shared clip builders for the integration tests.

use cutdetect_analysis::synthetic::solid_frame;
use cutdetect_core::{FrameBuffer, PixelFormat};
use cutdetect_host::CutDetector;
use tracing_subscriber::EnvFilter;

pub const WIDTH: u32 = 32;
pub const HEIGHT: u32 = 32;

/// Route tracing output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A grey frame at an 8-bit `level`.
pub fn grey(format: PixelFormat, level: u8) -> FrameBuffer {
    let v = f64::from(level) / 255.0;
    solid_frame(format, WIDTH, HEIGHT, [v, v, v])
}

/// A clip of `shot_levels.len()` shots, `shot_len` frames each.
///
/// Inside a shot the level alternates between `base` and `base + 2`, a
/// difference of about 0.8%: above the default duplicate threshold and well
/// under the default cut threshold.
pub fn clip(format: PixelFormat, shot_levels: &[u8], shot_len: usize) -> Vec<FrameBuffer> {
    shot_levels
        .iter()
        .flat_map(|&base| (0..shot_len).map(move |i| base + (i % 2) as u8 * 2))
        .map(|level| grey(format, level))
        .collect()
}

/// Run a complete analysis pass over `frames`.
pub fn analyse_all(detector: &mut CutDetector, frames: &mut Vec<FrameBuffer>) {
    detector.begin_analysis().unwrap();
    for index in 0..frames.len() as u64 {
        detector.analyse_frame(index, frames).unwrap();
    }
    detector.end_analysis().unwrap();
}
