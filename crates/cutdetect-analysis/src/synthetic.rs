//! Synthetic frames for tests and benchmarks.

use cutdetect_core::{FrameBuffer, PixelFormat};
use half::f16;

/// Encode one normalized RGB pixel in the packed layout of `format`.
///
/// Planar formats encode to an empty pixel.
pub fn encode_rgb(format: PixelFormat, rgb: [f64; 3]) -> Vec<u8> {
    match format {
        PixelFormat::Rgb8 => rgb
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect(),
        PixelFormat::Rgb10 | PixelFormat::Rgb12 => rgb
            .iter()
            .flat_map(|v| ((v.clamp(0.0, 1.0) * 65535.0).round() as u16).to_ne_bytes())
            .collect(),
        PixelFormat::RgbHalf => rgb
            .iter()
            .flat_map(|&v| f16::from_f64(v).to_ne_bytes())
            .collect(),
        PixelFormat::Nv12 | PixelFormat::Yuv420P => Vec::new(),
    }
}

/// A frame filled with one normalized RGB color.
pub fn solid_frame(format: PixelFormat, width: u32, height: u32, rgb: [f64; 3]) -> FrameBuffer {
    let mut frame = FrameBuffer::new(width, height, format);
    let pixel = encode_rgb(format, rgb);
    if pixel.is_empty() {
        return frame;
    }
    let plane = frame.primary_plane_mut();
    for y in 0..height {
        for chunk in plane.row_mut(y).chunks_exact_mut(pixel.len()) {
            chunk.copy_from_slice(&pixel);
        }
    }
    frame
}

/// An 8-bit frame whose luma ramps left to right, offset by `phase`.
///
/// Successive phases give small but nonzero differences, like a slow pan.
pub fn gradient_frame(width: u32, height: u32, phase: u32) -> FrameBuffer {
    let mut frame = FrameBuffer::new(width, height, PixelFormat::Rgb8);
    if width == 0 {
        return frame;
    }
    let plane = frame.primary_plane_mut();
    for y in 0..height {
        let row = plane.row_mut(y);
        for x in 0..width {
            let v = ((x + phase) % width * 255 / width) as u8;
            let i = x as usize * 3;
            row[i..i + 3].copy_from_slice(&[v, v, v]);
        }
    }
    frame
}
