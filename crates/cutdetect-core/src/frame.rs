//! Frame buffer types for host-delivered video frames.
//!
//! A frame arrives from the host as raw bytes plus geometry: a per-row byte
//! stride and a per-pixel byte increment, either of which may include padding.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{CutDetectError, Result};

/// Pixel format of a host frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGB, 3 bytes per pixel
    #[default]
    Rgb8,
    /// 10-bit RGB stored in 16-bit words (6 bytes per pixel)
    Rgb10,
    /// 12-bit RGB stored in 16-bit words (6 bytes per pixel)
    Rgb12,
    /// 16-bit half-float RGB (6 bytes per pixel)
    RgbHalf,
    /// NV12 YUV format
    Nv12,
    /// YUV 4:2:0 planar
    Yuv420P,
}

impl PixelFormat {
    /// Packed bytes per pixel, or 0 for planar formats.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgb10 | Self::Rgb12 | Self::RgbHalf => 6,
            Self::Nv12 | Self::Yuv420P => 0, // Planar
        }
    }

    /// Number of planes for this format.
    pub fn plane_count(self) -> usize {
        match self {
            Self::Rgb8 | Self::Rgb10 | Self::Rgb12 | Self::RgbHalf => 1,
            Self::Nv12 => 2,
            Self::Yuv420P => 3,
        }
    }

    /// Whether frames in this format can be difference-scored.
    ///
    /// This is the answer given to the host when it negotiates input formats.
    pub fn is_scoreable(self) -> bool {
        matches!(self, Self::Rgb8 | Self::Rgb10 | Self::Rgb12 | Self::RgbHalf)
    }
}

/// A plane of pixel data with stride information.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlane {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Bytes per row (may include padding)
    pub stride: usize,
    /// Bytes from one pixel to the next (may include padding, e.g. alpha)
    pub pixel_stride: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FramePlane {
    /// Create a zeroed plane with the given dimensions.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        // Align stride to 64 bytes, as hosts commonly do
        let min_stride = (width as usize) * bytes_per_pixel;
        let stride = (min_stride + 63) & !63;
        let data = vec![0u8; stride * height as usize];
        Self {
            data,
            stride,
            pixel_stride: bytes_per_pixel,
            width,
            height,
        }
    }

    /// Wrap raw host bytes, checking that the declared geometry fits.
    pub fn from_raw(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        pixel_stride: usize,
        min_pixel_bytes: usize,
    ) -> Result<Self> {
        if pixel_stride < min_pixel_bytes {
            return Err(CutDetectError::InvalidParameter(format!(
                "pixel increment {pixel_stride} is smaller than a {min_pixel_bytes}-byte pixel"
            )));
        }
        let row_bytes = width as usize * pixel_stride;
        if height > 0 && width > 0 && stride < row_bytes {
            return Err(CutDetectError::InvalidParameter(format!(
                "row stride {stride} is smaller than {width} pixels of {pixel_stride} bytes"
            )));
        }
        let required = Self::required_len(width, height, stride, pixel_stride, min_pixel_bytes);
        if data.len() < required {
            return Err(CutDetectError::InvalidParameter(format!(
                "buffer holds {} bytes, geometry needs {required}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            stride,
            pixel_stride,
            width,
            height,
        })
    }

    fn required_len(
        width: u32,
        height: u32,
        stride: usize,
        pixel_stride: usize,
        min_pixel_bytes: usize,
    ) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        (height as usize - 1) * stride + (width as usize - 1) * pixel_stride + min_pixel_bytes
    }

    /// Get a row of pixel data.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let end = (start + self.width as usize * self.pixel_stride).min(self.data.len());
        &self.data[start..end]
    }

    /// Get a mutable row of pixel data.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = (start + self.width as usize * self.pixel_stride).min(self.data.len());
        &mut self.data[start..end]
    }

    /// Bytes of the pixel at `(x, y)`, starting at its first channel.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = y as usize * self.stride + x as usize * self.pixel_stride;
        &self.data[start..]
    }
}

/// A video frame in CPU memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Pixel format
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data planes (1-3 depending on format)
    pub planes: SmallVec<[FramePlane; 3]>,
}

impl FrameBuffer {
    /// Create a zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let planes = match format {
            PixelFormat::Rgb8 => smallvec::smallvec![FramePlane::new(width, height, 3)],
            PixelFormat::Rgb10 | PixelFormat::Rgb12 | PixelFormat::RgbHalf => {
                smallvec::smallvec![FramePlane::new(width, height, 6)]
            }
            PixelFormat::Nv12 => {
                smallvec::smallvec![
                    FramePlane::new(width, height, 1),         // Y
                    FramePlane::new(width / 2, height / 2, 2), // UV interleaved
                ]
            }
            PixelFormat::Yuv420P => {
                smallvec::smallvec![
                    FramePlane::new(width, height, 1),         // Y
                    FramePlane::new(width / 2, height / 2, 1), // U
                    FramePlane::new(width / 2, height / 2, 1), // V
                ]
            }
        };

        Self {
            format,
            width,
            height,
            planes,
        }
    }

    /// Wrap a packed single-plane buffer as delivered by the host.
    ///
    /// `stride` is bytes per row and `pixel_stride` bytes per pixel; both are
    /// taken from the host rather than derived from the format.
    pub fn from_packed(
        format: PixelFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
        stride: usize,
        pixel_stride: usize,
    ) -> Result<Self> {
        if format.plane_count() != 1 {
            return Err(CutDetectError::UnsupportedFormat(format));
        }
        let plane = FramePlane::from_raw(
            data,
            width,
            height,
            stride,
            pixel_stride,
            format.bytes_per_pixel(),
        )?;
        Ok(Self {
            format,
            width,
            height,
            planes: smallvec::smallvec![plane],
        })
    }

    /// Get the primary plane (plane 0).
    #[inline]
    pub fn primary_plane(&self) -> &FramePlane {
        &self.planes[0]
    }

    /// Get the primary plane mutably.
    #[inline]
    pub fn primary_plane_mut(&mut self) -> &mut FramePlane {
        &mut self.planes[0]
    }

    /// Whether two frames share width and height.
    pub fn same_dimensions(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}
