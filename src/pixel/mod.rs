//! Image data model with byte-order normalization and pixel access

pub mod accessor;

use serde::{Deserialize, Serialize};

use crate::io::error::{GenerationError, Result};

/// Normalized RGBA color with all channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black, used as the defined out-of-bounds fallback
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Construct from normalized channel values
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct from 8-bit channel values
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: f32::from(a) / 255.0,
        }
    }

    /// Perceptual luminance (Rec. 601 weights)
    pub fn luminance(&self) -> f32 {
        0.299_f32.mul_add(self.r, 0.587_f32.mul_add(self.g, 0.114 * self.b))
    }

    /// Channel spread relative to the brightest channel
    ///
    /// Zero for grays, approaching one for fully saturated colors.
    pub fn saturation(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        if max <= f32::EPSILON {
            0.0
        } else {
            (max - min) / max
        }
    }

    /// Euclidean distance to another color in RGB space
    pub fn distance(&self, other: &Self) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        db.mul_add(db, dr.mul_add(dr, dg * dg)).sqrt()
    }

    /// Convert back to 8-bit channels
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

/// Channel layout of a decoded pixel buffer
///
/// Resolved once when the image is constructed; every read applies the
/// corresponding permutation so callers always observe RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Red, green, blue, alpha
    Rgba,
    /// Blue, green, red, alpha
    Bgra,
    /// Alpha, red, green, blue
    Argb,
}

impl ByteOrder {
    /// Byte offsets of (r, g, b, a) within a 4-byte pixel
    pub const fn channel_offsets(self) -> [usize; 4] {
        match self {
            Self::Rgba => [0, 1, 2, 3],
            Self::Bgra => [2, 1, 0, 3],
            Self::Argb => [1, 2, 3, 0],
        }
    }
}

/// One (x, y, color) observation drawn from a source image
///
/// Position is in source-image pixel space; conversion into display space
/// happens during particle assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Horizontal pixel coordinate
    pub x: u32,
    /// Vertical pixel coordinate
    pub y: u32,
    /// Color observed at the position
    pub color: Rgba,
}

impl Sample {
    /// Construct a sample at a position with a color
    pub const fn new(x: u32, y: u32, color: Rgba) -> Self {
        Self { x, y, color }
    }
}

/// Immutable decoded image: a width x height grid of 4-byte pixels
///
/// Never mutated after creation, so it can be shared read-only across
/// sampling workers without synchronization.
#[derive(Debug, Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    byte_order: ByteOrder,
    data: Vec<u8>,
}

impl SourceImage {
    /// Create an image from a raw pixel buffer with a known byte order
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if either dimension is zero or the buffer
    /// length does not equal `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, byte_order: ByteOrder, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GenerationError::InvalidImage {
                reason: format!("image dimensions must be non-zero, got {width}x{height}"),
            });
        }

        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(GenerationError::InvalidImage {
                reason: format!(
                    "pixel buffer holds {} bytes, expected {expected} for {width}x{height}",
                    data.len()
                ),
            });
        }

        Ok(Self {
            width,
            height,
            byte_order,
            data,
        })
    }

    /// Create an image from an RGBA8 buffer
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if either dimension is zero or the buffer
    /// length does not match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::from_raw(width, height, ByteOrder::Rgba, data)
    }

    /// Image width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Channel layout of the backing buffer
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Raw pixel bytes in the stored byte order
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
