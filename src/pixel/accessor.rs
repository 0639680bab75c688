//! Bounds-checked, byte-order-normalized random access over pixel data

use crate::pixel::{Rgba, SourceImage};

/// O(1) random-access color lookup over a decoded image
///
/// Resolves the channel permutation once at construction and applies it on
/// every read, so callers always observe RGBA regardless of how the image
/// was decoded. Out-of-range coordinates return [`Rgba::TRANSPARENT`]
/// rather than failing; validators probe past the edges and rely on a
/// defined fallback. Holds only a shared borrow of the image, so it is
/// freely shareable across sampling workers.
#[derive(Debug, Clone, Copy)]
pub struct PixelAccessor<'a> {
    image: &'a SourceImage,
    offsets: [usize; 4],
}

impl<'a> PixelAccessor<'a> {
    /// Create an accessor over a validated image
    pub const fn new(image: &'a SourceImage) -> Self {
        Self {
            image,
            offsets: image.byte_order().channel_offsets(),
        }
    }

    /// Image width in pixels
    pub const fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels
    pub const fn height(&self) -> u32 {
        self.image.height()
    }

    /// Total number of pixels
    pub const fn pixel_count(&self) -> usize {
        self.image.pixel_count()
    }

    /// Whether the coordinate pair lies inside the image
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Normalized RGBA color at (x, y)
    ///
    /// Returns transparent black for out-of-range coordinates.
    pub fn color_at(&self, x: u32, y: u32) -> Rgba {
        if !self.contains(x, y) {
            return Rgba::TRANSPARENT;
        }

        let base = (y as usize * self.width() as usize + x as usize) * 4;
        let data = self.image.data();
        let channel = |offset: usize| -> f32 {
            data.get(base + offset)
                .copied()
                .map_or(0.0, |v| f32::from(v) / 255.0)
        };

        Rgba {
            r: channel(self.offsets[0]),
            g: channel(self.offsets[1]),
            b: channel(self.offsets[2]),
            a: channel(self.offsets[3]),
        }
    }

    /// Color at a flat pixel index in row-major order
    pub fn color_at_index(&self, index: usize) -> Rgba {
        let width = self.width() as usize;
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        self.color_at(x, y)
    }

    /// Local contrast at (x, y): mean luminance difference to the four
    /// axis-aligned neighbors at the given radius
    ///
    /// Neighbors beyond the image edge fall back to transparent black,
    /// which is the same behavior the analyzer and importance scoring
    /// expect at borders.
    pub fn local_contrast(&self, x: u32, y: u32, radius: u32) -> f32 {
        let center = self.color_at(x, y).luminance();
        let r = radius.max(1) as i64;
        let offsets = [(-r, 0), (r, 0), (0, -r), (0, r)];

        let mut total = 0.0_f32;
        for (dx, dy) in offsets {
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            let neighbor = if nx < 0 || ny < 0 {
                Rgba::TRANSPARENT
            } else {
                self.color_at(nx as u32, ny as u32)
            };
            total += (center - neighbor.luminance()).abs();
        }

        total / offsets.len() as f32
    }
}
