//! Shared image builders for unit tests

use pixelcloud::pixel::{Sample, SourceImage};
use std::collections::HashSet;

/// Solid-color image of the given dimensions
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    let data: Vec<u8> = std::iter::repeat_n(rgba, width as usize * height as usize)
        .flatten()
        .collect();
    SourceImage::from_rgba8(width, height, data).unwrap()
}

/// Diagonal gradient image: luminance rises from top-left to bottom-right
pub fn gradient_image(width: u32, height: u32) -> SourceImage {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let v = ((x + y) * 255 / (width + height - 2).max(1)) as u8;
            data.extend_from_slice(&[v, v / 2, 255 - v, 255]);
        }
    }
    SourceImage::from_rgba8(width, height, data).unwrap()
}

/// Assert samples are unique, in bounds, and exactly `expected` many
pub fn assert_sample_invariants(samples: &[Sample], width: u32, height: u32, expected: usize) {
    assert_eq!(samples.len(), expected, "sample count mismatch");

    let mut positions = HashSet::new();
    for sample in samples {
        assert!(sample.x < width, "x {} out of bounds", sample.x);
        assert!(sample.y < height, "y {} out of bounds", sample.y);
        assert!(
            positions.insert((sample.x, sample.y)),
            "duplicate position ({}, {})",
            sample.x,
            sample.y
        );
    }
}
