//! Tests for the image data model and normalized pixel access

use pixelcloud::GenerationError;
use pixelcloud::pixel::accessor::PixelAccessor;
use pixelcloud::pixel::{ByteOrder, Rgba, SourceImage};

use crate::common::solid_image;

// Tests dimension validation at construction
#[test]
fn test_zero_dimension_is_rejected() {
    let result = SourceImage::from_rgba8(0, 4, Vec::new());
    assert!(matches!(result, Err(GenerationError::InvalidImage { .. })));
}

// Tests buffer length validation against the declared dimensions
#[test]
fn test_short_buffer_is_rejected() {
    let result = SourceImage::from_rgba8(2, 2, vec![0u8; 15]);
    assert!(matches!(result, Err(GenerationError::InvalidImage { .. })));
}

// Tests the defined out-of-bounds fallback
#[test]
fn test_out_of_bounds_read_is_transparent() {
    let image = solid_image(2, 2, [255, 255, 255, 255]);
    let accessor = PixelAccessor::new(&image);

    assert_eq!(accessor.color_at(2, 0), Rgba::TRANSPARENT);
    assert_eq!(accessor.color_at(0, 2), Rgba::TRANSPARENT);
    assert_eq!(accessor.color_at(u32::MAX, u32::MAX), Rgba::TRANSPARENT);
}

// Tests the ARGB channel permutation against a hand-built pixel
#[test]
fn test_argb_byte_order_is_normalized() {
    // Stored as ARGB: alpha=128, red=255, green=64, blue=0
    let image = SourceImage::from_raw(1, 1, ByteOrder::Argb, vec![128, 255, 64, 0]).unwrap();
    let color = PixelAccessor::new(&image).color_at(0, 0);

    assert!((color.r - 1.0).abs() < 1e-6);
    assert!((color.g - 64.0 / 255.0).abs() < 1e-6);
    assert!((color.b - 0.0).abs() < 1e-6);
    assert!((color.a - 128.0 / 255.0).abs() < 1e-6);
}

// Tests flat-index access agrees with coordinate access
#[test]
fn test_color_at_index_matches_coordinates() {
    let image = crate::common::gradient_image(5, 3);
    let accessor = PixelAccessor::new(&image);

    for index in 0..accessor.pixel_count() {
        let x = (index % 5) as u32;
        let y = (index / 5) as u32;
        assert_eq!(accessor.color_at_index(index), accessor.color_at(x, y));
    }
}

// Tests luminance weights: pure white is 1, pure green dominates red and blue
#[test]
fn test_luminance_weighting() {
    let white = Rgba::new(1.0, 1.0, 1.0, 1.0);
    assert!((white.luminance() - 1.0).abs() < 1e-6);

    let green = Rgba::new(0.0, 1.0, 0.0, 1.0).luminance();
    let red = Rgba::new(1.0, 0.0, 0.0, 1.0).luminance();
    let blue = Rgba::new(0.0, 0.0, 1.0, 1.0).luminance();
    assert!(green > red && red > blue);
}

// Tests saturation: gray is zero, pure red is one
#[test]
fn test_saturation_extremes() {
    assert!(Rgba::new(0.5, 0.5, 0.5, 1.0).saturation() < 1e-6);
    assert!((Rgba::new(1.0, 0.0, 0.0, 1.0).saturation() - 1.0).abs() < 1e-6);
    assert!(Rgba::TRANSPARENT.saturation() < 1e-6);
}

// Tests local contrast at the image edge: a lone white pixel sees four
// transparent-black neighbors, so contrast is full luminance
#[test]
fn test_local_contrast_at_edges_uses_transparent_fallback() {
    let image = solid_image(1, 1, [255, 255, 255, 255]);
    let accessor = PixelAccessor::new(&image);

    assert!((accessor.local_contrast(0, 0, 1) - 1.0).abs() < 1e-5);
}

// Tests that a flat interior has no local contrast
#[test]
fn test_local_contrast_is_zero_on_flat_interior() {
    let image = solid_image(5, 5, [90, 90, 90, 255]);
    let accessor = PixelAccessor::new(&image);

    assert!(accessor.local_contrast(2, 2, 1) < 1e-6);
}

// Tests 8-bit round trip through the normalized representation
#[test]
fn test_rgba8_round_trip() {
    let color = Rgba::from_rgba8(12, 200, 255, 0);
    assert_eq!(color.to_rgba8(), [12, 200, 255, 0]);
}
