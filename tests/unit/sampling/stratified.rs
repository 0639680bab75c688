//! Tests for band-quota allocation behavior

use pixelcloud::pipeline::CancellationToken;
use pixelcloud::pixel::accessor::PixelAccessor;
use pixelcloud::pixel::SourceImage;
use pixelcloud::sampling::params::SamplingParams;
use pixelcloud::sampling::{AdvancedAlgorithm, StrategyKind};

use crate::common::{assert_sample_invariants, solid_image};

fn half_bright_image(width: u32, height: u32) -> SourceImage {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for _ in 0..width {
            if y < height / 2 {
                data.extend_from_slice(&[255, 255, 255, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }
    SourceImage::from_rgba8(width, height, data).unwrap()
}

// Tests quota allocation follows importance mass: a black bottom half has
// zero alpha-weighted luminance, so every quota lands in the bright half
#[test]
fn test_quotas_follow_brightness_mass() {
    let image = half_bright_image(16, 16);
    let accessor = PixelAccessor::new(&image);
    let token = CancellationToken::new();

    let samples = StrategyKind::Advanced(AdvancedAlgorithm::Stratified)
        .sample(&accessor, 16, &SamplingParams::default(), &[], &token)
        .unwrap();

    assert_sample_invariants(&samples, 16, 16, 16);
    assert!(
        samples.iter().all(|sample| sample.y < 8),
        "sample landed in the zero-mass half"
    );
}

// Tests the zero-mass fallback: an all-black image still meets the target
// through population-proportional quotas
#[test]
fn test_zero_mass_image_still_meets_target() {
    let image = solid_image(12, 12, [0, 0, 0, 255]);
    let accessor = PixelAccessor::new(&image);
    let token = CancellationToken::new();

    let samples = StrategyKind::Advanced(AdvancedAlgorithm::Stratified)
        .sample(&accessor, 30, &SamplingParams::default(), &[], &token)
        .unwrap();

    assert_sample_invariants(&samples, 12, 12, 30);
}

// Tests a short image: band count clamps to the height
#[test]
fn test_band_count_clamps_to_short_images() {
    let image = half_bright_image(32, 4);
    let accessor = PixelAccessor::new(&image);
    let token = CancellationToken::new();

    let samples = StrategyKind::Advanced(AdvancedAlgorithm::Stratified)
        .sample(&accessor, 20, &SamplingParams::default(), &[], &token)
        .unwrap();

    assert_sample_invariants(&samples, 32, 4, 20);
}
