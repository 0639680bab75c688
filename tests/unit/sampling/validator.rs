//! Tests for artifact detection and correction

use pixelcloud::pixel::accessor::PixelAccessor;
use pixelcloud::pixel::Sample;
use pixelcloud::sampling::params::SamplingParams;
use pixelcloud::sampling::validator::ArtifactPreventionValidator;

use crate::common::{assert_sample_invariants, gradient_image};

fn block_samples(
    accessor: &PixelAccessor<'_>,
    x_range: std::ops::Range<u32>,
    y_range: std::ops::Range<u32>,
) -> Vec<Sample> {
    let mut samples = Vec::new();
    for y in y_range {
        for x in x_range.clone() {
            samples.push(Sample::new(x, y, accessor.color_at(x, y)));
        }
    }
    samples
}

// Tests duplicate and out-of-bounds samples are removed before correction
#[test]
fn test_dedupe_and_bounds_clamp() {
    let image = gradient_image(10, 10);
    let accessor = PixelAccessor::new(&image);

    let samples = vec![
        Sample::new(1, 1, accessor.color_at(1, 1)),
        Sample::new(1, 1, accessor.color_at(1, 1)),
        Sample::new(20, 3, accessor.color_at(20, 3)),
        Sample::new(4, 4, accessor.color_at(4, 4)),
    ];

    let corrected = ArtifactPreventionValidator::default().validate_and_correct(
        samples,
        &accessor,
        10,
        &SamplingParams::default(),
    );

    assert_sample_invariants(&corrected, 10, 10, 2);
}

// Tests output never exceeds the target
#[test]
fn test_truncates_to_target() {
    let image = gradient_image(10, 10);
    let accessor = PixelAccessor::new(&image);
    let samples = block_samples(&accessor, 0..10, 0..10);

    let corrected = ArtifactPreventionValidator::default().validate_and_correct(
        samples,
        &accessor,
        25,
        &SamplingParams::default(),
    );

    assert_eq!(corrected.len(), 25);
}

// Tests clustering correction: every sample crammed into the top-left
// region is spread out until no region exceeds the tolerated share
#[test]
fn test_clustered_block_is_spread_out() {
    let image = gradient_image(30, 30);
    let accessor = PixelAccessor::new(&image);
    let samples = block_samples(&accessor, 0..8, 0..8);
    let count = samples.len();

    let corrected = ArtifactPreventionValidator::default().validate_and_correct(
        samples,
        &accessor,
        count,
        &SamplingParams::default(),
    );

    assert_sample_invariants(&corrected, 30, 30, count);

    // Top-left third of a 30x30 image is x < 10, y < 10
    let in_corner = corrected
        .iter()
        .filter(|sample| sample.x < 10 && sample.y < 10)
        .count();
    assert!(
        in_corner < count,
        "clustering correction left every sample in one region"
    );
    let share = in_corner as f32 / count as f32;
    assert!(share < 0.9, "corner share {share} still degenerate");
}

// Tests clustering correction can be disabled through the parameters
#[test]
fn test_anti_clustering_flag_is_honored() {
    let image = gradient_image(30, 30);
    let accessor = PixelAccessor::new(&image);
    // A balanced top/bottom block so only the clustering detector fires
    let samples = block_samples(&accessor, 0..6, 11..19);
    let count = samples.len();

    let params = SamplingParams {
        anti_clustering: false,
        ..SamplingParams::default()
    };
    let corrected =
        ArtifactPreventionValidator::default().validate_and_correct(samples.clone(), &accessor, count, &params);

    assert_eq!(corrected, samples);
}

// Tests vertical imbalance correction: an all-top distribution is pushed
// back toward an even split within tolerance
#[test]
fn test_vertical_imbalance_is_corrected() {
    let image = gradient_image(40, 40);
    let accessor = PixelAccessor::new(&image);
    // Full top rows: evenly spread horizontally so clustering stays quiet
    let samples = block_samples(&accessor, 0..40, 0..2);
    let count = samples.len();

    let corrected = ArtifactPreventionValidator::default().validate_and_correct(
        samples,
        &accessor,
        count,
        &SamplingParams::default(),
    );

    assert_sample_invariants(&corrected, 40, 40, count);

    let top = corrected.iter().filter(|sample| sample.y < 20).count();
    let top_share = top as f32 / count as f32;
    assert!(
        (top_share - 0.5).abs() <= 0.2,
        "top share {top_share} still outside tolerance"
    );
}

// Tests the empty input edge case
#[test]
fn test_empty_input_stays_empty() {
    let image = gradient_image(10, 10);
    let accessor = PixelAccessor::new(&image);

    let corrected = ArtifactPreventionValidator::default().validate_and_correct(
        Vec::new(),
        &accessor,
        10,
        &SamplingParams::default(),
    );

    assert!(corrected.is_empty());
}
