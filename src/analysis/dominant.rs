//! Dominant color extraction via coarse histogram quantization

use std::collections::HashMap;

use crate::io::configuration::MAX_DOMINANT_COLORS;
use crate::pixel::Rgba;
use crate::pixel::accessor::PixelAccessor;

/// Accumulated channel sums for one quantization bucket
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    r: f64,
    g: f64,
    b: f64,
    weight: f64,
}

/// Quantize a color to a 4-bit-per-channel bucket key
fn bucket_key(color: &Rgba) -> u16 {
    let quantize = |v: f32| -> u16 { ((v.clamp(0.0, 1.0) * 15.0).round() as u16).min(15) };
    quantize(color.r) << 8 | quantize(color.g) << 4 | quantize(color.b)
}

/// Extract up to [`MAX_DOMINANT_COLORS`] representative colors
///
/// Walks the given probe positions, accumulates alpha-weighted channel sums
/// per 4-bit quantization bucket, and returns the mean color of the heaviest
/// buckets. Transparent pixels contribute nothing, so fully transparent
/// regions never produce a dominant color.
pub fn extract_dominant_colors(
    accessor: &PixelAccessor<'_>,
    probes: impl Iterator<Item = (u32, u32)>,
) -> Vec<Rgba> {
    let mut buckets: HashMap<u16, Bucket> = HashMap::new();

    for (x, y) in probes {
        let color = accessor.color_at(x, y);
        if color.a <= f32::EPSILON {
            continue;
        }

        let entry = buckets.entry(bucket_key(&color)).or_default();
        let weight = f64::from(color.a);
        entry.r += f64::from(color.r) * weight;
        entry.g += f64::from(color.g) * weight;
        entry.b += f64::from(color.b) * weight;
        entry.weight += weight;
    }

    let mut ranked: Vec<Bucket> = buckets.into_values().collect();
    ranked.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .iter()
        .take(MAX_DOMINANT_COLORS)
        .filter(|bucket| bucket.weight > 0.0)
        .map(|bucket| {
            Rgba::new(
                (bucket.r / bucket.weight) as f32,
                (bucket.g / bucket.weight) as f32,
                (bucket.b / bucket.weight) as f32,
                1.0,
            )
        })
        .collect()
}
