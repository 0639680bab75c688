//! Importance-scored sampling with ratio and vertical re-balancing

use ndarray::Array2;

use crate::io::error::Result;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::params::SamplingParams;
use crate::sampling::SamplingStrategy;

/// Weight of the dominant-color uniqueness bonus in the importance score
const UNIQUENESS_WEIGHT: f32 = 0.2;

/// A pixel with its computed importance score
#[derive(Debug, Clone, Copy)]
pub struct ScoredPixel {
    /// Horizontal pixel coordinate
    pub x: u32,
    /// Vertical pixel coordinate
    pub y: u32,
    /// Observed color
    pub color: Rgba,
    /// Weighted importance score
    pub score: f32,
}

impl ScoredPixel {
    /// Convert to an output sample
    pub const fn to_sample(self) -> Sample {
        Sample::new(self.x, self.y, self.color)
    }
}

/// Importance score for one pixel
///
/// Weighted local contrast plus weighted saturation, plus a bonus for
/// colors far from every dominant color: rare colors are a uniqueness
/// signal worth sampling even in flat regions.
pub fn importance_score(
    accessor: &PixelAccessor<'_>,
    x: u32,
    y: u32,
    params: &SamplingParams,
    dominant_colors: &[Rgba],
) -> f32 {
    let color = accessor.color_at(x, y);
    let contrast = accessor.local_contrast(x, y, params.edge_radius);
    let base = params
        .contrast_weight
        .mul_add(contrast, params.saturation_weight * color.saturation());

    if dominant_colors.is_empty() {
        return base;
    }

    let min_distance = dominant_colors
        .iter()
        .map(|dominant| color.distance(dominant))
        .fold(f32::INFINITY, f32::min);

    UNIQUENESS_WEIGHT.mul_add(min_distance, base)
}

/// Per-pixel importance scores as a (row, column) field
pub fn score_field(
    accessor: &PixelAccessor<'_>,
    params: &SamplingParams,
    dominant_colors: &[Rgba],
) -> Array2<f32> {
    Array2::from_shape_fn(
        (accessor.height() as usize, accessor.width() as usize),
        |(y, x)| importance_score(accessor, x as u32, y as u32, params, dominant_colors),
    )
}

/// Score every pixel of the image in row-major scan order
pub fn score_all_pixels(
    accessor: &PixelAccessor<'_>,
    params: &SamplingParams,
    dominant_colors: &[Rgba],
) -> Vec<ScoredPixel> {
    let field = score_field(accessor, params, dominant_colors);
    field
        .indexed_iter()
        .map(|((y, x), &score)| {
            let x = x as u32;
            let y = y as u32;
            ScoredPixel {
                x,
                y,
                color: accessor.color_at(x, y),
                score,
            }
        })
        .collect()
}

/// Sort scored pixels descending by score
///
/// The sort is stable, so equal scores keep scan order and results for
/// equal-weighted configurations stay deterministic.
pub fn sort_by_score_descending(pixels: &mut [ScoredPixel]) {
    pixels.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Importance sampling with threshold acceptance and re-balancing
///
/// Scores every pixel, accepts those above the threshold sorted descending,
/// then re-balances two ways: `important_sampling_ratio` fixes how many
/// samples come from the accepted pool versus best-of-the-rest filler, and
/// `top_bottom_ratio` bounds the share drawn from the top half of the image
/// to avoid vertical bias. Output bypasses artifact prevention; the internal
/// balancing is authoritative.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportanceSampling;

impl SamplingStrategy for ImportanceSampling {
    fn name(&self) -> &'static str {
        "importance"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let mut scored = score_all_pixels(accessor, params, dominant_colors);
        sort_by_score_descending(&mut scored);

        let split = scored
            .iter()
            .position(|pixel| pixel.score < params.importance_threshold)
            .unwrap_or(scored.len());
        let (accepted, filler) = scored.split_at(split);

        let important_quota =
            ((target as f32 * params.important_sampling_ratio) as usize).min(accepted.len());
        let mut chosen: Vec<ScoredPixel> = accepted.iter().copied().take(important_quota).collect();

        // Best-of-the-rest filler up to the target
        chosen.extend(filler.iter().copied().take(target - chosen.len()));
        if chosen.len() < target {
            chosen.extend(
                accepted
                    .iter()
                    .copied()
                    .skip(important_quota)
                    .take(target - chosen.len()),
            );
        }

        rebalance_vertical(&mut chosen, &scored, accessor.height(), params.top_bottom_ratio);

        Ok(chosen.iter().map(|pixel| pixel.to_sample()).collect())
    }
}

/// Swap samples between image halves until the top-half share is within
/// one sample of `top_ratio`
///
/// Replacements come from the highest-scoring unchosen pixels of the
/// underrepresented half; if that half has no spare pixels the imbalance
/// stands.
fn rebalance_vertical(
    chosen: &mut Vec<ScoredPixel>,
    all_scored: &[ScoredPixel],
    height: u32,
    top_ratio: f32,
) {
    if chosen.is_empty() {
        return;
    }

    let midline = height / 2;
    let desired_top = (chosen.len() as f32 * top_ratio).round() as usize;
    let current_top = chosen.iter().filter(|pixel| pixel.y < midline).count();

    let (from_top, needed) = if current_top > desired_top {
        (true, current_top - desired_top)
    } else {
        (false, desired_top - current_top)
    };
    if needed <= 1 {
        return;
    }

    let already: std::collections::HashSet<(u32, u32)> =
        chosen.iter().map(|pixel| (pixel.x, pixel.y)).collect();

    // Candidates from the underrepresented half, best first (scan order
    // preserved by the caller's stable sort)
    let mut replacements = all_scored
        .iter()
        .filter(|pixel| {
            let in_top = pixel.y < midline;
            in_top != from_top && !already.contains(&(pixel.x, pixel.y))
        })
        .copied();

    let mut remaining = needed;
    for slot in chosen.iter_mut() {
        if remaining == 0 {
            break;
        }
        let slot_in_top = slot.y < midline;
        if slot_in_top == from_top {
            if let Some(replacement) = replacements.next() {
                *slot = replacement;
                remaining -= 1;
            } else {
                break;
            }
        }
    }
}
