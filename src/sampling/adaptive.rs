//! Two-phase sampling: importance core with uniform fill

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::io::error::Result;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::importance::{score_all_pixels, sort_by_score_descending};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy, fill_random_unique};

/// Share of the target drawn by the importance phase
const IMPORTANCE_SHARE: f32 = 0.7;
/// Threshold multiplier for the importance phase
const ELEVATED_THRESHOLD_FACTOR: f32 = 1.25;

/// Importance sampling for 70% of the target at an elevated threshold,
/// then a uniform stride fill for the remaining 30%, skipping positions
/// the first phase already chose
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveSampling;

impl SamplingStrategy for AdaptiveSampling {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let elevated = SamplingParams {
            importance_threshold: params.importance_threshold * ELEVATED_THRESHOLD_FACTOR,
            ..*params
        };
        let importance_quota = (target as f32 * IMPORTANCE_SHARE) as usize;

        let mut scored = score_all_pixels(accessor, &elevated, dominant_colors);
        sort_by_score_descending(&mut scored);

        let mut samples = Vec::with_capacity(target);
        let mut mask = OccupancyMask::new(accessor.width(), accessor.height());

        for pixel in scored
            .iter()
            .take_while(|pixel| pixel.score >= elevated.importance_threshold)
            .take(importance_quota)
        {
            if mask.insert(pixel.x, pixel.y) {
                samples.push(pixel.to_sample());
            }
        }

        // Uniform phase: stride scan over the full image, skipping taken
        // positions
        let total = accessor.pixel_count();
        let remaining = target - samples.len();
        if remaining > 0 {
            let stride = total.div_ceil(remaining).max(1);
            let width = accessor.width() as usize;
            let mut index = 0;
            while index < total && samples.len() < target {
                let x = (index % width) as u32;
                let y = (index / width) as u32;
                if mask.insert(x, y) {
                    samples.push(Sample::new(x, y, accessor.color_at(x, y)));
                }
                index += stride;
            }
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        fill_random_unique(&mut samples, &mut mask, target, accessor, &mut rng);

        Ok(samples)
    }
}
