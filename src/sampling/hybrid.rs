//! Three-tier threshold blend sampling

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::io::error::Result;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::importance::{score_all_pixels, sort_by_score_descending};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy, fill_random_unique};

/// Share of the target for the very-important tier
const VERY_IMPORTANT_SHARE: f32 = 0.4;
/// Share of the target for the moderately-important tier
const MODERATE_SHARE: f32 = 0.4;
/// Threshold multiplier for the very-important tier
const VERY_IMPORTANT_FACTOR: f32 = 1.5;
/// Threshold multiplier for the moderately-important tier
const MODERATE_FACTOR: f32 = 0.5;

/// Three-tier blend: 40% of the target at 1.5x the importance threshold,
/// 40% at 0.5x excluding positions already chosen, and 20% uniform fill
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridSampling;

impl SamplingStrategy for HybridSampling {
    fn name(&self) -> &'static str {
        "hybrid"
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

        let very_threshold = params.importance_threshold * VERY_IMPORTANT_FACTOR;
        let moderate_threshold = params.importance_threshold * MODERATE_FACTOR;
        let very_quota = (target as f32 * VERY_IMPORTANT_SHARE) as usize;
        let moderate_quota = (target as f32 * MODERATE_SHARE) as usize;

        let mut samples = Vec::with_capacity(target);
        let mut mask = OccupancyMask::new(accessor.width(), accessor.height());

        let mut taken = 0;
        for pixel in scored.iter().take_while(|p| p.score >= very_threshold) {
            if taken >= very_quota {
                break;
            }
            if mask.insert(pixel.x, pixel.y) {
                samples.push(pixel.to_sample());
                taken += 1;
            }
        }

        taken = 0;
        for pixel in scored.iter().take_while(|p| p.score >= moderate_threshold) {
            if taken >= moderate_quota {
                break;
            }
            if mask.insert(pixel.x, pixel.y) {
                samples.push(pixel.to_sample());
                taken += 1;
            }
        }

        // Uniform tier covers the remainder
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
