//! Deterministic stride-scan sampling

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::io::error::Result;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy, fill_random_unique};

/// O(n) deterministic sampling with stride `ceil(total / target)`
///
/// Visits every `stride`-th pixel in row-major order, which spreads the
/// samples evenly without any randomness. Integer division can leave the
/// scan slightly short of the target; the shortfall is padded with random
/// unique positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampling;

impl SamplingStrategy for UniformSampling {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        _dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let total = accessor.pixel_count();
        let stride = total.div_ceil(target).max(1);
        let width = accessor.width() as usize;

        let mut samples = Vec::with_capacity(target);
        let mut mask = OccupancyMask::new(accessor.width(), accessor.height());

        let mut index = 0;
        while index < total && samples.len() < target {
            let x = (index % width) as u32;
            let y = (index / width) as u32;
            if mask.insert(x, y) {
                samples.push(Sample::new(x, y, accessor.color_at(x, y)));
            }
            index += stride;
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        fill_random_unique(&mut samples, &mut mask, target, accessor, &mut rng);

        Ok(samples)
    }
}
