//! Parallel hash-derived position sampling

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::io::error::Result;
use crate::math::hash::mix64;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy, fill_random_unique};

/// Indices evaluated per worker batch
const BATCH_SIZE: usize = 4096;

/// Derives each sample position directly from a hash of its output index,
/// so every index can be evaluated independently across a thread pool
///
/// Workers push owned batches into one mutex-guarded accumulator; per-batch
/// work dominates lock overhead, and a single growing accumulator is the
/// intended shape here rather than fine-grained sharing. The merged result
/// is re-sorted by output index, which keeps the final sample order
/// deterministic regardless of worker scheduling, then de-duplicated in
/// index order with a deterministic sequence continuation for collisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashBasedSampling;

/// Position for one output index under the seeded hash
fn position_for_index(seed: u64, index: u64, width: u32, height: u32) -> (u32, u32) {
    let hash = mix64(seed ^ mix64(index));
    let x = (hash & 0xffff_ffff) % u64::from(width);
    let y = (hash >> 32) % u64::from(height);
    (x as u32, y as u32)
}

impl SamplingStrategy for HashBasedSampling {
    fn name(&self) -> &'static str {
        "hash-based"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        _dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let width = accessor.width();
        let height = accessor.height();
        let batches = target.div_ceil(BATCH_SIZE);

        // Single accumulator by design: one lock per batch, not per item
        let accumulator: Mutex<Vec<(u64, Sample)>> = Mutex::new(Vec::with_capacity(target));

        (0..batches).into_par_iter().for_each(|batch| {
            let start = batch * BATCH_SIZE;
            let end = (start + BATCH_SIZE).min(target);
            let mut local = Vec::with_capacity(end - start);

            for index in start..end {
                let (x, y) = position_for_index(params.seed, index as u64, width, height);
                local.push((index as u64, Sample::new(x, y, accessor.color_at(x, y))));
            }

            if let Ok(mut merged) = accumulator.lock() {
                merged.append(&mut local);
            }
        });

        let mut indexed = accumulator.into_inner().unwrap_or_default();
        indexed.sort_by_key(|&(index, _)| index);

        // De-duplicate in index order; distinct hash outputs may repeat a
        // position when the requested count approaches the pixel count
        let mut mask = OccupancyMask::new(width, height);
        let mut samples = Vec::with_capacity(target);
        for (_, sample) in indexed {
            if mask.insert(sample.x, sample.y) {
                samples.push(sample);
            }
        }

        // Continue the hash sequence deterministically for collisions
        let mut index = target as u64;
        let budget = (target as u64).saturating_mul(8);
        while samples.len() < target && index < budget {
            let (x, y) = position_for_index(params.seed, index, width, height);
            if mask.insert(x, y) {
                samples.push(Sample::new(x, y, accessor.color_at(x, y)));
            }
            index += 1;
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        fill_random_unique(&mut samples, &mut mask, target, accessor, &mut rng);

        Ok(samples)
    }
}
