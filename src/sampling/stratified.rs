//! Stratified horizontal-band sampling with importance-mass quotas

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::io::configuration::STRATIFIED_BANDS;
use crate::io::error::Result;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy, fill_random_unique};

/// A candidate pixel within one band
#[derive(Debug, Clone, Copy)]
struct BandPixel {
    sample: Sample,
    importance: f32,
}

/// Partitions the image into horizontal bands, allocates per-band sample
/// quotas proportional to importance mass (alpha x luminance), and fills
/// each quota from the band's highest-scoring pixels with an even stride
///
/// A second pass tops up from unused pixels in band order when strides
/// leave quotas unmet, so bright bands never starve the total count.
#[derive(Debug, Clone, Copy, Default)]
pub struct StratifiedSampling;

impl SamplingStrategy for StratifiedSampling {
    fn name(&self) -> &'static str {
        "stratified"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        _dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let bands = STRATIFIED_BANDS.min(accessor.height() as usize).max(1);
        let band_height = (accessor.height() as usize).div_ceil(bands) as u32;

        // Bucket every pixel by band and accumulate importance mass
        let mut buckets: Vec<Vec<BandPixel>> = vec![Vec::new(); bands];
        let mut masses = vec![0.0_f32; bands];

        for y in 0..accessor.height() {
            let band = ((y / band_height) as usize).min(bands - 1);
            for x in 0..accessor.width() {
                let color = accessor.color_at(x, y);
                let importance = color.a * color.luminance();
                if let Some(mass) = masses.get_mut(band) {
                    *mass += importance;
                }
                if let Some(bucket) = buckets.get_mut(band) {
                    bucket.push(BandPixel {
                        sample: Sample::new(x, y, color),
                        importance,
                    });
                }
            }
        }

        let quotas = allocate_quotas(&masses, &buckets, target);

        // Within each band, highest-importance pixels first, strided over
        // the sorted list for spatial spread
        let mut samples = Vec::with_capacity(target);
        let mut mask = OccupancyMask::new(accessor.width(), accessor.height());

        for (bucket, &quota) in buckets.iter_mut().zip(quotas.iter()) {
            if quota == 0 || bucket.is_empty() {
                continue;
            }
            bucket.sort_by(|a, b| {
                b.importance
                    .partial_cmp(&a.importance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let step = (bucket.len() / quota).max(1);
            let mut taken = 0;
            let mut index = 0;
            while index < bucket.len() && taken < quota && samples.len() < target {
                if let Some(pixel) = bucket.get(index) {
                    if mask.insert(pixel.sample.x, pixel.sample.y) {
                        samples.push(pixel.sample);
                        taken += 1;
                    }
                }
                index += step;
            }
        }

        // Second pass: any unused pixel, in band order
        if samples.len() < target {
            'outer: for bucket in &buckets {
                for pixel in bucket {
                    if samples.len() >= target {
                        break 'outer;
                    }
                    if mask.insert(pixel.sample.x, pixel.sample.y) {
                        samples.push(pixel.sample);
                    }
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        fill_random_unique(&mut samples, &mut mask, target, accessor, &mut rng);

        Ok(samples)
    }
}

/// Proportional quota allocation with remainder going to the heaviest bands
///
/// When total mass is zero (fully transparent or black image) quotas fall
/// back to band population so the target is still met. Each remainder unit
/// goes to the currently heaviest band, which is then zeroed so no band
/// receives the remainder twice.
fn allocate_quotas(masses: &[f32], buckets: &[Vec<BandPixel>], target: usize) -> Vec<usize> {
    let mut working: Vec<f32> = masses.to_vec();
    let total: f32 = working.iter().sum();

    if total <= 0.0 {
        let population: f32 = buckets.iter().map(|b| b.len() as f32).sum();
        if population <= 0.0 {
            return vec![0; masses.len()];
        }
        for (mass, bucket) in working.iter_mut().zip(buckets.iter()) {
            *mass = bucket.len() as f32;
        }
    }

    let total: f32 = working.iter().sum();
    let mut quotas: Vec<usize> = working
        .iter()
        .map(|&mass| ((mass / total) * target as f32) as usize)
        .collect();
    let mut assigned: usize = quotas.iter().sum();

    while assigned < target {
        let heaviest = working
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(index, _)| index);
        let Some(index) = heaviest else { break };

        if let Some(quota) = quotas.get_mut(index) {
            *quota += 1;
        }
        if let Some(mass) = working.get_mut(index) {
            if *mass <= 0.0 {
                break;
            }
            *mass = 0.0;
        }
        assigned += 1;
    }

    quotas
}
