//! Artifact prevention: detection and correction of degenerate distributions

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::io::configuration::{
    RANDOM_FILL_ATTEMPT_FACTOR, VALIDATOR_REGION_GRID, VALIDATOR_REGION_TOLERANCE,
    VALIDATOR_VERTICAL_TOLERANCE,
};
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::Sample;
use crate::sampling::params::SamplingParams;
use crate::sampling::OccupancyMask;

/// Post-filter correcting distributions that are technically valid but
/// visually degenerate
///
/// Two detectors run over the sample set: a 3x3 region occupancy scan for
/// clustering, and a top/bottom split check for vertical imbalance. Excess
/// samples from overloaded areas are swapped for uniform-random unique
/// replacements drawn from underrepresented regions. A final de-duplication
/// and bounds clamp runs as a safety net even though each strategy already
/// guarantees both properties.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactPreventionValidator {
    /// Maximum share of samples one detection region may hold
    pub region_tolerance: f32,
    /// Allowed deviation from an even top/bottom split
    pub vertical_tolerance: f32,
}

impl Default for ArtifactPreventionValidator {
    fn default() -> Self {
        Self {
            region_tolerance: VALIDATOR_REGION_TOLERANCE,
            vertical_tolerance: VALIDATOR_VERTICAL_TOLERANCE,
        }
    }
}

impl ArtifactPreventionValidator {
    /// Validate and correct a sample distribution
    ///
    /// Never grows the list beyond `target`; corrections replace samples
    /// in place.
    pub fn validate_and_correct(
        &self,
        samples: Vec<Sample>,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
    ) -> Vec<Sample> {
        let mut cleaned = dedupe_and_clamp(samples, accessor);
        cleaned.truncate(target);

        if cleaned.is_empty() {
            return cleaned;
        }

        let mut rng = StdRng::seed_from_u64(params.seed ^ 0x5eed_a21f);

        if params.anti_clustering {
            correct_clustering(&mut cleaned, accessor, self.region_tolerance, &mut rng);
        }
        correct_vertical_imbalance(&mut cleaned, accessor, self.vertical_tolerance, &mut rng);

        cleaned
    }
}

/// Drop duplicate positions and out-of-bounds coordinates
fn dedupe_and_clamp(samples: Vec<Sample>, accessor: &PixelAccessor<'_>) -> Vec<Sample> {
    let mut mask = OccupancyMask::new(accessor.width(), accessor.height());
    samples
        .into_iter()
        .filter(|sample| accessor.contains(sample.x, sample.y) && mask.insert(sample.x, sample.y))
        .collect()
}

/// Region index in the 3x3 detection grid for a position
fn region_of(x: u32, y: u32, accessor: &PixelAccessor<'_>) -> usize {
    let grid = VALIDATOR_REGION_GRID;
    let col = (x * grid / accessor.width().max(1)).min(grid - 1);
    let row = (y * grid / accessor.height().max(1)).min(grid - 1);
    (row * grid + col) as usize
}

/// Detect a region holding more than the tolerated share of samples and
/// swap its excess for random positions in other regions
fn correct_clustering(
    samples: &mut [Sample],
    accessor: &PixelAccessor<'_>,
    tolerance: f32,
    rng: &mut StdRng,
) {
    let region_count = (VALIDATOR_REGION_GRID * VALIDATOR_REGION_GRID) as usize;
    let mut counts = vec![0_usize; region_count];
    for sample in samples.iter() {
        if let Some(count) = counts.get_mut(region_of(sample.x, sample.y, accessor)) {
            *count += 1;
        }
    }

    let limit = (samples.len() as f32 * tolerance).ceil() as usize;
    let crowded: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > limit)
        .map(|(region, _)| region)
        .collect();
    if crowded.is_empty() {
        return;
    }

    let mut mask = OccupancyMask::from_samples(accessor.width(), accessor.height(), samples);

    for &region in &crowded {
        let mut excess = counts.get(region).copied().unwrap_or(0).saturating_sub(limit);
        let mut attempts = excess * RANDOM_FILL_ATTEMPT_FACTOR;

        for sample in samples.iter_mut() {
            if excess == 0 || attempts == 0 {
                break;
            }
            if region_of(sample.x, sample.y, accessor) != region {
                continue;
            }

            // Draw until the replacement lands outside every crowded region
            while attempts > 0 {
                attempts -= 1;
                let x = rng.random_range(0..accessor.width());
                let y = rng.random_range(0..accessor.height());
                if crowded.contains(&region_of(x, y, accessor)) || !mask.insert(x, y) {
                    continue;
                }
                *sample = Sample::new(x, y, accessor.color_at(x, y));
                excess -= 1;
                break;
            }
        }
    }
}

/// Detect top/bottom imbalance beyond tolerance and move excess samples to
/// random positions in the starved half
fn correct_vertical_imbalance(
    samples: &mut [Sample],
    accessor: &PixelAccessor<'_>,
    tolerance: f32,
    rng: &mut StdRng,
) {
    let midline = accessor.height() / 2;
    let top = samples.iter().filter(|sample| sample.y < midline).count();
    let top_share = top as f32 / samples.len() as f32;

    let deviation = (top_share - 0.5).abs();
    if deviation <= tolerance {
        return;
    }

    let from_top = top_share > 0.5;
    let to_move = ((deviation - tolerance) * samples.len() as f32) as usize;
    if to_move == 0 {
        return;
    }

    let mut mask = OccupancyMask::from_samples(accessor.width(), accessor.height(), samples);
    let (y_start, y_end) = if from_top {
        (midline, accessor.height())
    } else {
        (0, midline.max(1))
    };

    let mut moved = 0;
    let mut attempts = to_move * RANDOM_FILL_ATTEMPT_FACTOR;
    for sample in samples.iter_mut() {
        if moved >= to_move || attempts == 0 {
            break;
        }
        let in_top = sample.y < midline;
        if in_top != from_top {
            continue;
        }

        while attempts > 0 {
            attempts -= 1;
            let x = rng.random_range(0..accessor.width());
            let y = rng.random_range(y_start..y_end);
            if mask.insert(x, y) {
                *sample = Sample::new(x, y, accessor.color_at(x, y));
                moved += 1;
                break;
            }
        }
    }
}
