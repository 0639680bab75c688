//! Deterministic low-discrepancy sampling

use crate::io::configuration::{VAN_DER_CORPUT_BASE_X, VAN_DER_CORPUT_BASE_Y};
use crate::io::error::Result;
use crate::math::sequence::radical_inverse;
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample};
use crate::sampling::params::SamplingParams;
use crate::sampling::{OccupancyMask, SamplingStrategy};

/// Index budget multiplier before falling back to a deterministic scan
const SEQUENCE_BUDGET_FACTOR: u64 = 8;

/// Van der Corput low-discrepancy sampling, base 2 on x and base 3 on y
///
/// Fully deterministic: no randomness anywhere, so two runs with identical
/// dimensions and target produce byte-identical output. Scaling the unit
/// sequence into pixel bounds can collide on small images; collisions are
/// skipped, and if the index budget runs out the remainder comes from a
/// deterministic row-major scan of untouched pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct VanDerCorputSampling;

impl SamplingStrategy for VanDerCorputSampling {
    fn name(&self) -> &'static str {
        "van-der-corput"
    }

    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        _params: &SamplingParams,
        _dominant_colors: &[Rgba],
        _token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let mut samples = Vec::with_capacity(target);
        let mut mask = OccupancyMask::new(accessor.width(), accessor.height());

        let budget = (target as u64).saturating_mul(SEQUENCE_BUDGET_FACTOR);
        let mut index = 0_u64;
        while samples.len() < target && index < budget {
            let x = (radical_inverse(VAN_DER_CORPUT_BASE_X, index) * f64::from(accessor.width()))
                as u32;
            let y = (radical_inverse(VAN_DER_CORPUT_BASE_Y, index) * f64::from(accessor.height()))
                as u32;
            if mask.insert(x, y) {
                samples.push(Sample::new(x, y, accessor.color_at(x, y)));
            }
            index += 1;
        }

        // Deterministic fallback keeps the reproducibility guarantee intact
        if samples.len() < target {
            let width = accessor.width() as usize;
            for flat in 0..accessor.pixel_count() {
                if samples.len() >= target {
                    break;
                }
                let x = (flat % width) as u32;
                let y = (flat / width) as u32;
                if mask.insert(x, y) {
                    samples.push(Sample::new(x, y, accessor.color_at(x, y)));
                }
            }
        }

        Ok(samples)
    }
}
