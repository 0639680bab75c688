//! Spatial sampling strategies turning pixels into bounded weighted sample sets
//!
//! Every strategy honors the same contract: exactly `target` samples when
//! the image has that many pixels, unique (x, y) positions, all coordinates
//! inside the image. Shortfalls are padded by a bounded-attempt random fill
//! that finishes with a row-major scan over the free positions.

pub mod adaptive;
pub mod blue_noise;
pub mod hash_based;
pub mod hybrid;
pub mod importance;
pub mod params;
pub mod stratified;
pub mod uniform;
pub mod validator;
pub mod van_der_corput;

use bitvec::bitvec;
use bitvec::vec::BitVec;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::io::configuration::RANDOM_FILL_ATTEMPT_FACTOR;
use crate::io::error::{GenerationError, Result};
use crate::pipeline::CancellationToken;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::Sample;
use crate::sampling::params::SamplingParams;

/// Advanced algorithm family selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvancedAlgorithm {
    /// Best-candidate (Mitchell) sampling maximizing minimum point distance
    BlueNoise,
    /// Deterministic low-discrepancy sequence, base 2 x / base 3 y
    VanDerCorput,
    /// Parallel hash-derived positions, one per output index
    HashBased,
    /// Horizontal bands with importance-mass proportional quotas
    Stratified,
}

/// Sampling strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Stride scan over all pixels
    Uniform,
    /// Importance-scored selection with ratio re-balancing
    Importance,
    /// Importance core with uniform fill
    Adaptive,
    /// Three-tier threshold blend
    Hybrid,
    /// One of the advanced algorithms
    Advanced(AdvancedAlgorithm),
}

impl StrategyKind {
    /// Human-readable strategy name for diagnostics and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Importance => "importance",
            Self::Adaptive => "adaptive",
            Self::Hybrid => "hybrid",
            Self::Advanced(AdvancedAlgorithm::BlueNoise) => "blue-noise",
            Self::Advanced(AdvancedAlgorithm::VanDerCorput) => "van-der-corput",
            Self::Advanced(AdvancedAlgorithm::HashBased) => "hash-based",
            Self::Advanced(AdvancedAlgorithm::Stratified) => "stratified",
        }
    }

    /// Stable discriminant for cache key derivation
    pub const fn key_tag(self) -> u64 {
        match self {
            Self::Uniform => 0,
            Self::Importance => 1,
            Self::Adaptive => 2,
            Self::Hybrid => 3,
            Self::Advanced(AdvancedAlgorithm::BlueNoise) => 4,
            Self::Advanced(AdvancedAlgorithm::VanDerCorput) => 5,
            Self::Advanced(AdvancedAlgorithm::HashBased) => 6,
            Self::Advanced(AdvancedAlgorithm::Stratified) => 7,
        }
    }

    /// Whether artifact prevention runs on this strategy's output
    ///
    /// Importance output is treated as authoritative because its internal
    /// ratio and top/bottom balancing already shapes the distribution, and
    /// re-correcting it would fight those knobs. All other strategies are
    /// validated.
    pub const fn validated(self) -> bool {
        !matches!(self, Self::Importance)
    }

    /// Dispatch to the concrete strategy implementation
    ///
    /// Handles the full-coverage edge case centrally: a target at or above
    /// the pixel count returns every pixel exactly once without invoking
    /// the strategy.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the token fires inside a long-running loop,
    /// or `InsufficientSamples` if the strategy produced no usable samples.
    pub fn sample(
        self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        dominant_colors: &[crate::pixel::Rgba],
        token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        if target >= accessor.pixel_count() {
            return Ok(all_pixels(accessor));
        }

        let samples = match self {
            Self::Uniform => uniform::UniformSampling.sample(accessor, target, params, dominant_colors, token),
            Self::Importance => {
                importance::ImportanceSampling.sample(accessor, target, params, dominant_colors, token)
            }
            Self::Adaptive => {
                adaptive::AdaptiveSampling.sample(accessor, target, params, dominant_colors, token)
            }
            Self::Hybrid => hybrid::HybridSampling.sample(accessor, target, params, dominant_colors, token),
            Self::Advanced(AdvancedAlgorithm::BlueNoise) => {
                blue_noise::BlueNoiseSampling.sample(accessor, target, params, dominant_colors, token)
            }
            Self::Advanced(AdvancedAlgorithm::VanDerCorput) => van_der_corput::VanDerCorputSampling
                .sample(accessor, target, params, dominant_colors, token),
            Self::Advanced(AdvancedAlgorithm::HashBased) => {
                hash_based::HashBasedSampling.sample(accessor, target, params, dominant_colors, token)
            }
            Self::Advanced(AdvancedAlgorithm::Stratified) => {
                stratified::StratifiedSampling.sample(accessor, target, params, dominant_colors, token)
            }
        }?;

        if samples.is_empty() && target > 0 {
            return Err(GenerationError::InsufficientSamples {
                strategy: self.name(),
                produced: 0,
                requested: target,
            });
        }

        Ok(samples)
    }
}

/// Contract shared by every sampling strategy
///
/// Implementations return at most `target` samples with unique in-bounds
/// positions; callers pad shortfalls. Long-running loops observe the
/// cancellation token at bounded intervals.
pub trait SamplingStrategy {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Draw up to `target` samples from the image
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when the token fires mid-loop.
    fn sample(
        &self,
        accessor: &PixelAccessor<'_>,
        target: usize,
        params: &SamplingParams,
        dominant_colors: &[crate::pixel::Rgba],
        token: &CancellationToken,
    ) -> Result<Vec<Sample>>;
}

/// Every pixel of the image, each exactly once, in row-major order
pub fn all_pixels(accessor: &PixelAccessor<'_>) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(accessor.pixel_count());
    for y in 0..accessor.height() {
        for x in 0..accessor.width() {
            samples.push(Sample::new(x, y, accessor.color_at(x, y)));
        }
    }
    samples
}

/// Occupied-position bitmask over an image's pixel grid
///
/// Backs the de-duplication guarantee of every strategy with O(1) inserts
/// and lookups over a `width * height` bit field.
#[derive(Debug, Clone)]
pub struct OccupancyMask {
    bits: BitVec,
    width: u32,
}

impl OccupancyMask {
    /// Create an empty mask for an image's dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: bitvec![0; width as usize * height as usize],
            width,
        }
    }

    /// Create a mask with every sample position already occupied
    pub fn from_samples(width: u32, height: u32, samples: &[Sample]) -> Self {
        let mut mask = Self::new(width, height);
        for sample in samples {
            mask.insert(sample.x, sample.y);
        }
        mask
    }

    const fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether the position is already occupied
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.bits.get(self.index(x, y)).is_none_or(|bit| *bit)
    }

    /// Mark a position occupied, returning true if it was previously free
    pub fn insert(&mut self, x: u32, y: u32) -> bool {
        let index = self.index(x, y);
        match self.bits.get_mut(index) {
            Some(mut bit) => {
                let was_free = !*bit;
                *bit = true;
                was_free
            }
            None => false,
        }
    }

    /// Number of occupied positions
    pub fn occupied(&self) -> usize {
        self.bits.count_ones()
    }
}

/// Pad a sample list to `target` with unique positions
///
/// Random draws are bounded at `missing * RANDOM_FILL_ATTEMPT_FACTOR`
/// rejections; rather than spinning on a nearly full grid, any remaining
/// shortfall is taken from a row-major scan over the free positions. The
/// list reaches `target` whenever the image has that many pixels.
pub fn fill_random_unique(
    samples: &mut Vec<Sample>,
    mask: &mut OccupancyMask,
    target: usize,
    accessor: &PixelAccessor<'_>,
    rng: &mut StdRng,
) {
    if samples.len() >= target {
        return;
    }

    let missing = target - samples.len();
    let mut attempts = missing * RANDOM_FILL_ATTEMPT_FACTOR;

    while samples.len() < target && attempts > 0 {
        attempts -= 1;
        let x = rng.random_range(0..accessor.width());
        let y = rng.random_range(0..accessor.height());
        if mask.insert(x, y) {
            samples.push(Sample::new(x, y, accessor.color_at(x, y)));
        }
    }

    'scan: for y in 0..accessor.height() {
        for x in 0..accessor.width() {
            if samples.len() >= target {
                break 'scan;
            }
            if mask.insert(x, y) {
                samples.push(Sample::new(x, y, accessor.color_at(x, y)));
            }
        }
    }
}
