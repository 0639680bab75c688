//! Sampling parameters and analysis-driven tuning

use serde::{Deserialize, Serialize};

use crate::analysis::ImageAnalysis;
use crate::io::configuration::DEFAULT_SEED;

/// Quality preset controlling analysis-driven parameter adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum QualityPreset {
    /// Fastest: base parameters, no analysis adjustment
    Draft,
    /// Default: base parameters, no analysis adjustment
    Standard,
    /// Analysis-tuned parameters
    High,
    /// Analysis-tuned parameters with the strongest content weighting
    Ultra,
}

impl QualityPreset {
    /// Whether this preset applies analysis-driven tuning
    ///
    /// Draft and Standard deliberately skip the adjustment as a cost/quality
    /// tradeoff; only the upper presets pay for content-aware tuning.
    pub const fn uses_analysis(self) -> bool {
        matches!(self, Self::High | Self::Ultra)
    }

    /// Stable discriminant for cache key derivation
    pub const fn key_tag(self) -> u64 {
        match self {
            Self::Draft => 0,
            Self::Standard => 1,
            Self::High => 2,
            Self::Ultra => 3,
        }
    }
}

/// Knobs shared by every sampling strategy
///
/// Immutable for the duration of one generation request. Derived from the
/// base profile and optionally adjusted once by analysis results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Minimum importance score for a pixel to count as important
    pub importance_threshold: f32,
    /// Weight of local contrast in the importance score
    pub contrast_weight: f32,
    /// Weight of color saturation in the importance score
    pub saturation_weight: f32,
    /// Neighbor window radius for local contrast, in pixels
    pub edge_radius: u32,
    /// Fraction of the target drawn from important pixels, in [0, 1]
    pub important_sampling_ratio: f32,
    /// Fraction of samples drawn from the top half of the image, in [0, 1]
    pub top_bottom_ratio: f32,
    /// Whether artifact prevention may correct clustered output
    pub anti_clustering: bool,
    /// Seed for every stochastic sampling path
    pub seed: u64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            importance_threshold: 0.3,
            contrast_weight: 0.6,
            saturation_weight: 0.4,
            edge_radius: 1,
            important_sampling_ratio: 0.7,
            top_bottom_ratio: 0.5,
            anti_clustering: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl SamplingParams {
    /// Derive parameters for a preset, applying analysis tuning when the
    /// preset asks for it
    ///
    /// High-complexity images get a lower threshold (more pixels qualify as
    /// important) and a stronger contrast weight; flat images lean harder on
    /// saturation so sparse colorful features still attract samples.
    #[must_use]
    pub fn tuned_for(self, preset: QualityPreset, analysis: Option<&ImageAnalysis>) -> Self {
        let Some(analysis) = analysis else {
            return self;
        };
        if !preset.uses_analysis() {
            return self;
        }

        let strength = match preset {
            QualityPreset::Ultra => 1.0,
            _ => 0.5,
        };

        let complexity_norm = (analysis.complexity / 10.0).clamp(0.0, 1.0);
        let threshold_shift = (complexity_norm - 0.5) * 0.2 * strength;
        let contrast_shift = analysis.edge_density * 0.3 * strength;
        let saturation_shift = (1.0 - analysis.saturation) * 0.2 * strength;

        Self {
            importance_threshold: (self.importance_threshold - threshold_shift).clamp(0.05, 0.9),
            contrast_weight: (self.contrast_weight + contrast_shift).clamp(0.1, 1.5),
            saturation_weight: (self.saturation_weight + saturation_shift).clamp(0.1, 1.5),
            ..self
        }
    }
}
