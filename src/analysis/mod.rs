//! Content analysis producing aggregate image statistics for parameter tuning

pub mod analyzer;
pub mod dominant;

use crate::pixel::Rgba;

/// Aggregate statistics from a single analysis pass over an image
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// Representative colors extracted from the image (at most 8)
    pub dominant_colors: Vec<Rgba>,
    /// Average windowed local contrast across probes, in [0, 1]
    pub contrast: f32,
    /// Fraction of probes whose local contrast exceeds the edge threshold
    pub edge_density: f32,
    /// Average channel-spread saturation across probes, in [0, 1]
    pub saturation: f32,
    /// Weighted composite score clamped to [0, 10]
    pub complexity: f32,
}
