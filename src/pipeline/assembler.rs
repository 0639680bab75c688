//! Conversion of validated samples into display-space particles

use crate::pipeline::{DisplayMode, GenerationConfig, Particle};
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::Sample;

/// Maps samples from source pixel space into centered destination
/// coordinates and assigns per-particle point sizes
///
/// Thin by design: all statistical work happens upstream, this is a pure
/// coordinate and size mapping.
#[derive(Debug, Clone, Copy)]
pub struct ParticleAssembler {
    display_mode: DisplayMode,
    output_bounds: (f32, f32),
    size_range: (f32, f32),
}

impl ParticleAssembler {
    /// Create an assembler from the generation config
    pub const fn new(config: &GenerationConfig) -> Self {
        Self {
            display_mode: config.display_mode,
            output_bounds: config.output_bounds,
            size_range: config.size_range,
        }
    }

    /// Per-axis scale factors from pixel space to destination space
    fn scale(&self, width: f32, height: f32) -> (f32, f32) {
        let (bound_w, bound_h) = self.output_bounds;
        let fit_x = bound_w / width;
        let fit_y = bound_h / height;

        match self.display_mode {
            DisplayMode::Fit => {
                let s = fit_x.min(fit_y);
                (s, s)
            }
            DisplayMode::Fill => {
                let s = fit_x.max(fit_y);
                (s, s)
            }
            DisplayMode::Stretch => (fit_x, fit_y),
            DisplayMode::Center => (1.0, 1.0),
        }
    }

    /// Convert samples into particles
    ///
    /// Positions are centered on the origin with y pointing up; size is
    /// interpolated across the configured range by alpha-weighted
    /// luminance, so bright opaque samples render larger.
    pub fn assemble(&self, samples: &[Sample], accessor: &PixelAccessor<'_>) -> Vec<Particle> {
        let width = accessor.width() as f32;
        let height = accessor.height() as f32;
        let (scale_x, scale_y) = self.scale(width, height);
        let (size_min, size_max) = self.size_range;

        samples
            .iter()
            .map(|sample| {
                let centered_x = (sample.x as f32 + 0.5) - width / 2.0;
                let centered_y = height / 2.0 - (sample.y as f32 + 0.5);
                let weight = (sample.color.a * sample.color.luminance()).clamp(0.0, 1.0);

                Particle {
                    position: [centered_x * scale_x, centered_y * scale_y],
                    color: sample.color,
                    size: (size_max - size_min).mul_add(weight, size_min),
                }
            })
            .collect()
    }
}
