//! Single-pass bounded-grid image analysis

use crate::analysis::ImageAnalysis;
use crate::analysis::dominant::extract_dominant_colors;
use crate::io::configuration::{ANALYSIS_EDGE_THRESHOLD, ANALYSIS_MAX_PROBES_PER_AXIS};
use crate::pixel::accessor::PixelAccessor;

/// Content-aware image analyzer
///
/// Samples a bounded probe grid rather than every pixel, keeping analysis
/// cost flat for large images. The resulting statistics feed parameter
/// tuning for the higher quality presets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAnalyzer {
    /// Local contrast window radius in pixels
    pub contrast_radius: u32,
}

impl ImageAnalyzer {
    /// Create an analyzer with the default contrast window
    pub const fn new() -> Self {
        Self { contrast_radius: 1 }
    }

    /// Analyze an image and produce aggregate statistics
    pub fn analyze(&self, accessor: &PixelAccessor<'_>) -> ImageAnalysis {
        let step_x = probe_step(accessor.width());
        let step_y = probe_step(accessor.height());

        let mut contrast_sum = 0.0_f64;
        let mut saturation_sum = 0.0_f64;
        let mut edge_probes = 0_usize;
        let mut probe_count = 0_usize;

        let mut y = 0;
        while y < accessor.height() {
            let mut x = 0;
            while x < accessor.width() {
                let color = accessor.color_at(x, y);
                let local_contrast = accessor.local_contrast(x, y, self.contrast_radius);

                contrast_sum += f64::from(local_contrast);
                saturation_sum += f64::from(color.saturation());
                if local_contrast > ANALYSIS_EDGE_THRESHOLD {
                    edge_probes += 1;
                }
                probe_count += 1;

                x += step_x;
            }
            y += step_y;
        }

        let probes_f = probe_count.max(1) as f64;
        let contrast = (contrast_sum / probes_f) as f32;
        let saturation = (saturation_sum / probes_f) as f32;
        let edge_density = edge_probes as f32 / probes_f as f32;

        let probe_positions = probe_grid(accessor.width(), accessor.height(), step_x, step_y);
        let dominant_colors = extract_dominant_colors(accessor, probe_positions);

        let complexity = complexity_score(contrast, edge_density, saturation, dominant_colors.len());

        ImageAnalysis {
            dominant_colors,
            contrast,
            edge_density,
            saturation,
            complexity,
        }
    }
}

/// Probe stride along one axis, chosen so the axis yields at most
/// `ANALYSIS_MAX_PROBES_PER_AXIS` probe positions
fn probe_step(extent: u32) -> u32 {
    extent.div_ceil(ANALYSIS_MAX_PROBES_PER_AXIS).max(1)
}

/// Iterator over bounded probe grid positions
fn probe_grid(
    width: u32,
    height: u32,
    step_x: u32,
    step_y: u32,
) -> impl Iterator<Item = (u32, u32)> {
    (0..height)
        .step_by(step_y as usize)
        .flat_map(move |y| (0..width).step_by(step_x as usize).map(move |x| (x, y)))
}

/// Weighted composite complexity in [0, 10]
///
/// Edge density carries the most weight: busy edges are what make a
/// particle field read as detailed, more than raw contrast or palette size.
fn complexity_score(contrast: f32, edge_density: f32, saturation: f32, palette_size: usize) -> f32 {
    let palette_factor = (palette_size as f32 / 8.0).min(1.0);
    // Weights sum to 10, so the raw composite already spans [0, 10]
    let composite = 4.0_f32.mul_add(
        edge_density,
        3.0_f32.mul_add(contrast, 2.0_f32.mul_add(saturation, palette_factor)),
    );
    composite.clamp(0.0, 10.0)
}
