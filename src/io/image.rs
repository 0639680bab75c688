//! PNG decoding into source images and particle output rendering

use std::path::Path;

use image::{ImageBuffer, Rgba as ImageRgba};

use crate::io::configuration::PREVIEW_SIZE;
use crate::io::error::{GenerationError, Result};
use crate::pipeline::Particle;
use crate::pixel::SourceImage;

/// Load a PNG file into a validated source image
///
/// The decoder normalizes to RGBA8, so the byte-order tag is always RGBA
/// for images arriving through this path; other byte orders come from
/// callers embedding the library against their own decoders.
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be decoded, or `InvalidImage`
/// if it decodes to zero size.
pub fn load_png(path: &Path) -> Result<SourceImage> {
    let decoded = image::open(path).map_err(|e| GenerationError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_rgba8(width, height, rgba.into_raw())
}

/// Serialize particles as a JSON dump
///
/// # Errors
///
/// Returns a serialization error or a file system error on write failure.
pub fn write_particle_dump(particles: &[Particle], path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(particles)?;
    std::fs::write(path, bytes).map_err(|e| GenerationError::FileSystem {
        path: path.to_path_buf(),
        operation: "write particle dump",
        source: e,
    })
}

/// Render particles as a square scatter-plot PNG
///
/// Maps destination-space positions into preview pixels, largest bound
/// spanning the preview edge. Intended as a quick visual check, not a
/// faithful render of the downstream particle system.
///
/// # Errors
///
/// Returns `ImageExport` if the preview cannot be saved.
pub fn export_preview(
    particles: &[Particle],
    output_bounds: (f32, f32),
    path: &Path,
) -> Result<()> {
    let size = PREVIEW_SIZE;
    let mut img = ImageBuffer::from_pixel(size, size, ImageRgba([0u8, 0, 0, 255]));

    let half_extent = (output_bounds.0.max(output_bounds.1) / 2.0).max(f32::EPSILON);
    let scale = size as f32 / 2.0 / half_extent;

    for particle in particles {
        let px = (particle.position[0].mul_add(scale, size as f32 / 2.0)) as i64;
        let py = (particle.position[1].mul_add(-scale, size as f32 / 2.0)) as i64;
        if px < 0 || py < 0 || px >= i64::from(size) || py >= i64::from(size) {
            continue;
        }
        let rgba = particle.color.to_rgba8();
        img.put_pixel(px as u32, py as u32, ImageRgba([rgba[0], rgba[1], rgba[2], 255]));
    }

    img.save(path).map_err(|e| GenerationError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
