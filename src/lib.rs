//! Image-to-point-cloud sampling pipeline with content-aware parameter tuning
//!
//! The system analyzes a raster image, draws a bounded set of weighted
//! position+color samples through one of several spatial sampling strategies,
//! corrects degenerate distributions, assembles display-space particles, and
//! caches the expensive computation across repeated requests.

#![forbid(unsafe_code)]

/// Content analysis producing aggregate image statistics
pub mod analysis;
/// Content-addressed LRU disk cache for computed sample sets
pub mod cache;
/// Input/output operations and error handling
pub mod io;
/// Mathematical utilities for hashing and low-discrepancy sequences
pub mod math;
/// Staged generation pipeline, execution strategies, and coordination
pub mod pipeline;
/// Image data model and normalized pixel access
pub mod pixel;
/// Spatial sampling strategies and artifact prevention
pub mod sampling;

pub use io::error::{GenerationError, Result};
