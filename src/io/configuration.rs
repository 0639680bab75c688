//! Pipeline constants and runtime configuration defaults

// Sampling constants
/// Candidates drawn per accepted point in best-candidate sampling
pub const BLUE_NOISE_CANDIDATES: usize = 32;

/// Numeric base for the horizontal low-discrepancy axis
pub const VAN_DER_CORPUT_BASE_X: u32 = 2;
/// Numeric base for the vertical low-discrepancy axis
pub const VAN_DER_CORPUT_BASE_Y: u32 = 3;

/// Horizontal bands used by stratified sampling
pub const STRATIFIED_BANDS: usize = 8;

/// Attempt multiplier for bounded random fill of shortfalls
///
/// A fill requesting `n` positions stops drawing after
/// `n * RANDOM_FILL_ATTEMPT_FACTOR` rejections and completes the remainder
/// from a row-major scan.
pub const RANDOM_FILL_ATTEMPT_FACTOR: usize = 16;

/// Iterations between cancellation checks inside long sampling loops
pub const CANCELLATION_CHECK_INTERVAL: usize = 256;

// Analysis constants
/// Maximum probe grid dimension for image analysis
pub const ANALYSIS_MAX_PROBES_PER_AXIS: u32 = 64;
/// Local contrast above which a probe counts toward edge density
pub const ANALYSIS_EDGE_THRESHOLD: f32 = 0.15;
/// Maximum dominant colors extracted from an image
pub const MAX_DOMINANT_COLORS: usize = 8;

// Artifact prevention constants
/// Region grid dimension for clustering detection (3x3 regions)
pub const VALIDATOR_REGION_GRID: u32 = 3;
/// Maximum share of samples one region may hold before correction
pub const VALIDATOR_REGION_TOLERANCE: f32 = 0.45;
/// Allowed deviation from an even top/bottom split
pub const VALIDATOR_VERTICAL_TOLERANCE: f32 = 0.15;

// Execution strategy thresholds
/// Particle count below which sequential execution wins
pub const SEQUENTIAL_PARTICLE_THRESHOLD: usize = 100_000;
/// Image area above which parallel sampling pays off
pub const PARALLEL_AREA_THRESHOLD: usize = 512 * 512;
/// Worker cap to avoid oversubscription
pub const MAX_WORKERS: usize = 4;

// Cache settings
/// Default cache byte budget (100 MB)
pub const DEFAULT_CACHE_BUDGET_BYTES: u64 = 100 * 1024 * 1024;
/// Cache index file name within the cache directory
pub const CACHE_INDEX_FILE: &str = "index.json";
/// Extension for cached sample payload files
pub const CACHE_PAYLOAD_EXTENSION: &str = "samples";

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;
/// Default particle count for the CLI
pub const DEFAULT_PARTICLE_COUNT: usize = 10_000;

// Output settings
/// Suffix added to particle dump filenames
pub const OUTPUT_SUFFIX: &str = "_particles";
/// Suffix added to preview render filenames
pub const PREVIEW_SUFFIX: &str = "_preview";
/// Side length of the square preview render in pixels
pub const PREVIEW_SIZE: u32 = 512;
