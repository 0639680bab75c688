//! Command-line interface for batch particle generation from PNG files

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::CacheManager;
use crate::io::configuration::{
    DEFAULT_CACHE_BUDGET_BYTES, DEFAULT_PARTICLE_COUNT, DEFAULT_SEED, OUTPUT_SUFFIX,
    PREVIEW_SUFFIX,
};
use crate::io::error::{GenerationError, Result};
use crate::io::image::{export_preview, load_png, write_particle_dump};
use crate::io::progress::StageProgress;
use crate::pipeline::coordinator::GenerationCoordinator;
use crate::pipeline::execution::AdaptiveExecution;
use crate::pipeline::{DisplayMode, GenerationConfig, GenerationPipeline};
use crate::sampling::params::QualityPreset;
use crate::sampling::{AdvancedAlgorithm, StrategyKind};

/// Flat strategy selector for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    /// Stride scan over all pixels
    Uniform,
    /// Importance-scored selection
    Importance,
    /// Importance core with uniform fill
    Adaptive,
    /// Three-tier threshold blend
    Hybrid,
    /// Best-candidate even distribution
    BlueNoise,
    /// Deterministic low-discrepancy sequence
    VanDerCorput,
    /// Parallel hash-derived positions
    HashBased,
    /// Horizontal bands with importance quotas
    Stratified,
}

impl StrategyArg {
    /// Map the flat CLI selector onto the strategy enum
    pub const fn to_kind(self) -> StrategyKind {
        match self {
            Self::Uniform => StrategyKind::Uniform,
            Self::Importance => StrategyKind::Importance,
            Self::Adaptive => StrategyKind::Adaptive,
            Self::Hybrid => StrategyKind::Hybrid,
            Self::BlueNoise => StrategyKind::Advanced(AdvancedAlgorithm::BlueNoise),
            Self::VanDerCorput => StrategyKind::Advanced(AdvancedAlgorithm::VanDerCorput),
            Self::HashBased => StrategyKind::Advanced(AdvancedAlgorithm::HashBased),
            Self::Stratified => StrategyKind::Advanced(AdvancedAlgorithm::Stratified),
        }
    }
}

#[derive(Parser)]
#[command(name = "pixelcloud")]
#[command(
    author,
    version,
    about = "Sample images into weighted particle clouds"
)]
/// Command-line arguments for the particle generation tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input PNG file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Number of particles to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_PARTICLE_COUNT)]
    pub count: usize,

    /// Sampling strategy
    #[arg(short = 't', long, value_enum, default_value_t = StrategyArg::Adaptive)]
    pub strategy: StrategyArg,

    /// Quality preset
    #[arg(short = 'p', long, value_enum, default_value_t = QualityPreset::Standard)]
    pub preset: QualityPreset,

    /// Display mode mapping pixels into output space
    #[arg(short = 'd', long, value_enum, default_value_t = DisplayMode::Fit)]
    pub display: DisplayMode,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Cache directory (defaults to .pixelcloud-cache beside the target)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Disable the sample cache entirely
    #[arg(long)]
    pub no_cache: bool,

    /// Also render a scatter-plot preview PNG
    #[arg(long)]
    pub preview: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build the generation configuration from the arguments
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            target_particle_count: self.count,
            quality_preset: self.preset,
            sampling_strategy: self.strategy.to_kind(),
            caching_enabled: !self.no_cache,
            display_mode: self.display,
            seed: self.seed,
            ..GenerationConfig::default()
        }
    }
}

/// Orchestrates batch processing of PNG files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    coordinator: GenerationCoordinator,
}

impl FileProcessor {
    /// Create a file processor, opening the cache unless disabled
    ///
    /// # Errors
    ///
    /// Returns `CacheCreationFailed` if the cache directory cannot be
    /// created.
    pub fn new(cli: Cli) -> Result<Self> {
        let cache = if cli.no_cache {
            None
        } else {
            let root = cli.cache_dir.clone().unwrap_or_else(|| {
                let parent = if cli.target.is_dir() {
                    cli.target.clone()
                } else {
                    cli.target.parent().map_or_else(PathBuf::new, Path::to_path_buf)
                };
                parent.join(".pixelcloud-cache")
            });
            Some(CacheManager::new(root, DEFAULT_CACHE_BUDGET_BYTES)?)
        };

        let pipeline = GenerationPipeline::new(Box::new(AdaptiveExecution::new()));
        Ok(Self {
            cli,
            coordinator: GenerationCoordinator::new(pipeline, cache),
        })
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        for file in &files {
            self.process_file(file)?;
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if self.cli.target.extension().and_then(|s| s.to_str()) == Some("png") {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else {
                Err(GenerationError::InvalidImage {
                    reason: "target file must be a PNG image".to_string(),
                })
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&self.cli.target)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) == Some("png")
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(GenerationError::InvalidImage {
                reason: "target must be a PNG file or directory".to_string(),
            })
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::output_path(input_path);
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    // Allow print for user feedback on soft cache failures
    #[allow(clippy::print_stderr)]
    fn process_file(&mut self, input_path: &Path) -> Result<()> {
        let start_time = Instant::now();
        let image = load_png(input_path)?;
        let config = self.cli.generation_config();

        let progress = self
            .cli
            .should_show_progress()
            .then(|| StageProgress::new(input_path));

        let particles = self.coordinator.generate(&image, &config, |fraction, stage| {
            if let Some(ref bar) = progress {
                bar.update(fraction, stage);
            }
        })?;

        if let Some(ref bar) = progress {
            bar.finish();
        }

        if let Some(cache_error) = self.coordinator.take_cache_error() {
            if !self.cli.quiet {
                eprintln!("Warning: caching skipped: {cache_error}");
            }
        }

        write_particle_dump(&particles, &Self::output_path(input_path))?;

        if self.cli.preview {
            export_preview(
                &particles,
                config.output_bounds,
                &Self::preview_path(input_path),
            )?;
        }

        if !self.cli.quiet {
            eprintln!(
                "{}: {} particles in {:.2?}",
                input_path.display(),
                particles.len(),
                start_time.elapsed()
            );
        }

        Ok(())
    }

    fn output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{}.json", stem.to_string_lossy(), OUTPUT_SUFFIX);

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }

    fn preview_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let preview_name = format!("{}{}.png", stem.to_string_lossy(), PREVIEW_SUFFIX);

        if let Some(parent) = input_path.parent() {
            parent.join(preview_name)
        } else {
            PathBuf::from(preview_name)
        }
    }
}
