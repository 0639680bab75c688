//! Staged generation pipeline with pluggable execution strategies

pub mod assembler;
pub mod coordinator;
pub mod execution;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::analysis::ImageAnalysis;
use crate::analysis::analyzer::ImageAnalyzer;
use crate::io::configuration::MAX_WORKERS;
use crate::io::error::{GenerationError, Result, invalid_configuration};
use crate::pipeline::assembler::ParticleAssembler;
use crate::pipeline::execution::ExecutionStrategy;
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::{Rgba, Sample, SourceImage};
use crate::sampling::params::{QualityPreset, SamplingParams};
use crate::sampling::validator::ArtifactPreventionValidator;
use crate::sampling::StrategyKind;

/// Logical pipeline stage
///
/// Stages always execute in declaration order; execution strategies only
/// decide intra-stage parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Content analysis over the source image
    Analysis,
    /// Sample extraction via the configured strategy
    Sampling,
    /// Conversion of samples into display-space particles
    Assembly,
    /// Persisting samples to the disk cache
    Caching,
}

impl Stage {
    /// Stage name for progress reporting
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Sampling => "sampling",
            Self::Assembly => "assembly",
            Self::Caching => "caching",
        }
    }

    /// Progress fraction reported once this stage completes
    pub const fn completion_fraction(self) -> f32 {
        match self {
            Self::Analysis => 0.25,
            Self::Sampling => 0.65,
            Self::Assembly => 0.85,
            Self::Caching => 0.95,
        }
    }
}

/// Relative scheduling priority of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StagePriority {
    /// Best-effort work that may be deferred
    Low,
    /// Default priority
    Normal,
    /// Critical-path work
    High,
}

/// Cooperative cancellation flag shared between a coordinator and its
/// in-flight pipeline
///
/// Checked at stage boundaries and at bounded intervals inside long
/// sampling loops; there is no hard wall-clock timeout.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clear the flag before a new run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Convert a set flag into a `Cancelled` error
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GenerationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// How source pixel space maps into the destination bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum DisplayMode {
    /// Scale to fit entirely inside the bounds, preserving aspect ratio
    Fit,
    /// Scale to cover the bounds, preserving aspect ratio
    Fill,
    /// Scale each axis independently to the bounds
    Stretch,
    /// No scaling; center the image in the bounds
    Center,
}

/// One output particle in destination coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in destination space, centered on the origin
    pub position: [f32; 2],
    /// Particle color
    pub color: Rgba,
    /// Point size in destination units
    pub size: f32,
}

/// Caller-supplied configuration, immutable for one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Number of particles to produce
    pub target_particle_count: usize,
    /// Quality preset controlling analysis-driven tuning
    pub quality_preset: QualityPreset,
    /// Sampling strategy selector
    pub sampling_strategy: StrategyKind,
    /// Whether results are stored in and served from the disk cache
    pub caching_enabled: bool,
    /// Upper bound on sampling workers (clamped to 4)
    pub max_concurrency: usize,
    /// Mapping from pixel space into destination bounds
    pub display_mode: DisplayMode,
    /// Destination space dimensions (width, height)
    pub output_bounds: (f32, f32),
    /// Particle point size bounds (min, max)
    pub size_range: (f32, f32),
    /// Seed for all stochastic sampling paths
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_particle_count: crate::io::configuration::DEFAULT_PARTICLE_COUNT,
            quality_preset: QualityPreset::Standard,
            sampling_strategy: StrategyKind::Adaptive,
            caching_enabled: true,
            max_concurrency: MAX_WORKERS,
            display_mode: DisplayMode::Fit,
            output_bounds: (2.0, 2.0),
            size_range: (1.0, 4.0),
            seed: crate::io::configuration::DEFAULT_SEED,
        }
    }
}

impl GenerationConfig {
    /// Validate the configuration before any work begins
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero target count, zero or
    /// negative output bounds, an inverted size range, or zero concurrency.
    pub fn validate(&self) -> Result<()> {
        if self.target_particle_count == 0 {
            return Err(invalid_configuration(
                "target_particle_count",
                &self.target_particle_count,
                &"must be positive",
            ));
        }
        if self.output_bounds.0 <= 0.0 || self.output_bounds.1 <= 0.0 {
            return Err(invalid_configuration(
                "output_bounds",
                &format!("{:?}", self.output_bounds),
                &"both dimensions must be positive",
            ));
        }
        if self.size_range.0 > self.size_range.1 || self.size_range.0 < 0.0 {
            return Err(invalid_configuration(
                "size_range",
                &format!("{:?}", self.size_range),
                &"min must be non-negative and not exceed max",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(invalid_configuration(
                "max_concurrency",
                &self.max_concurrency,
                &"at least one worker is required",
            ));
        }
        Ok(())
    }

    /// Worker cap after clamping to the oversubscription limit
    pub const fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > MAX_WORKERS {
            MAX_WORKERS
        } else {
            self.max_concurrency
        }
    }
}

/// Everything a pipeline run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Validated samples in source pixel space
    pub samples: Vec<Sample>,
    /// Assembled particles in destination space
    pub particles: Vec<Particle>,
    /// Analysis results computed during the run
    pub analysis: ImageAnalysis,
}

/// Orchestrates the stage sequence Analysis -> Sampling -> Assembly
///
/// Caching is the coordinator's concern; the pipeline reports the caching
/// stage fraction but does not touch the store itself. Dependencies are
/// injected explicitly rather than resolved from globals, and the execution
/// strategy decides intra-stage parallelism only; stage order is fixed.
pub struct GenerationPipeline {
    analyzer: ImageAnalyzer,
    validator: ArtifactPreventionValidator,
    execution: Box<dyn ExecutionStrategy + Send + Sync>,
}

impl GenerationPipeline {
    /// Create a pipeline with an explicit execution strategy
    pub fn new(execution: Box<dyn ExecutionStrategy + Send + Sync>) -> Self {
        Self {
            analyzer: ImageAnalyzer::new(),
            validator: ArtifactPreventionValidator::default(),
            execution,
        }
    }

    /// Access the execution strategy for instrumentation
    pub fn execution(&self) -> &(dyn ExecutionStrategy + Send + Sync) {
        self.execution.as_ref()
    }

    /// Run the pipeline over an image
    ///
    /// The progress callback fires at least once per stage transition with
    /// `(fraction, stage_name)`. A previously computed analysis may be
    /// supplied to skip the analysis pass.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when the token fires at a stage boundary or
    /// inside a long sampling loop, `InvalidConfiguration` if the execution
    /// strategy rejects the config, or `InsufficientSamples` if sampling
    /// produces nothing usable.
    pub fn run(
        &self,
        image: &SourceImage,
        config: &GenerationConfig,
        precomputed: Option<&ImageAnalysis>,
        token: &CancellationToken,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<PipelineOutput> {
        config.validate()?;
        self.execution.validate(config)?;

        let accessor = PixelAccessor::new(image);

        // Analysis
        token.check()?;
        let analysis =
            precomputed.map_or_else(|| self.analyzer.analyze(&accessor), Clone::clone);
        progress(Stage::Analysis.completion_fraction(), Stage::Analysis.name());

        // Sampling; tuning is applied for the upper presets only
        token.check()?;
        let params = SamplingParams {
            seed: config.seed,
            ..SamplingParams::default()
        }
        .tuned_for(config.quality_preset, Some(&analysis));

        let samples = self.run_sampling_stage(&accessor, config, &params, &analysis, token)?;
        progress(Stage::Sampling.completion_fraction(), Stage::Sampling.name());

        // Assembly
        token.check()?;
        let assembler = ParticleAssembler::new(config);
        let particles = assembler.assemble(&samples, &accessor);
        progress(Stage::Assembly.completion_fraction(), Stage::Assembly.name());

        Ok(PipelineOutput {
            samples,
            particles,
            analysis,
        })
    }

    /// Execute the sampling stage, parallelized when the strategy allows
    fn run_sampling_stage(
        &self,
        accessor: &PixelAccessor<'_>,
        config: &GenerationConfig,
        params: &SamplingParams,
        analysis: &ImageAnalysis,
        token: &CancellationToken,
    ) -> Result<Vec<Sample>> {
        let workers = self.execution.worker_count(
            Stage::Sampling,
            config,
            accessor.pixel_count(),
        );

        let sample_once = || {
            config.sampling_strategy.sample(
                accessor,
                config.target_particle_count,
                params,
                &analysis.dominant_colors,
                token,
            )
        };

        let raw = if workers > 1 && self.execution.can_parallelize(Stage::Sampling) {
            // A dedicated pool bounds rayon's worker count per pipeline run
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(sample_once),
                Err(_) => sample_once(),
            }
        } else {
            sample_once()
        }?;

        token.check()?;

        let samples = if config.sampling_strategy.validated() {
            self.validator.validate_and_correct(
                raw,
                accessor,
                config.target_particle_count,
                params,
            )
        } else {
            raw
        };

        if samples.is_empty() {
            return Err(GenerationError::InsufficientSamples {
                strategy: config.sampling_strategy.name(),
                produced: 0,
                requested: config.target_particle_count,
            });
        }

        Ok(samples)
    }
}
