//! Public generation façade: request lifecycle, caching, cancellation

use std::sync::Mutex;

use crate::cache::{CacheKey, CacheManager};
use crate::io::error::{GenerationError, Result};
use crate::pipeline::assembler::ParticleAssembler;
use crate::pipeline::{CancellationToken, GenerationConfig, GenerationPipeline, Particle, Stage};
use crate::pixel::accessor::PixelAccessor;
use crate::pixel::SourceImage;

/// Terminal state of the most recent generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Particles were produced (from the pipeline or the cache)
    Completed,
    /// The request was cancelled cooperatively
    Cancelled,
    /// The request failed with an error
    Failed,
}

/// Request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorState {
    Idle,
    Generating,
}

/// Accepts generation requests, enforces at-most-one in-flight generation,
/// resolves the cache before running the pipeline, reports progress, and
/// supports cooperative cancellation
///
/// State machine: Idle -> Generating -> (Completed | Cancelled | Failed)
/// -> Idle. Dependencies arrive through the constructor; there are no
/// process-wide singletons.
pub struct GenerationCoordinator {
    pipeline: GenerationPipeline,
    cache: Option<CacheManager>,
    state: Mutex<CoordinatorState>,
    token: CancellationToken,
    last_outcome: Mutex<Option<GenerationOutcome>>,
    last_cache_error: Mutex<Option<GenerationError>>,
}

impl GenerationCoordinator {
    /// Create a coordinator with an explicit pipeline and optional cache
    pub fn new(pipeline: GenerationPipeline, cache: Option<CacheManager>) -> Self {
        Self {
            pipeline,
            cache,
            state: Mutex::new(CoordinatorState::Idle),
            token: CancellationToken::new(),
            last_outcome: Mutex::new(None),
            last_cache_error: Mutex::new(None),
        }
    }

    /// Cancellation token observed by in-flight work
    ///
    /// Exposed so a caller can hand the token to another thread and cancel
    /// from there while `generate` blocks.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Request cooperative cancellation of the in-flight generation
    ///
    /// In-flight work observes the flag at stage boundaries and inside
    /// long sampling loops; partial work is discarded.
    pub fn cancel_generation(&self) {
        self.token.cancel();
    }

    /// Terminal state of the most recent request, if any finished
    pub fn last_outcome(&self) -> Option<GenerationOutcome> {
        self.last_outcome
            .lock()
            .map_or(None, |outcome| *outcome)
    }

    /// Soft cache failure from the most recent request, if one occurred
    ///
    /// Cache write errors never fail generation; they are parked here for
    /// diagnostics instead.
    pub fn take_cache_error(&self) -> Option<GenerationError> {
        self.last_cache_error
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
    }

    /// Generate particles for an image under a configuration
    ///
    /// Checks the cache first: a hit short-circuits the pipeline, still
    /// reporting a completed progress signal. On a miss the full pipeline
    /// runs, progress fires after each stage, and the result is stored in
    /// the cache on success (a failed store degrades to a diagnostic, see
    /// [`Self::take_cache_error`]).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyGenerating` when a request is in flight on this
    /// coordinator, `InvalidConfiguration`/`InvalidImage` for rejected
    /// inputs, `Cancelled` for a cooperative cancellation, or any pipeline
    /// error.
    pub fn generate(
        &self,
        image: &SourceImage,
        config: &GenerationConfig,
        mut progress: impl FnMut(f32, &str),
    ) -> Result<Vec<Particle>> {
        self.begin()?;
        let result = self.run_request(image, config, &mut progress);

        let outcome = match &result {
            Ok(_) => GenerationOutcome::Completed,
            Err(GenerationError::Cancelled) => GenerationOutcome::Cancelled,
            Err(_) => GenerationOutcome::Failed,
        };
        self.finish(outcome);

        result
    }

    /// Transition Idle -> Generating, rejecting concurrent requests
    fn begin(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| GenerationError::AlreadyGenerating)?;
        if *state == CoordinatorState::Generating {
            return Err(GenerationError::AlreadyGenerating);
        }
        *state = CoordinatorState::Generating;
        self.token.reset();
        Ok(())
    }

    /// Record the terminal state and return to Idle
    fn finish(&self, outcome: GenerationOutcome) {
        if let Ok(mut slot) = self.last_outcome.lock() {
            *slot = Some(outcome);
        }
        if let Ok(mut state) = self.state.lock() {
            *state = CoordinatorState::Idle;
        }
    }

    fn run_request(
        &self,
        image: &SourceImage,
        config: &GenerationConfig,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<Vec<Particle>> {
        config.validate()?;

        let key = CacheKey::derive(
            image.width(),
            image.height(),
            config.target_particle_count,
            config.quality_preset,
            config.sampling_strategy,
        );

        // Cache hit short-circuits the pipeline entirely
        if config.caching_enabled {
            if let Some(cache) = &self.cache {
                if let Some(samples) = cache.get(&key) {
                    let accessor = PixelAccessor::new(image);
                    let assembler = ParticleAssembler::new(config);
                    let particles = assembler.assemble(&samples, &accessor);
                    progress(1.0, "complete");
                    return Ok(particles);
                }
            }
        }

        let output = self
            .pipeline
            .run(image, config, None, &self.token, progress)?;

        if config.caching_enabled {
            if let Some(cache) = &self.cache {
                if let Err(error) = cache.put(&key, &output.samples) {
                    if let Ok(mut slot) = self.last_cache_error.lock() {
                        *slot = Some(error);
                    }
                }
            }
            progress(Stage::Caching.completion_fraction(), Stage::Caching.name());
        }

        self.token.check()?;
        progress(1.0, "complete");
        Ok(output.particles)
    }
}
