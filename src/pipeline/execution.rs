//! Execution strategies deciding per-stage parallelism and priority

use std::sync::LazyLock;
use std::time::Duration;

use crate::io::configuration::{
    MAX_WORKERS, PARALLEL_AREA_THRESHOLD, SEQUENTIAL_PARTICLE_THRESHOLD,
};
use crate::io::error::{Result, invalid_configuration};
use crate::pipeline::{GenerationConfig, Stage, StagePriority};

/// Snapshot of host capabilities, taken once per process lifetime
#[derive(Debug, Clone, Copy)]
pub struct DeviceCapabilities {
    /// Available hardware parallelism
    pub cores: usize,
}

static DEVICE_CAPABILITIES: LazyLock<DeviceCapabilities> = LazyLock::new(|| DeviceCapabilities {
    cores: std::thread::available_parallelism().map_or(1, |cores| cores.get()),
});

impl DeviceCapabilities {
    /// The cached process-wide snapshot
    pub fn snapshot() -> Self {
        *DEVICE_CAPABILITIES
    }
}

/// Per-stage scheduling decisions for a pipeline run
///
/// A strategy decides whether each stage may run with intra-stage
/// parallelism and how many workers it gets, and validates the
/// configuration before any work starts. Time estimates are heuristic
/// instrumentation, not guarantees.
pub trait ExecutionStrategy {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Whether the stage may use intra-stage parallelism
    fn can_parallelize(&self, stage: Stage) -> bool;

    /// Stages that must complete before this stage starts
    fn dependencies(&self, stage: Stage) -> Vec<Stage> {
        match stage {
            Stage::Analysis => Vec::new(),
            Stage::Sampling => vec![Stage::Analysis],
            Stage::Assembly => vec![Stage::Sampling],
            Stage::Caching => vec![Stage::Assembly],
        }
    }

    /// Scheduling priority for the stage
    fn priority(&self, stage: Stage) -> StagePriority {
        match stage {
            Stage::Sampling => StagePriority::High,
            Stage::Analysis | Stage::Assembly => StagePriority::Normal,
            Stage::Caching => StagePriority::Low,
        }
    }

    /// Check the configuration against this strategy's requirements
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when the config cannot satisfy the
    /// strategy (for example, parallel execution with one worker).
    fn validate(&self, config: &GenerationConfig) -> Result<()>;

    /// Worker count for a stage given the workload
    ///
    /// Defaults to sequential; parallel strategies override for the stages
    /// they parallelize.
    fn worker_count(&self, _stage: Stage, _config: &GenerationConfig, _pixel_count: usize) -> usize {
        1
    }

    /// Heuristic execution time estimate for instrumentation
    fn estimate_execution_time(&self, config: &GenerationConfig, pixel_count: usize) -> Duration;
}

/// Baseline estimate shared by the strategies: a scan cost per pixel plus
/// a per-particle cost
const fn base_estimate(config: &GenerationConfig, pixel_count: usize) -> Duration {
    let scan_nanos = pixel_count as u64 * 12;
    let particle_nanos = config.target_particle_count as u64 * 40;
    Duration::from_nanos(scan_nanos + particle_nanos)
}

/// Never parallelizes; optimal for small workloads where pool setup
/// overhead would dominate
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecution;

impl ExecutionStrategy for SequentialExecution {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn can_parallelize(&self, _stage: Stage) -> bool {
        false
    }

    fn validate(&self, _config: &GenerationConfig) -> Result<()> {
        Ok(())
    }

    fn estimate_execution_time(&self, config: &GenerationConfig, pixel_count: usize) -> Duration {
        base_estimate(config, pixel_count)
    }
}

/// Parallelizes analysis and sampling when the workload is large enough;
/// assembly and caching stay sequential because they mutate shared
/// accumulation state
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecution {
    /// Upper bound on concurrent workers
    pub max_workers: usize,
}

impl Default for ParallelExecution {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
        }
    }
}

impl ExecutionStrategy for ParallelExecution {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn can_parallelize(&self, stage: Stage) -> bool {
        matches!(stage, Stage::Analysis | Stage::Sampling)
    }

    fn validate(&self, config: &GenerationConfig) -> Result<()> {
        if config.max_concurrency <= 1 {
            return Err(invalid_configuration(
                "max_concurrency",
                &config.max_concurrency,
                &"parallel execution requires more than one worker",
            ));
        }
        Ok(())
    }

    fn worker_count(&self, stage: Stage, config: &GenerationConfig, pixel_count: usize) -> usize {
        if !self.can_parallelize(stage) {
            return 1;
        }
        let heavy_image = pixel_count >= PARALLEL_AREA_THRESHOLD;
        let heavy_count = config.target_particle_count >= SEQUENTIAL_PARTICLE_THRESHOLD;
        if heavy_image && heavy_count {
            self.max_workers.min(config.effective_concurrency())
        } else {
            1
        }
    }

    fn estimate_execution_time(&self, config: &GenerationConfig, pixel_count: usize) -> Duration {
        let workers = self
            .worker_count(Stage::Sampling, config, pixel_count)
            .max(1) as u32;
        base_estimate(config, pixel_count) / workers
    }
}

/// Workload classification used by adaptive execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadClass {
    /// Small image and particle count; sequential wins
    Light,
    /// Mid-size workload; limited parallelism
    Medium,
    /// Large workload; full worker budget
    Heavy,
}

/// Classifies each request by image area and particle count and picks
/// sequential, limited-parallel, or full-parallel behavior, consulting the
/// cached device capability snapshot
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveExecution {
    capabilities: DeviceCapabilities,
}

impl Default for AdaptiveExecution {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveExecution {
    /// Create an adaptive strategy using the process-wide capability snapshot
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities::snapshot(),
        }
    }

    /// Classify a workload by image area and particle count
    pub fn classify(config: &GenerationConfig, pixel_count: usize) -> WorkloadClass {
        let light_count = config.target_particle_count < SEQUENTIAL_PARTICLE_THRESHOLD;
        let light_image = pixel_count < PARALLEL_AREA_THRESHOLD;

        if light_count && light_image {
            WorkloadClass::Light
        } else if light_count || light_image {
            WorkloadClass::Medium
        } else {
            WorkloadClass::Heavy
        }
    }
}

impl ExecutionStrategy for AdaptiveExecution {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn can_parallelize(&self, stage: Stage) -> bool {
        matches!(stage, Stage::Analysis | Stage::Sampling)
    }

    fn validate(&self, _config: &GenerationConfig) -> Result<()> {
        Ok(())
    }

    fn worker_count(&self, stage: Stage, config: &GenerationConfig, pixel_count: usize) -> usize {
        if !self.can_parallelize(stage) {
            return 1;
        }
        let budget = self
            .capabilities
            .cores
            .min(config.effective_concurrency())
            .max(1);
        match Self::classify(config, pixel_count) {
            WorkloadClass::Light => 1,
            WorkloadClass::Medium => budget.min(2),
            WorkloadClass::Heavy => budget,
        }
    }

    fn estimate_execution_time(&self, config: &GenerationConfig, pixel_count: usize) -> Duration {
        let workers = self
            .worker_count(Stage::Sampling, config, pixel_count)
            .max(1) as u32;
        base_estimate(config, pixel_count) / workers
    }
}
