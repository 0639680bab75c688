//! Stage progress display for CLI runs

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Resolution of the stage progress bar
const PROGRESS_TICKS: u64 = 100;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg:12} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Renders pipeline stage transitions as a single progress bar
///
/// Driven directly by the coordinator's `(fraction, stage)` callback, so
/// it advances once per stage boundary rather than per unit of work.
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    /// Create a progress bar labelled with the file being processed
    pub fn new(path: &Path) -> Self {
        let bar = ProgressBar::new(PROGRESS_TICKS);
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
        );
        Self { bar }
    }

    /// Report a stage transition
    pub fn update(&self, fraction: f32, stage: &str) {
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * PROGRESS_TICKS as f32) as u64);
        self.bar.set_message(stage.to_string());
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
