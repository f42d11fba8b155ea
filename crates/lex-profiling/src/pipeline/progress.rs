//! Progress reporting for profiling jobs.
//!
//! A job emits one [`ProgressUpdate`] when each stage starts and a terminal
//! update when it completes or fails. Reporters must be `Send + Sync` so a
//! job can run on a worker thread while updates flow elsewhere.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_profiling::ProfilingJob;
//!
//! let result = ProfilingJob::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("sales.csv", &bytes)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a profiling job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingStage {
    /// Parsing the upload into a table
    Ingesting,
    /// Assigning semantic types to columns
    InferringTypes,
    /// Computing insights and column profiles
    Analyzing,
    /// Evaluating the recommendation rules
    Recommending,
    /// Handing the table to the report renderer
    Rendering,
    /// Job completed successfully
    Complete,
    /// Job failed with an error
    Failed,
}

impl ProfilingStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ingesting => "Reading File",
            Self::InferringTypes => "Inferring Types",
            Self::Analyzing => "Analyzing Dataset",
            Self::Recommending => "Generating Recommendations",
            Self::Rendering => "Rendering Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Typical share of total job time spent in this stage.
    ///
    /// The non-terminal weights sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Ingesting => 0.40,
            Self::InferringTypes => 0.20,
            Self::Analyzing => 0.25,
            Self::Recommending => 0.05,
            Self::Rendering => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Ingesting => 0.0,
            Self::InferringTypes => 0.40,
            Self::Analyzing => 0.60,
            Self::Recommending => 0.85,
            Self::Rendering => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current job stage
    pub stage: ProfilingStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a progress update at a point inside `stage`.
    pub fn new(stage: ProfilingStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
        }
    }

    /// Creates the update sent when `stage` begins.
    pub fn started(stage: ProfilingStage) -> Self {
        Self::new(stage, 0.0, format!("{}...", stage.display_name()))
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: ProfilingStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: ProfilingStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates from a job.
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(ProfilingStage::Analyzing, 0.5, "Analyzing...");
        assert_eq!(update.stage, ProfilingStage::Analyzing);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.725).abs() < 1e-6);
    }

    #[test]
    fn test_started_message() {
        let update = ProgressUpdate::started(ProfilingStage::InferringTypes);
        assert_eq!(update.message, "Inferring Types...");
        assert_eq!(update.progress, 0.40);
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done!");
        assert_eq!(update.stage, ProfilingStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let stages = [
            ProfilingStage::Ingesting,
            ProfilingStage::InferringTypes,
            ProfilingStage::Analyzing,
            ProfilingStage::Recommending,
            ProfilingStage::Rendering,
        ];

        let total_weight: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");

        // Each stage starts where the previous one ends.
        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&ProfilingStage::InferringTypes).unwrap();
        assert_eq!(json, "\"inferring_types\"");
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::started(ProfilingStage::Ingesting));
        });

        handle.join().expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
