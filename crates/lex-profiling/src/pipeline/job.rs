//! Profiling job orchestration.
//!
//! A [`ProfilingJob`] runs the stages for one dataset in order:
//! ingest, infer types, analyze, recommend, and (optionally) render.
//! Any stage failure aborts the job with that stage's error unchanged.

use crate::config::ProfilingConfig;
use crate::decisions::RecommendationEngine;
use crate::error::{ProfilingError, Result};
use crate::ingest::TableIngester;
use crate::pipeline::progress::{
    ClosureProgressReporter, ProfilingStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{ProfileAnalyzer, TypeInferencer};
use crate::reporting::ReportRenderer;
use crate::table::{Table, TypedTable};
use crate::types::ProfilingResult;
use chrono::Local;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Profiles one uploaded dataset.
///
/// Use [`ProfilingJob::builder()`] to construct one. A job holds no
/// per-run state, so a single instance can be shared across threads and
/// run any number of times.
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::{ProfilingConfig, ProfilingJob};
///
/// let job = ProfilingJob::builder()
///     .config(ProfilingConfig::builder().max_rows(100_000).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// let result = job.run("sales.csv", &bytes)?;
/// println!("{} recommendations", result.recommendations.len());
/// ```
pub struct ProfilingJob {
    config: ProfilingConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    renderer: Option<Arc<dyn ReportRenderer>>,
}

static_assertions::assert_impl_all!(ProfilingJob: Send, Sync);

impl ProfilingJob {
    /// Create a new job builder.
    pub fn builder() -> ProfilingJobBuilder {
        ProfilingJobBuilder::default()
    }

    /// The configuration this job runs with.
    pub fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    /// Profile an in-memory upload.
    ///
    /// The format is taken from the extension of `filename`.
    pub fn run(&self, filename: &str, bytes: &[u8]) -> Result<ProfilingResult> {
        self.finish(filename, || {
            TableIngester::new(&self.config).ingest_bytes(bytes, filename)
        })
    }

    /// Profile an upload read from `reader`.
    ///
    /// `len_hint` is the declared upload size, if known; it lets oversized
    /// uploads be rejected before any byte is read.
    pub fn run_reader<R: Read>(
        &self,
        filename: &str,
        reader: R,
        len_hint: Option<u64>,
    ) -> Result<ProfilingResult> {
        self.finish(filename, || {
            TableIngester::new(&self.config).ingest_reader(reader, filename, len_hint)
        })
    }

    fn finish<F>(&self, filename: &str, ingest: F) -> Result<ProfilingResult>
    where
        F: FnOnce() -> Result<Table>,
    {
        match self.run_stages(filename, ingest) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Profiled {} with {} recommendations",
                    result.filename,
                    result.recommendations.len()
                )));
                Ok(result)
            }
            Err(e) => {
                error!(code = e.error_code(), "Profiling failed: {}", e);
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn run_stages<F>(&self, filename: &str, ingest: F) -> Result<ProfilingResult>
    where
        F: FnOnce() -> Result<Table>,
    {
        let start_time = Instant::now();
        let display_name = display_filename(filename);
        info!(filename = %display_name, "Starting profiling job");

        self.enter(ProfilingStage::Ingesting);
        let table = ingest()?;

        self.enter(ProfilingStage::InferringTypes);
        let typed = TypeInferencer::new(&self.config).infer(table);

        self.enter(ProfilingStage::Analyzing);
        let profile = ProfileAnalyzer::new(&self.config).analyze(&typed)?;

        self.enter(ProfilingStage::Recommending);
        let recommendations = RecommendationEngine::new(&self.config).recommend(&profile);

        let report_id = generate_report_id();
        self.render(&report_id, &display_name, &typed)?;

        info!(
            report_id = %report_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Profiling job finished"
        );

        Ok(ProfilingResult {
            filename: display_name,
            insights: profile.insights,
            recommendations,
            report_id,
        })
    }

    fn render(&self, report_id: &str, filename: &str, table: &TypedTable) -> Result<()> {
        let Some(renderer) = &self.renderer else {
            debug!("No renderer configured, skipping render stage");
            return Ok(());
        };

        self.enter(ProfilingStage::Rendering);
        renderer
            .render(report_id, filename, table)
            .map_err(|e| ProfilingError::RenderFailed {
                report_id: report_id.to_string(),
                reason: format!("{e:#}"),
            })
    }

    fn enter(&self, stage: ProfilingStage) {
        info!("{}", stage.display_name());
        self.report_progress(ProgressUpdate::started(stage));
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for [`ProfilingJob`].
#[derive(Default)]
pub struct ProfilingJobBuilder {
    config: Option<ProfilingConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    renderer: Option<Arc<dyn ReportRenderer>>,
}

static_assertions::assert_impl_all!(ProfilingJobBuilder: Send);

impl ProfilingJobBuilder {
    /// Set the job configuration.
    pub fn config(mut self, config: ProfilingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving stage updates.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Hand the typed table to `renderer` once the report id is known.
    ///
    /// A renderer error fails the job with [`ProfilingError::RenderFailed`].
    pub fn renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the job, validating the configuration.
    pub fn build(self) -> Result<ProfilingJob> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(ProfilingJob {
            config,
            progress_reporter: self.progress_reporter,
            renderer: self.renderer,
        })
    }
}

/// Timestamp prefix plus 128 bits of randomness, hex encoded.
pub(crate) fn generate_report_id() -> String {
    format!(
        "{}_{:032x}",
        Local::now().format("%Y%m%d_%H%M%S"),
        rand::random::<u128>()
    )
}

/// Strip any directory components so paths never leak into results.
fn display_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(filename)
        .to_string()
}
