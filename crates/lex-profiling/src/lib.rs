//! Dataset Profiling Library
//!
//! Profiles tabular uploads (CSV, XLSX, XLS) and turns the statistics into
//! prioritized data-quality recommendations.
//!
//! # Overview
//!
//! A profiling job runs four stages over one dataset:
//!
//! - **Ingestion**: parse the upload into a [`Table`] of text cells, with
//!   size and row limits enforced up front
//! - **Type Inference**: assign each column a [`SemanticType`]
//! - **Analysis**: compute [`Insights`] (missingness, duplicates, memory
//!   estimate, completeness) plus per-column profiles
//! - **Recommendations**: evaluate a deterministic rule table and return
//!   [`Recommendation`]s grouped by severity
//!
//! The result is a [`ProfilingResult`] carrying a freshly generated report
//! id. An optional [`ReportRenderer`] receives the typed table under that id.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_profiling::{ProfilingConfig, ProfilingJob};
//!
//! let bytes = std::fs::read("sales.csv")?;
//!
//! let result = ProfilingJob::builder()
//!     .config(ProfilingConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("sales.csv", &bytes)?;
//!
//! println!("Rows: {}", result.insights.row_count);
//! for rec in &result.recommendations {
//!     println!("[{}] {}", rec.kind, rec.title);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`ProfilingConfig`] to tune limits and rule thresholds:
//!
//! ```rust,ignore
//! use lex_profiling::ProfilingConfig;
//!
//! let config = ProfilingConfig::builder()
//!     .max_upload_bytes(10 * 1024 * 1024)
//!     .critical_missing_threshold(40.0)
//!     .warning_missing_threshold(5.0)
//!     .delimiter(b';')
//!     .build()?;
//! ```
//!
//! # Sharing Results
//!
//! The engine keeps no state between jobs. Callers that serve results by
//! report id own a [`ReportStore`]:
//!
//! ```rust,ignore
//! use lex_profiling::{ProfilingJob, ReportStore};
//!
//! let store = ReportStore::new();
//! let job = ProfilingJob::builder().build()?;
//! let stored = store.insert(job.run("sales.csv", &bytes)?);
//! assert_eq!(store.get(&stored.report_id)?.filename, "sales.csv");
//! ```

pub mod config;
pub mod decisions;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod store;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{BooleanVocabulary, ConfigValidationError, ProfilingConfig, ProfilingConfigBuilder};
pub use decisions::RecommendationEngine;
pub use error::{ParseLocation, ProfilingError};
pub use ingest::{FileFormat, TableIngester};
pub use pipeline::{
    ClosureProgressReporter, ProfilingJob, ProfilingJobBuilder, ProfilingStage, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::{DatasetProfile, ProfileAnalyzer, TypeInferencer};
pub use reporting::{ParquetSnapshotWriter, ReportRenderer, write_result_json};
pub use store::{ReportStore, ReportSummary, StoredReport};
pub use table::{Cell, Column, Table, TypedColumn, TypedTable};
pub use types::{
    ColumnProfile, Insights, MemoryPolicy, MissingInfo, NumericRange,
    ProfilingResult, Recommendation, RecommendationCategory, RecommendationType, SemanticType,
};
