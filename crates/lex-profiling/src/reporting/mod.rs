//! Report artifact handoff.
//!
//! The profiling engine does not draw charts or build HTML. Instead a job
//! hands the typed table to a [`ReportRenderer`] together with the report id
//! it just assigned. This module provides the trait plus two writers:
//!
//! - [`ParquetSnapshotWriter`]: a columnar snapshot of the typed table
//!   (`<report_id>.parquet`) for renderers that plot from a file
//! - [`write_result_json`]: the [`ProfilingResult`] as pretty JSON
//!   (`<report_id>.json`), used by the CLI's `--emit-report`
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_profiling::{ParquetSnapshotWriter, ProfilingJob};
//! use std::sync::Arc;
//!
//! let writer = ParquetSnapshotWriter::new("reports");
//! let result = ProfilingJob::builder()
//!     .renderer(Arc::new(writer))
//!     .build()?
//!     .run("sales.csv", &bytes)?;
//!
//! // reports/<report_id>.parquet now exists
//! ```

use crate::config::BooleanVocabulary;
use crate::error::Result;
use crate::table::TypedTable;
use crate::types::ProfilingResult;
use anyhow::Context;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Receives the typed table of a finished profile.
///
/// Called once per successful job, after recommendations are computed and
/// before the table is dropped. Returning an error fails the job with
/// [`ProfilingError::RenderFailed`](crate::ProfilingError::RenderFailed).
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report_id: &str, filename: &str, table: &TypedTable) -> anyhow::Result<()>;
}

/// Writes the typed table to `<output_dir>/<report_id>.parquet`.
///
/// Column dtypes follow the inferred semantic types: integer columns become
/// `Int64`, float columns `Float64`, boolean columns `Boolean`, and the rest
/// strings. Missing and invalid cells are written as nulls.
#[derive(Debug, Clone)]
pub struct ParquetSnapshotWriter {
    output_dir: PathBuf,
    vocabulary: BooleanVocabulary,
}

impl ParquetSnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            vocabulary: BooleanVocabulary::default(),
        }
    }

    /// Use the same boolean vocabulary the job inferred types with.
    pub fn with_vocabulary(mut self, vocabulary: BooleanVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Path the snapshot for `report_id` is written to.
    pub fn snapshot_path(&self, report_id: &str) -> PathBuf {
        self.output_dir.join(format!("{report_id}.parquet"))
    }
}

impl ReportRenderer for ParquetSnapshotWriter {
    fn render(&self, report_id: &str, filename: &str, table: &TypedTable) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("creating snapshot directory {}", self.output_dir.display())
        })?;

        let mut df = table.to_dataframe(&self.vocabulary)?;
        let path = self.snapshot_path(report_id);
        let file = File::create(&path)
            .with_context(|| format!("creating snapshot {}", path.display()))?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .with_context(|| format!("writing snapshot {}", path.display()))?;

        info!(
            report_id,
            filename,
            rows = df.height(),
            "Snapshot saved: {}",
            path.display()
        );
        Ok(())
    }
}

/// Write `result` as pretty JSON to `<output_dir>/<report_id>.json`.
pub fn write_result_json(output_dir: &Path, result: &ProfilingResult) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let path = output_dir.join(format!("{}.json", result.report_id));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, result).map_err(io::Error::from)?;
    writer.flush()?;

    info!("Report saved: {}", path.display());
    Ok(path)
}
