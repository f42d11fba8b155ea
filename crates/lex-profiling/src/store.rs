//! In-memory store of finished profiling results.
//!
//! The profiling engine itself is lock-free; whoever serves results to
//! clients owns a [`ReportStore`] and decides how long entries live.

use crate::error::{ProfilingError, Result};
use crate::types::ProfilingResult;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A stored result plus bookkeeping.
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub result: Arc<ProfilingResult>,
    pub created_at: DateTime<Utc>,
}

/// Lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub report_id: String,
    pub filename: String,
    pub row_count: usize,
    pub column_count: usize,
    pub recommendation_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Results keyed by report id.
#[derive(Debug, Default)]
pub struct ReportStore {
    reports: RwLock<HashMap<String, StoredReport>>,
}

static_assertions::assert_impl_all!(ReportStore: Send, Sync);

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result` under its report id and return the shared handle.
    ///
    /// Report ids carry 128 bits of randomness; an existing entry with the
    /// same id is replaced.
    pub fn insert(&self, result: ProfilingResult) -> Arc<ProfilingResult> {
        let result = Arc::new(result);
        let entry = StoredReport {
            result: Arc::clone(&result),
            created_at: Utc::now(),
        };
        debug!(report_id = %result.report_id, "Storing report");
        self.reports.write().insert(result.report_id.clone(), entry);
        result
    }

    pub fn get(&self, report_id: &str) -> Result<Arc<ProfilingResult>> {
        self.reports
            .read()
            .get(report_id)
            .map(|entry| Arc::clone(&entry.result))
            .ok_or_else(|| ProfilingError::ReportNotFound(report_id.to_string()))
    }

    pub fn contains(&self, report_id: &str) -> bool {
        self.reports.read().contains_key(report_id)
    }

    /// Summaries of every stored report, newest first.
    pub fn list(&self) -> Vec<ReportSummary> {
        let mut summaries: Vec<ReportSummary> = self
            .reports
            .read()
            .values()
            .map(|entry| ReportSummary {
                report_id: entry.result.report_id.clone(),
                filename: entry.result.filename.clone(),
                row_count: entry.result.insights.row_count,
                column_count: entry.result.insights.column_count,
                recommendation_count: entry.result.recommendations.len(),
                created_at: entry.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.report_id.cmp(&b.report_id))
        });
        summaries
    }

    pub fn remove(&self, report_id: &str) -> Result<Arc<ProfilingResult>> {
        self.reports
            .write()
            .remove(report_id)
            .map(|entry| entry.result)
            .ok_or_else(|| ProfilingError::ReportNotFound(report_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}
