use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type assigned to a column by type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    DateTime,
    Categorical,
}

impl SemanticType {
    /// Label used in `insights.data_types`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Categorical => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Insights
// ============================================================================

/// Missing-cell statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissingInfo {
    pub count: usize,
    pub percentage: f64,
}

/// Per-cell byte widths used for the memory estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPolicy {
    /// Integer, Float and DateTime cells.
    pub fixed_width_bytes: usize,
    /// Boolean cells.
    pub boolean_bytes: usize,
    /// Per present text cell, added to its UTF-8 length.
    pub text_object_overhead_bytes: usize,
    /// Reference slot for every text cell, present or missing.
    pub text_reference_bytes: usize,
}

impl Default for MemoryPolicy {
    fn default() -> Self {
        Self {
            fixed_width_bytes: 8,
            boolean_bytes: 1,
            text_object_overhead_bytes: 49,
            text_reference_bytes: 8,
        }
    }
}

/// Dataset-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub row_count: usize,
    pub column_count: usize,
    /// Only columns with at least one missing cell, in source order.
    pub missing_data: IndexMap<String, MissingInfo>,
    /// Every column's semantic type label, in source order.
    pub data_types: IndexMap<String, SemanticType>,
    pub duplicates: usize,
    /// Estimated footprint in MiB.
    pub memory_usage: f64,
    pub memory_policy: MemoryPolicy,
    /// Percentage of non-missing cells across the whole table.
    pub completeness: f64,
}

// ============================================================================
// Column profiles
// ============================================================================

/// Observed min/max of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Per-column detail consumed by the recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub semantic_type: SemanticType,
    pub missing_count: usize,
    pub missing_percentage: f64,
    /// Distinct present values (trimmed).
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_range: Option<NumericRange>,
    /// Text column whose values are all numbers once formatting such as
    /// currency symbols or thousands separators is stripped.
    pub formatted_numeric: bool,
    /// Text column whose leading sample values all parse as dates.
    pub date_like_sample: bool,
}

// ============================================================================
// Recommendations
// ============================================================================

/// Severity of a recommendation.
///
/// Declaration order is the output priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Critical,
    Warning,
    Info,
    Success,
}

impl RecommendationType {
    pub fn priority(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Info => 2,
            Self::Success => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Area a recommendation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationCategory {
    #[serde(rename = "Missing Data")]
    MissingData,
    #[serde(rename = "Data Quality")]
    DataQuality,
    #[serde(rename = "Optimization")]
    Optimization,
    #[serde(rename = "Data Type")]
    DataType,
    #[serde(rename = "Feature Engineering")]
    FeatureEngineering,
    #[serde(rename = "Preprocessing")]
    Preprocessing,
    #[serde(rename = "Overall Quality")]
    OverallQuality,
}

impl RecommendationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MissingData => "Missing Data",
            Self::DataQuality => "Data Quality",
            Self::Optimization => "Optimization",
            Self::DataType => "Data Type",
            Self::FeatureEngineering => "Feature Engineering",
            Self::Preprocessing => "Preprocessing",
            Self::OverallQuality => "Overall Quality",
        }
    }
}

/// A single actionable finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub action: String,
    /// Firing order within one engine run.
    #[serde(skip)]
    pub ordinal: usize,
}

/// Everything a profiling job produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingResult {
    pub filename: String,
    pub insights: Insights,
    pub recommendations: Vec<Recommendation>,
    pub report_id: String,
}
