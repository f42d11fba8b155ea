//! Configuration types for the profiling engine.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic job setup. Every threshold the recommendation
//! rules consult lives here, so tuning a rule never requires a code change.

use serde::{Deserialize, Serialize};

/// Default maximum upload size: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Default maximum number of data rows.
pub const DEFAULT_MAX_ROWS: usize = 1_000_000;

/// Default chrono formats tried when classifying date/time columns.
pub const DEFAULT_DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%m/%d/%Y %H:%M",
];

/// Cell values treated as missing, in addition to empty/whitespace cells.
pub const DEFAULT_MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Tokens recognised as boolean values (compared case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanVocabulary {
    pub truthy: Vec<String>,
    pub falsy: Vec<String>,
}

impl Default for BooleanVocabulary {
    fn default() -> Self {
        Self {
            truthy: ["true", "yes", "t", "y", "1"].map(String::from).to_vec(),
            falsy: ["false", "no", "f", "n", "0"].map(String::from).to_vec(),
        }
    }
}

impl BooleanVocabulary {
    /// Check whether `value` is one of the boolean tokens.
    pub fn contains(&self, value: &str) -> bool {
        let value = value.trim();
        self.truthy
            .iter()
            .chain(self.falsy.iter())
            .any(|token| token.eq_ignore_ascii_case(value))
    }
}

/// Configuration for a profiling job.
///
/// Use [`ProfilingConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_profiling::ProfilingConfig;
///
/// let config = ProfilingConfig::builder()
///     .max_upload_bytes(10 * 1024 * 1024)
///     .critical_missing_threshold(60.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Maximum accepted input size in bytes.
    /// Default: 100 MiB
    pub max_upload_bytes: u64,

    /// Maximum accepted number of data rows.
    /// Default: 1,000,000
    pub max_rows: usize,

    /// Field delimiter for CSV input.
    /// Default: b','
    pub delimiter: u8,

    /// Whether the first row holds column names.
    /// Default: true
    pub has_header: bool,

    /// Cell values treated as missing (exact match after trimming).
    pub missing_markers: Vec<String>,

    /// Columns with missing percentage strictly above this are critical.
    /// Default: 50.0
    pub critical_missing_threshold: f64,

    /// Columns with missing percentage strictly above this (and at most the
    /// critical threshold) are warnings. Anything above zero is info.
    /// Default: 10.0
    pub warning_missing_threshold: f64,

    /// Distinct/row ratio above which a text column is high-cardinality.
    /// Default: 0.95
    pub high_cardinality_ratio: f64,

    /// Distinct/row ratio below which a text column is a categorical
    /// encoding candidate.
    /// Default: 0.05
    pub low_cardinality_ratio: f64,

    /// Minimum completeness percentage for the "good quality" rule.
    /// Default: 95.0
    pub completeness_threshold: f64,

    /// Estimated memory (MiB) above which a large-memory note is emitted.
    /// Default: 100.0
    pub large_memory_mb: f64,

    /// Ratio between the widest and narrowest numeric range above which
    /// feature scaling is recommended.
    /// Default: 100.0
    pub scaling_ratio: f64,

    /// Number of leading non-missing values checked by the potential-date
    /// rule on text columns.
    /// Default: 10
    pub date_sample_size: usize,

    /// chrono format strings used to recognise date/time values.
    pub datetime_formats: Vec<String>,

    /// Boolean vocabulary used during type inference.
    pub boolean_vocabulary: BooleanVocabulary,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_rows: DEFAULT_MAX_ROWS,
            delimiter: b',',
            has_header: true,
            missing_markers: DEFAULT_MISSING_MARKERS.map(String::from).to_vec(),
            critical_missing_threshold: 50.0,
            warning_missing_threshold: 10.0,
            high_cardinality_ratio: 0.95,
            low_cardinality_ratio: 0.05,
            completeness_threshold: 95.0,
            large_memory_mb: 100.0,
            scaling_ratio: 100.0,
            date_sample_size: 10,
            datetime_formats: DEFAULT_DATETIME_FORMATS.map(String::from).to_vec(),
            boolean_vocabulary: BooleanVocabulary::default(),
        }
    }
}

impl ProfilingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProfilingConfigBuilder {
        ProfilingConfigBuilder::default()
    }

    /// Check whether a raw cell value is a missing marker.
    pub fn is_missing_marker(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || self.missing_markers.iter().any(|m| m == trimmed)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigValidationError::ZeroLimit("max_upload_bytes"));
        }
        if self.max_rows == 0 {
            return Err(ConfigValidationError::ZeroLimit("max_rows"));
        }

        for (field, value) in [
            ("critical_missing_threshold", self.critical_missing_threshold),
            ("warning_missing_threshold", self.warning_missing_threshold),
            ("completeness_threshold", self.completeness_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigValidationError::InvalidPercentage {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.warning_missing_threshold > self.critical_missing_threshold {
            return Err(ConfigValidationError::MisorderedThresholds {
                warning: self.warning_missing_threshold,
                critical: self.critical_missing_threshold,
            });
        }

        for (field, value) in [
            ("high_cardinality_ratio", self.high_cardinality_ratio),
            ("low_cardinality_ratio", self.low_cardinality_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidRatio {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.large_memory_mb < 0.0 {
            return Err(ConfigValidationError::Negative {
                field: "large_memory_mb".to_string(),
                value: self.large_memory_mb,
            });
        }
        if self.scaling_ratio < 1.0 {
            return Err(ConfigValidationError::InvalidScalingRatio(self.scaling_ratio));
        }

        if self.delimiter == b'"' || self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter as char));
        }

        let vocabulary = &self.boolean_vocabulary;
        if vocabulary.truthy.is_empty() || vocabulary.falsy.is_empty() {
            return Err(ConfigValidationError::EmptyBooleanVocabulary);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("Invalid percentage for '{field}': {value} (must be between 0 and 100)")]
    InvalidPercentage { field: String, value: f64 },

    #[error("Warning missing threshold {warning} is above the critical threshold {critical}")]
    MisorderedThresholds { warning: f64, critical: f64 },

    #[error("Invalid ratio for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidRatio { field: String, value: f64 },

    #[error("'{field}' must not be negative: {value}")]
    Negative { field: String, value: f64 },

    #[error("Invalid scaling ratio: {0} (must be at least 1.0)")]
    InvalidScalingRatio(f64),

    #[error("Invalid CSV delimiter: {0:?}")]
    InvalidDelimiter(char),

    #[error("Boolean vocabulary needs at least one truthy and one falsy token")]
    EmptyBooleanVocabulary,
}

impl From<ConfigValidationError> for crate::error::ProfilingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ProfilingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ProfilingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProfilingConfigBuilder {
    base: Option<ProfilingConfig>,
    max_upload_bytes: Option<u64>,
    max_rows: Option<usize>,
    delimiter: Option<u8>,
    has_header: Option<bool>,
    missing_markers: Option<Vec<String>>,
    critical_missing_threshold: Option<f64>,
    warning_missing_threshold: Option<f64>,
    high_cardinality_ratio: Option<f64>,
    low_cardinality_ratio: Option<f64>,
    completeness_threshold: Option<f64>,
    large_memory_mb: Option<f64>,
    scaling_ratio: Option<f64>,
    date_sample_size: Option<usize>,
    datetime_formats: Option<Vec<String>>,
    boolean_vocabulary: Option<BooleanVocabulary>,
}

impl ProfilingConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON)
    /// instead of the defaults. Explicit builder calls still take priority.
    pub fn base(mut self, config: ProfilingConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the maximum accepted input size in bytes.
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Set the maximum accepted number of data rows.
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Set the CSV field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Declare whether the first row is a header.
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    /// Replace the missing-value markers.
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the critical missing-data threshold (percent, exclusive).
    pub fn critical_missing_threshold(mut self, pct: f64) -> Self {
        self.critical_missing_threshold = Some(pct);
        self
    }

    /// Set the warning missing-data threshold (percent, exclusive).
    pub fn warning_missing_threshold(mut self, pct: f64) -> Self {
        self.warning_missing_threshold = Some(pct);
        self
    }

    /// Set the high-cardinality ratio.
    pub fn high_cardinality_ratio(mut self, ratio: f64) -> Self {
        self.high_cardinality_ratio = Some(ratio);
        self
    }

    /// Set the low-cardinality ratio.
    pub fn low_cardinality_ratio(mut self, ratio: f64) -> Self {
        self.low_cardinality_ratio = Some(ratio);
        self
    }

    /// Set the completeness threshold for the good-quality rule (percent).
    pub fn completeness_threshold(mut self, pct: f64) -> Self {
        self.completeness_threshold = Some(pct);
        self
    }

    /// Set the large-memory threshold in MiB.
    pub fn large_memory_mb(mut self, mb: f64) -> Self {
        self.large_memory_mb = Some(mb);
        self
    }

    /// Set the feature-scaling ratio.
    pub fn scaling_ratio(mut self, ratio: f64) -> Self {
        self.scaling_ratio = Some(ratio);
        self
    }

    /// Set the number of values sampled by the potential-date rule.
    pub fn date_sample_size(mut self, size: usize) -> Self {
        self.date_sample_size = Some(size);
        self
    }

    /// Replace the date/time format set.
    pub fn datetime_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the boolean vocabulary.
    pub fn boolean_vocabulary(mut self, vocabulary: BooleanVocabulary) -> Self {
        self.boolean_vocabulary = Some(vocabulary);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProfilingConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProfilingConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = ProfilingConfig {
            max_upload_bytes: self.max_upload_bytes.unwrap_or(base.max_upload_bytes),
            max_rows: self.max_rows.unwrap_or(base.max_rows),
            delimiter: self.delimiter.unwrap_or(base.delimiter),
            has_header: self.has_header.unwrap_or(base.has_header),
            missing_markers: self.missing_markers.unwrap_or(base.missing_markers),
            critical_missing_threshold: self
                .critical_missing_threshold
                .unwrap_or(base.critical_missing_threshold),
            warning_missing_threshold: self
                .warning_missing_threshold
                .unwrap_or(base.warning_missing_threshold),
            high_cardinality_ratio: self
                .high_cardinality_ratio
                .unwrap_or(base.high_cardinality_ratio),
            low_cardinality_ratio: self
                .low_cardinality_ratio
                .unwrap_or(base.low_cardinality_ratio),
            completeness_threshold: self
                .completeness_threshold
                .unwrap_or(base.completeness_threshold),
            large_memory_mb: self.large_memory_mb.unwrap_or(base.large_memory_mb),
            scaling_ratio: self.scaling_ratio.unwrap_or(base.scaling_ratio),
            date_sample_size: self.date_sample_size.unwrap_or(base.date_sample_size),
            datetime_formats: self.datetime_formats.unwrap_or(base.datetime_formats),
            boolean_vocabulary: self.boolean_vocabulary.unwrap_or(base.boolean_vocabulary),
        };

        config.validate()?;
        Ok(config)
    }
}
