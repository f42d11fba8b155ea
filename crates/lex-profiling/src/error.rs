//! Error types for the profiling engine.
//!
//! Every stage of a [`ProfilingJob`](crate::ProfilingJob) fails with a
//! [`ProfilingError`]. Errors are terminal for the job that raised them and
//! carry enough location detail (line, record, byte offset, column) to be
//! surfaced verbatim to the person who uploaded the file.
//!
//! Errors are serializable so the transport layer can forward them to the
//! caller as `{ "code": ..., "message": ... }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::fmt;
use thiserror::Error;

/// Where in the input a parse failure was detected.
///
/// All fields are optional because the available detail depends on the
/// format: CSV reports line/record/byte positions, spreadsheets only report
/// the sheet-level failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseLocation {
    /// 1-based line number in the source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    /// 0-based record index (the header is record 0 when present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<u64>,
    /// Byte offset of the start of the offending record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<u64>,
    /// Column name, when the failure is attributable to a single column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl ParseLocation {
    pub fn is_empty(&self) -> bool {
        self.line.is_none()
            && self.record.is_none()
            && self.byte_offset.is_none()
            && self.column.is_none()
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        if let Some(record) = self.record {
            parts.push(format!("record {}", record));
        }
        if let Some(offset) = self.byte_offset {
            parts.push(format!("byte {}", offset));
        }
        if let Some(column) = &self.column {
            parts.push(format!("column '{}'", column));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// The main error type for the profiling engine.
#[derive(Error, Debug)]
pub enum ProfilingError {
    /// The declared file extension is not one of csv, xlsx, xls.
    #[error("Unsupported file format '{extension}'. Please upload a CSV or Excel file (.csv, .xlsx, .xls)")]
    UnsupportedFormat { extension: String },

    /// The input exceeds the configured byte limit.
    #[error("File too large: {size} bytes exceeds the maximum of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// The input has more data rows than the configured limit.
    #[error("Too many rows: more than {limit} data rows are not supported")]
    RowLimitExceeded { limit: usize },

    /// Malformed structure or unreadable encoding.
    #[error("{}", format_parse_error(.message, .location))]
    ParseError {
        message: String,
        location: ParseLocation,
    },

    /// The file parsed but contains no data rows.
    #[error("File is empty: no data rows found")]
    EmptyDataset,

    /// An engine invariant was violated. Never expected in correct operation.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external report renderer rejected the hand-off.
    #[error("Failed to render report '{report_id}': {reason}")]
    RenderFailed { report_id: String, reason: String },

    /// No stored report exists under the requested identifier.
    #[error("Report '{0}' not found")]
    ReportNotFound(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_parse_error(message: &str, location: &ParseLocation) -> String {
    if location.is_empty() {
        format!("Failed to parse file: {}", message)
    } else {
        format!("Failed to parse file at {}: {}", location, message)
    }
}

impl ProfilingError {
    /// Build a [`ProfilingError::ParseError`] without location detail.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: ParseLocation::default(),
        }
    }

    /// Build a [`ProfilingError::ParseError`] pinned to a location.
    pub fn parse_at(message: impl Into<String>, location: ParseLocation) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }

    /// Get error code for the transport layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::RowLimitExceeded { .. } => "ROW_LIMIT_EXCEEDED",
            Self::ParseError { .. } => "PARSE_ERROR",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InternalError(_) => "INTERNAL_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::RenderFailed { .. } => "RENDER_FAILED",
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the failure was caused by the uploaded file itself, as opposed
    /// to the engine or its collaborators. Transport layers map these to 4xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::FileTooLarge { .. }
                | Self::RowLimitExceeded { .. }
                | Self::ParseError { .. }
                | Self::EmptyDataset
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProfilingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProfilingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for profiling operations.
pub type Result<T> = std::result::Result<T, ProfilingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(ProfilingError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            ProfilingError::FileTooLarge { size: 10, limit: 5 }.error_code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(ProfilingError::parse("bad").error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_is_client_error() {
        assert!(ProfilingError::EmptyDataset.is_client_error());
        assert!(
            ProfilingError::UnsupportedFormat {
                extension: "txt".to_string()
            }
            .is_client_error()
        );
        assert!(!ProfilingError::InternalError("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_parse_error_message_includes_location() {
        let error = ProfilingError::parse_at(
            "found record with 3 fields, but the previous record has 4 fields",
            ParseLocation {
                line: Some(5),
                record: Some(4),
                byte_offset: Some(87),
                column: None,
            },
        );
        let message = error.to_string();
        assert!(message.contains("line 5"));
        assert!(message.contains("byte 87"));
        assert!(message.contains("3 fields"));
    }

    #[test]
    fn test_parse_error_without_location() {
        let error = ProfilingError::parse("corrupt workbook");
        assert_eq!(error.to_string(), "Failed to parse file: corrupt workbook");
    }

    #[test]
    fn test_error_serialization() {
        let error = ProfilingError::UnsupportedFormat {
            extension: "txt".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_FORMAT"));
        assert!(json.contains("txt"));
    }
}
