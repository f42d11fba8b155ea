//! Streaming CSV reader.

use super::{ColumnBuilder, generated_headers, map_io_error, normalise_headers};
use crate::config::ProfilingConfig;
use crate::error::{ParseLocation, ProfilingError, Result};
use crate::table::Table;
use csv::{ErrorKind, Position, ReaderBuilder, StringRecord};
use std::io::{self, Read};
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';
const UTF8_BOM_BYTES: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Read delimited text into a [`Table`], one record at a time.
pub(crate) fn read_csv<R: Read>(reader: R, config: &ProfilingConfig) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(false)
        .from_reader(QuoteTracker::new(reader, config.delimiter));

    let limit = config.max_upload_bytes;
    let mut record = StringRecord::new();

    // The first record is either the header or the first data row.
    if !reader
        .read_record(&mut record)
        .map_err(|e| map_csv_error(e, limit))?
    {
        return Err(ProfilingError::EmptyDataset);
    }
    let mut last_start = record.position().cloned();

    let width = record.len();
    let mut builder = ColumnBuilder::new(config, width);
    let names = if config.has_header {
        let raw = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i == 0 {
                    field.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    field.to_string()
                }
            })
            .collect();
        normalise_headers(raw)
    } else {
        push_record(&mut builder, &record)?;
        generated_headers(width)
    };
    debug!(columns = ?names, "CSV header resolved");

    while reader
        .read_record(&mut record)
        .map_err(|e| map_csv_error(e, limit))?
    {
        last_start = record.position().cloned();
        push_record(&mut builder, &record)?;
    }

    // The parser closes a dangling quoted field at end of input without
    // complaint, swallowing every following line into it.
    if reader.get_ref().inside_quotes() {
        return Err(ProfilingError::parse_at(
            "unexpected end of file inside a quoted field",
            last_start.as_ref().map(location_of).unwrap_or_default(),
        ));
    }

    builder.finish(names)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` seen inside a quoted field: either the closing quote or the
    /// first half of an escaped pair.
    QuoteInQuoted,
}

/// Read adapter that follows field quoting as bytes pass to the parser.
struct QuoteTracker<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
    offset: u64,
}

impl<R> QuoteTracker<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
            offset: 0,
        }
    }

    /// True when the input so far ends inside an unterminated quoted field.
    fn inside_quotes(&self) -> bool {
        self.state == QuoteState::Quoted
    }

    fn advance(&mut self, byte: u8) {
        let leading_bom = self.offset < 3
            && self.state == QuoteState::FieldStart
            && byte == UTF8_BOM_BYTES[self.offset as usize];
        self.offset += 1;
        if leading_bom {
            return;
        }

        let ends_field = byte == self.delimiter || byte == b'\n' || byte == b'\r';
        self.state = match (self.state, byte) {
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, _) if ends_field => QuoteState::FieldStart,
            (_, _) => QuoteState::Unquoted,
        };
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            self.advance(byte);
        }
        Ok(n)
    }
}

fn push_record(builder: &mut ColumnBuilder<'_>, record: &StringRecord) -> Result<()> {
    let cells: Vec<_> = record.iter().map(|field| builder.text_cell(field)).collect();
    builder.push_row(cells)
}

fn location_of(position: &Position) -> ParseLocation {
    ParseLocation {
        line: Some(position.line()),
        record: Some(position.record()),
        byte_offset: Some(position.byte()),
        column: None,
    }
}

/// Translate a `csv` error into a [`ProfilingError`] that keeps its position.
fn map_csv_error(err: csv::Error, limit: u64) -> ProfilingError {
    let location = err.position().map(location_of).unwrap_or_default();

    match err.into_kind() {
        ErrorKind::Io(io_err) => map_io_error(io_err, limit),
        ErrorKind::Utf8 { err, .. } => ProfilingError::parse_at(
            format!("invalid UTF-8 in field {}: {}", err.field() + 1, err),
            location,
        ),
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => ProfilingError::parse_at(
            format!(
                "found record with {} fields, but the previous record has {} fields",
                len, expected_len
            ),
            location,
        ),
        other => ProfilingError::parse_at(format!("{:?}", other), location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;

    fn read(input: &str) -> Result<Table> {
        read_csv(input.as_bytes(), &ProfilingConfig::default())
    }

    #[test]
    fn test_basic_csv() {
        let table = read("name,age\nAlice,30\nBob,\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);

        let age = table.column("age").unwrap();
        assert_eq!(age.cells()[0], Cell::Value("30".to_string()));
        assert_eq!(age.cells()[1], Cell::Missing);
    }

    #[test]
    fn test_quoted_fields() {
        let table = read("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n").unwrap();
        let a = table.column("a").unwrap();
        let b = table.column("b").unwrap();
        assert_eq!(a.cells()[0], Cell::Value("x, y".to_string()));
        assert_eq!(b.cells()[0], Cell::Value("say \"hi\"".to_string()));
    }

    #[test]
    fn test_unclosed_quote_reports_record_start() {
        let err = read("a,b\n1,\"2\n3,4\n").unwrap_err();
        match err {
            ProfilingError::ParseError { message, location } => {
                assert!(message.contains("quoted field"), "message: {message}");
                assert_eq!(location.line, Some(2));
                assert_eq!(location.record, Some(1));
                assert_eq!(location.byte_offset, Some(4));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_closed_multiline_quote_is_accepted() {
        let table = read("a,b\n1,\"two\nlines \"\"quoted\"\"\"\n3,4\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("b").unwrap().cells()[0],
            Cell::Value("two\nlines \"quoted\"".to_string())
        );
    }

    #[test]
    fn test_quote_tracker_states() {
        let mut tracker = QuoteTracker::new(io::empty(), b',');
        for &byte in b"x\"y,\"a\"\"" {
            tracker.advance(byte);
        }
        assert!(tracker.inside_quotes());
        tracker.advance(b'"');
        assert!(!tracker.inside_quotes());

        let mut tracker = QuoteTracker::new(io::empty(), b';');
        for &byte in "\u{feff}\"id\";\"".as_bytes() {
            tracker.advance(byte);
        }
        assert!(tracker.inside_quotes());
    }

    #[test]
    fn test_missing_markers() {
        let table = read("v\nNA\nnull\n  \nN/A\nNathan\n").unwrap();
        let v = table.column("v").unwrap();
        assert_eq!(v.cells().iter().filter(|c| c.is_missing()).count(), 4);
        assert_eq!(v.cells()[4], Cell::Value("Nathan".to_string()));
    }

    #[test]
    fn test_ragged_row_reports_position() {
        let err = read("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        match err {
            ProfilingError::ParseError { message, location } => {
                assert!(message.contains("2 fields"), "message: {message}");
                assert_eq!(location.line, Some(3));
                assert_eq!(location.record, Some(2));
                assert_eq!(location.byte_offset, Some(12));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes = b"a,b\n1,\xff\xfe\n";
        let err = read_csv(&bytes[..], &ProfilingConfig::default()).unwrap_err();
        assert!(matches!(err, ProfilingError::ParseError { .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(read("a,b\n"), Err(ProfilingError::EmptyDataset)));
        assert!(matches!(read(""), Err(ProfilingError::EmptyDataset)));
    }

    #[test]
    fn test_bom_is_stripped() {
        let table = read("\u{feff}id,name\n1,x\n").unwrap();
        assert!(table.column("id").is_some());
    }

    #[test]
    fn test_no_header_generates_names() {
        let config = ProfilingConfig::builder().has_header(false).build().unwrap();
        let table = read_csv("1,2\n3,4\n".as_bytes(), &config).unwrap();
        assert_eq!(table.row_count(), 2);
        let names: Vec<_> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["column_1", "column_2"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let config = ProfilingConfig::builder().delimiter(b';').build().unwrap();
        let table = read_csv("a;b\n1,5;2\n".as_bytes(), &config).unwrap();
        assert_eq!(
            table.column("a").unwrap().cells()[0],
            Cell::Value("1,5".to_string())
        );
    }

    #[test]
    fn test_row_limit() {
        let config = ProfilingConfig::builder().max_rows(2).build().unwrap();
        assert!(read_csv("a\n1\n2\n".as_bytes(), &config).is_ok());

        let err = read_csv("a\n1\n2\n3\n".as_bytes(), &config).unwrap_err();
        assert!(matches!(err, ProfilingError::RowLimitExceeded { limit: 2 }));
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let table = read("x,,x\n1,2,3\n").unwrap();
        let names: Vec<_> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["x", "Unnamed: 1", "x.1"]);
    }
}
