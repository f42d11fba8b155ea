//! Table ingestion for CSV and spreadsheet uploads.
//!
//! [`TableIngester`] turns raw bytes (or any [`Read`]er) into a [`Table`].
//! Format and size are checked before any parsing happens; CSV is streamed
//! record by record, spreadsheets are decoded from an in-memory buffer.

mod delimited;
mod spreadsheet;

use crate::config::ProfilingConfig;
use crate::error::{ProfilingError, Result};
use crate::table::{Cell, Column, Table};
use std::collections::HashSet;
use std::fmt;
use std::io::{self, Read};
use tracing::{debug, info, warn};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Resolve a format from an extension (`csv`, `.XLSX`) or a filename
    /// (`sales.csv`). Matching is case-insensitive.
    pub fn from_extension(declared: &str) -> Result<Self> {
        let declared = declared.trim();
        let extension = declared
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(declared)
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(ProfilingError::UnsupportedFormat { extension }),
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        })
    }
}

/// Parses uploads into [`Table`]s under the limits of a [`ProfilingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct TableIngester<'a> {
    config: &'a ProfilingConfig,
}

impl<'a> TableIngester<'a> {
    pub fn new(config: &'a ProfilingConfig) -> Self {
        Self { config }
    }

    /// Ingest an in-memory upload.
    pub fn ingest_bytes(&self, bytes: &[u8], extension: &str) -> Result<Table> {
        let format = FileFormat::from_extension(extension)?;
        self.check_declared_size(bytes.len() as u64)?;

        info!(format = %format, bytes = bytes.len(), "Ingesting upload");
        let table = match format {
            FileFormat::Csv => delimited::read_csv(bytes, self.config)?,
            FileFormat::Xlsx | FileFormat::Xls => spreadsheet::read_spreadsheet(bytes, self.config)?,
        };
        self.log_table(&table);
        Ok(table)
    }

    /// Ingest from a reader.
    ///
    /// When `declared_len` is known the size limit is enforced before reading.
    /// Otherwise the reader is wrapped so that reading fails with
    /// [`ProfilingError::FileTooLarge`] as soon as the limit is crossed.
    pub fn ingest_reader<R: Read>(
        &self,
        reader: R,
        extension: &str,
        declared_len: Option<u64>,
    ) -> Result<Table> {
        let format = FileFormat::from_extension(extension)?;
        if let Some(len) = declared_len {
            self.check_declared_size(len)?;
        }

        let limit = self.config.max_upload_bytes;
        let limited = LimitedReader::new(reader, limit);

        info!(format = %format, declared_len = ?declared_len, "Ingesting stream");
        let table = match format {
            FileFormat::Csv => delimited::read_csv(limited, self.config)?,
            FileFormat::Xlsx | FileFormat::Xls => {
                let mut buffer = Vec::new();
                let mut limited = limited;
                limited
                    .read_to_end(&mut buffer)
                    .map_err(|e| map_io_error(e, limit))?;
                spreadsheet::read_spreadsheet(&buffer, self.config)?
            }
        };
        self.log_table(&table);
        Ok(table)
    }

    fn check_declared_size(&self, size: u64) -> Result<()> {
        let limit = self.config.max_upload_bytes;
        if size > limit {
            warn!(size, limit, "Rejecting upload above the size limit");
            return Err(ProfilingError::FileTooLarge { size, limit });
        }
        Ok(())
    }

    fn log_table(&self, table: &Table) {
        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "Ingestion complete"
        );
    }
}

// =============================================================================
// Size-limited reading
// =============================================================================

/// Marker error carried inside an [`io::Error`] when the byte limit is hit.
#[derive(Debug, thiserror::Error)]
#[error("input exceeds {limit} bytes")]
struct SizeLimitExceeded {
    read: u64,
    limit: u64,
}

/// Reader adapter that fails once more than `limit` bytes have been read.
struct LimitedReader<R> {
    inner: R,
    read: u64,
    limit: u64,
}

impl<R> LimitedReader<R> {
    fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            read: 0,
            limit,
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if self.read > self.limit {
            return Err(io::Error::other(SizeLimitExceeded {
                read: self.read,
                limit: self.limit,
            }));
        }
        Ok(n)
    }
}

/// Translate an I/O error, recognising the size-limit marker.
pub(crate) fn map_io_error(err: io::Error, limit: u64) -> ProfilingError {
    match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<SizeLimitExceeded>())
    {
        Some(exceeded) => {
            warn!(read = exceeded.read, limit, "Upload stream crossed the size limit");
            ProfilingError::FileTooLarge {
                size: exceeded.read,
                limit: exceeded.limit,
            }
        }
        None => ProfilingError::Io(err),
    }
}

// =============================================================================
// Shared table assembly
// =============================================================================

/// Turn raw header cells into unique column names.
///
/// Blank names become `Unnamed: {index}`; repeated names get `.1`, `.2`, ...
/// suffixes in order of appearance.
pub(crate) fn normalise_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut names = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            debug!(original = %base, renamed = %name, "Renamed duplicate header");
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

/// Positional names used when the input has no header row.
pub(crate) fn generated_headers(width: usize) -> Vec<String> {
    (1..=width).map(|n| format!("column_{}", n)).collect()
}

/// Accumulates cells column by column while rows are read.
pub(crate) struct ColumnBuilder<'a> {
    config: &'a ProfilingConfig,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl<'a> ColumnBuilder<'a> {
    pub(crate) fn new(config: &'a ProfilingConfig, width: usize) -> Self {
        Self {
            config,
            columns: (0..width).map(|_| Vec::new()).collect(),
            rows: 0,
        }
    }

    /// Check the row limit before accepting one more data row.
    pub(crate) fn reserve_row(&self) -> Result<()> {
        if self.rows >= self.config.max_rows {
            warn!(limit = self.config.max_rows, "Rejecting upload above the row limit");
            return Err(ProfilingError::RowLimitExceeded {
                limit: self.config.max_rows,
            });
        }
        Ok(())
    }

    /// Append one row of cells; rows shorter than the table are padded with
    /// missing cells.
    pub(crate) fn push_row<I>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = Cell>,
    {
        self.reserve_row()?;
        let mut cells = cells.into_iter();
        for column in self.columns.iter_mut() {
            column.push(cells.next().unwrap_or(Cell::Missing));
        }
        self.rows += 1;
        Ok(())
    }

    /// Classify a raw text cell.
    pub(crate) fn text_cell(&self, raw: &str) -> Cell {
        if self.config.is_missing_marker(raw) {
            Cell::Missing
        } else {
            Cell::Value(raw.to_string())
        }
    }

    /// Finish into a table; zero data rows is an [`ProfilingError::EmptyDataset`].
    pub(crate) fn finish(self, names: Vec<String>) -> Result<Table> {
        if self.rows == 0 {
            warn!("Rejecting upload without data rows");
            return Err(ProfilingError::EmptyDataset);
        }
        if names.len() != self.columns.len() {
            return Err(ProfilingError::InternalError(format!(
                "{} header names for {} columns",
                names.len(),
                self.columns.len()
            )));
        }

        let columns = names
            .into_iter()
            .zip(self.columns)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Table::new(columns)
    }
}
