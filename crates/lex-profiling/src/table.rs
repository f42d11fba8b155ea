//! In-memory columnar table produced by ingestion.
//!
//! A [`Table`] is an ordered list of [`Column`]s that all share the same row
//! count. Type inference consumes a `Table` and returns a [`TypedTable`], so a
//! column's [`SemanticType`] is assigned exactly once and cannot change
//! afterwards.

use crate::error::{ProfilingError, Result};
use crate::types::SemanticType;
use crate::utils::{parse_bool_token, parse_float_literal, parse_integer_literal};
use crate::config::BooleanVocabulary;
use polars::prelude::*;

/// A single cell of the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    /// A present value, kept as source text.
    Value(String),
    /// Empty cell or a configured missing marker.
    Missing,
    /// A value the source itself flagged as broken (e.g. `#DIV/0!`).
    Invalid(String),
}

impl Cell {
    /// Missing and invalid cells both count as missing.
    pub fn is_missing(&self) -> bool {
        !matches!(self, Cell::Value(_))
    }

    /// The present value, if any.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Cell::Value(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over present values, trimmed.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().filter_map(Cell::as_value).map(str::trim)
    }
}

/// Untyped table as produced by ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Assemble a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(ProfilingError::InternalError(format!(
                "column '{}' has {} cells, expected {}",
                bad.name(),
                bad.len(),
                row_count
            )));
        }
        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

/// A column together with its inferred semantic type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    column: Column,
    semantic_type: SemanticType,
}

impl TypedColumn {
    pub(crate) fn new(column: Column, semantic_type: SemanticType) -> Self {
        Self {
            column,
            semantic_type,
        }
    }

    pub fn name(&self) -> &str {
        self.column.name()
    }

    pub fn cells(&self) -> &[Cell] {
        self.column.cells()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.column.values()
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }
}

/// Table whose columns carry an inferred [`SemanticType`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTable {
    columns: Vec<TypedColumn>,
    row_count: usize,
}

impl TypedTable {
    pub(crate) fn new(columns: Vec<TypedColumn>, row_count: usize) -> Self {
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[TypedColumn] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Convert into a polars [`DataFrame`].
    ///
    /// Integer, Float and Boolean columns become `Int64`, `Float64` and
    /// `Boolean` series; everything else stays as `String`. Missing and invalid
    /// cells become nulls.
    pub fn to_dataframe(&self, vocabulary: &BooleanVocabulary) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|column| column_to_series(column, vocabulary).into_column())
            .collect::<Vec<_>>();

        DataFrame::new(columns).map_err(|e| ProfilingError::InternalError(e.to_string()))
    }
}

fn column_to_series(column: &TypedColumn, vocabulary: &BooleanVocabulary) -> Series {
    fn present(cell: &Cell) -> Option<&str> {
        cell.as_value().map(str::trim)
    }

    let name: PlSmallStr = column.name().into();

    match column.semantic_type() {
        SemanticType::Integer => {
            let values: Vec<Option<i64>> = column
                .cells()
                .iter()
                .map(|c| present(c).and_then(parse_integer_literal))
                .collect();
            Series::new(name, values)
        }
        SemanticType::Float => {
            let values: Vec<Option<f64>> = column
                .cells()
                .iter()
                .map(|c| present(c).and_then(parse_float_literal))
                .collect();
            Series::new(name, values)
        }
        SemanticType::Boolean => {
            let values: Vec<Option<bool>> = column
                .cells()
                .iter()
                .map(|c| present(c).and_then(|v| parse_bool_token(v, vocabulary)))
                .collect();
            Series::new(name, values)
        }
        SemanticType::DateTime | SemanticType::Categorical => {
            let values: Vec<Option<&str>> = column.cells().iter().map(present).collect();
            Series::new(name, values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> Cell {
        Cell::Value(text.to_string())
    }

    #[test]
    fn test_cell_missingness() {
        assert!(!value("x").is_missing());
        assert!(Cell::Missing.is_missing());
        assert!(Cell::Invalid("#DIV/0!".to_string()).is_missing());
    }

    #[test]
    fn test_cell_variants_are_distinct() {
        assert_ne!(Cell::Missing, Cell::Invalid(String::new()));
        assert_ne!(value("#REF!"), Cell::Invalid("#REF!".to_string()));
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::new("a", vec![value("1"), value("2")]),
            Column::new("b", vec![value("1")]),
        ]);
        assert!(matches!(result, Err(ProfilingError::InternalError(_))));
    }

    #[test]
    fn test_table_dimensions() {
        let table = Table::new(vec![
            Column::new("a", vec![value("1"), Cell::Missing]),
            Column::new("b", vec![value("x"), value("y")]),
        ])
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column("b").unwrap().values().count(), 2);
        assert_eq!(table.column("a").unwrap().values().count(), 1);
    }

    #[test]
    fn test_to_dataframe_types() {
        let table = TypedTable::new(
            vec![
                TypedColumn::new(
                    Column::new("id", vec![value("1"), Cell::Missing]),
                    SemanticType::Integer,
                ),
                TypedColumn::new(
                    Column::new("score", vec![value(" 1.5 "), value("2")]),
                    SemanticType::Float,
                ),
                TypedColumn::new(
                    Column::new("flag", vec![value("yes"), value("N")]),
                    SemanticType::Boolean,
                ),
                TypedColumn::new(
                    Column::new("city", vec![value("Oslo"), Cell::Invalid("#N/A".into())]),
                    SemanticType::Categorical,
                ),
            ],
            2,
        );

        let df = table.to_dataframe(&BooleanVocabulary::default()).unwrap();
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("city").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("id").unwrap().null_count(), 1);
        assert_eq!(df.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_to_dataframe_trims_text_columns() {
        let table = TypedTable::new(
            vec![
                TypedColumn::new(
                    Column::new("when", vec![value(" 2024-01-05 "), Cell::Missing]),
                    SemanticType::DateTime,
                ),
                TypedColumn::new(
                    Column::new("city", vec![value("\tOslo"), value("Bergen ")]),
                    SemanticType::Categorical,
                ),
            ],
            2,
        );

        let df = table.to_dataframe(&BooleanVocabulary::default()).unwrap();
        let when: Vec<_> = df.column("when").unwrap().str().unwrap().into_iter().collect();
        let city: Vec<_> = df.column("city").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(when, vec![Some("2024-01-05"), None]);
        assert_eq!(city, vec![Some("Oslo"), Some("Bergen")]);
    }
}
