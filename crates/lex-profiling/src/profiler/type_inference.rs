//! Type inference logic for column analysis.

use crate::config::ProfilingConfig;
use crate::table::{Column, Table, TypedColumn, TypedTable};
use crate::types::SemanticType;
use crate::utils::{is_datetime_literal, parse_float_literal, parse_integer_literal};
use tracing::{debug, info};

/// Assigns a [`SemanticType`] to every column by scanning all present values.
///
/// Checks run in a fixed order (integer, float, boolean, date/time) and the
/// first type that accepts every value wins. A column without any present
/// value is categorical.
#[derive(Debug, Clone, Copy)]
pub struct TypeInferencer<'a> {
    config: &'a ProfilingConfig,
}

impl<'a> TypeInferencer<'a> {
    pub fn new(config: &'a ProfilingConfig) -> Self {
        Self { config }
    }

    /// Consume a table and return it with every column typed.
    pub fn infer(&self, table: Table) -> TypedTable {
        let row_count = table.row_count();
        let columns: Vec<TypedColumn> = table
            .into_columns()
            .into_iter()
            .map(|column| {
                let semantic_type = self.infer_column(&column);
                debug!(column = column.name(), semantic_type = %semantic_type, "Inferred column type");
                TypedColumn::new(column, semantic_type)
            })
            .collect();

        info!(columns = columns.len(), "Type inference complete");
        TypedTable::new(columns, row_count)
    }

    /// Infer the semantic type of a single column.
    pub fn infer_column(&self, column: &Column) -> SemanticType {
        let mut candidates = Candidates::all();
        let mut present = 0usize;

        for value in column.values() {
            present += 1;
            candidates.narrow(value, self.config);
            if candidates.is_exhausted() {
                return SemanticType::Categorical;
            }
        }

        if present == 0 {
            return SemanticType::Categorical;
        }
        candidates.resolve()
    }
}

/// Types still consistent with every value seen so far.
#[derive(Debug, Clone, Copy)]
struct Candidates {
    integer: bool,
    float: bool,
    boolean: bool,
    datetime: bool,
}

impl Candidates {
    fn all() -> Self {
        Self {
            integer: true,
            float: true,
            boolean: true,
            datetime: true,
        }
    }

    fn narrow(&mut self, value: &str, config: &ProfilingConfig) {
        if self.integer && parse_integer_literal(value).is_none() {
            self.integer = false;
        }
        if self.float && parse_float_literal(value).is_none() {
            self.float = false;
        }
        if self.boolean && !config.boolean_vocabulary.contains(value) {
            self.boolean = false;
        }
        if self.datetime && !is_datetime_literal(value, &config.datetime_formats) {
            self.datetime = false;
        }
    }

    fn is_exhausted(&self) -> bool {
        !(self.integer || self.float || self.boolean || self.datetime)
    }

    fn resolve(&self) -> SemanticType {
        if self.integer {
            SemanticType::Integer
        } else if self.float {
            SemanticType::Float
        } else if self.boolean {
            SemanticType::Boolean
        } else if self.datetime {
            SemanticType::DateTime
        } else {
            SemanticType::Categorical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn column(values: &[&str]) -> Column {
        let cells = values
            .iter()
            .map(|v| match *v {
                "" => Cell::Missing,
                "#ERR" => Cell::Invalid("#DIV/0!".to_string()),
                other => Cell::Value(other.to_string()),
            })
            .collect();
        Column::new("c", cells)
    }

    fn infer(values: &[&str]) -> SemanticType {
        let config = ProfilingConfig::default();
        TypeInferencer::new(&config).infer_column(&column(values))
    }

    #[test]
    fn test_integer() {
        assert_eq!(infer(&["1", "-2", " 30 ", ""]), SemanticType::Integer);
    }

    #[test]
    fn test_zero_one_is_integer_before_boolean() {
        assert_eq!(infer(&["0", "1", "1"]), SemanticType::Integer);
    }

    #[test]
    fn test_float() {
        assert_eq!(infer(&["1", "2.5", "1e3"]), SemanticType::Float);
    }

    #[test]
    fn test_non_numeric_words_are_not_float() {
        assert_eq!(infer(&["inf", "nan"]), SemanticType::Categorical);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(infer(&["yes", "No", "TRUE", "f"]), SemanticType::Boolean);
    }

    #[test]
    fn test_datetime() {
        assert_eq!(
            infer(&["2024-01-01", "2024-02-15", "2024-03-31 12:00:00"]),
            SemanticType::DateTime
        );
    }

    #[test]
    fn test_mixed_is_categorical() {
        assert_eq!(infer(&["1", "two", "3"]), SemanticType::Categorical);
        assert_eq!(infer(&["2024-01-01", "soon"]), SemanticType::Categorical);
    }

    #[test]
    fn test_all_missing_is_categorical() {
        assert_eq!(infer(&["", "", "#ERR"]), SemanticType::Categorical);
    }

    #[test]
    fn test_invalid_cells_are_skipped() {
        assert_eq!(infer(&["1", "#ERR", "2"]), SemanticType::Integer);
    }

    #[test]
    fn test_custom_boolean_vocabulary() {
        let config = ProfilingConfig::builder()
            .boolean_vocabulary(crate::config::BooleanVocabulary {
                truthy: vec!["oui".to_string()],
                falsy: vec!["non".to_string()],
            })
            .build()
            .unwrap();
        let inferred = TypeInferencer::new(&config).infer_column(&column(&["oui", "non"]));
        assert_eq!(inferred, SemanticType::Boolean);
    }

    #[test]
    fn test_infer_table_keeps_order() {
        let config = ProfilingConfig::default();
        let table = Table::new(vec![
            Column::new("b", vec![Cell::Value("x".into())]),
            Column::new("a", vec![Cell::Value("1".into())]),
        ])
        .unwrap();

        let typed = TypeInferencer::new(&config).infer(table);
        let names: Vec<_> = typed.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(typed.columns()[1].semantic_type(), SemanticType::Integer);
        assert_eq!(typed.row_count(), 1);
    }
}
