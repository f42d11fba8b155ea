//! Per-column statistics used by the recommendation rules.

use crate::config::ProfilingConfig;
use crate::table::TypedColumn;
use crate::types::{ColumnProfile, NumericRange, SemanticType};
use crate::utils::{is_datetime_literal, parse_float_literal, parse_formatted_number};
use std::collections::HashSet;

/// Build the [`ColumnProfile`] of one typed column.
pub(crate) fn profile_column(
    column: &TypedColumn,
    row_count: usize,
    config: &ProfilingConfig,
) -> ColumnProfile {
    let missing_count = column.cells().iter().filter(|c| c.is_missing()).count();
    let distinct: HashSet<&str> = column.values().collect();
    let semantic_type = column.semantic_type();

    let numeric_range = if semantic_type.is_numeric() {
        numeric_range(column)
    } else {
        None
    };

    let (formatted_numeric, date_like_sample) = if semantic_type == SemanticType::Categorical {
        (
            is_formatted_numeric(column),
            has_date_like_sample(column, config),
        )
    } else {
        (false, false)
    };

    ColumnProfile {
        name: column.name().to_string(),
        semantic_type,
        missing_count,
        missing_percentage: percentage(missing_count, row_count),
        distinct_count: distinct.len(),
        numeric_range,
        formatted_numeric,
        date_like_sample,
    }
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

fn numeric_range(column: &TypedColumn) -> Option<NumericRange> {
    column
        .values()
        .filter_map(parse_float_literal)
        .fold(None, |range, v| match range {
            None => Some(NumericRange { min: v, max: v }),
            Some(NumericRange { min, max }) => Some(NumericRange {
                min: min.min(v),
                max: max.max(v),
            }),
        })
}

/// Every present value is a number once currency, percent and thousands
/// formatting is removed.
fn is_formatted_numeric(column: &TypedColumn) -> bool {
    let mut values = column.values().peekable();
    values.peek().is_some() && values.all(|v| parse_formatted_number(v).is_some())
}

/// The leading `date_sample_size` present values all parse as dates.
fn has_date_like_sample(column: &TypedColumn, config: &ProfilingConfig) -> bool {
    if config.date_sample_size == 0 {
        return false;
    }
    let mut sample = column.values().take(config.date_sample_size).peekable();
    sample.peek().is_some() && sample.all(|v| is_datetime_literal(v, &config.datetime_formats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column};

    fn typed(semantic_type: SemanticType, values: &[&str]) -> TypedColumn {
        let cells = values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Value(v.to_string())
                }
            })
            .collect();
        TypedColumn::new(Column::new("col", cells), semantic_type)
    }

    #[test]
    fn test_missing_and_distinct() {
        let config = ProfilingConfig::default();
        let column = typed(SemanticType::Categorical, &["a", "b", "", "a", " b "]);
        let profile = profile_column(&column, 5, &config);

        assert_eq!(profile.missing_count, 1);
        assert_eq!(profile.missing_percentage, 20.0);
        assert_eq!(profile.distinct_count, 2);
    }

    #[test]
    fn test_numeric_range() {
        let config = ProfilingConfig::default();
        let column = typed(SemanticType::Float, &["1.5", "-2", "", "10"]);
        let profile = profile_column(&column, 4, &config);

        assert_eq!(
            profile.numeric_range,
            Some(NumericRange {
                min: -2.0,
                max: 10.0
            })
        );
    }

    #[test]
    fn test_formatted_numeric() {
        let config = ProfilingConfig::default();
        let prices = typed(SemanticType::Categorical, &["$1,200", "$35.50", ""]);
        assert!(profile_column(&prices, 3, &config).formatted_numeric);

        let words = typed(SemanticType::Categorical, &["$1,200", "call us"]);
        assert!(!profile_column(&words, 2, &config).formatted_numeric);
    }

    #[test]
    fn test_date_like_sample_uses_leading_values() {
        let config = ProfilingConfig::builder().date_sample_size(2).build().unwrap();
        let column = typed(
            SemanticType::Categorical,
            &["2024-01-01", "", "2024-01-02", "not a date"],
        );
        assert!(profile_column(&column, 4, &config).date_like_sample);

        let column = typed(SemanticType::Categorical, &["not a date", "2024-01-02"]);
        assert!(!profile_column(&column, 2, &config).date_like_sample);
    }

    #[test]
    fn test_flags_only_for_text_columns() {
        let config = ProfilingConfig::default();
        let column = typed(SemanticType::Integer, &["1", "2"]);
        let profile = profile_column(&column, 2, &config);
        assert!(!profile.formatted_numeric);
        assert!(!profile.date_like_sample);
    }
}
