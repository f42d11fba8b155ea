//! Dataset profiling.
//!
//! This module provides:
//! - [`TypeInferencer`]: semantic type per column
//! - [`ProfileAnalyzer`]: the [`Insights`] aggregate plus per-column detail
//! - Duplicate-row detection and memory estimation helpers

mod duplicates;
mod memory;
mod statistics;
mod type_inference;

pub use duplicates::count_duplicate_rows;
pub use memory::{bytes_to_mib, column_bytes};
pub use type_inference::TypeInferencer;

use crate::config::ProfilingConfig;
use crate::error::{ProfilingError, Result};
use crate::table::TypedTable;
use crate::types::{ColumnProfile, Insights, MemoryPolicy, MissingInfo};
use indexmap::IndexMap;
use statistics::{percentage, profile_column};
use tracing::{debug, info};

/// Output of [`ProfileAnalyzer::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile {
    pub insights: Insights,
    /// One entry per column, in source order.
    pub columns: Vec<ColumnProfile>,
}

/// Computes dataset statistics from a typed table.
#[derive(Debug, Clone, Copy)]
pub struct ProfileAnalyzer<'a> {
    config: &'a ProfilingConfig,
    policy: MemoryPolicy,
}

impl<'a> ProfileAnalyzer<'a> {
    pub fn new(config: &'a ProfilingConfig) -> Self {
        Self {
            config,
            policy: MemoryPolicy::default(),
        }
    }

    /// Override the per-cell byte widths used for the memory estimate.
    pub fn with_memory_policy(mut self, policy: MemoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Profile the whole table.
    ///
    /// Fails with [`ProfilingError::InternalError`] if the table violates its
    /// own invariants; nothing is silently corrected.
    pub fn analyze(&self, table: &TypedTable) -> Result<DatasetProfile> {
        let row_count = table.row_count();
        let mut missing_data = IndexMap::new();
        let mut data_types = IndexMap::new();
        let mut columns = Vec::with_capacity(table.column_count());
        let mut missing_cells = 0usize;
        let mut memory_bytes = 0u64;

        for column in table.columns() {
            if column.cells().len() != row_count {
                return Err(ProfilingError::InternalError(format!(
                    "column '{}' has {} cells but the table has {} rows",
                    column.name(),
                    column.cells().len(),
                    row_count
                )));
            }

            let profile = profile_column(column, row_count, self.config);
            if profile.missing_count > row_count {
                return Err(ProfilingError::InternalError(format!(
                    "column '{}' reports {} missing cells out of {} rows",
                    profile.name, profile.missing_count, row_count
                )));
            }

            debug!(
                column = %profile.name,
                semantic_type = %profile.semantic_type,
                missing = profile.missing_count,
                distinct = profile.distinct_count,
                "Profiled column"
            );

            if profile.missing_count > 0 {
                missing_data.insert(
                    profile.name.clone(),
                    MissingInfo {
                        count: profile.missing_count,
                        percentage: profile.missing_percentage,
                    },
                );
            }
            data_types.insert(profile.name.clone(), profile.semantic_type);
            missing_cells += profile.missing_count;
            memory_bytes += column_bytes(column, &self.policy);
            columns.push(profile);
        }

        let duplicates = count_duplicate_rows(table);
        if duplicates > row_count {
            return Err(ProfilingError::InternalError(format!(
                "{} duplicate rows reported for {} rows",
                duplicates, row_count
            )));
        }

        let total_cells = row_count * table.column_count();
        let completeness = if total_cells == 0 {
            100.0
        } else {
            100.0 - percentage(missing_cells, total_cells)
        };

        let insights = Insights {
            row_count,
            column_count: table.column_count(),
            missing_data,
            data_types,
            duplicates,
            memory_usage: bytes_to_mib(memory_bytes),
            memory_policy: self.policy,
            completeness,
        };

        info!(
            rows = insights.row_count,
            columns = insights.column_count,
            duplicates = insights.duplicates,
            memory_mb = insights.memory_usage,
            completeness = insights.completeness,
            "Profiling complete"
        );

        Ok(DatasetProfile { insights, columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column, Table};
    use crate::types::SemanticType;
    use pretty_assertions::assert_eq;

    fn typed_table(columns: Vec<(&str, Vec<&str>)>) -> TypedTable {
        let config = ProfilingConfig::default();
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let cells = values
                    .into_iter()
                    .map(|v| {
                        if v.is_empty() {
                            Cell::Missing
                        } else {
                            Cell::Value(v.to_string())
                        }
                    })
                    .collect();
                Column::new(name, cells)
            })
            .collect();
        TypeInferencer::new(&config).infer(Table::new(columns).unwrap())
    }

    #[test]
    fn test_counts_and_types() {
        let config = ProfilingConfig::default();
        let table = typed_table(vec![
            ("id", vec!["1", "2", "3", "4"]),
            ("name", vec!["a", "", "c", ""]),
        ]);

        let profile = ProfileAnalyzer::new(&config).analyze(&table).unwrap();
        let insights = &profile.insights;

        assert_eq!(insights.row_count, 4);
        assert_eq!(insights.column_count, 2);
        assert_eq!(insights.data_types.get("id"), Some(&SemanticType::Integer));
        assert_eq!(insights.data_types.get("name"), Some(&SemanticType::Categorical));
        assert!(!insights.missing_data.contains_key("id"));
        assert_eq!(
            insights.missing_data.get("name"),
            Some(&MissingInfo {
                count: 2,
                percentage: 50.0
            })
        );
        assert_eq!(insights.completeness, 75.0);
        assert_eq!(profile.columns.len(), 2);
    }

    #[test]
    fn test_data_types_keep_column_order() {
        let config = ProfilingConfig::default();
        let table = typed_table(vec![("z", vec!["1"]), ("a", vec!["x"]), ("m", vec!["1.5"])]);
        let profile = ProfileAnalyzer::new(&config).analyze(&table).unwrap();

        let keys: Vec<_> = profile.insights.data_types.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicates_and_memory() {
        let config = ProfilingConfig::default();
        let table = typed_table(vec![("n", vec!["1", "1", "2"]), ("s", vec!["ab", "ab", ""])]);
        let profile = ProfileAnalyzer::new(&config).analyze(&table).unwrap();

        assert_eq!(profile.insights.duplicates, 1);
        // integer: 3 * 8; text: 2 * (49 + 2 + 8) + 8
        let expected = (24 + 2 * 59 + 8) as f64 / 1024.0 / 1024.0;
        assert_eq!(profile.insights.memory_usage, expected);
        assert_eq!(profile.insights.memory_policy, MemoryPolicy::default());
    }

    #[test]
    fn test_custom_memory_policy() {
        let config = ProfilingConfig::default();
        let table = typed_table(vec![("n", vec!["1", "2"])]);
        let policy = MemoryPolicy {
            fixed_width_bytes: 4,
            ..MemoryPolicy::default()
        };
        let profile = ProfileAnalyzer::new(&config)
            .with_memory_policy(policy)
            .analyze(&table)
            .unwrap();
        assert_eq!(profile.insights.memory_usage, bytes_to_mib(8));
        assert_eq!(profile.insights.memory_policy.fixed_width_bytes, 4);
    }

    #[test]
    fn test_missing_percentage_bounds() {
        let config = ProfilingConfig::default();
        let table = typed_table(vec![("all", vec!["", "", ""]), ("none", vec!["a", "b", "c"])]);
        let profile = ProfileAnalyzer::new(&config).analyze(&table).unwrap();

        for (_, info) in profile.insights.missing_data.iter() {
            assert!(info.count <= profile.insights.row_count);
            assert!(info.percentage > 0.0 && info.percentage <= 100.0);
        }
        assert_eq!(profile.insights.missing_data.get("all").unwrap().percentage, 100.0);
        assert_eq!(profile.insights.missing_data.len(), 1);
    }
}
