//! Exact duplicate-row detection.
//!
//! Rows are bucketed by a 64-bit hash of their full cell tuple. A hash hit is
//! confirmed by comparing the row against each distinct representative in
//! the bucket cell by cell, so a collision can never be counted as a
//! duplicate.

use crate::table::{Cell, TypedTable};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Count rows whose full ordered tuple equals an earlier row.
///
/// `k` identical rows contribute `k - 1`.
pub fn count_duplicate_rows(table: &TypedTable) -> usize {
    let columns: Vec<&[Cell]> = table.columns().iter().map(|c| c.cells()).collect();
    let row_count = table.row_count();

    // hash -> indices of the first occurrence of each distinct row
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut duplicates = 0;

    for row in 0..row_count {
        let hash = row_hash(&columns, row);
        let representatives = buckets.entry(hash).or_default();

        if representatives
            .iter()
            .any(|&other| rows_equal(&columns, row, other))
        {
            duplicates += 1;
        } else {
            representatives.push(row);
        }
    }

    duplicates
}

fn row_hash(columns: &[&[Cell]], row: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    for column in columns {
        column[row].hash(&mut hasher);
    }
    hasher.finish()
}

fn rows_equal(columns: &[&[Cell]], a: usize, b: usize) -> bool {
    columns.iter().all(|column| column[a] == column[b])
}
