//! Memory footprint estimation.

use crate::table::{Cell, TypedColumn};
use crate::types::{MemoryPolicy, SemanticType};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Estimated bytes held by one column under `policy`.
pub fn column_bytes(column: &TypedColumn, policy: &MemoryPolicy) -> u64 {
    let cells = column.cells();
    match column.semantic_type() {
        SemanticType::Integer | SemanticType::Float | SemanticType::DateTime => {
            (cells.len() * policy.fixed_width_bytes) as u64
        }
        SemanticType::Boolean => (cells.len() * policy.boolean_bytes) as u64,
        SemanticType::Categorical => cells
            .iter()
            .map(|cell| {
                let object = match cell {
                    Cell::Value(text) => policy.text_object_overhead_bytes + text.len(),
                    Cell::Missing | Cell::Invalid(_) => 0,
                };
                (object + policy.text_reference_bytes) as u64
            })
            .sum(),
    }
}

pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}
