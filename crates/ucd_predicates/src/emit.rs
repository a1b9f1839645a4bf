//! Renders compiled predicates as source code.

pub mod cpp;
pub mod rust;
pub mod wrap;

use crate::sparse_set::SparseSet;

/// `// N code units from M ranges (spanning a search area of K)`
pub fn summary(set: &SparseSet) -> String {
    let width = match set.bounds() {
        Some((first, last)) => u64::from(last - first) + 1,
        None => 0,
    };
    format!(
        "// {} code units from {} ranges (spanning a search area of {})",
        set.len(),
        set.sparse_value_count() + set.contiguous_subrange_count(),
        width
    )
}

/// Name of the child index variable of a dispatch at `level`.
pub fn selector_name(level: u32) -> String {
    format!("child_index_{}", level)
}

/// Name of the bitmask table of a node at `level`.
pub fn table_name(level: u32) -> String {
    format!("bitmask_table_{}", level)
}
