//! Row filtering by id or displayed name

use crate::resolve::NameResolution;
use crate::table::{Table, ID_COLUMN, NAME_COLUMN};

/// Indices of rows whose id or displayed name contains `query`,
/// ignoring case. An empty query matches every row.
pub fn search_rows(table: &Table, resolution: &NameResolution, query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return (0..table.row_count()).collect();
    }

    (0..table.row_count())
        .filter(|&row| {
            [ID_COLUMN, NAME_COLUMN].iter().any(|&col| {
                resolution
                    .display_cell(table, row, col)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}
