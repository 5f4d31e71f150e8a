use serde::{Deserialize, Serialize};

use crate::model::Dataset;

/// Keep rows whose `column` value is one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub values: Vec<String>,
}

impl RowFilter {
    /// Parse `COLUMN=V1,V2` as used on the command line.
    pub fn parse(expr: &str) -> Option<Self> {
        let (column, values) = expr.split_once('=')?;
        let column = column.trim();
        if column.is_empty() {
            return None;
        }
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self { column: column.to_string(), values })
    }
}

/// Indices of rows passing every filter.
///
/// Filters naming an absent column, or with no values selected, do not
/// restrict anything.
pub fn filter_rows(dataset: &Dataset, filters: &[RowFilter]) -> Vec<usize> {
    let active: Vec<(usize, &RowFilter)> = filters
        .iter()
        .filter(|f| !f.values.is_empty())
        .filter_map(|f| match dataset.column_index(&f.column) {
            Some(idx) => Some((idx, f)),
            None => {
                log::debug!("filter on absent column \"{}\" ignored", f.column);
                None
            }
        })
        .collect();

    (0..dataset.row_count())
        .filter(|&row| {
            active.iter().all(|(col, f)| {
                let value = dataset.cell(row, *col).map(|c| c.display()).unwrap_or_default();
                f.values.iter().any(|v| *v == value)
            })
        })
        .collect()
}
