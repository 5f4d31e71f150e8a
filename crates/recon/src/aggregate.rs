use std::collections::HashMap;

use crate::model::{
    AnnotatedRow, Cell, Dataset, GroupBreakdown, GroupTotals, Totals, VarianceEntry,
    VarianceRanking,
};
use crate::error::ReconError;

/// `part / whole * 100`, defined as 0 when `whole` is 0.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole != 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Sum quantities over annotated rows.
///
/// Uncounted rows add nothing to `counted_total` but add their zero
/// difference to `difference_total`.
pub fn totals<'a>(rows: impl IntoIterator<Item = &'a AnnotatedRow>) -> Totals {
    let mut t = Totals::default();
    for row in rows {
        t.rows += 1;
        t.system_total += row.system;
        if let Some(counted) = row.counted.value() {
            t.counted_total += counted;
            t.counted_rows += 1;
        }
        t.difference_total += row.difference;
    }
    t.percent_complete = percent_of(t.counted_total, t.system_total);
    t.percent_variance = percent_of(t.difference_total, t.system_total);
    t
}

/// Identity of a group. A number and a text cell that print the same are
/// still different groups.
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Number(u64),
    Text(String),
    Bool(bool),
}

impl GroupKey {
    fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            // +0.0 folds -0.0 into 0.0
            Cell::Number(n) => Some(Self::Number((n + 0.0).to_bits())),
            Cell::Text(s) => Some(Self::Text(s.clone())),
            Cell::Bool(b) => Some(Self::Bool(*b)),
        }
    }
}

/// Partition rows by the typed value of `column`, in first-encountered
/// order, labelling each group with the cell's display form. Rows whose key
/// cell is empty belong to no group.
fn group_rows<'a>(
    dataset: &Dataset,
    rows: &'a [AnnotatedRow],
    column: &str,
) -> Result<Vec<(String, Vec<&'a AnnotatedRow>)>, ReconError> {
    let key_column = dataset.require_column(column)?;
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&AnnotatedRow>)> = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        let cell = key_column.cells.get(row.index).ok_or(ReconError::RowOutOfRange {
            index: row.index,
            rows: dataset.row_count(),
        })?;
        let Some(key) = GroupKey::of(cell) else {
            skipped += 1;
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((cell.display(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    if skipped > 0 {
        log::debug!("group by \"{column}\": {skipped} row(s) with empty key left out");
    }
    Ok(groups)
}

/// Per-group totals, each with its own percent complete.
pub fn group_totals(
    dataset: &Dataset,
    rows: &[AnnotatedRow],
    column: &str,
) -> Result<GroupBreakdown, ReconError> {
    let groups = group_rows(dataset, rows, column)?
        .into_iter()
        .map(|(key, members)| GroupTotals { key, totals: totals(members) })
        .collect();
    Ok(GroupBreakdown { column: column.to_string(), groups })
}

/// Groups ranked by absolute summed difference, largest first.
///
/// The sort is stable, so groups with equal absolute difference keep the
/// order in which they first appear in the data.
pub fn rank_variances(
    dataset: &Dataset,
    rows: &[AnnotatedRow],
    column: &str,
    top_n: usize,
) -> Result<VarianceRanking, ReconError> {
    let mut entries: Vec<VarianceEntry> = group_rows(dataset, rows, column)?
        .into_iter()
        .map(|(key, members)| {
            let difference: f64 = members.iter().map(|r| r.difference).sum();
            VarianceEntry { key, difference, abs_difference: difference.abs() }
        })
        .collect();

    entries.sort_by(|a, b| b.abs_difference.total_cmp(&a.abs_difference));
    entries.truncate(top_n);

    Ok(VarianceRanking { column: column.to_string(), entries })
}
