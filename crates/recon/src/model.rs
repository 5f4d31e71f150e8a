use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as handed over by the parser.
///
/// Numeric coercion is the engine's job, so CSV input arrives as `Text`
/// and only typed spreadsheet cells arrive as `Number`/`Bool`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display form used for group keys, filters and the detail table.
    /// Integral numbers print without decimals.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Text(s) => s.clone(),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Ordered named columns sharing one row count. Row `i` of every column is
/// the same inventory line item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build from whole columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, ReconError> {
        let rows = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != rows) {
            return Err(ReconError::RaggedColumns {
                column: bad.name.clone(),
                expected: rows,
                found: bad.cells.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build from a header and row-major records. Short rows are padded with
    /// `Empty`; cells beyond the header width are dropped.
    pub fn from_rows(headers: Vec<String>, records: Vec<Vec<Cell>>) -> Self {
        let rows = records.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column { name, cells: Vec::with_capacity(rows) })
            .collect();

        for record in records {
            let mut cells = record.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(Cell::Empty));
            }
        }

        Self { columns, rows }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.columns.get(col).and_then(|c| c.cells.get(row))
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<&Column, ReconError> {
        self.column(name).ok_or_else(|| ReconError::MissingColumn { column: name.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Column names bound to each role. The two quantity roles are required;
/// a `ReconColumns` only exists once both resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconColumns {
    pub system_quantity: String,
    pub count_target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl ReconColumns {
    pub fn new(system_quantity: impl Into<String>, count_target: impl Into<String>) -> Self {
        Self {
            system_quantity: system_quantity.into(),
            count_target: count_target.into(),
            product: None,
            family: None,
            agent: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-row reconciliation
// ---------------------------------------------------------------------------

/// Counted quantity of a line item. `NotCounted` is distinct from a count of
/// zero: the item has not been counted yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum CountedQuantity {
    Counted(f64),
    NotCounted,
}

impl CountedQuantity {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Counted(n) => Some(*n),
            Self::NotCounted => None,
        }
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Counted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRow {
    /// Row position in the source dataset.
    pub index: usize,
    pub system: f64,
    pub counted: CountedQuantity,
    /// `counted - system`, or 0 when not counted.
    pub difference: f64,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Totals {
    pub system_total: f64,
    pub counted_total: f64,
    pub difference_total: f64,
    pub percent_complete: f64,
    pub percent_variance: f64,
    pub rows: usize,
    pub counted_rows: usize,
}

/// Count progress: the raw percent as reported in the metrics, and the same
/// value clamped to `[0, 100]` for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub raw_percent: f64,
    pub clamped_percent: f64,
}

impl Progress {
    pub fn from_percent(raw_percent: f64) -> Self {
        let clamped_percent = if raw_percent.is_nan() { 0.0 } else { raw_percent.clamp(0.0, 100.0) };
        Self { raw_percent, clamped_percent }
    }

    /// Clamped progress in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.clamped_percent / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotals {
    pub key: String,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub column: String,
    pub groups: Vec<GroupTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceEntry {
    pub key: String,
    pub difference: f64,
    pub abs_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceRanking {
    pub column: String,
    pub entries: Vec<VarianceEntry>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub columns: ReconColumns,
    pub totals: Totals,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_agent: Option<GroupBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_product: Option<GroupBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_variances: Option<VarianceRanking>,
    pub rows: Vec<AnnotatedRow>,
}
