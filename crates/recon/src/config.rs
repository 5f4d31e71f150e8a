use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::filter::RowFilter;

pub const DEFAULT_TOP_N: usize = 10;
pub const MAX_TOP_N: usize = 100;

/// Knobs for the optional parts of a report. The required quantity columns
/// are always resolved from the headers and cannot be overridden here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    /// Number of entries in the variance ranking.
    pub top_n: usize,
    /// Group per-agent progress by this column instead of the resolved one.
    pub agent_column: Option<String>,
    /// Group per-product progress and rank variances by this column instead
    /// of family / product code.
    pub variance_column: Option<String>,
    /// Detail-table filters. Never applied to the metrics.
    pub filters: Vec<RowFilter>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            agent_column: None,
            variance_column: None,
            filters: Vec::new(),
        }
    }
}

impl ReportOptions {
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.top_n == 0 || self.top_n > MAX_TOP_N {
            return Err(ReconError::InvalidOptions(format!(
                "top_n must be between 1 and {MAX_TOP_N}, got {}",
                self.top_n
            )));
        }
        for (name, value) in [("agent_column", &self.agent_column), ("variance_column", &self.variance_column)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ReconError::InvalidOptions(format!("{name} must not be empty")));
            }
        }
        if let Some(f) = self.filters.iter().find(|f| f.column.trim().is_empty()) {
            return Err(ReconError::InvalidOptions(format!(
                "filter with values {:?} has an empty column name",
                f.values
            )));
        }
        Ok(())
    }
}
