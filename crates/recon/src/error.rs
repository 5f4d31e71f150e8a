use thiserror::Error;

use crate::matcher::Role;

#[derive(Debug, Error)]
pub enum ReconError {
    /// One or both required roles matched no column. Fatal for the report.
    #[error(
        "could not find column(s) for {}; available columns: [{}]",
        format_roles(.missing),
        format_columns(.available)
    )]
    UnresolvedRoles { missing: Vec<Role>, available: Vec<String> },

    /// A column name handed to the engine does not exist in the dataset.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    /// An annotated row points past the end of the dataset it is grouped on.
    #[error("row {index} is out of range for a dataset of {rows} row(s)")]
    RowOutOfRange { index: usize, rows: usize },

    /// Columns passed to `Dataset::from_columns` differ in length.
    #[error("column '{column}' has {found} cell(s), expected {expected}")]
    RaggedColumns { column: String, expected: usize, found: usize },

    /// Report options failed validation.
    #[error("invalid report options: {0}")]
    InvalidOptions(String),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| format!("'{}'", r.label()))
        .collect::<Vec<_>>()
        .join(" and ")
}

fn format_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
