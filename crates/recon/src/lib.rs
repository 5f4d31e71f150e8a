//! `countboard-recon`: inventory count reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded [`Dataset`], resolves which columns
//! hold the system and counted quantities, and returns an [`AggregateReport`].
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod model;

pub use config::ReportOptions;
pub use engine::{compute, run};
pub use error::ReconError;
pub use filter::{filter_rows, RowFilter};
pub use matcher::{normalize_header, resolve_roles, ResolvedRoles, Role};
pub use model::{AggregateReport, AnnotatedRow, Cell, CountedQuantity, Dataset, ReconColumns, Totals};
