// Count export acquisition, parsing and report export

pub mod csv;
pub mod error;
pub mod export;
pub mod fetch;
pub mod headers;
pub mod source;
pub mod xlsx;

pub use error::{ExportError, LoadError};
pub use source::{load, LoadOptions, Source};
