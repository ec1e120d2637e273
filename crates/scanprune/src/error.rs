//! Error types for scan planning and reader construction

use thiserror::Error;

/// Result type for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while resolving, pruning or opening a scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// A projected or filter-target column does not exist in the file schema
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Requested row group range lies outside the file
    #[error("Invalid row group: {0}")]
    InvalidRowGroup(String),

    /// Error reading or parsing Parquet file
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error with Arrow data structures
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
