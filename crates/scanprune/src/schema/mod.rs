//! Column name resolution against a Parquet schema
//!
//! Requested output columns and filter target columns are both given by name.
//! This module maps them onto physical leaf column indices of the file's
//! [`SchemaDescriptor`](parquet::schema::types::SchemaDescriptor).

pub mod resolver;

pub use resolver::{resolve_index, ColumnResolver, ResolvedColumn};
