//! # scanprune
//!
//! Predicate-aware Parquet scans with row group pruning.
//!
//! This crate sits between a scan orchestrator and the Parquet decoder:
//! - Resolves requested output columns and filter columns to leaf indices
//! - Skips row groups whose column chunk statistics prove that no row can match
//! - Builds a sequential batch reader over the surviving row groups only
//!
//! Pruning is conservative: a row group is only skipped when a filter proves
//! exclusion from complete min/max statistics. Missing or partial statistics
//! always keep the row group.
//!
//! ## Example
//!
//! ```no_run
//! use scanprune::{ColumnPredicate, ReadOptions, ReaderConfig, ScanFile};
//!
//! let file = ScanFile::open("data.parquet", ReaderConfig::default()).unwrap();
//!
//! let options = ReadOptions::new()
//!     .with_columns(["b", "c"])
//!     .with_filter(ColumnPredicate::between("a", 10, 20));
//!
//! let reader = file.make_reader(&options).unwrap();
//! println!("reading row groups {:?}", reader.row_groups());
//!
//! for batch in reader {
//!     let batch = batch.unwrap();
//!     println!("{} rows", batch.num_rows());
//! }
//! ```

pub mod error;
pub mod filter;
pub mod reader;
pub mod schema;

pub use error::{Result, ScanError};
pub use filter::{
    explain_row_groups, prune_row_groups, ChunkStatistics, ColumnFilter, ColumnPredicate,
    Literal, RowGroupDecision, RowGroupPruner,
};
pub use reader::{
    project_batch, ProjectionPolicy, ReadOptions, ReaderConfig, ScanFile, ScanPlan, ScanReader,
    ScanSource,
};
pub use schema::{resolve_index, ColumnResolver, ResolvedColumn};
