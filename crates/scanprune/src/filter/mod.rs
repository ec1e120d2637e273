//! Statistics-based row group filtering
//!
//! A filter targets exactly one column and answers a single question about a
//! column chunk: can it prove that no row in the chunk satisfies the filter?
//! The pruner only ever skips data on a "yes"; every uncertain answer keeps
//! the row group.

pub mod predicate;
pub mod row_group;
pub mod statistics;

use std::fmt;

pub use predicate::{ColumnPredicate, Literal, PredicateKind, RangeBound};
pub use row_group::{explain_row_groups, prune_row_groups, RowGroupDecision, RowGroupPruner};
pub use statistics::{ChunkStatistics, StatValue};

/// A single-column filter usable for row group pruning
pub trait ColumnFilter: fmt::Debug + Send + Sync {
    /// Dotted path of the column this filter reads
    fn column_name(&self) -> &str;

    /// Returns true if `stats` prove that no row of the chunk can satisfy
    /// this filter. Must return false whenever that cannot be proven.
    fn check_statistics(&self, stats: &ChunkStatistics<'_>) -> bool;
}
