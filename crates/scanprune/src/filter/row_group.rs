//! Row group pruning from column chunk statistics
//!
//! This module provides the [`RowGroupPruner`], which walks the row groups of a
//! file and drops those for which at least one filter can prove, from the
//! chunk statistics alone, that no row matches.

use std::ops::Range;
use std::sync::Arc;

use parquet::file::metadata::{ParquetMetaData, RowGroupMetaData};
use parquet::schema::types::SchemaDescriptor;
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::filter::{ChunkStatistics, ColumnFilter};
use crate::schema::resolve_index;

/// Outcome of pruning a single row group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowGroupDecision {
    /// At least one filter had usable statistics and none excluded the group
    Kept,
    /// No filter found usable statistics; kept conservatively
    KeptNoStatistics,
    /// The filter at `filter_index` proved that no row can match
    Excluded { filter_index: usize, column: String },
}

impl RowGroupDecision {
    pub fn is_kept(&self) -> bool {
        !matches!(self, RowGroupDecision::Excluded { .. })
    }
}

/// Prunes the row groups of one file
///
/// Borrows the schema and row group metadata for the duration of a request.
/// Filters are resolved before any row group is examined, so a missing column
/// fails the request without producing partial output.
#[derive(Debug, Clone, Copy)]
pub struct RowGroupPruner<'a> {
    schema: &'a SchemaDescriptor,
    row_groups: &'a [RowGroupMetaData],
}

impl<'a> RowGroupPruner<'a> {
    pub fn new(metadata: &'a ParquetMetaData) -> Self {
        Self::from_parts(metadata.file_metadata().schema_descr(), metadata.row_groups())
    }

    pub fn from_parts(schema: &'a SchemaDescriptor, row_groups: &'a [RowGroupMetaData]) -> Self {
        Self { schema, row_groups }
    }

    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    /// Returns the ascending indices of row groups that may contain matches
    pub fn prune(&self, filters: &[Arc<dyn ColumnFilter>]) -> Result<Vec<usize>> {
        self.prune_within(filters, 0..self.row_groups.len())
    }

    /// Like [`prune`](Self::prune), restricted to the row groups in `candidates`
    pub fn prune_within(
        &self,
        filters: &[Arc<dyn ColumnFilter>],
        candidates: Range<usize>,
    ) -> Result<Vec<usize>> {
        let decisions = self.explain_within(filters, candidates)?;
        let kept: Vec<usize> = decisions
            .into_iter()
            .filter(|(_, decision)| decision.is_kept())
            .map(|(idx, _)| idx)
            .collect();
        Ok(kept)
    }

    /// Decision for every row group, in file order
    pub fn explain(&self, filters: &[Arc<dyn ColumnFilter>]) -> Result<Vec<RowGroupDecision>> {
        Ok(self
            .explain_within(filters, 0..self.row_groups.len())?
            .into_iter()
            .map(|(_, decision)| decision)
            .collect())
    }

    fn explain_within(
        &self,
        filters: &[Arc<dyn ColumnFilter>],
        candidates: Range<usize>,
    ) -> Result<Vec<(usize, RowGroupDecision)>> {
        if candidates.start > candidates.end || candidates.end > self.row_groups.len() {
            return Err(ScanError::InvalidRowGroup(format!(
                "row groups {}..{} outside file with {} row groups",
                candidates.start,
                candidates.end,
                self.row_groups.len()
            )));
        }

        let mut resolved: Vec<(usize, &dyn ColumnFilter)> = Vec::with_capacity(filters.len());
        for filter in filters {
            resolved.push((resolve_index(self.schema, filter.column_name())?, filter.as_ref()));
        }

        let total = candidates.len();
        let decisions: Vec<(usize, RowGroupDecision)> = candidates
            .map(|idx| (idx, self.decide(idx, &resolved)))
            .collect();

        debug!(
            kept = decisions.iter().filter(|(_, d)| d.is_kept()).count(),
            total,
            filters = filters.len(),
            "Pruned row groups"
        );
        Ok(decisions)
    }

    fn decide(&self, rg_idx: usize, filters: &[(usize, &dyn ColumnFilter)]) -> RowGroupDecision {
        let row_group = &self.row_groups[rg_idx];
        let mut consulted = false;

        for (filter_index, (col_idx, filter)) in filters.iter().enumerate() {
            let Some(stats) = row_group
                .columns()
                .get(*col_idx)
                .and_then(ChunkStatistics::from_chunk)
            else {
                continue;
            };
            if !stats.has_min_max() {
                continue;
            }
            consulted = true;

            if filter.check_statistics(&stats) {
                debug!(
                    row_group = rg_idx,
                    column = filter.column_name(),
                    ?filter,
                    "Row group excluded by statistics"
                );
                return RowGroupDecision::Excluded {
                    filter_index,
                    column: filter.column_name().to_string(),
                };
            }
        }

        if consulted || filters.is_empty() {
            RowGroupDecision::Kept
        } else {
            debug!(row_group = rg_idx, "No usable statistics, keeping row group");
            RowGroupDecision::KeptNoStatistics
        }
    }
}

/// Returns the ascending indices of the row groups in `metadata` that survive `filters`
pub fn prune_row_groups(
    metadata: &ParquetMetaData,
    filters: &[Arc<dyn ColumnFilter>],
) -> Result<Vec<usize>> {
    RowGroupPruner::new(metadata).prune(filters)
}

/// Returns the pruning decision for every row group in `metadata`
pub fn explain_row_groups(
    metadata: &ParquetMetaData,
    filters: &[Arc<dyn ColumnFilter>],
) -> Result<Vec<RowGroupDecision>> {
    RowGroupPruner::new(metadata).explain(filters)
}
