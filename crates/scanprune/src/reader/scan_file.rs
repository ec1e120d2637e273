//! Open file handle and per-request reader construction

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::ProjectionMask;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::ChunkReader;
use parquet::schema::types::SchemaDescriptor;
use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::RowGroupPruner;
use crate::reader::{ProjectionPolicy, ReadOptions, ReaderConfig, ScanReader};
use crate::schema::{ColumnResolver, ResolvedColumn};

/// A byte source that can hand out an independent reader per scan
pub trait ScanSource: ChunkReader + Sized + 'static {
    fn reopen(&self) -> Result<Self>;
}

impl ScanSource for File {
    fn reopen(&self) -> Result<Self> {
        Ok(self.try_clone()?)
    }
}

impl ScanSource for Bytes {
    fn reopen(&self) -> Result<Self> {
        Ok(self.clone())
    }
}

/// Resolution and pruning result for one read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Kept row groups, ascending
    pub row_groups: Vec<usize>,
    /// Output columns in requested order; empty means every column
    pub projection: Vec<ResolvedColumn>,
    /// Row groups in the file
    pub total_row_groups: usize,
}

impl ScanPlan {
    /// Leaf indices of the projected columns, in requested order
    pub fn column_indices(&self) -> Vec<usize> {
        self.projection.iter().map(|c| c.index).collect()
    }
}

/// An open file whose metadata is resident
///
/// Metadata is loaded once on open. Each call to [`make_reader`](Self::make_reader)
/// resolves, prunes and builds a fresh reader from immutable state.
pub struct ScanFile<T: ScanSource> {
    source: T,
    metadata: ArrowReaderMetadata,
    resolver: ColumnResolver,
    config: ReaderConfig,
}

impl ScanFile<File> {
    /// Opens a Parquet file from the local file system
    pub fn open<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::try_new(file, config)
    }
}

impl<T: ScanSource> ScanFile<T> {
    /// Reads the footer of `source` and prepares it for scanning
    pub fn try_new(source: T, config: ReaderConfig) -> Result<Self> {
        let metadata = ArrowReaderMetadata::load(&source, ArrowReaderOptions::new())?;
        let resolver = ColumnResolver::new(metadata.metadata().file_metadata().schema_descr());

        debug!(
            row_groups = metadata.metadata().num_row_groups(),
            columns = resolver.num_columns(),
            "Opened file for scanning"
        );

        Ok(Self {
            source,
            metadata,
            resolver,
            config,
        })
    }

    /// Parquet footer metadata, loaded once on open
    pub fn metadata(&self) -> &Arc<ParquetMetaData> {
        self.metadata.metadata()
    }

    /// Parquet leaf schema used for column resolution
    pub fn parquet_schema(&self) -> &SchemaDescriptor {
        self.metadata().file_metadata().schema_descr()
    }

    /// Arrow schema of the whole file
    pub fn arrow_schema(&self) -> SchemaRef {
        self.metadata.schema().clone()
    }

    /// Column name resolver built from the file schema
    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    /// Reader settings applied to every request
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Number of row groups in the file
    pub fn num_row_groups(&self) -> usize {
        self.metadata().num_row_groups()
    }

    /// Total rows across all row groups
    pub fn num_rows(&self) -> i64 {
        self.metadata()
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows())
            .sum()
    }

    /// Resolves columns and prunes row groups for `options` without reading data
    pub fn plan(&self, options: &ReadOptions) -> Result<ScanPlan> {
        let projection = self.resolver.resolve_projection(&options.columns)?;
        for filter in &options.filters {
            self.resolver.resolve(filter.column_name())?;
        }

        let total_row_groups = self.num_row_groups();
        let candidates = options.row_groups.clone().unwrap_or(0..total_row_groups);
        let pruner = RowGroupPruner::new(self.metadata());
        let row_groups = if self.config.statistics_pruning {
            pruner.prune_within(&options.filters, candidates)?
        } else {
            pruner.prune_within(&[], candidates)?
        };

        Ok(ScanPlan {
            row_groups,
            projection,
            total_row_groups,
        })
    }

    /// Builds a batch reader over the row groups that survive `options.filters`
    pub fn make_reader(&self, options: &ReadOptions) -> Result<ScanReader> {
        let plan = self.plan(options)?;
        self.reader_for_plan(plan)
    }

    /// Builds a batch reader for an already computed plan
    pub fn reader_for_plan(&self, plan: ScanPlan) -> Result<ScanReader> {
        let mut builder =
            ParquetRecordBatchReaderBuilder::new_with_metadata(self.source.reopen()?, self.metadata.clone())
                .with_batch_size(self.config.batch_size)
                .with_row_groups(plan.row_groups.clone());

        let mut reorder = None;
        let mut deferred = None;
        if !plan.projection.is_empty() {
            match self.config.projection {
                ProjectionPolicy::Enforce => {
                    let mask = ProjectionMask::leaves(self.parquet_schema(), plan.column_indices());
                    builder = builder.with_projection(mask);
                    reorder = output_order(&plan.projection);
                }
                ProjectionPolicy::Deferred => {
                    warn!(
                        columns = plan.projection.len(),
                        "Column projection deferred to caller, reading all columns"
                    );
                    deferred = Some(plan.projection.iter().map(|c| c.name.clone()).collect());
                }
            }
        }

        debug!(
            kept = plan.row_groups.len(),
            total = plan.total_row_groups,
            columns = plan.projection.len(),
            "Building scan reader"
        );

        ScanReader::new(builder.build()?, reorder, plan.row_groups, deferred)
    }
}

/// Permutation from file column order to requested column order.
///
/// The decoder emits projected columns in file order. For top-level columns
/// each leaf is one output field, so the requested order can be restored; a
/// nested projection keeps file order.
fn output_order(projection: &[ResolvedColumn]) -> Option<Vec<usize>> {
    if !projection.iter().all(|c| c.top_level) {
        debug!("Nested columns in projection, keeping file column order");
        return None;
    }

    let mut file_order: Vec<usize> = projection.iter().map(|c| c.index).collect();
    file_order.sort_unstable();

    let order: Vec<usize> = projection
        .iter()
        .filter_map(|c| file_order.binary_search(&c.index).ok())
        .collect();

    if order.iter().enumerate().all(|(pos, &idx)| pos == idx) {
        None
    } else {
        Some(order)
    }
}
