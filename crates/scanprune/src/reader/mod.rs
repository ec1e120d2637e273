//! Batch reader assembly over pruned row groups

pub mod scan_file;
pub mod scan_reader;

pub use scan_file::{ScanFile, ScanPlan, ScanSource};
pub use scan_reader::{project_batch, ScanReader};

use std::ops::Range;
use std::sync::Arc;

use crate::filter::ColumnFilter;

/// Where column projection is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionPolicy {
    /// The batch reader decodes only the projected columns
    Enforce,
    /// The batch reader decodes every column of the kept row groups and the
    /// caller applies the projection (see [`project_batch`])
    Deferred,
}

/// Configuration for scan readers
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Number of rows to read per batch (default: 8192)
    pub batch_size: usize,

    /// Where projection happens (default: enforced at reader construction)
    pub projection: ProjectionPolicy,

    /// Whether to prune row groups with statistics (default: true)
    pub statistics_pruning: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            projection: ProjectionPolicy::Enforce,
            statistics_pruning: true,
        }
    }
}

impl From<&config::ScanConfig> for ReaderConfig {
    fn from(scan: &config::ScanConfig) -> Self {
        Self {
            batch_size: scan.batch_size,
            projection: if scan.enforce_projection {
                ProjectionPolicy::Enforce
            } else {
                ProjectionPolicy::Deferred
            },
            statistics_pruning: scan.statistics_pruning,
        }
    }
}

/// A single read request against an open file
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Columns to return, in output order. Empty means every column.
    pub columns: Vec<String>,

    /// Filters used to prune row groups
    pub filters: Vec<Arc<dyn ColumnFilter>>,

    /// Row groups to consider before pruning (`None` = all)
    pub row_groups: Option<Range<usize>>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, filter: impl ColumnFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn with_shared_filter(mut self, filter: Arc<dyn ColumnFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_row_groups(mut self, row_groups: Range<usize>) -> Self {
        self.row_groups = Some(row_groups);
        self
    }
}
