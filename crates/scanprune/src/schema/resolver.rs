//! Name to leaf-index resolution

use std::collections::HashMap;

use parquet::schema::types::SchemaDescriptor;

use crate::error::{Result, ScanError};

/// Looks up the leaf column index for `column_name` in `schema`.
///
/// Names are matched against the dotted column path (`a`, `payload.id`).
/// When several leaves share a path the first one wins.
pub fn resolve_index(schema: &SchemaDescriptor, column_name: &str) -> Result<usize> {
    schema
        .columns()
        .iter()
        .position(|c| c.path().string() == column_name)
        .ok_or_else(|| ScanError::ColumnNotFound(column_name.to_string()))
}

/// A column name together with its physical leaf index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub index: usize,
    /// True when the column sits directly under the schema root
    pub top_level: bool,
}

/// Resolver built once per open file
///
/// Holds a name index over the schema so that repeated requests against the
/// same file do not rescan the column list.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    by_path: HashMap<String, usize>,
    depth: Vec<usize>,
}

impl ColumnResolver {
    pub fn new(schema: &SchemaDescriptor) -> Self {
        let mut by_path = HashMap::with_capacity(schema.num_columns());
        let mut depth = Vec::with_capacity(schema.num_columns());
        for (idx, column) in schema.columns().iter().enumerate() {
            by_path.entry(column.path().string()).or_insert(idx);
            depth.push(column.path().parts().len());
        }
        Self { by_path, depth }
    }

    /// Number of leaf columns in the schema
    pub fn num_columns(&self) -> usize {
        self.depth.len()
    }

    /// Resolves a single name, failing with [`ScanError::ColumnNotFound`]
    pub fn resolve(&self, column_name: &str) -> Result<ResolvedColumn> {
        let index = *self
            .by_path
            .get(column_name)
            .ok_or_else(|| ScanError::ColumnNotFound(column_name.to_string()))?;
        Ok(ResolvedColumn {
            name: column_name.to_string(),
            index,
            top_level: self.depth[index] == 1,
        })
    }

    /// Resolves an ordered projection list.
    ///
    /// Duplicate names collapse onto their first occurrence. The first
    /// missing name aborts the whole resolution.
    pub fn resolve_projection<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ResolvedColumn>> {
        let mut resolved: Vec<ResolvedColumn> = Vec::with_capacity(names.len());
        for name in names {
            let column = self.resolve(name.as_ref())?;
            if resolved.iter().all(|c| c.index != column.index) {
                resolved.push(column);
            }
        }
        Ok(resolved)
    }
}
