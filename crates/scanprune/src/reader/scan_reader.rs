//! Sequential record batch stream over the kept row groups

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StructArray};
use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions, RecordBatchReader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReader;

use crate::error::{Result, ScanError};

/// Batch reader returned by [`ScanFile::make_reader`](crate::ScanFile::make_reader)
///
/// Yields batches from the kept row groups in ascending order, preserving row
/// order within each group. Errors from the decoder are passed through as is.
pub struct ScanReader {
    inner: ParquetRecordBatchReader,
    schema: SchemaRef,
    /// Column permutation restoring the requested output order
    reorder: Option<Vec<usize>>,
    row_groups: Vec<usize>,
    deferred_projection: Option<Vec<String>>,
}

impl ScanReader {
    pub(crate) fn new(
        inner: ParquetRecordBatchReader,
        reorder: Option<Vec<usize>>,
        row_groups: Vec<usize>,
        deferred_projection: Option<Vec<String>>,
    ) -> Result<Self> {
        let decoded = inner.schema();
        let schema = match &reorder {
            Some(order) => Arc::new(decoded.project(order)?),
            None => decoded,
        };
        Ok(Self {
            inner,
            schema,
            reorder,
            row_groups,
            deferred_projection,
        })
    }

    /// Row groups this reader reads, ascending
    pub fn row_groups(&self) -> &[usize] {
        &self.row_groups
    }

    /// False when the reader returns every column and the caller still has
    /// to apply [`deferred_projection`](Self::deferred_projection)
    pub fn projection_applied(&self) -> bool {
        self.deferred_projection.is_none()
    }

    /// Projection left to the caller, if any
    pub fn deferred_projection(&self) -> Option<&[String]> {
        self.deferred_projection.as_deref()
    }
}

impl Iterator for ScanReader {
    type Item = std::result::Result<RecordBatch, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.inner.next()?;
        Some(match &self.reorder {
            Some(order) => batch.and_then(|b| b.project(order)),
            None => batch,
        })
    }
}

impl RecordBatchReader for ScanReader {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}

/// Projects `batch` onto the named columns
///
/// Used to finish a scan whose projection was deferred. A name is either a
/// top-level field or a dotted leaf path; a path into a struct keeps only the
/// requested children. Duplicate names are kept once. As with an enforced
/// projection, top-level columns follow the requested order unless a nested
/// path is present, in which case they keep file order.
pub fn project_batch<S: AsRef<str>>(batch: &RecordBatch, columns: &[S]) -> Result<RecordBatch> {
    let schema = batch.schema();

    // Top-level column and the sub-paths requested below it
    let mut selection: Vec<(usize, Vec<Vec<&str>>)> = Vec::with_capacity(columns.len());
    let mut nested = false;
    for name in columns {
        let name = name.as_ref();
        let (idx, path) =
            locate(&schema, name).ok_or_else(|| ScanError::ColumnNotFound(name.to_string()))?;
        nested |= !path.is_empty();
        match selection.iter_mut().find(|(i, _)| *i == idx) {
            Some((_, paths)) => paths.push(path),
            None => selection.push((idx, vec![path])),
        }
    }
    if nested {
        selection.sort_by_key(|(idx, _)| *idx);
    }

    let mut fields = Vec::with_capacity(selection.len());
    let mut arrays = Vec::with_capacity(selection.len());
    for (idx, paths) in &selection {
        let paths: Vec<&[&str]> = paths.iter().map(Vec::as_slice).collect();
        let (field, array) = prune_column(schema.field(*idx), batch.column(*idx), &paths)?;
        fields.push(field);
        arrays.push(array);
    }

    let projected = Schema::new_with_metadata(fields, schema.metadata().clone());
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(projected),
        arrays,
        &options,
    )?)
}

/// Top-level index of `name` and the struct children leading to it
fn locate<'n>(schema: &Schema, name: &'n str) -> Option<(usize, Vec<&'n str>)> {
    if let Ok(idx) = schema.index_of(name) {
        return Some((idx, Vec::new()));
    }

    let mut parts = name.split('.');
    let idx = schema.index_of(parts.next()?).ok()?;
    let mut path = Vec::new();
    let mut data_type = schema.field(idx).data_type();
    for part in parts {
        // Leaves below a list or map come with their whole column
        let DataType::Struct(children) = data_type else {
            break;
        };
        let (_, child) = children.find(part)?;
        path.push(part);
        data_type = child.data_type();
    }
    Some((idx, path))
}

/// Keeps the parts of `array` addressed by `paths`; an empty path keeps all of it
fn prune_column(field: &Field, array: &ArrayRef, paths: &[&[&str]]) -> Result<(FieldRef, ArrayRef)> {
    let whole = paths.iter().any(|p| p.is_empty());
    let struct_array = match array.as_struct_opt() {
        Some(s) if !whole => s,
        _ => return Ok((Arc::new(field.clone()), array.clone())),
    };

    let mut child_fields = Vec::new();
    let mut child_arrays = Vec::new();
    for (i, child) in struct_array.fields().iter().enumerate() {
        let sub: Vec<&[&str]> = paths
            .iter()
            .filter(|p| p[0] == child.name().as_str())
            .map(|p| &p[1..])
            .collect();
        if sub.is_empty() {
            continue;
        }
        let (f, a) = prune_column(child, struct_array.column(i), &sub)?;
        child_fields.push(f);
        child_arrays.push(a);
    }

    let pruned = StructArray::try_new(
        Fields::from(child_fields),
        child_arrays,
        struct_array.nulls().cloned(),
    )?;
    let field = Field::new(field.name(), pruned.data_type().clone(), field.is_nullable())
        .with_metadata(field.metadata().clone());
    Ok((Arc::new(field), Arc::new(pruned)))
}
