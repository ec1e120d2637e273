//! Shared fixtures for scan integration tests

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray, StructArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::schema::types::ColumnPath;

/// Rows per row group in the fixture file
pub const ROWS_PER_GROUP: usize = 4;

pub fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("a", DataType::Int64, true),
        Field::new("b", DataType::Utf8, false),
        Field::new("c", DataType::Int64, false),
    ]))
}

/// One row group worth of rows. Column `b` is `g{group}-{row}` and
/// column `c` is `group * 100 + row`.
fn group_batch(group: i64, a: Vec<Option<i64>>) -> RecordBatch {
    let rows = a.len() as i64;
    let b: Vec<String> = (0..rows).map(|i| format!("g{}-{}", group, i)).collect();
    let c: Vec<i64> = (0..rows).map(|i| group * 100 + i).collect();
    RecordBatch::try_new(
        schema(),
        vec![
            Arc::new(Int64Array::from(a)),
            Arc::new(StringArray::from(b)),
            Arc::new(Int64Array::from(c)),
        ],
    )
    .expect("valid fixture batch")
}

/// Three row groups:
/// - group 0: `a` in [0, 5]
/// - group 1: `a` in [15, 18]
/// - group 2: `a` all null, so no min/max statistics
pub fn fixture_batches() -> Vec<RecordBatch> {
    vec![
        group_batch(0, vec![Some(0), Some(2), Some(4), Some(5)]),
        group_batch(1, vec![Some(15), Some(16), Some(17), Some(18)]),
        group_batch(2, vec![None; ROWS_PER_GROUP]),
    ]
}

fn write(props: WriterProperties) -> Bytes {
    let mut writer =
        ArrowWriter::try_new(Vec::new(), schema(), Some(props)).expect("create writer");
    for batch in fixture_batches() {
        writer.write(&batch).expect("write batch");
        // One row group per batch
        writer.flush().expect("flush row group");
    }
    Bytes::from(writer.into_inner().expect("finish file"))
}

/// Fixture file with statistics on every column
pub fn fixture_file() -> Bytes {
    write(WriterProperties::builder().build())
}

/// Fixture file without statistics on column `b`
pub fn fixture_file_without_b_stats() -> Bytes {
    write(
        WriterProperties::builder()
            .set_column_statistics_enabled(ColumnPath::from("b"), EnabledStatistics::None)
            .build(),
    )
}

/// Values of an Int64 column across batches
pub fn int_column(batches: &[RecordBatch], name: &str) -> Vec<Option<i64>> {
    batches
        .iter()
        .flat_map(|batch| {
            let column = batch
                .column_by_name(name)
                .expect("column present")
                .as_any()
                .downcast_ref::<Int64Array>()
                .expect("int64 column")
                .clone();
            column.iter().collect::<Vec<_>>()
        })
        .collect()
}

pub fn field_names(schema: &Schema) -> Vec<String> {
    schema.fields().iter().map(|f| f.name().clone()).collect()
}

/// Single row group file with a struct column `payload { id, name }`
pub fn nested_fixture_file() -> Bytes {
    let payload = StructArray::from(vec![
        (
            Arc::new(Field::new("id", DataType::Int64, false)),
            Arc::new(Int64Array::from(vec![10, 11, 12])) as ArrayRef,
        ),
        (
            Arc::new(Field::new("name", DataType::Utf8, false)),
            Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef,
        ),
    ]);
    let schema = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Int64, false),
        Field::new("payload", payload.data_type().clone(), false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int64Array::from(vec![1, 2, 3])), Arc::new(payload)],
    )
    .expect("valid nested batch");
    write_batches(schema, vec![batch])
}

/// Writes each batch as its own row group
pub fn write_batches(schema: SchemaRef, batches: Vec<RecordBatch>) -> Bytes {
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, None).expect("create writer");
    for batch in batches {
        writer.write(&batch).expect("write batch");
        writer.flush().expect("flush row group");
    }
    Bytes::from(writer.into_inner().expect("finish file"))
}
