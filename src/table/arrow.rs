// src/table/arrow.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::{PlateTable, SAMPLE_COLUMN, TIME_COLUMN};

/// Arrow schema for a plate table:
/// - `Sample`   → Utf8
/// - well cols  → Float64 (nullable; ghost and overflow wells are null)
/// - `Time (s)` → UInt64
pub fn build_arrow_schema(table: &PlateTable) -> Arc<ArrowSchema> {
    let mut fields = Vec::with_capacity(table.well_labels().len() + 2);
    fields.push(ArrowField::new(SAMPLE_COLUMN, DataType::Utf8, false));
    for label in table.well_labels() {
        fields.push(ArrowField::new(label, DataType::Float64, true));
    }
    fields.push(ArrowField::new(TIME_COLUMN, DataType::UInt64, false));

    Arc::new(ArrowSchema::new(fields))
}

/// Materialize the whole table as a single record batch, column by column.
pub fn to_record_batch(table: &PlateTable) -> Result<RecordBatch> {
    let schema = build_arrow_schema(table);
    let rows = table.rows();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    columns.push(Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.sample.as_str()),
    )));

    for well in 0..table.well_labels().len() {
        let mut b = Float64Builder::with_capacity(rows.len());
        for row in rows {
            b.append_option(row.wells[well]);
        }
        columns.push(Arc::new(b.finish()));
    }

    columns.push(Arc::new(UInt64Array::from_iter_values(
        rows.iter().map(|r| r.elapsed_seconds),
    )));

    RecordBatch::try_new(schema, columns).context("building plate record batch")
}
