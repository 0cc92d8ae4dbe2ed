//! Parquet bridge: event-table reading/writing and the candidate sink.
//!
//! # Schemas
//!
//! Event tables (`evmix_events_v1`): `runNumber`/`eventNumber` as `Int64`
//! (readers also accept `Int32`), every other column `Float64`.
//!
//! Candidate output (`evmix_candidates_v1`): all columns `Float64`; the
//! Parquet key-value metadata records the schema version under
//! [`META_KEY_SCHEMA_VERSION`] and the mixed combinations as JSON under
//! [`META_KEY_COMBINATIONS`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::event_table::{EventTable, EVENT_COLUMN, RUN_COLUMN};
use mx_core::{Error, Result};

/// Schema version string for event-table files.
pub const EVENTS_SCHEMA_V1: &str = "evmix_events_v1";

/// Schema version string for mixed-candidate files.
pub const CANDIDATES_SCHEMA_V1: &str = "evmix_candidates_v1";

/// Parquet metadata key for the schema version.
pub const META_KEY_SCHEMA_VERSION: &str = "evmix.schema_version";

/// Parquet metadata key for the mixed-combination list (JSON).
pub const META_KEY_COMBINATIONS: &str = "evmix.combinations";

/// Rows buffered in the candidate sink before a `RecordBatch` is flushed.
const DEFAULT_FLUSH_ROWS: usize = 8192;

/// JSON-serializable descriptor of one mixed combination, stored in the
/// candidate file's metadata.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CombinationMeta {
    /// Mixed candidate name.
    pub name: String,
    /// Ordered stems contributing to the candidate.
    pub stems: Vec<String>,
}

// ---------------------------------------------------------------------------
// Event tables
// ---------------------------------------------------------------------------

/// Write an [`EventTable`] to a Parquet file.
pub fn write_events(table: &EventTable, path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new(RUN_COLUMN, DataType::Int64, false),
        Field::new(EVENT_COLUMN, DataType::Int64, false),
    ];
    fields.extend(
        table.column_names().iter().map(|n| Field::new(n, DataType::Float64, false)),
    );

    let metadata =
        HashMap::from([(META_KEY_SCHEMA_VERSION.to_string(), EVENTS_SCHEMA_V1.to_string())]);
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));

    let mut arrays: Vec<Arc<dyn Array>> = vec![
        Arc::new(Int64Array::from(table.runs().to_vec())),
        Arc::new(Int64Array::from(table.events().to_vec())),
    ];
    for name in table.column_names() {
        let col = table.column(name).ok_or_else(|| {
            Error::Table(format!("missing column '{name}' in EventTable"))
        })?;
        arrays.push(Arc::new(Float64Array::from(col.to_vec())));
    }

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| Error::Table(format!("failed to build RecordBatch: {e}")))?;

    let file = File::create(path)
        .map_err(|e| Error::Table(format!("failed to create {}: {e}", path.display())))?;
    let props = parquet::file::properties::WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();
    let mut writer = parquet::arrow::ArrowWriter::try_new(file, schema, Some(props))
        .map_err(|e| Error::Table(format!("failed to create Parquet writer: {e}")))?;
    writer.write(&batch).map_err(|e| Error::Table(format!("failed to write Parquet: {e}")))?;
    writer.close().map_err(|e| Error::Table(format!("failed to close Parquet writer: {e}")))?;
    Ok(())
}

/// Read an [`EventTable`] from a Parquet file.
///
/// The file must carry `runNumber`/`eventNumber` integer columns; every other
/// column must be `Float64` and is loaded as a kinematic column.
pub fn read_events(path: &Path) -> Result<EventTable> {
    let file = File::open(path)
        .map_err(|e| Error::Table(format!("failed to open {}: {e}", path.display())))?;
    let builder = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Table(format!("failed to read Parquet: {e}")))?;

    let full_schema = builder.schema().clone();

    let reader = builder
        .build()
        .map_err(|e| Error::Table(format!("failed to build Parquet reader: {e}")))?;
    let batches: std::result::Result<Vec<_>, _> = reader.collect();
    let batches =
        batches.map_err(|e| Error::Table(format!("failed to read Parquet batches: {e}")))?;

    if batches.iter().map(|b| b.num_rows()).sum::<usize>() == 0 {
        return Err(Error::Table(format!("{} contains no events", path.display())));
    }

    let merged = arrow::compute::concat_batches(&full_schema, &batches)
        .map_err(|e| Error::Table(format!("failed to concat Parquet batches: {e}")))?;

    let runs = identity_column(&merged, RUN_COLUMN)?;
    let events = identity_column(&merged, EVENT_COLUMN)?;

    let schema = merged.schema();
    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for (idx, field) in schema.fields().iter().enumerate() {
        let name = field.name();
        if name == RUN_COLUMN || name == EVENT_COLUMN {
            continue;
        }
        if field.data_type() != &DataType::Float64 {
            return Err(Error::Table(format!(
                "column '{}' has type {:?}, expected Float64",
                name,
                field.data_type()
            )));
        }
        let arr = merged.column(idx).as_primitive::<arrow::datatypes::Float64Type>();
        columns.push((name.clone(), arr.values().to_vec()));
    }

    EventTable::from_columns(runs, events, columns)
}

/// Extract an identity column as `i64`, accepting `Int64` or `Int32`.
fn identity_column(batch: &RecordBatch, name: &str) -> Result<Vec<i64>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::Table(format!("missing identity column '{name}'")))?;
    let arr = batch.column(idx);
    match arr.data_type() {
        DataType::Int64 => {
            Ok(arr.as_primitive::<arrow::datatypes::Int64Type>().values().to_vec())
        }
        DataType::Int32 => Ok(arr
            .as_primitive::<arrow::datatypes::Int32Type>()
            .values()
            .iter()
            .map(|&v| v as i64)
            .collect()),
        other => Err(Error::Table(format!(
            "identity column '{name}' has type {other:?}, expected Int64 or Int32"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Candidate sink
// ---------------------------------------------------------------------------

/// Append-only Parquet sink for mixed-candidate rows.
///
/// Rows are buffered column-wise and flushed as `RecordBatch`es; the file is
/// finalized by [`CandidateWriter::finish`]. Dropping the writer without
/// finishing abandons buffered rows and leaves the file truncated.
#[derive(Debug)]
pub struct CandidateWriter {
    writer: parquet::arrow::ArrowWriter<File>,
    schema: SchemaRef,
    buffers: Vec<Vec<f64>>,
    flush_rows: usize,
    buffered: usize,
    rows_written: u64,
}

impl CandidateWriter {
    /// Create a sink over an already-opened output file.
    ///
    /// `columns` is the flat output schema; `combinations` is recorded in the
    /// file's key-value metadata.
    pub fn create(
        file: File,
        columns: &[String],
        combinations: &[CombinationMeta],
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Table("candidate schema requires at least one column".into()));
        }
        let mut seen = HashSet::new();
        for name in columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::Table(format!("duplicate output column '{name}'")));
            }
        }

        let combos_json = serde_json::to_string(combinations)?;
        let fields: Vec<Field> =
            columns.iter().map(|n| Field::new(n, DataType::Float64, false)).collect();
        let metadata = HashMap::from([
            (META_KEY_SCHEMA_VERSION.to_string(), CANDIDATES_SCHEMA_V1.to_string()),
            (META_KEY_COMBINATIONS.to_string(), combos_json),
        ]);
        let schema = Arc::new(Schema::new(fields).with_metadata(metadata));

        let props = parquet::file::properties::WriterProperties::builder()
            .set_compression(parquet::basic::Compression::SNAPPY)
            .build();
        let writer = parquet::arrow::ArrowWriter::try_new(file, schema.clone(), Some(props))
            .map_err(|e| Error::Table(format!("failed to create Parquet writer: {e}")))?;

        Ok(Self {
            writer,
            schema,
            buffers: vec![Vec::new(); columns.len()],
            flush_rows: DEFAULT_FLUSH_ROWS,
            buffered: 0,
            rows_written: 0,
        })
    }

    /// Override the batch flush threshold (rows per `RecordBatch`).
    pub fn with_flush_rows(mut self, rows: usize) -> Self {
        self.flush_rows = rows.max(1);
        self
    }

    /// Append one row; `row` must match the schema arity.
    pub fn append(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.buffers.len() {
            return Err(Error::Table(format!(
                "row arity mismatch: expected {}, got {}",
                self.buffers.len(),
                row.len()
            )));
        }
        for (buf, v) in self.buffers.iter_mut().zip(row) {
            buf.push(*v);
        }
        self.buffered += 1;
        if self.buffered >= self.flush_rows {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Rows appended so far, including buffered-but-unflushed rows.
    pub fn rows_appended(&self) -> u64 {
        self.rows_written + self.buffered as u64
    }

    /// Flush remaining rows and finalize the file. Returns the row count.
    pub fn finish(mut self) -> Result<u64> {
        self.flush_batch()?;
        self.writer
            .close()
            .map_err(|e| Error::Table(format!("failed to close Parquet writer: {e}")))?;
        Ok(self.rows_written)
    }

    fn flush_batch(&mut self) -> Result<()> {
        if self.buffered == 0 {
            return Ok(());
        }
        let arrays: Vec<Arc<dyn Array>> = self
            .buffers
            .iter_mut()
            .map(|b| Arc::new(Float64Array::from(std::mem::take(b))) as Arc<dyn Array>)
            .collect();
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)
            .map_err(|e| Error::Table(format!("failed to build RecordBatch: {e}")))?;
        self.writer
            .write(&batch)
            .map_err(|e| Error::Table(format!("failed to write Parquet batch: {e}")))?;
        self.rows_written += self.buffered as u64;
        self.buffered = 0;
        Ok(())
    }
}
