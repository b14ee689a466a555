//! Parquet codec for partial results.
//!
//! An artifact is a SNAPPY-compressed parquet file with two non-nullable
//! `Float64` columns, `r` and `x`, plus key-value metadata identifying the job
//! and the sweep parameters it was computed with.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bifurcation_core::contract::ARTIFACT_SCHEMA_VERSION;
use bifurcation_core::storage_keys::{
    COLUMN_R, COLUMN_X, METADATA_CONFIG_FINGERPRINT, METADATA_JOB_INDEX, METADATA_SCHEMA_VERSION,
    METADATA_TOTAL_JOBS,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::worker::PartialResult;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parquet codec error: {0}")]
    Parquet(#[from] ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("artifact has no '{column}' column")]
    MissingColumn { column: &'static str },
    #[error("artifact column '{column}' has type {data_type}, expected Float64")]
    UnexpectedColumnType {
        column: &'static str,
        data_type: String,
    },
    #[error("artifact column '{column}' contains null values")]
    NullValues { column: &'static str },
    #[error("artifact columns are misaligned: r has {r_len} values, x has {x_len}")]
    LengthMismatch { r_len: usize, x_len: usize },
}

/// Contents of an artifact read back from disk.
///
/// Metadata fields are optional so files written by other tools with the same
/// two columns can still be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArtifact {
    pub schema_version: Option<String>,
    pub job_index: Option<usize>,
    pub total_jobs: Option<usize>,
    pub config_fingerprint: Option<String>,
    pub r: Vec<f64>,
    pub x: Vec<f64>,
}

fn artifact_schema() -> Schema {
    Schema::new(vec![
        Field::new(COLUMN_R, DataType::Float64, false),
        Field::new(COLUMN_X, DataType::Float64, false),
    ])
}

fn artifact_metadata(result: &PartialResult, config_fingerprint: &str) -> Vec<KeyValue> {
    vec![
        KeyValue::new(
            METADATA_SCHEMA_VERSION.to_string(),
            ARTIFACT_SCHEMA_VERSION.to_string(),
        ),
        KeyValue::new(METADATA_JOB_INDEX.to_string(), result.job_index.to_string()),
        KeyValue::new(METADATA_TOTAL_JOBS.to_string(), result.total_jobs.to_string()),
        KeyValue::new(
            METADATA_CONFIG_FINGERPRINT.to_string(),
            config_fingerprint.to_string(),
        ),
    ]
}

pub fn write_artifact(
    path: impl AsRef<Path>,
    result: &PartialResult,
    config_fingerprint: &str,
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    if result.r.len() != result.x.len() {
        return Err(ArtifactError::LengthMismatch {
            r_len: result.r.len(),
            x_len: result.x.len(),
        });
    }

    let schema = Arc::new(artifact_schema());
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(result.r.clone())),
        Arc::new(Float64Array::from(result.x.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(artifact_metadata(result, config_fingerprint)))
        .build();

    // Readers only ever see the previous artifact or the complete new one.
    let io_error = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;
    let mut writer = ArrowWriter::try_new(staged.as_file_mut(), schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged.persist(path).map_err(|error| io_error(error.error))?;

    Ok(())
}

pub fn read_artifact(path: impl AsRef<Path>) -> Result<LoadedArtifact, ArtifactError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let metadata = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .cloned()
        .unwrap_or_default();
    let lookup = |key: &str| {
        metadata
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.clone())
    };
    let schema_version = lookup(METADATA_SCHEMA_VERSION);
    let job_index = lookup(METADATA_JOB_INDEX).and_then(|value| value.parse().ok());
    let total_jobs = lookup(METADATA_TOTAL_JOBS).and_then(|value| value.parse().ok());
    let config_fingerprint = lookup(METADATA_CONFIG_FINGERPRINT);

    let mut r = Vec::new();
    let mut x = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        r.extend_from_slice(float_column(&batch, COLUMN_R)?.values());
        x.extend_from_slice(float_column(&batch, COLUMN_X)?.values());
    }

    if r.len() != x.len() {
        return Err(ArtifactError::LengthMismatch {
            r_len: r.len(),
            x_len: x.len(),
        });
    }

    Ok(LoadedArtifact {
        schema_version,
        job_index,
        total_jobs,
        config_fingerprint,
        r,
        x,
    })
}

fn float_column<'a>(
    batch: &'a RecordBatch,
    column: &'static str,
) -> Result<&'a Float64Array, ArtifactError> {
    let array = batch
        .column_by_name(column)
        .ok_or(ArtifactError::MissingColumn { column })?;
    let values = array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ArtifactError::UnexpectedColumnType {
            column,
            data_type: array.data_type().to_string(),
        })?;
    if values.null_count() > 0 {
        return Err(ArtifactError::NullValues { column });
    }
    Ok(values)
}
