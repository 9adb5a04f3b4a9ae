//! Error types shared by ingestion, metrics and the dashboard pipeline
//!
//! Every variant is recoverable at the granularity of a single dashboard
//! feature. The pipeline converts them into `FeatureResult::Unavailable`
//! rather than propagating them to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// A column a specific feature needs is absent from the upload.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A mandatory column was requested for aggregation but does not exist.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A mandatory column exists but carries no numeric values.
    #[error("Column '{0}' has no numeric values")]
    EmptyColumn(String),

    /// Date/time fields could not be combined into a timestamp.
    #[error("Could not parse timestamp at row {row}: '{value}'")]
    TimestampParse { row: usize, value: String },

    /// A time-dependent feature was requested on a dataset without timestamps.
    #[error("Timestamps unavailable: {0}")]
    TimestampUnavailable(String),

    /// No file has been supplied yet. Not a failure; the dashboard stays idle.
    #[error("No upload provided")]
    UploadMissing,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
