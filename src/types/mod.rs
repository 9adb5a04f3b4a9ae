//! Shared data structures for the shaker dashboard pipeline
//!
//! - Ingestion: RawTable / RawRecord (upload as-is)
//! - Normalization: NormalizedDataset / ShakerRecord
//! - Metrics: AggregateStats, EfficiencyEstimate, HeatmapMatrix, TimeSeries
//! - Advisory: RowFlag, Alert, DiagnosticPoint

mod dataset;
mod metrics;
mod advisory;
pub mod thresholds;

pub use dataset::*;
pub use metrics::*;
pub use advisory::*;
pub use thresholds::*;
