//! Shaker Monitor: shaker and mud-screen telemetry dashboard engine
//!
//! Turns an uploaded CSV of drilling sensor data into KPIs, chart series,
//! screen advisories and a paginated data table for a presentation layer.
//!
//! ## Architecture
//!
//! - **Ingest**: CSV loading, column mapping and schema normalization
//! - **Metrics**: aggregate statistics, removal efficiency, heatmap, tail windows
//! - **Advisory**: aggregate alert rules and per-row screen classification
//! - **Dashboard**: session pipeline, feature isolation, pagination, upload cache

pub mod config;
pub mod error;
pub mod types;
pub mod ingest;
pub mod metrics;
pub mod advisory;
pub mod dashboard;

// Re-export dashboard configuration
pub use config::{ConfigError, DashboardConfig};

// Re-export errors
pub use error::{DashboardError, Result};

// Re-export commonly used types
pub use types::{
    AdvisoryThresholds, AggregateStats, Alert, AlertKind, EfficiencyEstimate, HeatmapMatrix,
    MeshType, MetricColumn, NormalizedDataset, RowFlag, ShakerRecord,
};

// Re-export the pipeline entry points
pub use advisory::AdvisoryEngine;
pub use dashboard::{DashboardReport, DashboardSession, DashboardState, FeatureResult, PageSize};
pub use ingest::{normalize, read_table, NormalizerOptions, Upload};
