//! Metric Calculator
//!
//! Pure functions over a `NormalizedDataset`. Nothing here mutates the
//! dataset or logs above debug level; callers decide what to surface.
//!
//! - `aggregate()` - mean/min/max with per-column missing-data policy
//! - `solids_removal_efficiency()` - WOB/flow/shaker removal ratio
//! - `heatmap()` - dense day x hour bucket means
//! - `tail()` / `realtime_series()` - bounded windows for live-style charts

pub mod aggregate;
pub mod efficiency;
pub mod heatmap;

pub use aggregate::aggregate;
pub use efficiency::{row_efficiency, solids_removal_efficiency};
pub use heatmap::heatmap;

use crate::error::{DashboardError, Result};
use crate::types::{
    MetricColumn, NormalizedDataset, SeriesPoint, ShakerRecord, TimeSeries, TimestampStatus,
};

/// Last `n` rows in dataset order (chronological when timestamps exist).
pub fn tail(dataset: &NormalizedDataset, n: usize) -> &[ShakerRecord] {
    let records = dataset.records();
    &records[records.len().saturating_sub(n)..]
}

/// Time series of `column` over the last `window` rows.
///
/// Requires timestamps, since the points are plotted against time. Rows in
/// the window without a value for the column are left out of the series.
pub fn realtime_series(
    dataset: &NormalizedDataset,
    column: MetricColumn,
    window: usize,
) -> Result<TimeSeries> {
    if let TimestampStatus::Unavailable { reason } = dataset.timestamp_status() {
        return Err(DashboardError::TimestampUnavailable(reason.clone()));
    }
    if !dataset.has_column(column) {
        return Err(DashboardError::MissingColumn(column.label().to_string()));
    }

    let points = tail(dataset, window)
        .iter()
        .filter_map(|rec| {
            Some(SeriesPoint {
                timestamp: rec.timestamp?,
                value: dataset.value(rec, column)?,
            })
        })
        .collect();

    let name = match column {
        MetricColumn::PrimaryShaker => dataset
            .primary_shaker_channel()
            .unwrap_or(column.label())
            .to_string(),
        other => other.label().to_string(),
    };

    Ok(TimeSeries { name, points })
}
