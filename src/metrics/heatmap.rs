//! Day x hour heatmap bucketing

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};

use crate::error::{DashboardError, Result};
use crate::types::{HeatmapMatrix, MetricColumn, NormalizedDataset, TimestampStatus};

/// Bucket a column by (calendar date, hour of day) and average each bucket.
///
/// The grid is dense: every day from the first to the last observed
/// timestamp, hours 0..=23, with 0 in buckets that received no values.
/// Requires timestamps and the value column.
pub fn heatmap(dataset: &NormalizedDataset, value_column: MetricColumn) -> Result<HeatmapMatrix> {
    if let TimestampStatus::Unavailable { reason } = dataset.timestamp_status() {
        return Err(DashboardError::TimestampUnavailable(reason.clone()));
    }
    if !dataset.has_column(value_column) {
        return Err(DashboardError::MissingColumn(value_column.label().to_string()));
    }

    let mut buckets: BTreeMap<(NaiveDate, u32), (f64, usize)> = BTreeMap::new();
    let mut first_day: Option<NaiveDate> = None;
    let mut last_day: Option<NaiveDate> = None;

    for rec in dataset.records() {
        let Some(ts) = rec.timestamp else {
            continue;
        };
        let day = ts.date();
        first_day = Some(first_day.map_or(day, |d| d.min(day)));
        last_day = Some(last_day.map_or(day, |d| d.max(day)));

        if let Some(v) = dataset.value(rec, value_column) {
            let entry = buckets.entry((day, ts.hour())).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let (Some(first), Some(last)) = (first_day, last_day) else {
        return Ok(HeatmapMatrix {
            days: Vec::new(),
            cells: Vec::new(),
        });
    };

    let mut days = Vec::new();
    let mut cells = Vec::new();
    let mut day = Some(first);
    while let Some(d) = day.filter(|d| *d <= last) {
        let mut row = [0.0; 24];
        for (hour, cell) in row.iter_mut().enumerate() {
            // hour < 24 always fits in u32
            let key = (d, hour as u32);
            if let Some((sum, count)) = buckets.get(&key) {
                *cell = sum / *count as f64;
            }
        }
        days.push(d);
        cells.push(row);
        day = d.succ_opt();
    }

    tracing::debug!(
        column = %value_column,
        days = days.len(),
        filled = buckets.len(),
        "Heatmap built"
    );

    Ok(HeatmapMatrix { days, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{normalize, read_table, NormalizerOptions};

    fn dataset(csv: &str) -> NormalizedDataset {
        let table = read_table(csv.as_bytes()).unwrap().table;
        normalize(&table, &NormalizerOptions::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_bucket_equals_mean() {
        let ds = dataset(
            "YYYY/MM/DD,HH:MM:SS,MA_Flow_Rate (gal/min)\n\
             2024/02/10,14:00:00,500\n\
             2024/02/10,14:20:00,600\n\
             2024/02/10,14:59:59,700\n",
        );
        let m = heatmap(&ds, MetricColumn::FlowRate).unwrap();
        assert_eq!(m.day_count(), 1);
        assert!((m.at(date(2024, 2, 10), 14).unwrap() - 600.0).abs() < 1e-9);
        for hour in (0..24).filter(|h| *h != 14) {
            assert_eq!(m.at(date(2024, 2, 10), hour), Some(0.0));
        }
        assert!((m.total() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_is_dense_over_date_range() {
        let ds = dataset(
            "YYYY/MM/DD,HH:MM:SS,MA_Flow_Rate (gal/min)\n\
             2024/02/10,01:00:00,100\n\
             2024/02/13,23:00:00,300\n",
        );
        let m = heatmap(&ds, MetricColumn::FlowRate).unwrap();
        assert_eq!(m.days, vec![
            date(2024, 2, 10),
            date(2024, 2, 11),
            date(2024, 2, 12),
            date(2024, 2, 13),
        ]);
        assert_eq!(m.cells.len(), 4);
        assert_eq!(m.at(date(2024, 2, 11), 5), Some(0.0));
        assert_eq!(m.at(date(2024, 2, 13), 23), Some(300.0));
    }

    #[test]
    fn test_blank_values_do_not_dilute_bucket() {
        let ds = dataset(
            "YYYY/MM/DD,HH:MM:SS,MA_Flow_Rate (gal/min)\n\
             2024/02/10,08:00:00,400\n\
             2024/02/10,08:30:00,\n",
        );
        let m = heatmap(&ds, MetricColumn::FlowRate).unwrap();
        assert_eq!(m.at(date(2024, 2, 10), 8), Some(400.0));
    }

    #[test]
    fn test_requires_timestamps() {
        let ds = dataset("MA_Flow_Rate (gal/min)\n400\n");
        assert!(matches!(
            heatmap(&ds, MetricColumn::FlowRate),
            Err(DashboardError::TimestampUnavailable(_))
        ));
    }

    #[test]
    fn test_requires_value_column() {
        let ds = dataset("YYYY/MM/DD,HH:MM:SS\n2024/02/10,08:00:00\n");
        assert!(matches!(
            heatmap(&ds, MetricColumn::FlowRate),
            Err(DashboardError::MissingColumn(_))
        ));
    }
}
