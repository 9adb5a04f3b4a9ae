//! Schema Normalizer
//!
//! Turns a schema-less `RawTable` into a `NormalizedDataset` in a single
//! forward pass:
//!
//! 1. Map canonical columns (depth, flow rate, WOB, shaker channels, utilization)
//! 2. Build timestamps from the split date/time fields (or a direct column)
//! 3. Derive screen utilization when it is absent and derivable
//! 4. Stable sort by timestamp
//!
//! The result is never modified afterwards. A timestamp failure does not
//! abort normalization; it only marks the dataset as untimed so that
//! time-dependent features switch off.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::columns::{column_names, find_column, ColumnMap};
use crate::error::{DashboardError, Result};
use crate::types::{
    NormalizedDataset, RawTable, ShakerRecord, TimestampStatus, UtilizationSource,
};

/// Inputs the normalizer needs beyond the upload itself
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    /// Rated capacity of the selected screen mesh (gal/min)
    pub mesh_capacity_gpm: f64,
    /// Header of the primary shaker channel
    pub primary_shaker: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            mesh_capacity_gpm: crate::types::MeshType::default().capacity_gpm(),
            primary_shaker: column_names::PRIMARY_SHAKER.to_string(),
        }
    }
}

/// Normalize an upload. Never fails: missing pieces are recorded on the dataset.
pub fn normalize(table: &RawTable, options: &NormalizerOptions) -> NormalizedDataset {
    let map = ColumnMap::from_table(table, &options.primary_shaker);
    let column_summary = map.summary();
    info!(rows = table.len(), "{column_summary}");

    let (timestamps, timestamp_status) = match build_timestamp(table) {
        Ok((stamps, status)) => (Some(stamps), status),
        Err(e) => {
            warn!(error = %e, "Could not parse timestamp; time-based features disabled");
            (
                None,
                TimestampStatus::Unavailable {
                    reason: e.to_string(),
                },
            )
        }
    };

    let number = |rec: &crate::types::RawRecord, idx: Option<usize>| {
        idx.and_then(|i| rec.get(i)).and_then(crate::types::RawValue::as_f64)
    };

    let records: Vec<ShakerRecord> = table
        .records()
        .iter()
        .enumerate()
        .map(|(row, raw)| ShakerRecord {
            row,
            timestamp: timestamps.as_ref().and_then(|t| t.get(row).copied().flatten()),
            depth: number(raw, map.depth),
            flow_rate: number(raw, map.flow_rate),
            weight_on_bit: number(raw, map.weight_on_bit),
            shakers: map
                .shakers
                .iter()
                .map(|(_, idx)| number(raw, Some(*idx)))
                .collect(),
            screen_utilization_pct: number(raw, map.screen_utilization),
            solids_volume_rate: None,
            raw: raw.clone(),
        })
        .collect();

    let dataset = NormalizedDataset {
        headers: table.headers().to_vec(),
        shaker_channels: map.shakers.iter().map(|(h, _)| h.clone()).collect(),
        primary_shaker: map.primary_shaker,
        depth_column: map.depth.map(|i| table.headers()[i].clone()),
        has_flow_rate: map.flow_rate.is_some(),
        has_weight_on_bit: map.weight_on_bit.is_some(),
        utilization: if map.screen_utilization.is_some() {
            UtilizationSource::Reported
        } else {
            UtilizationSource::Unavailable
        },
        timestamps: timestamp_status,
        column_summary,
        records,
    };

    let dataset = derive_screen_utilization(dataset, options.mesh_capacity_gpm);
    sort_by_timestamp(dataset)
}

/// Combine the date and time fields (single space separator) into timestamps.
///
/// Falls back to a ready-made `Timestamp` column when the split fields are
/// absent. A row with a blank date or time cell gets no timestamp; any
/// non-blank value that fails to parse fails the whole column, as does a
/// column with no usable value at all.
pub fn build_timestamp(
    table: &RawTable,
) -> Result<(Vec<Option<NaiveDateTime>>, TimestampStatus)> {
    let headers = table.headers();

    let (stamps, status) = if let (Some(d), Some(t)) = (
        find_column(headers, column_names::DATE),
        find_column(headers, column_names::TIME),
    ) {
        let stamps = table
            .records()
            .iter()
            .enumerate()
            .map(|(row, rec)| match (rec.text(d), rec.text(t)) {
                (Some(date), Some(time)) => {
                    let joined = format!("{date} {time}");
                    parse_datetime(&joined)
                        .map(Some)
                        .ok_or(DashboardError::TimestampParse { row, value: joined })
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        let status = TimestampStatus::Combined {
            date_column: headers[d].clone(),
            time_column: headers[t].clone(),
        };
        (stamps, status)
    } else if let Some(c) = find_column(headers, column_names::TIMESTAMP) {
        let stamps = table
            .records()
            .iter()
            .enumerate()
            .map(|(row, rec)| match rec.text(c) {
                Some(value) => parse_datetime(&value)
                    .map(Some)
                    .ok_or(DashboardError::TimestampParse { row, value }),
                None => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        let status = TimestampStatus::Direct {
            column: headers[c].clone(),
        };
        (stamps, status)
    } else {
        return Err(DashboardError::MissingColumn(format!(
            "{} + {} or {}",
            column_names::DATE,
            column_names::TIME,
            column_names::TIMESTAMP
        )));
    };

    let blank = stamps.iter().filter(|s| s.is_none()).count();
    if !stamps.is_empty() && blank == stamps.len() {
        return Err(DashboardError::TimestampUnavailable(
            "every row has a blank date or time".to_string(),
        ));
    }
    if blank > 0 {
        warn!(rows = blank, "Rows with blank date/time have no timestamp");
    }

    Ok((stamps, status))
}

/// Parse the datetime layouts rig exports use. Zoned values are converted to UTC.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_utc());
    }

    for fmt in &[
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S%.f",
        "%m/%d/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    None
}

/// Add `screen_utilization_pct` (and the solids volume rate behind it).
///
/// `solids_volume_rate = weight_on_bit * flow_rate / 100` and
/// `screen_utilization_pct = solids_volume_rate / mesh_capacity * 100`.
///
/// Leaves the dataset untouched when utilization is already present (reported
/// or previously derived), when either prerequisite column is missing, or
/// when the capacity is not a positive number.
pub fn derive_screen_utilization(
    mut dataset: NormalizedDataset,
    mesh_capacity_gpm: f64,
) -> NormalizedDataset {
    if dataset.utilization.is_available() {
        debug!(source = ?dataset.utilization, "Screen utilization already present");
        return dataset;
    }

    if !dataset.has_weight_on_bit || !dataset.has_flow_rate {
        info!(
            wob = dataset.has_weight_on_bit,
            flow = dataset.has_flow_rate,
            "Screen utilization absent and not derivable"
        );
        return dataset;
    }

    if !(mesh_capacity_gpm.is_finite() && mesh_capacity_gpm > 0.0) {
        warn!(capacity = mesh_capacity_gpm, "Invalid mesh capacity; utilization not derived");
        return dataset;
    }

    for rec in &mut dataset.records {
        let solids = match (rec.weight_on_bit, rec.flow_rate) {
            (Some(wob), Some(flow)) => Some(wob * flow / 100.0),
            _ => None,
        };
        rec.solids_volume_rate = solids;
        rec.screen_utilization_pct = solids.map(|v| v / mesh_capacity_gpm * 100.0);
    }

    dataset.utilization = UtilizationSource::Derived { mesh_capacity_gpm };
    info!(capacity_gpm = mesh_capacity_gpm, "Derived screen utilization from WOB and flow rate");
    dataset
}

/// Stable ascending sort by timestamp. Rows without a timestamp go last;
/// untimed datasets keep upload order.
pub fn sort_by_timestamp(mut dataset: NormalizedDataset) -> NormalizedDataset {
    if dataset.timestamps.is_available() {
        dataset
            .records
            .sort_by_key(|r| (r.timestamp.is_none(), r.timestamp));
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::csv_loader::read_table;
    use crate::types::MetricColumn;

    fn load(csv: &str) -> RawTable {
        read_table(csv.as_bytes()).unwrap().table
    }

    fn options(capacity: f64) -> NormalizerOptions {
        NormalizerOptions {
            mesh_capacity_gpm: capacity,
            ..Default::default()
        }
    }

    #[test]
    fn test_derived_utilization_scenario() {
        let table = load(
            "YYYY/MM/DD,HH:MM:SS,Weight on Bit (klbs),MA_Flow_Rate (gal/min)\n\
             2024/01/01,00:00:00,10,100\n\
             2024/01/01,00:01:00,20,100\n",
        );
        let ds = normalize(&table, &options(200.0));
        let util: Vec<f64> = ds.column_values(MetricColumn::ScreenUtilization).collect();
        assert_eq!(util.len(), 2);
        assert!((util[0] - 5.0).abs() < 1e-9);
        assert!((util[1] - 10.0).abs() < 1e-9);
        assert_eq!(
            ds.utilization_source(),
            UtilizationSource::Derived { mesh_capacity_gpm: 200.0 }
        );
        let solids: Vec<f64> = ds.column_values(MetricColumn::SolidsVolumeRate).collect();
        assert_eq!(solids, vec![10.0, 20.0]);
    }

    #[test]
    fn test_reported_utilization_is_not_recomputed() {
        let table = load(
            "Weight on Bit (klbs),MA_Flow_Rate (gal/min),Screen Utilization (%)\n\
             10,100,42\n\
             20,100,43\n",
        );
        let ds = normalize(&table, &options(200.0));
        let again = derive_screen_utilization(ds.clone(), 120.0);
        assert_eq!(ds, again);
        let util: Vec<f64> = again.column_values(MetricColumn::ScreenUtilization).collect();
        assert_eq!(util, vec![42.0, 43.0]);
    }

    #[test]
    fn test_derivation_happens_once() {
        let table = load("Weight on Bit (klbs),MA_Flow_Rate (gal/min)\n10,100\n");
        let ds = normalize(&table, &options(200.0));
        let again = derive_screen_utilization(ds.clone(), 100.0);
        assert_eq!(ds, again);
    }

    #[test]
    fn test_utilization_unavailable_without_wob() {
        let table = load("MA_Flow_Rate (gal/min)\n100\n");
        let ds = normalize(&table, &options(200.0));
        assert_eq!(ds.utilization_source(), UtilizationSource::Unavailable);
        assert!(!ds.has_column(MetricColumn::ScreenUtilization));
    }

    #[test]
    fn test_sorted_by_timestamp_stable_for_ties() {
        let table = load(
            "YYYY/MM/DD,HH:MM:SS,SHAKER #3 (PERCENT)\n\
             2024/01/02,08:00:00,1\n\
             2024/01/01,09:00:00,2\n\
             2024/01/01,09:00:00,3\n\
             2024/01/01,07:30:00,4\n",
        );
        let ds = normalize(&table, &NormalizerOptions::default());
        let order: Vec<usize> = ds.records().iter().map(|r| r.row).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
        assert!(matches!(ds.timestamp_status(), TimestampStatus::Combined { .. }));
    }

    #[test]
    fn test_malformed_timestamp_keeps_upload_order() {
        let table = load(
            "YYYY/MM/DD,HH:MM:SS,SHAKER #3 (PERCENT)\n\
             2024/01/02,08:00:00,1\n\
             not-a-date,09:00:00,2\n",
        );
        let ds = normalize(&table, &NormalizerOptions::default());
        assert!(!ds.has_timestamps());
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].row, 0);
        assert!(ds.records().iter().all(|r| r.timestamp.is_none()));
        let shaker: Vec<f64> = ds.column_values(MetricColumn::PrimaryShaker).collect();
        assert_eq!(shaker, vec![1.0, 2.0]);
    }

    #[test]
    fn test_build_timestamp_reports_row() {
        let table = load("YYYY/MM/DD,HH:MM:SS\n2024/01/01,00:00:00\n2024/01/01,25:61:00\n");
        match build_timestamp(&table) {
            Err(DashboardError::TimestampParse { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "2024/01/01 25:61:00");
            }
            other => panic!("expected TimestampParse, got {other:?}"),
        }
    }

    #[test]
    fn test_build_timestamp_direct_column() {
        let table = load("Timestamp\n2024-03-05 14:15:16\n");
        let (stamps, status) = build_timestamp(&table).unwrap();
        assert_eq!(stamps[0].map(|t| t.to_string()).as_deref(), Some("2024-03-05 14:15:16"));
        assert!(matches!(status, TimestampStatus::Direct { .. }));
    }

    #[test]
    fn test_blank_time_cell_leaves_only_that_row_untimed() {
        let table = load(
            "YYYY/MM/DD,HH:MM:SS,SHAKER #3 (PERCENT)\n\
             2024/05/01,02:00:00,20\n\
             2024/05/01,,30\n\
             2024/05/01,01:00:00,10\n",
        );
        let ds = normalize(&table, &NormalizerOptions::default());
        assert!(ds.has_timestamps());
        let order: Vec<usize> = ds.records().iter().map(|r| r.row).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert!(ds.records()[2].timestamp.is_none());
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn test_all_blank_timestamps_unavailable() {
        let table = load("Timestamp,SHAKER #3 (PERCENT)\n,10\nnan,20\n");
        assert!(matches!(
            build_timestamp(&table),
            Err(DashboardError::TimestampUnavailable(_))
        ));
        let ds = normalize(&table, &NormalizerOptions::default());
        assert!(!ds.has_timestamps());
    }

    #[test]
    fn test_column_summary_kept_on_dataset() {
        let table = load("Bit Depth (feet),SHAKER #3 (PERCENT)\n1000,50\n");
        let ds = normalize(&table, &NormalizerOptions::default());
        assert!(ds.column_summary().contains("DEPTH"));
        assert!(ds.column_summary().contains("Missing: [TIMESTAMP"));
    }

    #[test]
    fn test_build_timestamp_missing_columns() {
        let table = load("SHAKER #3 (PERCENT)\n50\n");
        assert!(matches!(
            build_timestamp(&table),
            Err(DashboardError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024/01/01 12:30:00").is_some());
        assert!(parse_datetime("2024/01/01 12:30").is_some());
        assert!(parse_datetime("2024-01-01T12:30:00").is_some());
        assert!(parse_datetime("2024-01-01T12:30:00+02:00").is_some());
        assert!(parse_datetime("01/31/2024 12:30:00").is_some());
        assert!(parse_datetime("nan").is_none());
        assert!(parse_datetime(" ").is_none());
    }
}
