//! Per-row screen classification

use crate::error::{DashboardError, Result};
use crate::types::{
    AdvisoryThresholds, DiagnosticPoint, MetricColumn, NormalizedDataset, RowFlag,
};

/// Classify one row. The most severe matching flag wins.
///
/// - utilization above the overload level -> `Overloaded`
/// - utilization above the operator threshold with shaker above the
///   overload level -> `Warning`
/// - otherwise `Normal`
///
/// A row without a shaker reading can still be overloaded but never warned.
pub fn classify(
    screen_utilization_pct: f64,
    shaker_pct: Option<f64>,
    thresholds: &AdvisoryThresholds,
) -> RowFlag {
    let mut flag = RowFlag::Normal;

    if screen_utilization_pct > thresholds.utilization_threshold
        && shaker_pct.is_some_and(|s| s > thresholds.shaker_overload)
    {
        flag = flag.max(RowFlag::Warning);
    }
    if screen_utilization_pct > thresholds.overload_utilization {
        flag = flag.max(RowFlag::Overloaded);
    }

    flag
}

/// Flag every row of the dataset, aligned with `dataset.records()`.
///
/// Rows without a utilization value are `Normal`. Fails with `MissingColumn`
/// when the dataset has no utilization at all (neither reported nor derived).
pub fn classify_rows(
    dataset: &NormalizedDataset,
    thresholds: &AdvisoryThresholds,
) -> Result<Vec<RowFlag>> {
    if !dataset.has_column(MetricColumn::ScreenUtilization) {
        return Err(DashboardError::MissingColumn(
            MetricColumn::ScreenUtilization.label().to_string(),
        ));
    }

    Ok(dataset
        .records()
        .iter()
        .map(|rec| match rec.screen_utilization_pct {
            Some(util) => classify(
                util,
                dataset.value(rec, MetricColumn::PrimaryShaker),
                thresholds,
            ),
            None => RowFlag::Normal,
        })
        .collect())
}

/// Flow rate vs utilization points for the diagnostic scatter.
///
/// `flags` must be the output of `classify_rows` for the same dataset. Rows
/// missing either axis are left out.
pub fn diagnostic_points(
    dataset: &NormalizedDataset,
    flags: &[RowFlag],
) -> Result<Vec<DiagnosticPoint>> {
    let missing: Vec<&str> = [MetricColumn::FlowRate, MetricColumn::ScreenUtilization]
        .into_iter()
        .filter(|c| !dataset.has_column(*c))
        .map(MetricColumn::label)
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumn(missing.join(", ")));
    }

    Ok(dataset
        .records()
        .iter()
        .zip(flags)
        .filter_map(|(rec, flag)| {
            Some(DiagnosticPoint {
                row: rec.row,
                flow_rate: rec.flow_rate?,
                screen_utilization_pct: rec.screen_utilization_pct?,
                flag: *flag,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{normalize, read_table, NormalizerOptions};

    fn dataset(csv: &str) -> NormalizedDataset {
        let table = read_table(csv.as_bytes()).unwrap().table;
        normalize(&table, &NormalizerOptions::default())
    }

    #[test]
    fn test_warning_when_shaker_overloaded_and_utilization_elevated() {
        let t = AdvisoryThresholds::default();
        assert_eq!(classify(85.0, Some(96.0), &t), RowFlag::Warning);
    }

    #[test]
    fn test_overloaded_beats_warning() {
        let t = AdvisoryThresholds::default();
        assert_eq!(classify(95.0, Some(96.0), &t), RowFlag::Overloaded);
        assert_eq!(classify(91.0, Some(10.0), &t), RowFlag::Overloaded);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let t = AdvisoryThresholds::default();
        assert_eq!(classify(90.0, Some(50.0), &t), RowFlag::Normal);
        assert_eq!(classify(80.0, Some(99.0), &t), RowFlag::Normal);
        assert_eq!(classify(85.0, Some(95.0), &t), RowFlag::Normal);
    }

    #[test]
    fn test_missing_shaker_never_warns() {
        let t = AdvisoryThresholds::default();
        assert_eq!(classify(85.0, None, &t), RowFlag::Normal);
        assert_eq!(classify(92.0, None, &t), RowFlag::Overloaded);
    }

    #[test]
    fn test_threshold_slider_moves_warning_boundary() {
        let t = AdvisoryThresholds {
            utilization_threshold: 70.0,
            ..AdvisoryThresholds::default()
        };
        assert_eq!(classify(75.0, Some(96.0), &t), RowFlag::Warning);
    }

    #[test]
    fn test_classify_rows_aligned_with_records() {
        let ds = dataset(
            "Screen Utilization (%),SHAKER #3 (PERCENT),MA_Flow_Rate (gal/min)\n\
             50,40,400\n\
             85,96,500\n\
             95,20,\n\
             ,99,450\n",
        );
        let t = AdvisoryThresholds::default();
        let flags = classify_rows(&ds, &t).unwrap();
        assert_eq!(
            flags,
            vec![
                RowFlag::Normal,
                RowFlag::Warning,
                RowFlag::Overloaded,
                RowFlag::Normal
            ]
        );

        let points = diagnostic_points(&ds, &flags).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].row, 1);
        assert_eq!(points[1].flag, RowFlag::Warning);
        assert_eq!(points[1].flow_rate, 500.0);
    }

    #[test]
    fn test_classify_rows_without_utilization() {
        let ds = dataset("SHAKER #3 (PERCENT)\n50\n");
        assert!(matches!(
            classify_rows(&ds, &AdvisoryThresholds::default()),
            Err(DashboardError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_diagnostics_need_flow_rate() {
        let ds = dataset("Screen Utilization (%)\n50\n");
        let flags = classify_rows(&ds, &AdvisoryThresholds::default()).unwrap();
        match diagnostic_points(&ds, &flags) {
            Err(DashboardError::MissingColumn(cols)) => assert_eq!(cols, "flow_rate"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
