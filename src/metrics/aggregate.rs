//! Aggregate statistics over canonical columns

use crate::error::{DashboardError, Result};
use crate::types::{AggregateStats, ColumnRequirement, MetricColumn, NormalizedDataset};

/// Mean / min / max of a canonical column over the whole dataset.
///
/// Mandatory columns (depth, primary shaker) fail with `ColumnNotFound` when
/// absent and `EmptyColumn` when they carry no numeric values. Optional
/// columns report `AggregateStats::ZERO` in both situations.
pub fn aggregate(dataset: &NormalizedDataset, column: MetricColumn) -> Result<AggregateStats> {
    let requirement = column.requirement();

    if !dataset.has_column(column) {
        return match requirement {
            ColumnRequirement::Mandatory => {
                Err(DashboardError::ColumnNotFound(column.label().to_string()))
            }
            ColumnRequirement::Optional => Ok(AggregateStats::ZERO),
        };
    }

    match AggregateStats::from_values(dataset.column_values(column)) {
        Some(stats) => Ok(stats),
        None => match requirement {
            ColumnRequirement::Mandatory => {
                Err(DashboardError::EmptyColumn(column.label().to_string()))
            }
            ColumnRequirement::Optional => Ok(AggregateStats::ZERO),
        },
    }
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
    fn test_shaker_stats_ordered() {
        let ds = dataset("SHAKER #3 (PERCENT)\n40\n97.5\n61\n12\n");
        let stats = aggregate(&ds, MetricColumn::PrimaryShaker).unwrap();
        assert_eq!(stats.min, 12.0);
        assert_eq!(stats.max, 97.5);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!((stats.mean - 52.625).abs() < 1e-9);
    }

    #[test]
    fn test_missing_mandatory_column_errors() {
        let ds = dataset("MA_Flow_Rate (gal/min)\n500\n");
        assert!(matches!(
            aggregate(&ds, MetricColumn::PrimaryShaker),
            Err(DashboardError::ColumnNotFound(_))
        ));
        assert!(matches!(
            aggregate(&ds, MetricColumn::Depth),
            Err(DashboardError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_missing_optional_column_is_zero() {
        let ds = dataset("SHAKER #3 (PERCENT)\n50\n");
        assert_eq!(
            aggregate(&ds, MetricColumn::ScreenUtilization).unwrap(),
            AggregateStats::ZERO
        );
        assert_eq!(
            aggregate(&ds, MetricColumn::FlowRate).unwrap(),
            AggregateStats::ZERO
        );
    }

    #[test]
    fn test_empty_mandatory_column_errors() {
        let ds = dataset("SHAKER #3 (PERCENT),Bit Depth (feet)\n,1000\nNaN,1010\n");
        assert!(matches!(
            aggregate(&ds, MetricColumn::PrimaryShaker),
            Err(DashboardError::EmptyColumn(_))
        ));
        let depth = aggregate(&ds, MetricColumn::Depth).unwrap();
        assert_eq!(depth.max, 1010.0);
    }

    #[test]
    fn test_sparse_values_skip_blanks() {
        let ds = dataset("Screen Utilization (%)\n80\n\n90\nNaN\n");
        let stats = aggregate(&ds, MetricColumn::ScreenUtilization).unwrap();
        assert!((stats.mean - 85.0).abs() < 1e-9);
    }
}
