//! Metric outputs: aggregate statistics, efficiency, heatmap grid, chart series

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Mean / min / max of one numeric column
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl AggregateStats {
    /// All-zero stats reported for absent optional columns
    pub const ZERO: AggregateStats = AggregateStats {
        mean: 0.0,
        min: 0.0,
        max: 0.0,
    };

    /// Stats over a non-empty sequence; `None` when there are no values.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return None;
        }

        // Clamp so floating-point summation error never puts the mean outside [min, max]
        let mean = (sum / count as f64).clamp(min, max);
        Some(Self { mean, min, max })
    }
}

/// Solids removal efficiency averaged over the rows that carry every input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyEstimate {
    /// Mean per-row efficiency (%)
    pub mean_pct: f64,
    /// Rows contributing to the mean
    pub rows_used: usize,
    /// Rows skipped because an input was missing
    pub rows_excluded: usize,
}

impl EfficiencyEstimate {
    /// Pie chart split: (removed solids, losses)
    pub fn pie_split(&self) -> (f64, f64) {
        (self.mean_pct, 100.0 - self.mean_pct)
    }
}

/// Dense (calendar day x hour-of-day) grid of bucket means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMatrix {
    /// Every calendar day from the first to the last observed, inclusive
    pub days: Vec<NaiveDate>,
    /// `cells[d][h]` is the mean for `days[d]` at hour `h`; empty buckets are 0
    pub cells: Vec<[f64; 24]>,
}

impl HeatmapMatrix {
    /// Cell value, or `None` when the day is outside the grid or `hour > 23`.
    pub fn at(&self, day: NaiveDate, hour: u32) -> Option<f64> {
        let h = usize::try_from(hour).ok().filter(|h| *h < 24)?;
        let d = self.days.iter().position(|x| *x == day)?;
        self.cells.get(d).map(|row| row[h])
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Sum of every cell
    pub fn total(&self) -> f64 {
        self.cells.iter().flat_map(|row| row.iter()).sum()
    }
}

/// One point of a time-ordered chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Named time series handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_over_values() {
        let stats = AggregateStats::from_values([3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stats_over_nothing_is_none() {
        assert!(AggregateStats::from_values(std::iter::empty()).is_none());
    }

    #[test]
    fn identical_values_keep_mean_within_bounds() {
        let stats = AggregateStats::from_values([0.1; 10]).unwrap();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
    }

    #[test]
    fn pie_split_sums_to_hundred() {
        let est = EfficiencyEstimate {
            mean_pct: 62.5,
            rows_used: 4,
            rows_excluded: 0,
        };
        let (removed, losses) = est.pie_split();
        assert!((removed + losses - 100.0).abs() < 1e-12);
    }

    #[test]
    fn heatmap_lookup_rejects_bad_hour() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let matrix = HeatmapMatrix {
            days: vec![day],
            cells: vec![[1.0; 24]],
        };
        assert_eq!(matrix.at(day, 23), Some(1.0));
        assert_eq!(matrix.at(day, 24), None);
        assert_eq!(matrix.at(day.succ_opt().unwrap(), 0), None);
    }
}
