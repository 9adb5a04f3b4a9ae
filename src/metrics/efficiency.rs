//! Solids removal efficiency
//!
//! Per row: `in_rate = WOB * flow / 100`, `out_rate = shaker %`,
//! `efficiency = out_rate / (in_rate + EFFICIENCY_EPSILON) * 100`.
//! A zero input rate yields a large but finite ratio, never a division error.

use crate::error::{DashboardError, Result};
use crate::types::{EfficiencyEstimate, MetricColumn, NormalizedDataset, EFFICIENCY_EPSILON};

/// Efficiency for a single row (%)
pub fn row_efficiency(weight_on_bit: f64, flow_rate: f64, shaker_pct: f64) -> f64 {
    let in_rate = weight_on_bit * flow_rate / 100.0;
    shaker_pct / (in_rate + EFFICIENCY_EPSILON) * 100.0
}

/// Mean row efficiency over rows carrying WOB, flow rate and primary shaker.
///
/// Rows missing any input are excluded from the mean, not counted as zero.
/// Fails with `MissingColumn` only when an input column is absent entirely.
pub fn solids_removal_efficiency(dataset: &NormalizedDataset) -> Result<EfficiencyEstimate> {
    let missing: Vec<&str> = [
        MetricColumn::WeightOnBit,
        MetricColumn::FlowRate,
        MetricColumn::PrimaryShaker,
    ]
    .into_iter()
    .filter(|c| !dataset.has_column(*c))
    .map(MetricColumn::label)
    .collect();

    if !missing.is_empty() {
        return Err(DashboardError::MissingColumn(missing.join(", ")));
    }

    let mut sum = 0.0;
    let mut rows_used = 0usize;

    for rec in dataset.records() {
        let inputs = (
            rec.weight_on_bit,
            rec.flow_rate,
            dataset.value(rec, MetricColumn::PrimaryShaker),
        );
        if let (Some(wob), Some(flow), Some(shaker)) = inputs {
            sum += row_efficiency(wob, flow, shaker);
            rows_used += 1;
        }
    }

    let mean_pct = if rows_used == 0 {
        0.0
    } else {
        sum / rows_used as f64
    };

    Ok(EfficiencyEstimate {
        mean_pct,
        rows_used,
        rows_excluded: dataset.len() - rows_used,
    })
}
