//! Dashboard report assembly
//!
//! Every feature is computed independently. A feature that cannot be built
//! from the upload becomes `FeatureResult::Unavailable` with a readable
//! reason; the rest of the report is unaffected.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::advisory::{diagnostic_points, AdvisoryEngine};
use crate::error::Result;
use crate::ingest::UploadInfo;
use crate::metrics::{aggregate, heatmap, realtime_series, solids_removal_efficiency};
use crate::types::{
    AdvisoryThresholds, AggregateStats, Alert, DiagnosticPoint, EfficiencyEstimate, FlagCounts,
    HeatmapMatrix, MeshType, MetricColumn, NormalizedDataset, TimeSeries, TimestampStatus,
    UtilizationSource,
};

/// Outcome of one dashboard feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FeatureResult<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> FeatureResult<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, FeatureResult::Available(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            FeatureResult::Available(v) => Some(v),
            FeatureResult::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FeatureResult::Available(_) => None,
            FeatureResult::Unavailable { reason } => Some(reason),
        }
    }
}

/// Headline KPIs for the overview block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryKpis {
    /// Deepest reading of the resolved depth column (ft)
    pub depth_drilled_ft: f64,
    pub shaker: AggregateStats,
    pub screen_utilization: AggregateStats,
    pub avg_flow_rate_gpm: f64,
}

/// Efficiency pie: removed solids vs losses (%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPie {
    pub estimate: EfficiencyEstimate,
    pub removed_pct: f64,
    pub losses_pct: f64,
}

/// Per-row flags and the diagnostic scatter built from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub counts: FlagCounts,
    /// Flow rate vs utilization points; unavailable without flow rate
    pub scatter: FeatureResult<Vec<DiagnosticPoint>>,
}

/// Everything the presentation layer needs for one upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub upload: UploadInfo,
    pub mesh: MeshType,
    pub thresholds: AdvisoryThresholds,
    pub timestamps: TimestampStatus,
    pub utilization_source: UtilizationSource,
    pub summary: FeatureResult<SummaryKpis>,
    pub alerts: FeatureResult<Vec<Alert>>,
    pub realtime: FeatureResult<TimeSeries>,
    pub efficiency: FeatureResult<EfficiencyPie>,
    pub heatmap: FeatureResult<HeatmapMatrix>,
    pub diagnostics: FeatureResult<Diagnostics>,
    /// One line per unavailable feature, in report order
    pub warnings: Vec<String>,
}

/// Settings a report build needs beyond the dataset
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub mesh: MeshType,
    pub thresholds: AdvisoryThresholds,
    pub realtime_window: usize,
}

/// Turn a feature computation into a `FeatureResult`, logging and recording
/// a warning when it fails.
fn feature<T>(name: &str, result: Result<T>, warnings: &mut Vec<String>) -> FeatureResult<T> {
    match result {
        Ok(v) => FeatureResult::Available(v),
        Err(e) => {
            warn!(feature = name, reason = %e, "Feature unavailable");
            warnings.push(format!("{name} unavailable: {e}"));
            FeatureResult::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

fn summary_kpis(dataset: &NormalizedDataset) -> Result<SummaryKpis> {
    Ok(SummaryKpis {
        depth_drilled_ft: aggregate(dataset, MetricColumn::Depth)?.max,
        shaker: aggregate(dataset, MetricColumn::PrimaryShaker)?,
        screen_utilization: aggregate(dataset, MetricColumn::ScreenUtilization)?,
        avg_flow_rate_gpm: aggregate(dataset, MetricColumn::FlowRate)?.mean,
    })
}

fn alerts(dataset: &NormalizedDataset, engine: &AdvisoryEngine) -> Result<Vec<Alert>> {
    let screen = aggregate(dataset, MetricColumn::ScreenUtilization)?;
    let shaker = aggregate(dataset, MetricColumn::PrimaryShaker)?;
    Ok(engine.evaluate(&screen, &shaker))
}

fn efficiency_pie(dataset: &NormalizedDataset) -> Result<EfficiencyPie> {
    let estimate = solids_removal_efficiency(dataset)?;
    let (removed_pct, losses_pct) = estimate.pie_split();
    Ok(EfficiencyPie {
        estimate,
        removed_pct,
        losses_pct,
    })
}

fn diagnostics(dataset: &NormalizedDataset, engine: &AdvisoryEngine) -> Result<Diagnostics> {
    let flags = engine.classify_rows(dataset)?;
    let scatter = match diagnostic_points(dataset, &flags) {
        Ok(points) => FeatureResult::Available(points),
        Err(e) => FeatureResult::Unavailable {
            reason: e.to_string(),
        },
    };
    Ok(Diagnostics {
        counts: FlagCounts::tally(&flags),
        scatter,
    })
}

/// Build the full report for a normalized dataset.
pub fn build_report(
    dataset: &NormalizedDataset,
    upload: UploadInfo,
    options: &ReportOptions,
) -> DashboardReport {
    let engine = AdvisoryEngine::new(options.thresholds.clone());
    let mut warnings = Vec::new();

    let summary = feature("Summary", summary_kpis(dataset), &mut warnings);
    let alerts = feature("Screen advisor", alerts(dataset, &engine), &mut warnings);
    let realtime = feature(
        "Real-time chart",
        realtime_series(dataset, MetricColumn::PrimaryShaker, options.realtime_window),
        &mut warnings,
    );
    let efficiency = feature("Efficiency chart", efficiency_pie(dataset), &mut warnings);
    let heatmap = feature(
        "Heatmap",
        heatmap(dataset, MetricColumn::FlowRate),
        &mut warnings,
    );
    let diagnostics = feature("Diagnostics", diagnostics(dataset, &engine), &mut warnings);

    if let FeatureResult::Available(Diagnostics {
        scatter: FeatureResult::Unavailable { reason },
        ..
    }) = &diagnostics
    {
        warn!(feature = "Diagnostic scatter", reason = %reason, "Feature unavailable");
        warnings.push(format!("Diagnostic scatter unavailable: {reason}"));
    }

    DashboardReport {
        upload,
        mesh: options.mesh,
        thresholds: options.thresholds.clone(),
        timestamps: dataset.timestamp_status().clone(),
        utilization_source: dataset.utilization_source(),
        summary,
        alerts,
        realtime,
        efficiency,
        heatmap,
        diagnostics,
        warnings,
    }
}
