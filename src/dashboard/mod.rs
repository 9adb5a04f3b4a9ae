//! Dashboard Session - one upload in, one report out
//!
//! ```text
//! PHASE 1: Upload check (no file or blank file -> Idle)
//! PHASE 2: CSV parse (cached by content digest)
//! PHASE 3: Schema normalization (timestamps, derived utilization, sort)
//! PHASE 4: Metric calculation + advisory rules (per feature, isolated)
//! ```
//!
//! Single-threaded and synchronous. A new upload fully replaces the previous
//! report; only the parse cache carries over between runs.

pub mod cache;
pub mod pagination;
pub mod report;

pub use cache::UploadCache;
pub use pagination::{paginate, table_page, PageSize, PageWindow, TablePage};
pub use report::{
    build_report, DashboardReport, Diagnostics, EfficiencyPie, FeatureResult, ReportOptions,
    SummaryKpis,
};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::ingest::{normalize, NormalizerOptions, Upload, UploadInfo};
use crate::types::NormalizedDataset;

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "report", rename_all = "snake_case")]
pub enum DashboardState {
    /// Nothing to show yet; waiting for a file
    Idle,
    Ready(Box<DashboardReport>),
}

impl DashboardState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DashboardState::Idle)
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            DashboardState::Idle => None,
            DashboardState::Ready(report) => Some(report),
        }
    }
}

/// Session state: configuration plus the parse cache
pub struct DashboardSession {
    config: DashboardConfig,
    cache: UploadCache,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = UploadCache::new(config.table.cache_capacity);
        Self { config, cache }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &UploadCache {
        &self.cache
    }

    fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            mesh_capacity_gpm: self.config.mesh_capacity_gpm(),
            primary_shaker: self.config.columns.primary_shaker.clone(),
        }
    }

    /// Parse and normalize an upload.
    ///
    /// Fails with `UploadMissing` for a blank file and with `Csv` when the
    /// header itself cannot be read.
    pub fn load(&mut self, upload: &Upload) -> Result<(NormalizedDataset, UploadInfo)> {
        if upload.is_blank() {
            return Err(DashboardError::UploadMissing);
        }

        let parsed = self.cache.get_or_parse(upload)?;
        let options = self.normalizer_options();
        let dataset = normalize(&parsed.table, &options);

        let info = UploadInfo {
            name: upload.name.clone(),
            digest: upload.digest().to_string(),
            rows: dataset.len(),
            columns: parsed.table.headers().len(),
            error_rows: parsed.error_rows,
            columns_found: dataset.column_summary().to_string(),
        };

        Ok((dataset, info))
    }

    /// Run the full pipeline for an upload.
    ///
    /// No upload, a blank upload, or an upload with a header but no rows
    /// leaves the dashboard idle. An unreadable CSV is logged and also
    /// leaves it idle; it never aborts the session.
    pub fn run(&mut self, upload: Option<&Upload>) -> DashboardState {
        // PHASE 1: Upload check
        let Some(upload) = upload else {
            info!("No upload provided; dashboard idle");
            return DashboardState::Idle;
        };

        // PHASES 2-3: Parse + normalize
        let (dataset, info) = match self.load(upload) {
            Ok(loaded) => loaded,
            Err(DashboardError::UploadMissing) => {
                info!(file = %upload.name, "Upload is empty; dashboard idle");
                return DashboardState::Idle;
            }
            Err(e) => {
                warn!(file = %upload.name, error = %e, "Upload could not be read; dashboard idle");
                return DashboardState::Idle;
            }
        };

        if dataset.is_empty() {
            info!(file = %upload.name, "Upload has no data rows; dashboard idle");
            return DashboardState::Idle;
        }

        // PHASE 4: Metrics + advisories
        let options = ReportOptions {
            mesh: self.config.mesh.mesh_type,
            thresholds: self.config.advisory_thresholds(),
            realtime_window: self.config.charts.realtime_window,
        };
        let report = build_report(&dataset, info, &options);

        info!(
            file = %report.upload.name,
            rows = report.upload.rows,
            degraded = report.warnings.len(),
            "Dashboard report ready"
        );

        DashboardState::Ready(Box::new(report))
    }

    /// Render one page of the raw data table for an upload.
    ///
    /// Returns `None` when the upload has no rows to show.
    pub fn table(&mut self, upload: &Upload, page_size: PageSize, page: usize) -> Result<Option<TablePage>> {
        let (dataset, _) = match self.load(upload) {
            Ok(loaded) => loaded,
            Err(DashboardError::UploadMissing) => return Ok(None),
            Err(e) => return Err(e),
        };
        if dataset.is_empty() {
            return Ok(None);
        }
        Ok(Some(table_page(&dataset, page_size, page)))
    }
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
