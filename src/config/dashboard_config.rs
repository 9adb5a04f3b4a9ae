//! Dashboard Configuration - mesh selection, advisory thresholds and display settings
//!
//! Each struct implements `Default` with values matching the built-in
//! constants, so a missing config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::ingest::column_names;
use crate::types::thresholds::shaker_thresholds;
use crate::types::{AdvisoryThresholds, MeshType};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a dashboard session.
///
/// Load with `DashboardConfig::load()` which searches:
/// 1. `$SHAKER_CONFIG` env var
/// 2. `./shaker_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Screen mesh selection
    #[serde(default)]
    pub mesh: MeshConfig,

    /// Advisory thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Column selection
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,

    /// Raw data table settings
    #[serde(default)]
    pub table: TableConfig,
}

impl DashboardConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SHAKER_CONFIG` environment variable
    /// 2. `./shaker_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), mesh = %config.mesh.mesh_type, "Loaded dashboard config from SHAKER_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SHAKER_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SHAKER_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./shaker_config.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(mesh = %config.mesh.mesh_type, "Loaded dashboard config from ./shaker_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./shaker_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No shaker_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Syntax(e) => ConfigError::Parse(path.to_path_buf(), e),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::Syntax)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate every setting, collecting all problems before failing.
    ///
    /// Rules:
    /// - Utilization threshold within [50, 100]
    /// - Thresholds finite and within 0-1000%
    /// - overload >= screen change
    /// - Page size one of 50 / 100 / 200, real-time window > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let mut errors: Vec<String> = Vec::new();

        let threshold = t.utilization_threshold;
        if !(shaker_thresholds::UTILIZATION_THRESHOLD_MIN
            ..=shaker_thresholds::UTILIZATION_THRESHOLD_MAX)
            .contains(&threshold)
        {
            errors.push(format!(
                "thresholds.utilization_threshold = {threshold} must be within [{}, {}]",
                shaker_thresholds::UTILIZATION_THRESHOLD_MIN,
                shaker_thresholds::UTILIZATION_THRESHOLD_MAX
            ));
        }

        Self::check_escalation(
            t.screen_change_utilization_pct,
            t.overload_utilization_pct,
            "thresholds.overload_utilization_pct",
            &mut errors,
        );

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_escalation(lower: f64, upper: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass; catch them explicitly
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got lower={lower}, upper={upper})"
            ));
            return;
        }
        if upper < lower {
            errors.push(format!("{name} ({upper:.1}) must be >= {lower:.1}"));
        }
    }

    /// Thresholds handed to the advisory engine
    pub fn advisory_thresholds(&self) -> AdvisoryThresholds {
        let t = &self.thresholds;
        AdvisoryThresholds {
            utilization_threshold: f64::from(t.utilization_threshold),
            screen_change_utilization: t.screen_change_utilization_pct,
            overload_utilization: t.overload_utilization_pct,
            shaker_overload: t.shaker_overload_pct,
            healthy_utilization_max: t.healthy_utilization_max_pct,
            healthy_shaker_max: t.healthy_shaker_max_pct,
        }
    }

    /// Rated capacity of the selected mesh (gal/min)
    pub fn mesh_capacity_gpm(&self) -> f64 {
        self.mesh.mesh_type.capacity_gpm()
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    /// TOML syntax or type error in a document without a file path
    Syntax(toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Syntax(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Mesh
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Screen mesh designation ("API 100", "API 140", "API 170", "API 200")
    #[serde(default)]
    pub mesh_type: MeshType,
}

// ============================================================================
// Advisory Thresholds
// ============================================================================

/// Advisory thresholds (all percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Operator utilization threshold. Elevated-utilization level for the
    /// blinding alert and the per-row warning rule.
    #[serde(default = "default_utilization_threshold")]
    pub utilization_threshold: u8,

    /// Mean utilization above this recommends a screen change.
    #[serde(default = "default_screen_change")]
    pub screen_change_utilization_pct: f64,

    /// Row utilization above this flags the row overloaded.
    #[serde(default = "default_overload_utilization")]
    pub overload_utilization_pct: f64,

    /// Shaker output above this counts as overload.
    #[serde(default = "default_shaker_overload")]
    pub shaker_overload_pct: f64,

    /// Mean utilization below this counts toward healthy operation.
    #[serde(default = "default_healthy_utilization")]
    pub healthy_utilization_max_pct: f64,

    /// Mean shaker output below this counts toward healthy operation.
    #[serde(default = "default_healthy_shaker")]
    pub healthy_shaker_max_pct: f64,
}

fn default_utilization_threshold() -> u8 { shaker_thresholds::UTILIZATION_THRESHOLD_DEFAULT }
fn default_screen_change() -> f64 { shaker_thresholds::SCREEN_CHANGE_UTILIZATION }
fn default_overload_utilization() -> f64 { shaker_thresholds::OVERLOAD_UTILIZATION }
fn default_shaker_overload() -> f64 { shaker_thresholds::SHAKER_OVERLOAD }
fn default_healthy_utilization() -> f64 { shaker_thresholds::HEALTHY_UTILIZATION_MAX }
fn default_healthy_shaker() -> f64 { shaker_thresholds::HEALTHY_SHAKER_MAX }

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            utilization_threshold: default_utilization_threshold(),
            screen_change_utilization_pct: default_screen_change(),
            overload_utilization_pct: default_overload_utilization(),
            shaker_overload_pct: default_shaker_overload(),
            healthy_utilization_max_pct: default_healthy_utilization(),
            healthy_shaker_max_pct: default_healthy_shaker(),
        }
    }
}

// ============================================================================
// Columns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Header of the shaker channel used for KPIs, charts and advisories
    #[serde(default = "default_primary_shaker")]
    pub primary_shaker: String,
}

fn default_primary_shaker() -> String {
    column_names::PRIMARY_SHAKER.to_string()
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            primary_shaker: default_primary_shaker(),
        }
    }
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Rows shown in the real-time shaker chart
    #[serde(default = "default_realtime_window")]
    pub realtime_window: usize,
}

fn default_realtime_window() -> usize { defaults::REALTIME_WINDOW_ROWS }

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            realtime_window: default_realtime_window(),
        }
    }
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page (50, 100 or 200)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Parsed uploads kept in the session cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_page_size() -> usize { defaults::DEFAULT_PAGE_SIZE }
fn default_cache_capacity() -> usize { defaults::UPLOAD_CACHE_CAPACITY }

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_capacity: default_cache_capacity(),
        }
    }
}
