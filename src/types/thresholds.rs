//! Advisory thresholds, mesh capacities and fixed numerical constants

use serde::{Deserialize, Serialize};

/// Built-in advisory thresholds. `AdvisoryThresholds::default()` mirrors these.
pub mod shaker_thresholds {
    // === Aggregate Alerts ===
    /// Mean screen utilization above this recommends a screen change (%)
    pub const SCREEN_CHANGE_UTILIZATION: f64 = 85.0;
    /// Shaker output above this is treated as overload territory (%)
    pub const SHAKER_OVERLOAD: f64 = 95.0;
    /// Mean utilization below this counts toward healthy operation (%)
    pub const HEALTHY_UTILIZATION_MAX: f64 = 75.0;
    /// Mean shaker output below this counts toward healthy operation (%)
    pub const HEALTHY_SHAKER_MAX: f64 = 70.0;

    // === Per-Row Classification ===
    /// Row utilization above this is flagged overloaded (%)
    pub const OVERLOAD_UTILIZATION: f64 = 90.0;

    // === Operator Threshold ===
    /// Default utilization threshold slider value (%)
    pub const UTILIZATION_THRESHOLD_DEFAULT: u8 = 80;
    /// Lowest permitted utilization threshold (%)
    pub const UTILIZATION_THRESHOLD_MIN: u8 = 50;
    /// Highest permitted utilization threshold (%)
    pub const UTILIZATION_THRESHOLD_MAX: u8 = 100;
}

/// Guards the efficiency ratio against a zero input rate. Not tunable.
pub const EFFICIENCY_EPSILON: f64 = 1e-5;

/// Screen mesh designation with its rated throughput
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MeshType {
    #[serde(rename = "API 100")]
    Api100,
    #[serde(rename = "API 140")]
    Api140,
    #[serde(rename = "API 170")]
    Api170,
    #[serde(rename = "API 200")]
    Api200,
}

impl MeshType {
    pub const ALL: [MeshType; 4] = [
        MeshType::Api100,
        MeshType::Api140,
        MeshType::Api170,
        MeshType::Api200,
    ];

    /// Rated mesh capacity (gal/min)
    pub fn capacity_gpm(self) -> f64 {
        match self {
            MeshType::Api100 => 250.0,
            MeshType::Api140 => 200.0,
            MeshType::Api170 => 160.0,
            MeshType::Api200 => 120.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshType::Api100 => "API 100",
            MeshType::Api140 => "API 140",
            MeshType::Api170 => "API 170",
            MeshType::Api200 => "API 200",
        }
    }

    /// Look up a mesh by its label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(wanted))
    }
}

impl Default for MeshType {
    fn default() -> Self {
        MeshType::Api100
    }
}

impl std::fmt::Display for MeshType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Thresholds consumed by the advisory rule engine.
///
/// `utilization_threshold` is the operator slider value. It is the
/// "elevated utilization" level shared by the blinding alert and the
/// per-row warning rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryThresholds {
    pub utilization_threshold: f64,
    pub screen_change_utilization: f64,
    pub overload_utilization: f64,
    pub shaker_overload: f64,
    pub healthy_utilization_max: f64,
    pub healthy_shaker_max: f64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        use shaker_thresholds::*;
        Self {
            utilization_threshold: f64::from(UTILIZATION_THRESHOLD_DEFAULT),
            screen_change_utilization: SCREEN_CHANGE_UTILIZATION,
            overload_utilization: OVERLOAD_UTILIZATION,
            shaker_overload: SHAKER_OVERLOAD,
            healthy_utilization_max: HEALTHY_UTILIZATION_MAX,
            healthy_shaker_max: HEALTHY_SHAKER_MAX,
        }
    }
}
