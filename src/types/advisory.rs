//! Advisory types: per-row flags, aggregate alerts, diagnostic scatter points

use serde::{Deserialize, Serialize};

/// Per-row screen condition. Ordered by severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RowFlag {
    Normal = 0,
    Warning = 1,
    Overloaded = 2,
}

impl std::fmt::Display for RowFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowFlag::Normal => write!(f, "normal"),
            RowFlag::Warning => write!(f, "warning"),
            RowFlag::Overloaded => write!(f, "overloaded"),
        }
    }
}

impl Default for RowFlag {
    fn default() -> Self {
        RowFlag::Normal
    }
}

/// Which aggregate rule produced an alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ScreenChangeRecommended,
    PossibleBlinding,
    HealthyOperation,
}

impl AlertKind {
    pub fn severity(self) -> AlertSeverity {
        match self {
            AlertKind::ScreenChangeRecommended => AlertSeverity::Action,
            AlertKind::PossibleBlinding => AlertSeverity::Warning,
            AlertKind::HealthyOperation => AlertSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Action,
    Warning,
}

/// Human-readable advisory produced from aggregate thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Counts of each row flag across a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCounts {
    pub normal: usize,
    pub warning: usize,
    pub overloaded: usize,
}

impl FlagCounts {
    pub fn tally<'a, I: IntoIterator<Item = &'a RowFlag>>(flags: I) -> Self {
        let mut counts = Self::default();
        for flag in flags {
            match flag {
                RowFlag::Normal => counts.normal += 1,
                RowFlag::Warning => counts.warning += 1,
                RowFlag::Overloaded => counts.overloaded += 1,
            }
        }
        counts
    }
}

/// Flow rate vs utilization point, colored by its row flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticPoint {
    pub row: usize,
    pub flow_rate: f64,
    pub screen_utilization_pct: f64,
    pub flag: RowFlag,
}
