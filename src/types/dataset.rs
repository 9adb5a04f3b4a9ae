//! Raw upload rows and the normalized shaker dataset

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Raw Upload
// ============================================================================

/// A single CSV cell as uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl RawValue {
    /// Classify a cell. NaN-like markers count as empty.
    pub fn parse(cell: &str) -> Self {
        let s = cell.trim();
        if s.is_empty()
            || s.eq_ignore_ascii_case("nan")
            || s.eq_ignore_ascii_case("null")
            || s == "-"
        {
            return RawValue::Empty;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => RawValue::Number(v),
            _ => RawValue::Text(s.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Empty => Ok(()),
        }
    }
}

/// One uploaded row, aligned with the header of its `RawTable`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub values: Vec<RawValue>,
}

impl RawRecord {
    pub fn get(&self, idx: usize) -> Option<&RawValue> {
        self.values.get(idx)
    }

    /// Text form of a cell, with numbers rendered back to strings.
    pub fn text(&self, idx: usize) -> Option<String> {
        match self.values.get(idx)? {
            RawValue::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

/// The uploaded table: header plus rows, no schema guarantees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            // First occurrence wins for duplicated header names
            index.entry(h.clone()).or_insert(i);
        }
        Self {
            headers,
            index,
            records,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Numeric value of `column` in row `row`, if both exist and the cell is numeric.
    pub fn number(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.get(idx)?.as_f64()
    }
}

// ============================================================================
// Normalized Dataset
// ============================================================================

/// Where the dataset's timestamps came from, or why there are none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimestampStatus {
    /// Date and time columns joined with a single space
    Combined { date_column: String, time_column: String },
    /// A ready-made timestamp column
    Direct { column: String },
    /// Time-dependent features are disabled; rows keep upload order
    Unavailable { reason: String },
}

impl TimestampStatus {
    pub fn is_available(&self) -> bool {
        !matches!(self, TimestampStatus::Unavailable { .. })
    }
}

/// Provenance of the screen utilization column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum UtilizationSource {
    /// Present in the upload
    Reported,
    /// Computed from weight on bit and flow rate against a mesh capacity
    Derived { mesh_capacity_gpm: f64 },
    /// Neither present nor derivable
    Unavailable,
}

impl UtilizationSource {
    pub fn is_available(self) -> bool {
        !matches!(self, UtilizationSource::Unavailable)
    }
}

/// Numeric columns that metrics can be computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    Depth,
    FlowRate,
    WeightOnBit,
    PrimaryShaker,
    ScreenUtilization,
    SolidsVolumeRate,
}

/// Whether an absent column is an error or silently zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRequirement {
    Mandatory,
    Optional,
}

impl MetricColumn {
    pub fn requirement(self) -> ColumnRequirement {
        match self {
            MetricColumn::Depth | MetricColumn::PrimaryShaker => ColumnRequirement::Mandatory,
            MetricColumn::FlowRate
            | MetricColumn::WeightOnBit
            | MetricColumn::ScreenUtilization
            | MetricColumn::SolidsVolumeRate => ColumnRequirement::Optional,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricColumn::Depth => "depth",
            MetricColumn::FlowRate => "flow_rate",
            MetricColumn::WeightOnBit => "weight_on_bit",
            MetricColumn::PrimaryShaker => "shaker_pct",
            MetricColumn::ScreenUtilization => "screen_utilization_pct",
            MetricColumn::SolidsVolumeRate => "solids_volume_rate",
        }
    }
}

impl std::fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One normalized telemetry row
#[derive(Debug, Clone, PartialEq)]
pub struct ShakerRecord {
    /// Zero-based position of the row in the upload
    pub row: usize,
    pub timestamp: Option<NaiveDateTime>,
    /// Depth (ft) from the resolved depth column
    pub depth: Option<f64>,
    /// Mud flow rate (gal/min)
    pub flow_rate: Option<f64>,
    /// Weight on bit (klbs)
    pub weight_on_bit: Option<f64>,
    /// One entry per shaker channel, aligned with `NormalizedDataset::shaker_channels`
    pub shakers: Vec<Option<f64>>,
    pub screen_utilization_pct: Option<f64>,
    /// Estimated solids volume rate (gpm); only populated when utilization is derived
    pub solids_volume_rate: Option<f64>,
    pub raw: RawRecord,
}

/// Upload after schema normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    pub(crate) headers: Vec<String>,
    pub(crate) shaker_channels: Vec<String>,
    pub(crate) primary_shaker: Option<usize>,
    pub(crate) depth_column: Option<String>,
    pub(crate) has_flow_rate: bool,
    pub(crate) has_weight_on_bit: bool,
    pub(crate) utilization: UtilizationSource,
    pub(crate) timestamps: TimestampStatus,
    /// Found/missing column summary from the mapping pass
    pub(crate) column_summary: String,
    pub(crate) records: Vec<ShakerRecord>,
}

impl NormalizedDataset {
    pub fn records(&self) -> &[ShakerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Original upload header, in upload order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn shaker_channels(&self) -> &[String] {
        &self.shaker_channels
    }

    pub fn primary_shaker_channel(&self) -> Option<&str> {
        self.primary_shaker
            .and_then(|i| self.shaker_channels.get(i))
            .map(String::as_str)
    }

    pub fn depth_column(&self) -> Option<&str> {
        self.depth_column.as_deref()
    }

    pub fn utilization_source(&self) -> UtilizationSource {
        self.utilization
    }

    pub fn timestamp_status(&self) -> &TimestampStatus {
        &self.timestamps
    }

    pub fn column_summary(&self) -> &str {
        &self.column_summary
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps.is_available()
    }

    /// Whether the canonical column exists in this dataset (values may still be sparse)
    pub fn has_column(&self, column: MetricColumn) -> bool {
        match column {
            MetricColumn::Depth => self.depth_column.is_some(),
            MetricColumn::FlowRate => self.has_flow_rate,
            MetricColumn::WeightOnBit => self.has_weight_on_bit,
            MetricColumn::PrimaryShaker => self.primary_shaker.is_some(),
            MetricColumn::ScreenUtilization => self.utilization.is_available(),
            MetricColumn::SolidsVolumeRate => {
                matches!(self.utilization, UtilizationSource::Derived { .. })
            }
        }
    }

    /// Value of a canonical column for one record
    pub fn value(&self, record: &ShakerRecord, column: MetricColumn) -> Option<f64> {
        match column {
            MetricColumn::Depth => record.depth,
            MetricColumn::FlowRate => record.flow_rate,
            MetricColumn::WeightOnBit => record.weight_on_bit,
            MetricColumn::PrimaryShaker => self
                .primary_shaker
                .and_then(|i| record.shakers.get(i).copied().flatten()),
            MetricColumn::ScreenUtilization => record.screen_utilization_pct,
            MetricColumn::SolidsVolumeRate => record.solids_volume_rate,
        }
    }

    /// Iterator over the present values of a column, in dataset order
    pub fn column_values(&self, column: MetricColumn) -> impl Iterator<Item = f64> + '_ {
        self.records
            .iter()
            .filter_map(move |r| self.value(r, column))
    }
}
