//! Column mapping for shaker telemetry uploads
//!
//! Uploads come from rig data exports with descriptive, unit-suffixed column
//! names (e.g. "Weight on Bit (klbs)"). Exact names are tried first, then a
//! case-insensitive match on the trimmed header.

use crate::error::{DashboardError, Result};
use crate::types::RawTable;

/// Header names as they appear in rig exports
pub mod column_names {
    pub const BIT_DEPTH: &str = "Bit Depth (feet)";
    pub const HOLE_DEPTH: &str = "Hole Depth (feet)";
    pub const DATE: &str = "YYYY/MM/DD";
    pub const TIME: &str = "HH:MM:SS";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const FLOW_RATE: &str = "MA_Flow_Rate (gal/min)";
    pub const WEIGHT_ON_BIT: &str = "Weight on Bit (klbs)";
    pub const SCREEN_UTILIZATION: &str = "Screen Utilization (%)";
    pub const PRIMARY_SHAKER: &str = "SHAKER #3 (PERCENT)";
    /// Any header starting with this (case-insensitive) is a shaker channel
    pub const SHAKER_PREFIX: &str = "SHAKER";
}

/// Find a header by exact name, falling back to a case-insensitive match.
pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name).or_else(|| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

/// Pick the depth column: bit depth first, then hole depth.
pub fn resolve_depth_column(table: &RawTable) -> Result<String> {
    [column_names::BIT_DEPTH, column_names::HOLE_DEPTH]
        .iter()
        .find_map(|name| find_column(table.headers(), name))
        .map(|idx| table.headers()[idx].clone())
        .ok_or_else(|| {
            DashboardError::MissingColumn(format!(
                "{} or {}",
                column_names::BIT_DEPTH,
                column_names::HOLE_DEPTH
            ))
        })
}

/// Maps canonical fields to header indices for one upload
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub depth: Option<usize>,
    pub date: Option<usize>,
    pub time: Option<usize>,
    pub timestamp: Option<usize>,
    pub flow_rate: Option<usize>,
    pub weight_on_bit: Option<usize>,
    pub screen_utilization: Option<usize>,
    /// (header, index) for every shaker channel, in upload order
    pub shakers: Vec<(String, usize)>,
    /// Position within `shakers` of the primary channel
    pub primary_shaker: Option<usize>,
}

impl ColumnMap {
    /// Build the column map from the upload header.
    pub fn from_table(table: &RawTable, primary_shaker: &str) -> Self {
        let headers = table.headers();

        let depth = resolve_depth_column(table)
            .ok()
            .and_then(|name| table.column_index(&name));

        let shakers: Vec<(String, usize)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                h.trim()
                    .to_uppercase()
                    .starts_with(column_names::SHAKER_PREFIX)
            })
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let primary_shaker = shakers
            .iter()
            .position(|(h, _)| h == primary_shaker)
            .or_else(|| {
                shakers
                    .iter()
                    .position(|(h, _)| h.trim().eq_ignore_ascii_case(primary_shaker))
            });

        Self {
            depth,
            date: find_column(headers, column_names::DATE),
            time: find_column(headers, column_names::TIME),
            timestamp: find_column(headers, column_names::TIMESTAMP),
            flow_rate: find_column(headers, column_names::FLOW_RATE),
            weight_on_bit: find_column(headers, column_names::WEIGHT_ON_BIT),
            screen_utilization: find_column(headers, column_names::SCREEN_UTILIZATION),
            shakers,
            primary_shaker,
        }
    }

    /// Report which canonical columns were found
    pub fn summary(&self) -> String {
        let mut found: Vec<&str> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();

        macro_rules! check_col {
            ($name:expr, $present:expr) => {
                if $present { found.push($name); } else { missing.push($name); }
            };
        }

        check_col!(
            "TIMESTAMP",
            self.timestamp.is_some() || (self.date.is_some() && self.time.is_some())
        );
        check_col!("DEPTH", self.depth.is_some());
        check_col!("FLOW_RATE", self.flow_rate.is_some());
        check_col!("WOB", self.weight_on_bit.is_some());
        check_col!("SHAKER_PRIMARY", self.primary_shaker.is_some());
        check_col!("SCREEN_UTIL", self.screen_utilization.is_some());

        format!(
            "Found {}/{} columns, {} shaker channel(s). Present: [{}]. Missing: [{}]",
            found.len(),
            found.len() + missing.len(),
            self.shakers.len(),
            found.join(", "),
            missing.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawRecord;

    fn table(headers: &[&str]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            Vec::<RawRecord>::new(),
        )
    }

    #[test]
    fn bit_depth_preferred_over_hole_depth() {
        let t = table(&["Hole Depth (feet)", "Bit Depth (feet)"]);
        assert_eq!(resolve_depth_column(&t).unwrap(), "Bit Depth (feet)");
    }

    #[test]
    fn hole_depth_used_as_fallback() {
        let t = table(&["Hole Depth (feet)", "SHAKER #3 (PERCENT)"]);
        assert_eq!(resolve_depth_column(&t).unwrap(), "Hole Depth (feet)");
    }

    #[test]
    fn missing_depth_is_an_error() {
        let t = table(&["SHAKER #3 (PERCENT)"]);
        assert!(matches!(
            resolve_depth_column(&t),
            Err(DashboardError::MissingColumn(_))
        ));
    }

    #[test]
    fn shaker_channels_detected_by_prefix() {
        let t = table(&[
            "YYYY/MM/DD",
            "SHAKER #1 (Units)",
            "Shaker #2 (PERCENT)",
            "SHAKER #3 (PERCENT)",
            "MA_Flow_Rate (gal/min)",
        ]);
        let map = ColumnMap::from_table(&t, column_names::PRIMARY_SHAKER);
        assert_eq!(map.shakers.len(), 3);
        assert_eq!(map.primary_shaker, Some(2));
        assert_eq!(map.flow_rate, Some(4));
        assert!(map.time.is_none());
    }

    #[test]
    fn case_insensitive_header_match() {
        let t = table(&["weight on bit (klbs)", "ma_flow_rate (gal/min)"]);
        let map = ColumnMap::from_table(&t, column_names::PRIMARY_SHAKER);
        assert_eq!(map.weight_on_bit, Some(0));
        assert_eq!(map.flow_rate, Some(1));
        assert!(map.primary_shaker.is_none());
        assert!(map.summary().contains("Missing: [TIMESTAMP, DEPTH, SHAKER_PRIMARY, SCREEN_UTIL]"));
    }
}
