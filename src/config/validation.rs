//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults::PAGE_SIZE_OPTIONS;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for DashboardConfig.
///
/// Any new field added to DashboardConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [mesh]
        "mesh",
        "mesh.mesh_type",
        // [thresholds]
        "thresholds",
        "thresholds.utilization_threshold",
        "thresholds.screen_change_utilization_pct",
        "thresholds.overload_utilization_pct",
        "thresholds.shaker_overload_pct",
        "thresholds.healthy_utilization_max_pct",
        "thresholds.healthy_shaker_max_pct",
        // [columns]
        "columns",
        "columns.primary_shaker",
        // [charts]
        "charts",
        "charts.realtime_window",
        // [table]
        "table",
        "table.page_size",
        "table.cache_capacity",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the alphabetically first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate value ranges on a parsed DashboardConfig.
///
/// Returns (errors, warnings). Errors are impossible values; warnings are
/// suspicious but usable.
pub fn validate_ranges(config: &super::DashboardConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let t = &config.thresholds;
    let percentages = [
        ("screen_change_utilization_pct", t.screen_change_utilization_pct),
        ("overload_utilization_pct", t.overload_utilization_pct),
        ("shaker_overload_pct", t.shaker_overload_pct),
        ("healthy_utilization_max_pct", t.healthy_utilization_max_pct),
        ("healthy_shaker_max_pct", t.healthy_shaker_max_pct),
    ];

    for (name, value) in percentages {
        if !value.is_finite() {
            errors.push(format!("thresholds.{name} = {value} must be a finite number"));
        } else if !(0.0..=1000.0).contains(&value) {
            errors.push(format!(
                "thresholds.{name} = {value:.1} is outside the usable range (0-1000%)"
            ));
        } else if value > 100.0 && name.contains("utilization") {
            warnings.push(ValidationWarning {
                field: format!("thresholds.{name}"),
                message: format!("thresholds.{name} = {value:.1} exceeds 100%; alert can only fire on overloaded screens"),
                suggestion: None,
            });
        }
    }

    if t.healthy_utilization_max_pct.is_finite()
        && t.healthy_utilization_max_pct > t.screen_change_utilization_pct
    {
        warnings.push(ValidationWarning {
            field: "thresholds.healthy_utilization_max_pct".to_string(),
            message: format!(
                "healthy_utilization_max_pct = {:.1} is above screen_change_utilization_pct = {:.1}; \
                 healthy and screen-change alerts can fire together",
                t.healthy_utilization_max_pct, t.screen_change_utilization_pct
            ),
            suggestion: None,
        });
    }

    if f64::from(t.utilization_threshold) > t.screen_change_utilization_pct {
        warnings.push(ValidationWarning {
            field: "thresholds.utilization_threshold".to_string(),
            message: format!(
                "utilization_threshold = {} is above screen_change_utilization_pct = {:.1}; \
                 screen-change alerts will fire before blinding alerts",
                t.utilization_threshold, t.screen_change_utilization_pct
            ),
            suggestion: None,
        });
    }

    if !PAGE_SIZE_OPTIONS.contains(&config.table.page_size) {
        errors.push(format!(
            "table.page_size = {} must be one of {:?}",
            config.table.page_size, PAGE_SIZE_OPTIONS
        ));
    }

    if config.charts.realtime_window == 0 {
        errors.push("charts.realtime_window must be > 0".to_string());
    }

    if config.columns.primary_shaker.trim().is_empty() {
        errors.push("columns.primary_shaker must not be empty".to_string());
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("mesh_type", "mesh_type"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("page_sise", "page_size"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let value: toml::Value = "[mesh]\nmesh_type = \"API 140\"\n".parse().unwrap();
        let keys = walk_toml_keys(&value, "");
        assert!(keys.contains(&"mesh".to_string()));
        assert!(keys.contains(&"mesh.mesh_type".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[thresholds]
utilisation_threshold = 70
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("thresholds.utilization_threshold")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[mesh]
mesh_type = "API 140"

[thresholds]
utilization_threshold = 75
shaker_overload_pct = 95.0

[table]
page_size = 50
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_page_size_must_be_offered() {
        let mut config = DashboardConfig::default();
        config.table.page_size = 75;
        let (errors, _) = validate_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("table.page_size")));
    }

    #[test]
    fn test_zero_realtime_window_rejected() {
        let mut config = DashboardConfig::default();
        config.charts.realtime_window = 0;
        let (errors, _) = validate_ranges(&config);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_ranges(&DashboardConfig::default());
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }
}
