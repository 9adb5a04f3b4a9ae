//! Aggregate alert rules
//!
//! Each rule looks at the screen utilization and primary shaker aggregates
//! and either fires a single alert or stays silent. Rules never see each
//! other's results, so any subset can fire together.
//!
//! ## Rules
//!
//! 1. **ScreenChange** - mean utilization above the screen-change level
//! 2. **Blinding** - shaker peak overload while utilization is elevated
//! 3. **Healthy** - utilization and shaker output both comfortably low

use crate::types::{AdvisoryThresholds, AggregateStats, Alert, AlertKind};

/// Aggregates an advisory rule is evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInputs {
    pub screen_utilization: AggregateStats,
    pub shaker: AggregateStats,
}

/// A single aggregate advisory rule
pub trait AdvisoryRule: Send + Sync {
    /// Rule name (e.g., "ScreenChange", "Blinding", "Healthy")
    fn name(&self) -> &str;

    /// Evaluate the aggregates, returning an alert when the rule fires
    fn evaluate(&self, inputs: &RuleInputs, thresholds: &AdvisoryThresholds) -> Option<Alert>;
}

fn alert(kind: AlertKind, message: String) -> Alert {
    Alert {
        kind,
        severity: kind.severity(),
        message,
    }
}

pub struct ScreenChangeRule;

impl AdvisoryRule for ScreenChangeRule {
    fn name(&self) -> &str {
        "ScreenChange"
    }

    fn evaluate(&self, inputs: &RuleInputs, thresholds: &AdvisoryThresholds) -> Option<Alert> {
        let mean = inputs.screen_utilization.mean;
        (mean > thresholds.screen_change_utilization).then(|| {
            alert(
                AlertKind::ScreenChangeRecommended,
                format!(
                    "Screen change recommended: average utilization {:.1}% exceeds {:.0}%",
                    mean, thresholds.screen_change_utilization
                ),
            )
        })
    }
}

pub struct BlindingRule;

impl AdvisoryRule for BlindingRule {
    fn name(&self) -> &str {
        "Blinding"
    }

    fn evaluate(&self, inputs: &RuleInputs, thresholds: &AdvisoryThresholds) -> Option<Alert> {
        let peak = inputs.shaker.max;
        let mean = inputs.screen_utilization.mean;
        (peak > thresholds.shaker_overload && mean > thresholds.utilization_threshold).then(|| {
            alert(
                AlertKind::PossibleBlinding,
                format!(
                    "Possible screen blinding/overload: shaker peaked at {:.1}% with average utilization {:.1}%",
                    peak, mean
                ),
            )
        })
    }
}

pub struct HealthyRule;

impl AdvisoryRule for HealthyRule {
    fn name(&self) -> &str {
        "Healthy"
    }

    fn evaluate(&self, inputs: &RuleInputs, thresholds: &AdvisoryThresholds) -> Option<Alert> {
        let util = inputs.screen_utilization.mean;
        let shaker = inputs.shaker.mean;
        (util < thresholds.healthy_utilization_max && shaker < thresholds.healthy_shaker_max).then(
            || {
                alert(
                    AlertKind::HealthyOperation,
                    format!(
                        "Shaker operating in healthy range: utilization {:.1}%, shaker {:.1}%",
                        util, shaker
                    ),
                )
            },
        )
    }
}

/// The three aggregate rules, in display order
pub fn default_rules() -> Vec<Box<dyn AdvisoryRule>> {
    vec![
        Box::new(ScreenChangeRule),
        Box::new(BlindingRule),
        Box::new(HealthyRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, max: f64) -> AggregateStats {
        AggregateStats {
            mean,
            min: 0.0,
            max,
        }
    }

    #[test]
    fn screen_change_is_strictly_greater() {
        let t = AdvisoryThresholds::default();
        let at = RuleInputs {
            screen_utilization: stats(85.0, 85.0),
            shaker: stats(50.0, 50.0),
        };
        assert!(ScreenChangeRule.evaluate(&at, &t).is_none());

        let above = RuleInputs {
            screen_utilization: stats(85.1, 90.0),
            ..at
        };
        let fired = ScreenChangeRule.evaluate(&above, &t).unwrap();
        assert_eq!(fired.kind, AlertKind::ScreenChangeRecommended);
    }

    #[test]
    fn blinding_needs_peak_and_elevated_utilization() {
        let t = AdvisoryThresholds::default();
        let peak_only = RuleInputs {
            screen_utilization: stats(70.0, 80.0),
            shaker: stats(60.0, 99.0),
        };
        assert!(BlindingRule.evaluate(&peak_only, &t).is_none());

        let both = RuleInputs {
            screen_utilization: stats(82.0, 90.0),
            ..peak_only
        };
        assert_eq!(
            BlindingRule.evaluate(&both, &t).map(|a| a.kind),
            Some(AlertKind::PossibleBlinding)
        );
    }

    #[test]
    fn blinding_follows_configured_threshold() {
        let t = AdvisoryThresholds {
            utilization_threshold: 60.0,
            ..AdvisoryThresholds::default()
        };
        let inputs = RuleInputs {
            screen_utilization: stats(65.0, 70.0),
            shaker: stats(60.0, 97.0),
        };
        assert!(BlindingRule.evaluate(&inputs, &t).is_some());
    }

    #[test]
    fn healthy_requires_both_low() {
        let t = AdvisoryThresholds::default();
        let low = RuleInputs {
            screen_utilization: stats(60.0, 70.0),
            shaker: stats(50.0, 80.0),
        };
        assert_eq!(
            HealthyRule.evaluate(&low, &t).map(|a| a.kind),
            Some(AlertKind::HealthyOperation)
        );

        let busy_shaker = RuleInputs {
            shaker: stats(70.0, 80.0),
            ..low
        };
        assert!(HealthyRule.evaluate(&busy_shaker, &t).is_none());
    }

    #[test]
    fn default_rules_cover_all_kinds() {
        let names: Vec<String> = default_rules().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["ScreenChange", "Blinding", "Healthy"]);
    }
}
