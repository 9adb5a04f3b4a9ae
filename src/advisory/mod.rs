//! Advisory Rule Engine
//!
//! Deterministic and stateless. Aggregate rules turn screen utilization and
//! shaker statistics into human-readable alerts; the classifier flags each
//! row as normal, warning or overloaded for the diagnostic scatter.

pub mod classifier;
pub mod rules;

pub use classifier::{classify, classify_rows, diagnostic_points};
pub use rules::{default_rules, AdvisoryRule, BlindingRule, HealthyRule, RuleInputs, ScreenChangeRule};

use tracing::debug;

use crate::error::Result;
use crate::types::{AdvisoryThresholds, AggregateStats, Alert, NormalizedDataset, RowFlag};

/// Rule set bound to one set of thresholds
pub struct AdvisoryEngine {
    thresholds: AdvisoryThresholds,
    rules: Vec<Box<dyn AdvisoryRule>>,
}

impl AdvisoryEngine {
    pub fn new(thresholds: AdvisoryThresholds) -> Self {
        Self {
            thresholds,
            rules: default_rules(),
        }
    }

    pub fn thresholds(&self) -> &AdvisoryThresholds {
        &self.thresholds
    }

    /// Evaluate every rule independently; alerts come back in rule order.
    pub fn evaluate(&self, screen_utilization: &AggregateStats, shaker: &AggregateStats) -> Vec<Alert> {
        let inputs = RuleInputs {
            screen_utilization: *screen_utilization,
            shaker: *shaker,
        };

        self.rules
            .iter()
            .filter_map(|rule| {
                let fired = rule.evaluate(&inputs, &self.thresholds);
                debug!(rule = rule.name(), fired = fired.is_some(), "Advisory rule evaluated");
                fired
            })
            .collect()
    }

    /// Per-row flags for the dataset, aligned with `dataset.records()`
    pub fn classify_rows(&self, dataset: &NormalizedDataset) -> Result<Vec<RowFlag>> {
        classify_rows(dataset, &self.thresholds)
    }
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self::new(AdvisoryThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertKind;

    fn stats(mean: f64, max: f64) -> AggregateStats {
        AggregateStats { mean, min: 0.0, max }
    }

    #[test]
    fn test_screen_change_without_blinding() {
        let engine = AdvisoryEngine::default();
        let alerts = engine.evaluate(&stats(86.0, 92.0), &stats(60.0, 90.0));
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::ScreenChangeRecommended]);
    }

    #[test]
    fn test_rules_fire_together() {
        let engine = AdvisoryEngine::default();
        let alerts = engine.evaluate(&stats(88.0, 99.0), &stats(70.0, 98.0));
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::ScreenChangeRecommended, AlertKind::PossibleBlinding]
        );
    }

    #[test]
    fn test_healthy_only() {
        let engine = AdvisoryEngine::default();
        let alerts = engine.evaluate(&stats(40.0, 60.0), &stats(30.0, 55.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::HealthyOperation);
    }

    #[test]
    fn test_middle_band_is_silent() {
        let engine = AdvisoryEngine::default();
        assert!(engine.evaluate(&stats(78.0, 84.0), &stats(72.0, 90.0)).is_empty());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let engine = AdvisoryEngine::default();
        let a = engine.evaluate(&stats(88.0, 99.0), &stats(70.0, 98.0));
        let b = engine.evaluate(&stats(88.0, 99.0), &stats(70.0, 98.0));
        assert_eq!(a, b);
    }
}
