mod model;
mod rules;

pub use model::BoostedScorer;
pub use rules::RuleBasedScorer;

use std::sync::Arc;

use tracing::warn;

use super::domain::FeatureVector;

/// Strategy interface mapping a feature vector to a bounded risk score.
///
/// The breakdown is the scorer's internal explanation; it is consumed only
/// by driver ranking and never surfaced verbatim.
pub trait RiskScorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, features: &FeatureVector) -> Result<ScoreBreakdown, ScorerError>;
}

/// Score in [0,100] plus per-feature contributions explaining it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub contributions: Vec<FeatureContribution>,
}

/// One feature's share of a score.
///
/// `contribution` is the signed amount the feature moved the score; the
/// rule-based scorer additionally tags each entry with its fixed axis weight
/// and a display label for the triggering condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContribution {
    pub feature: &'static str,
    pub value: f64,
    pub contribution: f64,
    pub axis_weight: Option<f64>,
    pub label: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("model artifact unavailable: {0}")]
    Artifact(String),
    #[error("model produced a non-finite score")]
    NonFinite,
}

/// Scorer selection policy: prefer the learned model, recover to the
/// deterministic rules on any failure. A calculation never fails because a
/// scorer is unavailable.
pub struct ScorerSelection {
    primary: Option<Arc<dyn RiskScorer>>,
    fallback: RuleBasedScorer,
}

impl ScorerSelection {
    pub fn new(primary: Option<Arc<dyn RiskScorer>>) -> Self {
        Self {
            primary,
            fallback: RuleBasedScorer,
        }
    }

    pub fn rule_based_only() -> Self {
        Self::new(None)
    }

    /// Score with the preferred strategy, falling back per policy.
    /// Returns the breakdown and the name of the scorer that produced it.
    pub fn score(&self, features: &FeatureVector) -> (ScoreBreakdown, &'static str) {
        if let Some(primary) = &self.primary {
            match primary.score(features) {
                Ok(breakdown) => return (breakdown, primary.name()),
                Err(err) => {
                    warn!(scorer = primary.name(), error = %err, "scorer failed, using rule-based fallback");
                }
            }
        }

        (self.fallback.evaluate(features), self.fallback.name())
    }
}
