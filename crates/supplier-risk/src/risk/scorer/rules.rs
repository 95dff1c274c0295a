use super::{FeatureContribution, RiskScorer, ScoreBreakdown, ScorerError};
use crate::risk::domain::{FeatureVector, DEFAULT_AUDIT_PASS_RATE};

const CERTIFICATE_AXIS_WEIGHT: f64 = 0.4;
const AUDIT_AXIS_WEIGHT: f64 = 0.3;
const FINANCIAL_AXIS_WEIGHT: f64 = 0.2;
const GEOGRAPHIC_AXIS_WEIGHT: f64 = 0.1;

const EXPIRED_POINTS: f64 = 40.0;
const EXPIRING_SOON_POINTS: f64 = 30.0;
const RENEWAL_DUE_POINTS: f64 = 15.0;
const EXPIRING_SOON_DAYS: f64 = 30.0;
const RENEWAL_DUE_DAYS: f64 = 90.0;

const POINTS_PER_AUDIT_FAILURE: f64 = 10.0;
const AUDIT_POINTS_CAP: f64 = 30.0;

const FINANCIAL_CRITICAL_THRESHOLD: f64 = 40.0;
const FINANCIAL_WEAK_THRESHOLD: f64 = 60.0;
const FINANCIAL_CRITICAL_POINTS: f64 = 20.0;
const FINANCIAL_WEAK_POINTS: f64 = 10.0;

const GEOGRAPHIC_THRESHOLD: f64 = 0.5;
const GEOGRAPHIC_POINTS: f64 = 10.0;

/// Deterministic additive scorer over the fixed rule axes. Always available;
/// serves as the fallback when the learned model cannot answer.
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    /// Apply the rule axes to a feature vector. Infallible: the score is the
    /// clamped sum of the axis contributions, and only non-zero axes appear
    /// in the breakdown.
    pub fn evaluate(&self, features: &FeatureVector) -> ScoreBreakdown {
        let mut contributions = Vec::new();

        if let Some(entry) = certificate_axis(features) {
            contributions.push(entry);
        }
        if let Some(entry) = audit_axis(features) {
            contributions.push(entry);
        }
        if let Some(entry) = financial_axis(features) {
            contributions.push(entry);
        }
        if let Some(entry) = geographic_axis(features) {
            contributions.push(entry);
        }

        let score = contributions
            .iter()
            .map(|entry| entry.contribution)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        ScoreBreakdown {
            score,
            contributions,
        }
    }
}

impl RiskScorer for RuleBasedScorer {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn score(&self, features: &FeatureVector) -> Result<ScoreBreakdown, ScorerError> {
        Ok(self.evaluate(features))
    }
}

fn certificate_axis(features: &FeatureVector) -> Option<FeatureContribution> {
    // A supplier with nothing on file has no certificate posture to penalize.
    if features.total_certificates <= 0.0 {
        return None;
    }

    if features.expired_count > 0.0 {
        return Some(FeatureContribution {
            feature: "expired_count",
            value: features.expired_count,
            contribution: EXPIRED_POINTS,
            axis_weight: Some(CERTIFICATE_AXIS_WEIGHT),
            label: Some("Certificate Expired"),
        });
    }

    let days = features.days_to_nearest_expiry;
    if days < EXPIRING_SOON_DAYS {
        Some(FeatureContribution {
            feature: "days_to_nearest_expiry",
            value: days,
            contribution: EXPIRING_SOON_POINTS,
            axis_weight: Some(CERTIFICATE_AXIS_WEIGHT),
            label: Some("Certificate Expiring Soon"),
        })
    } else if days < RENEWAL_DUE_DAYS {
        Some(FeatureContribution {
            feature: "days_to_nearest_expiry",
            value: days,
            contribution: RENEWAL_DUE_POINTS,
            axis_weight: Some(CERTIFICATE_AXIS_WEIGHT),
            label: Some("Certificate Renewal Due"),
        })
    } else {
        None
    }
}

fn audit_axis(features: &FeatureVector) -> Option<FeatureContribution> {
    if features.audit_pass_rate >= DEFAULT_AUDIT_PASS_RATE {
        return None;
    }

    let failures =
        ((1.0 - features.audit_pass_rate) * features.total_certificates.max(1.0)).round();
    if failures <= 0.0 {
        return None;
    }

    Some(FeatureContribution {
        feature: "audit_pass_rate",
        value: features.audit_pass_rate,
        contribution: (failures * POINTS_PER_AUDIT_FAILURE).min(AUDIT_POINTS_CAP),
        axis_weight: Some(AUDIT_AXIS_WEIGHT),
        label: Some("Past Audit Failures"),
    })
}

fn financial_axis(features: &FeatureVector) -> Option<FeatureContribution> {
    let score = features.financial_health_score;
    let points = if score < FINANCIAL_CRITICAL_THRESHOLD {
        FINANCIAL_CRITICAL_POINTS
    } else if score < FINANCIAL_WEAK_THRESHOLD {
        FINANCIAL_WEAK_POINTS
    } else {
        return None;
    };

    Some(FeatureContribution {
        feature: "financial_health_score",
        value: score,
        contribution: points,
        axis_weight: Some(FINANCIAL_AXIS_WEIGHT),
        label: Some("Financial Health"),
    })
}

fn geographic_axis(features: &FeatureVector) -> Option<FeatureContribution> {
    if features.geographic_risk_score / 100.0 <= GEOGRAPHIC_THRESHOLD {
        return None;
    }

    Some(FeatureContribution {
        feature: "geographic_risk_score",
        value: features.geographic_risk_score,
        contribution: GEOGRAPHIC_POINTS,
        axis_weight: Some(GEOGRAPHIC_AXIS_WEIGHT),
        label: Some("Geographic Risk"),
    })
}
