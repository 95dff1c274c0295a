use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for suppliers tracked by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub String);

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplier master-data snapshot as exposed by the directory collaborator.
///
/// Financial and geographic indicators are maintained by external systems;
/// when they are absent the engine substitutes neutral priors rather than
/// failing the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProfile {
    pub id: SupplierId,
    pub name: String,
    pub city: Option<String>,
    pub financial_health_score: Option<f64>,
    pub geographic_risk_score: Option<f64>,
    pub registered_at: Option<DateTime<Utc>>,
}

/// Compliance certificate on file for a supplier. Either date may be missing
/// in upstream records; derivation rules decide how such certificates count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub name: String,
    pub issued_on: Option<DateTime<Utc>>,
    pub expires_on: Option<DateTime<Utc>>,
}

/// Canonical feature order; scorers and model artifacts index into this.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "days_to_nearest_expiry",
    "total_certificates",
    "expired_count",
    "expiring_soon_count",
    "valid_count",
    "audit_pass_rate",
    "avg_certificate_validity_days",
    "financial_health_score",
    "geographic_risk_score",
    "years_in_business",
];

pub const FEATURE_COUNT: usize = 10;

/// Neutral priors used when source data cannot answer for a feature.
pub const DEFAULT_AUDIT_PASS_RATE: f64 = 0.85;
pub const DEFAULT_FINANCIAL_HEALTH: f64 = 70.0;
pub const DEFAULT_GEOGRAPHIC_RISK: f64 = 40.0;
pub const DEFAULT_YEARS_IN_BUSINESS: f64 = 5.0;

/// Fixed-schema numeric description of a supplier's current state.
///
/// Always fully populated: absent source data resolves to the documented
/// default for each field, never to a missing entry. Field declaration order
/// matches [`FEATURE_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub days_to_nearest_expiry: f64,
    pub total_certificates: f64,
    pub expired_count: f64,
    pub expiring_soon_count: f64,
    pub valid_count: f64,
    pub audit_pass_rate: f64,
    pub avg_certificate_validity_days: f64,
    pub financial_health_score: f64,
    pub geographic_risk_score: f64,
    pub years_in_business: f64,
}

impl FeatureVector {
    /// Vector a supplier with no certificate or audit history resolves to.
    pub fn neutral() -> Self {
        Self {
            days_to_nearest_expiry: 0.0,
            total_certificates: 0.0,
            expired_count: 0.0,
            expiring_soon_count: 0.0,
            valid_count: 0.0,
            audit_pass_rate: DEFAULT_AUDIT_PASS_RATE,
            avg_certificate_validity_days: 0.0,
            financial_health_score: DEFAULT_FINANCIAL_HEALTH,
            geographic_risk_score: DEFAULT_GEOGRAPHIC_RISK,
            years_in_business: DEFAULT_YEARS_IN_BUSINESS,
        }
    }

    /// Values in canonical feature order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.days_to_nearest_expiry,
            self.total_certificates,
            self.expired_count,
            self.expiring_soon_count,
            self.valid_count,
            self.audit_pass_rate,
            self.avg_certificate_validity_days,
            self.financial_health_score,
            self.geographic_risk_score,
            self.years_in_business,
        ]
    }

    /// (name, value) pairs in canonical feature order.
    pub fn entries(&self) -> [(&'static str, f64); FEATURE_COUNT] {
        let values = self.values();
        let mut entries = [("", 0.0); FEATURE_COUNT];
        for (slot, (name, value)) in entries
            .iter_mut()
            .zip(FEATURE_NAMES.iter().zip(values.iter()))
        {
            *slot = (*name, *value);
        }
        entries
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| self.values()[index])
    }
}

/// Banded classification of a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 60.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Direction of risk-score movement over roughly a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

/// Relative share of a driver among the top drivers shown, not of the
/// absolute score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    Low,
    Medium,
    High,
}

impl ImpactTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A single feature identified as a top contributor to a risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub rank: u8,
    pub factor: String,
    pub weight: f64,
    pub description: String,
    pub impact: ImpactTier,
    pub action: String,
    pub action_path: String,
    pub value: f64,
}

/// Remediation entry derived from a driver for the mitigations view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub risk_factor: String,
    pub current_value: f64,
    pub recommendation: String,
    pub priority: ImpactTier,
    pub action_path: String,
}

/// Per-dimension companion scores reported alongside the headline score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub certificate_health: u8,
    pub audit_performance: u8,
    pub financial_stability: f64,
}

impl SubScores {
    pub fn from_features(features: &FeatureVector) -> Self {
        let certificate_health = if features.total_certificates > 0.0 {
            ((features.valid_count / features.total_certificates) * 100.0).round() as u8
        } else {
            0
        };

        Self {
            certificate_health,
            audit_performance: (features.audit_pass_rate * 100.0).round().clamp(0.0, 100.0) as u8,
            financial_stability: features.financial_health_score,
        }
    }
}

/// Immutable snapshot of one risk calculation for one supplier.
///
/// Snapshots are only ever superseded by appending a newer one; history is
/// the audit trail and is never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub supplier_id: SupplierId,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub drivers: Vec<Driver>,
    pub features: FeatureVector,
    pub sub_scores: SubScores,
    pub trend: TrendDirection,
    pub change_from_last_month: f64,
    pub industry_benchmark: f64,
    pub created_at: DateTime<Utc>,
}

/// One point of a supplier's score history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub date: DateTime<Utc>,
    pub risk_score: f64,
}
