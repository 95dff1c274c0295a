//! Supplier risk assessment engine.
//!
//! The pipeline for one calculation is sequential: derive the canonical
//! feature vector from certificate, audit, and profile data, score it with
//! the preferred strategy, rank the contributing factors, attach trend and
//! benchmark context from recorded history, then append the snapshot to the
//! append-only history store. Read paths (history, drivers, benchmark)
//! consume recorded snapshots.

pub mod analytics;
pub mod domain;
pub(crate) mod drivers;
pub(crate) mod features;
pub mod router;
pub mod scorer;
pub mod service;
pub mod stores;

#[cfg(test)]
mod tests;

pub use analytics::{BenchmarkPosition, BenchmarkReport};
pub use domain::{
    Certificate, Driver, FeatureVector, ImpactTier, Mitigation, RiskAssessment, RiskLevel,
    ScorePoint, SubScores, SupplierId, SupplierProfile, TrendDirection, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use router::risk_router;
pub use scorer::{
    BoostedScorer, FeatureContribution, RiskScorer, RuleBasedScorer, ScoreBreakdown,
    ScorerError, ScorerSelection,
};
pub use service::{RiskEngine, RiskEngineError, DEFAULT_HISTORY_DAYS};
pub use stores::{
    AssessmentHistory, AuditLog, CertificateStore, StoreError, SupplierDirectory,
};
