use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::analytics::{self, BenchmarkReport};
use super::domain::{
    Driver, Mitigation, RiskAssessment, RiskLevel, ScorePoint, SubScores, SupplierId,
};
use super::drivers;
use super::features;
use super::scorer::ScorerSelection;
use super::stores::{
    AssessmentHistory, AuditLog, CertificateStore, StoreError, SupplierDirectory,
};

/// Default lookback for score history reads.
pub const DEFAULT_HISTORY_DAYS: i64 = 180;

/// Error raised by the risk engine.
#[derive(Debug, thiserror::Error)]
pub enum RiskEngineError {
    #[error("supplier {0} not found")]
    SupplierNotFound(SupplierId),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The assessment was computed but could not be recorded; it is carried
    /// here so callers may still use the uncached result.
    #[error("assessment computed but history write failed: {source}")]
    Recording {
        assessment: Box<RiskAssessment>,
        source: StoreError,
    },
}

/// Facade composing feature derivation, scoring, driver ranking, recording,
/// and portfolio analytics into the engine's exposed operations.
///
/// Constructed once at process start with its collaborators injected;
/// requests are independent and share no state beyond the history store.
pub struct RiskEngine<S, C, A, H> {
    suppliers: Arc<S>,
    certificates: Arc<C>,
    audits: Arc<A>,
    history: Arc<H>,
    scorers: ScorerSelection,
}

impl<S, C, A, H> RiskEngine<S, C, A, H>
where
    S: SupplierDirectory,
    C: CertificateStore,
    A: AuditLog,
    H: AssessmentHistory,
{
    pub fn new(
        suppliers: Arc<S>,
        certificates: Arc<C>,
        audits: Arc<A>,
        history: Arc<H>,
        scorers: ScorerSelection,
    ) -> Self {
        Self {
            suppliers,
            certificates,
            audits,
            history,
            scorers,
        }
    }

    /// Compute (or reuse) the current assessment for a supplier.
    ///
    /// With `force` unset, the most recent recorded snapshot is returned
    /// as-is; staleness is the caller's decision. With `force` set, or when
    /// no snapshot exists, the full pipeline runs and the result is appended
    /// to history.
    pub fn calculate(
        &self,
        id: &SupplierId,
        force: bool,
    ) -> Result<RiskAssessment, RiskEngineError> {
        if !force {
            if let Some(cached) = self.history.latest(id)? {
                return Ok(cached);
            }
        }

        let assessment = self.assess(id, Utc::now())?;

        if let Err(source) = self.history.append(&assessment) {
            warn!(supplier = %id, error = %source, "assessment computed but not recorded");
            return Err(RiskEngineError::Recording {
                assessment: Box::new(assessment),
                source,
            });
        }

        Ok(assessment)
    }

    /// Score history for a supplier, oldest first.
    pub fn history(
        &self,
        id: &SupplierId,
        days: i64,
    ) -> Result<Vec<ScorePoint>, RiskEngineError> {
        let cutoff = Utc::now() - Duration::days(days);
        let mut points: Vec<ScorePoint> = self
            .history
            .since(id, cutoff)?
            .iter()
            .map(|snapshot| ScorePoint {
                date: snapshot.created_at,
                risk_score: snapshot.risk_score,
            })
            .collect();
        points.sort_by_key(|point| point.date);
        Ok(points)
    }

    /// Top drivers behind the supplier's current assessment.
    pub fn drivers(&self, id: &SupplierId) -> Result<Vec<Driver>, RiskEngineError> {
        self.assessment(id).map(|assessment| assessment.drivers)
    }

    /// Remediation recommendations derived from the current drivers.
    pub fn mitigations(&self, id: &SupplierId) -> Result<Vec<Mitigation>, RiskEngineError> {
        self.assessment(id)
            .map(|assessment| drivers::mitigations(&assessment.drivers))
    }

    /// Compare the supplier's current score against the population.
    pub fn benchmark(&self, id: &SupplierId) -> Result<BenchmarkReport, RiskEngineError> {
        let assessment = self.assessment(id)?;
        let population = self.history.latest_scores()?;
        Ok(analytics::portfolio_benchmark(
            &population,
            assessment.risk_score,
        ))
    }

    /// Current assessment for read paths that can tolerate an unrecorded
    /// result: a failed history write degrades to the computed snapshot.
    pub fn assessment(&self, id: &SupplierId) -> Result<RiskAssessment, RiskEngineError> {
        match self.calculate(id, false) {
            Err(RiskEngineError::Recording { assessment, .. }) => Ok(*assessment),
            other => other,
        }
    }

    /// Run the full pipeline once: derive features, score, rank drivers,
    /// analyze trend and benchmark, assemble the snapshot.
    fn assess(
        &self,
        id: &SupplierId,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment, RiskEngineError> {
        let profile = self
            .suppliers
            .fetch(id)?
            .ok_or_else(|| RiskEngineError::SupplierNotFound(id.clone()))?;
        let certificates = self.certificates.list_for_supplier(id)?;
        let pass_rate = self.audits.pass_rate(id)?;

        let features = features::derive(&profile, &certificates, pass_rate, now);

        let (breakdown, scorer) = self.scorers.score(&features);
        let score = round_to_tenth(breakdown.score);
        debug!(supplier = %id, scorer, score, breakdown = ?breakdown.contributions, "scored supplier");

        let ranked = drivers::rank(&breakdown);

        let mut points: Vec<ScorePoint> = self
            .history
            .since(id, now - Duration::days(DEFAULT_HISTORY_DAYS))?
            .iter()
            .map(|snapshot| ScorePoint {
                date: snapshot.created_at,
                risk_score: snapshot.risk_score,
            })
            .collect();
        points.push(ScorePoint {
            date: now,
            risk_score: score,
        });
        let trend = analytics::month_over_month(&points, score, now);

        let population = self.history.latest_scores()?;
        let benchmark = analytics::portfolio_benchmark(&population, score);

        Ok(RiskAssessment {
            supplier_id: id.clone(),
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            drivers: ranked,
            sub_scores: SubScores::from_features(&features),
            features,
            trend: trend.trend,
            change_from_last_month: round_to_tenth(trend.change),
            industry_benchmark: round_to_tenth(benchmark.industry_average),
            created_at: now,
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
