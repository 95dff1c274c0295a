use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::risk::domain::{
    Certificate, FeatureVector, RiskAssessment, RiskLevel, SubScores, SupplierId,
    SupplierProfile, TrendDirection,
};
use crate::risk::scorer::{RiskScorer, ScoreBreakdown, ScorerError, ScorerSelection};
use crate::risk::service::RiskEngine;
use crate::risk::stores::{
    AssessmentHistory, AuditLog, CertificateStore, StoreError, SupplierDirectory,
};

pub(super) fn supplier_id() -> SupplierId {
    SupplierId("sup-001".to_string())
}

pub(super) fn profile(id: &SupplierId) -> SupplierProfile {
    SupplierProfile {
        id: id.clone(),
        name: "Meridian Textiles".to_string(),
        city: Some("Rotterdam".to_string()),
        financial_health_score: Some(80.0),
        geographic_risk_score: Some(20.0),
        registered_at: Some(Utc::now() - Duration::days(365 * 10)),
    }
}

pub(super) fn bare_profile(id: &SupplierId) -> SupplierProfile {
    SupplierProfile {
        id: id.clone(),
        name: "Unlisted Supplier".to_string(),
        city: None,
        financial_health_score: None,
        geographic_risk_score: None,
        registered_at: None,
    }
}

/// Certificate with dates relative to now; negative `expires_in_days` means
/// already expired.
pub(super) fn certificate(name: &str, issued_days_ago: i64, expires_in_days: i64) -> Certificate {
    let now = Utc::now();
    Certificate {
        name: name.to_string(),
        issued_on: Some(now - Duration::days(issued_days_ago)),
        expires_on: Some(now + Duration::days(expires_in_days)),
    }
}

/// Minimal snapshot for seeding history stores in trend tests.
pub(super) fn snapshot(id: &SupplierId, score: f64, created_at: DateTime<Utc>) -> RiskAssessment {
    let features = FeatureVector::neutral();
    RiskAssessment {
        supplier_id: id.clone(),
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        drivers: Vec::new(),
        sub_scores: SubScores::from_features(&features),
        features,
        trend: TrendDirection::Stable,
        change_from_last_month: 0.0,
        industry_benchmark: score,
        created_at,
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    profiles: Mutex<HashMap<SupplierId, SupplierProfile>>,
}

impl MemoryDirectory {
    pub(super) fn insert(&self, profile: SupplierProfile) {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.insert(profile.id.clone(), profile);
    }
}

impl SupplierDirectory for MemoryDirectory {
    fn fetch(&self, id: &SupplierId) -> Result<Option<SupplierProfile>, StoreError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryCertificates {
    records: Mutex<HashMap<SupplierId, Vec<Certificate>>>,
}

impl MemoryCertificates {
    pub(super) fn insert(&self, id: &SupplierId, certificates: Vec<Certificate>) {
        let mut guard = self.records.lock().expect("certificate mutex poisoned");
        guard.insert(id.clone(), certificates);
    }
}

impl CertificateStore for MemoryCertificates {
    fn list_for_supplier(&self, id: &SupplierId) -> Result<Vec<Certificate>, StoreError> {
        let guard = self.records.lock().expect("certificate mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct MemoryAudits {
    rates: Mutex<HashMap<SupplierId, f64>>,
}

impl MemoryAudits {
    pub(super) fn set(&self, id: &SupplierId, pass_rate: f64) {
        let mut guard = self.rates.lock().expect("audit mutex poisoned");
        guard.insert(id.clone(), pass_rate);
    }
}

impl AuditLog for MemoryAudits {
    fn pass_rate(&self, id: &SupplierId) -> Result<Option<f64>, StoreError> {
        let guard = self.rates.lock().expect("audit mutex poisoned");
        Ok(guard.get(id).copied())
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    snapshots: Mutex<Vec<RiskAssessment>>,
}

impl MemoryHistory {
    pub(super) fn seed(&self, assessment: RiskAssessment) {
        let mut guard = self.snapshots.lock().expect("history mutex poisoned");
        guard.push(assessment);
    }

    pub(super) fn len(&self) -> usize {
        self.snapshots.lock().expect("history mutex poisoned").len()
    }
}

impl AssessmentHistory for MemoryHistory {
    fn append(&self, assessment: &RiskAssessment) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().expect("history mutex poisoned");
        guard.push(assessment.clone());
        Ok(())
    }

    fn latest(&self, id: &SupplierId) -> Result<Option<RiskAssessment>, StoreError> {
        let guard = self.snapshots.lock().expect("history mutex poisoned");
        Ok(guard
            .iter()
            .filter(|snapshot| &snapshot.supplier_id == id)
            .max_by_key(|snapshot| snapshot.created_at)
            .cloned())
    }

    fn since(
        &self,
        id: &SupplierId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, StoreError> {
        let guard = self.snapshots.lock().expect("history mutex poisoned");
        Ok(guard
            .iter()
            .filter(|snapshot| &snapshot.supplier_id == id && snapshot.created_at >= cutoff)
            .cloned()
            .collect())
    }

    fn latest_scores(&self) -> Result<Vec<f64>, StoreError> {
        let guard = self.snapshots.lock().expect("history mutex poisoned");
        let mut latest: HashMap<SupplierId, (DateTime<Utc>, f64)> = HashMap::new();
        for snapshot in guard.iter() {
            let entry = latest
                .entry(snapshot.supplier_id.clone())
                .or_insert((snapshot.created_at, snapshot.risk_score));
            if snapshot.created_at >= entry.0 {
                *entry = (snapshot.created_at, snapshot.risk_score);
            }
        }
        Ok(latest.into_values().map(|(_, score)| score).collect())
    }
}

/// History whose writes always fail; reads behave as an empty store.
pub(super) struct WriteFailingHistory;

impl AssessmentHistory for WriteFailingHistory {
    fn append(&self, _assessment: &RiskAssessment) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("history write rejected".to_string()))
    }

    fn latest(&self, _id: &SupplierId) -> Result<Option<RiskAssessment>, StoreError> {
        Ok(None)
    }

    fn since(
        &self,
        _id: &SupplierId,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, StoreError> {
        Ok(Vec::new())
    }

    fn latest_scores(&self) -> Result<Vec<f64>, StoreError> {
        Ok(Vec::new())
    }
}

/// Scorer that always errors, for exercising the fallback policy.
pub(super) struct FailingScorer;

impl RiskScorer for FailingScorer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn score(&self, _features: &FeatureVector) -> Result<ScoreBreakdown, ScorerError> {
        Err(ScorerError::Artifact("synthetic failure".to_string()))
    }
}

pub(super) struct EngineHarness {
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) certificates: Arc<MemoryCertificates>,
    pub(super) audits: Arc<MemoryAudits>,
    pub(super) history: Arc<MemoryHistory>,
    pub(super) engine:
        Arc<RiskEngine<MemoryDirectory, MemoryCertificates, MemoryAudits, MemoryHistory>>,
}

/// Rule-based engine over empty in-memory stores.
pub(super) fn harness() -> EngineHarness {
    let directory = Arc::new(MemoryDirectory::default());
    let certificates = Arc::new(MemoryCertificates::default());
    let audits = Arc::new(MemoryAudits::default());
    let history = Arc::new(MemoryHistory::default());
    let engine = Arc::new(RiskEngine::new(
        directory.clone(),
        certificates.clone(),
        audits.clone(),
        history.clone(),
        ScorerSelection::rule_based_only(),
    ));

    EngineHarness {
        directory,
        certificates,
        audits,
        history,
        engine,
    }
}

/// Harness seeded with a supplier holding one long-expired certificate and a
/// clean audit record: the expired-certificate axis is the only contributor.
pub(super) fn expired_certificate_harness() -> (EngineHarness, SupplierId) {
    let harness = harness();
    let id = supplier_id();
    harness.directory.insert(profile(&id));
    harness
        .certificates
        .insert(&id, vec![certificate("ISO 9001", 375, -10)]);
    harness.audits.set(&id, 1.0);
    (harness, id)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
