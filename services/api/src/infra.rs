use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use supplier_risk::risk::{
    AssessmentHistory, AuditLog, Certificate, CertificateStore, RiskAssessment, StoreError,
    SupplierDirectory, SupplierId, SupplierProfile,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySupplierDirectory {
    profiles: Arc<Mutex<HashMap<SupplierId, SupplierProfile>>>,
}

impl InMemorySupplierDirectory {
    pub(crate) fn insert(&self, profile: SupplierProfile) {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.insert(profile.id.clone(), profile);
    }
}

impl SupplierDirectory for InMemorySupplierDirectory {
    fn fetch(&self, id: &SupplierId) -> Result<Option<SupplierProfile>, StoreError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCertificateStore {
    records: Arc<Mutex<HashMap<SupplierId, Vec<Certificate>>>>,
}

impl InMemoryCertificateStore {
    pub(crate) fn insert(&self, id: &SupplierId, certificates: Vec<Certificate>) {
        let mut guard = self.records.lock().expect("certificate mutex poisoned");
        guard.insert(id.clone(), certificates);
    }
}

impl CertificateStore for InMemoryCertificateStore {
    fn list_for_supplier(&self, id: &SupplierId) -> Result<Vec<Certificate>, StoreError> {
        let guard = self.records.lock().expect("certificate mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    rates: Arc<Mutex<HashMap<SupplierId, f64>>>,
}

impl InMemoryAuditLog {
    pub(crate) fn set(&self, id: &SupplierId, pass_rate: f64) {
        let mut guard = self.rates.lock().expect("audit mutex poisoned");
        guard.insert(id.clone(), pass_rate);
    }
}

impl AuditLog for InMemoryAuditLog {
    fn pass_rate(&self, id: &SupplierId) -> Result<Option<f64>, StoreError> {
        let guard = self.rates.lock().expect("audit mutex poisoned");
        Ok(guard.get(id).copied())
    }
}

/// Append-only history backed by a plain vector; snapshots are pushed and
/// never rewritten.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentHistory {
    snapshots: Arc<Mutex<Vec<RiskAssessment>>>,
}

impl AssessmentHistory for InMemoryAssessmentHistory {
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

/// Seed a small supplier portfolio spanning the risk bands. Returns the
/// seeded profiles so callers can iterate them by name.
pub(crate) fn seed_demo_portfolio(
    directory: &InMemorySupplierDirectory,
    certificates: &InMemoryCertificateStore,
    audits: &InMemoryAuditLog,
) -> Vec<SupplierProfile> {
    let now = Utc::now();

    let profiles = vec![
        SupplierProfile {
            id: SupplierId("sup-nordwind".to_string()),
            name: "Nordwind Logistics".to_string(),
            city: Some("Hamburg".to_string()),
            financial_health_score: Some(88.0),
            geographic_risk_score: Some(15.0),
            registered_at: Some(now - Duration::days(365 * 12)),
        },
        SupplierProfile {
            id: SupplierId("sup-meridian".to_string()),
            name: "Meridian Textiles".to_string(),
            city: Some("Porto".to_string()),
            financial_health_score: Some(75.0),
            geographic_risk_score: Some(30.0),
            registered_at: Some(now - Duration::days(365 * 6)),
        },
        SupplierProfile {
            id: SupplierId("sup-cascadia".to_string()),
            name: "Cascadia Components".to_string(),
            city: Some("Mumbai".to_string()),
            financial_health_score: Some(30.0),
            geographic_risk_score: Some(80.0),
            registered_at: Some(now - Duration::days(300)),
        },
    ];

    for profile in &profiles {
        directory.insert(profile.clone());
    }

    certificates.insert(
        &profiles[0].id,
        vec![
            demo_certificate(now, "ISO 9001", 200, 500),
            demo_certificate(now, "ISO 14001", 100, 400),
        ],
    );
    audits.set(&profiles[0].id, 0.97);

    certificates.insert(
        &profiles[1].id,
        vec![
            demo_certificate(now, "ISO 9001", 375, -10),
            demo_certificate(now, "OEKO-TEX", 150, 215),
        ],
    );
    audits.set(&profiles[1].id, 1.0);

    certificates.insert(
        &profiles[2].id,
        vec![
            demo_certificate(now, "ISO 9001", 500, -40),
            demo_certificate(now, "REACH", 400, -5),
        ],
    );
    audits.set(&profiles[2].id, 0.3);

    profiles
}

fn demo_certificate(
    now: DateTime<Utc>,
    name: &str,
    issued_days_ago: i64,
    expires_in_days: i64,
) -> Certificate {
    Certificate {
        name: name.to_string(),
        issued_on: Some(now - Duration::days(issued_days_ago)),
        expires_on: Some(now + Duration::days(expires_in_days)),
    }
}
