use chrono::{DateTime, Utc};

use super::domain::{Certificate, RiskAssessment, SupplierId, SupplierProfile};

/// Read access to supplier master data.
pub trait SupplierDirectory: Send + Sync {
    fn fetch(&self, id: &SupplierId) -> Result<Option<SupplierProfile>, StoreError>;
}

/// Read access to the certificates on file for a supplier.
pub trait CertificateStore: Send + Sync {
    fn list_for_supplier(&self, id: &SupplierId) -> Result<Vec<Certificate>, StoreError>;
}

/// Read access to audit outcomes, already reduced to a pass rate in [0,1].
/// `None` means no audit history exists for the supplier.
pub trait AuditLog: Send + Sync {
    fn pass_rate(&self, id: &SupplierId) -> Result<Option<f64>, StoreError>;
}

/// Append-only store of assessment snapshots.
///
/// Implementations must never expose an update or delete path; concurrent
/// appends for the same supplier each land as their own snapshot.
pub trait AssessmentHistory: Send + Sync {
    fn append(&self, assessment: &RiskAssessment) -> Result<(), StoreError>;
    fn latest(&self, id: &SupplierId) -> Result<Option<RiskAssessment>, StoreError>;
    fn since(
        &self,
        id: &SupplierId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, StoreError>;
    /// Most recent score per supplier, across the whole population.
    fn latest_scores(&self) -> Result<Vec<f64>, StoreError>;
}

/// Error enumeration for storage collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
