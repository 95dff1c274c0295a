use chrono::{DateTime, Duration, Utc};

use super::domain::{
    Certificate, FeatureVector, SupplierProfile, DEFAULT_AUDIT_PASS_RATE,
    DEFAULT_FINANCIAL_HEALTH, DEFAULT_GEOGRAPHIC_RISK, DEFAULT_YEARS_IN_BUSINESS,
};

/// Certificates expiring within this window count as "expiring soon".
pub(crate) const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Derive the canonical feature vector from raw supplier records.
///
/// Missing data never fails derivation: certificate-derived features resolve
/// to zero and the remaining indicators to their neutral priors, so a brand
/// new supplier still gets a deterministic vector.
pub(crate) fn derive(
    profile: &SupplierProfile,
    certificates: &[Certificate],
    audit_pass_rate: Option<f64>,
    now: DateTime<Utc>,
) -> FeatureVector {
    let soon_cutoff = now + Duration::days(EXPIRING_SOON_WINDOW_DAYS);

    let mut expired = 0usize;
    let mut expiring_soon = 0usize;
    let mut nearest_expiry_days: Option<i64> = None;
    let mut validity_spans: Vec<i64> = Vec::new();

    for certificate in certificates {
        match certificate.expires_on {
            Some(expiry) if expiry < now => expired += 1,
            Some(expiry) => {
                if expiry < soon_cutoff {
                    expiring_soon += 1;
                }
                let days = (expiry - now).num_days();
                nearest_expiry_days = Some(match nearest_expiry_days {
                    Some(current) => current.min(days),
                    None => days,
                });
            }
            // A certificate without an expiry date cannot be expired or
            // expiring; it stays in the valid bucket.
            None => {}
        }

        if let (Some(issued), Some(expiry)) = (certificate.issued_on, certificate.expires_on) {
            let span = (expiry - issued).num_days();
            if span > 0 {
                validity_spans.push(span);
            }
        }
    }

    let total = certificates.len();
    let valid = total - expired - expiring_soon;

    let avg_validity = if validity_spans.is_empty() {
        0.0
    } else {
        validity_spans.iter().sum::<i64>() as f64 / validity_spans.len() as f64
    };

    FeatureVector {
        days_to_nearest_expiry: nearest_expiry_days.unwrap_or(0).max(0) as f64,
        total_certificates: total as f64,
        expired_count: expired as f64,
        expiring_soon_count: expiring_soon as f64,
        valid_count: valid as f64,
        audit_pass_rate: audit_pass_rate
            .unwrap_or(DEFAULT_AUDIT_PASS_RATE)
            .clamp(0.0, 1.0),
        avg_certificate_validity_days: avg_validity,
        financial_health_score: profile
            .financial_health_score
            .unwrap_or(DEFAULT_FINANCIAL_HEALTH),
        geographic_risk_score: profile
            .geographic_risk_score
            .unwrap_or(DEFAULT_GEOGRAPHIC_RISK),
        years_in_business: years_in_business(profile, now),
    }
}

fn years_in_business(profile: &SupplierProfile, now: DateTime<Utc>) -> f64 {
    match profile.registered_at {
        Some(registered) if registered <= now => ((now - registered).num_days() / 365) as f64,
        _ => DEFAULT_YEARS_IN_BUSINESS,
    }
}
