use super::domain::{Driver, ImpactTier, Mitigation};
use super::scorer::ScoreBreakdown;

pub(crate) const MAX_DRIVERS: usize = 3;

const HIGH_IMPACT_SHARE: f64 = 0.4;
const MEDIUM_IMPACT_SHARE: f64 = 0.2;

/// Rank the scorer's contributions into at most [`MAX_DRIVERS`] driver
/// records.
///
/// Zero-impact features are dropped, never padded in; weights are the share
/// of each driver within the returned set, so they sum to 1.0 whenever the
/// list is non-empty.
pub(crate) fn rank(breakdown: &ScoreBreakdown) -> Vec<Driver> {
    let mut ranked: Vec<_> = breakdown
        .contributions
        .iter()
        .filter(|entry| entry.contribution.abs() > f64::EPSILON)
        .collect();
    ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    ranked.truncate(MAX_DRIVERS);

    let total_impact: f64 = ranked.iter().map(|entry| entry.contribution.abs()).sum();

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let weight = entry.contribution.abs() / total_impact;
            let guidance = guidance_for(entry.feature);
            Driver {
                rank: index as u8 + 1,
                factor: entry
                    .label
                    .map(str::to_string)
                    .unwrap_or_else(|| display_name(entry.feature)),
                weight,
                description: describe(entry.feature, entry.value),
                impact: tier_for(weight),
                action: guidance.action.to_string(),
                action_path: guidance.path.to_string(),
                value: entry.value,
            }
        })
        .collect()
}

/// Remediation view of a ranked driver list.
pub(crate) fn mitigations(drivers: &[Driver]) -> Vec<Mitigation> {
    drivers
        .iter()
        .map(|driver| Mitigation {
            risk_factor: driver.factor.clone(),
            current_value: driver.value,
            recommendation: driver.action.clone(),
            priority: driver.impact,
            action_path: driver.action_path.clone(),
        })
        .collect()
}

fn tier_for(weight: f64) -> ImpactTier {
    if weight > HIGH_IMPACT_SHARE {
        ImpactTier::High
    } else if weight > MEDIUM_IMPACT_SHARE {
        ImpactTier::Medium
    } else {
        ImpactTier::Low
    }
}

struct FactorGuidance {
    action: &'static str,
    path: &'static str,
}

/// Static remediation catalog keyed by feature name. Unrecognized features
/// get the generic guidance rather than an error, so a newer scorer can ship
/// features before this table learns about them.
fn guidance_for(feature: &str) -> FactorGuidance {
    match feature {
        "days_to_nearest_expiry" => FactorGuidance {
            action: "Renew certificate immediately",
            path: "/dashboard/certificates/upload",
        },
        "expired_count" => FactorGuidance {
            action: "Replace expired certificates",
            path: "/dashboard/certificates",
        },
        "expiring_soon_count" => FactorGuidance {
            action: "Renew expiring certificates",
            path: "/dashboard/certificates",
        },
        "audit_pass_rate" => FactorGuidance {
            action: "Schedule audit preparation",
            path: "/dashboard/compliance",
        },
        "financial_health_score" => FactorGuidance {
            action: "Update financial information",
            path: "/dashboard/profile",
        },
        "geographic_risk_score" => FactorGuidance {
            action: "Review geographic risk factors",
            path: "/dashboard/settings",
        },
        "years_in_business" => FactorGuidance {
            action: "Provide business history documentation",
            path: "/dashboard/profile",
        },
        _ => FactorGuidance {
            action: "Review and improve",
            path: "/dashboard",
        },
    }
}

fn describe(feature: &str, value: f64) -> String {
    match feature {
        "days_to_nearest_expiry" => format!("Certificate expires in {} days", value as i64),
        "total_certificates" => format!("{} certificates on file", value as i64),
        "expired_count" => format!("{} expired certificates", value as i64),
        "expiring_soon_count" => format!("{} certificates expiring soon", value as i64),
        "valid_count" => format!("{} valid certificates", value as i64),
        "audit_pass_rate" => format!("Audit pass rate: {:.0}%", value * 100.0),
        "avg_certificate_validity_days" => {
            format!("Average certificate validity: {value:.0} days")
        }
        "financial_health_score" => format!("Financial health score: {value:.0}"),
        "geographic_risk_score" => format!("Geographic risk score: {value:.0}"),
        "years_in_business" => format!("Years in business: {}", value as i64),
        other => display_name(other),
    }
}

/// "days_to_nearest_expiry" -> "Days To Nearest Expiry".
fn display_name(feature: &str) -> String {
    feature
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
