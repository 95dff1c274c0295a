use crate::risk::domain::ImpactTier;
use crate::risk::drivers::{mitigations, rank};
use crate::risk::scorer::{FeatureContribution, ScoreBreakdown};

fn contribution(feature: &'static str, value: f64, amount: f64) -> FeatureContribution {
    FeatureContribution {
        feature,
        value,
        contribution: amount,
        axis_weight: None,
        label: None,
    }
}

#[test]
fn single_contribution_becomes_a_full_weight_driver() {
    let breakdown = ScoreBreakdown {
        score: 40.0,
        contributions: vec![FeatureContribution {
            feature: "expired_count",
            value: 1.0,
            contribution: 40.0,
            axis_weight: Some(0.4),
            label: Some("Certificate Expired"),
        }],
    };

    let drivers = rank(&breakdown);

    assert_eq!(drivers.len(), 1);
    let driver = &drivers[0];
    assert_eq!(driver.rank, 1);
    assert_eq!(driver.factor, "Certificate Expired");
    assert_eq!(driver.weight, 1.0);
    assert_eq!(driver.impact, ImpactTier::High);
    assert_eq!(driver.action, "Replace expired certificates");
    assert_eq!(driver.action_path, "/dashboard/certificates");
}

#[test]
fn keeps_at_most_three_drivers_with_weights_summing_to_one() {
    let breakdown = ScoreBreakdown {
        score: 75.0,
        contributions: vec![
            contribution("expired_count", 2.0, 40.0),
            contribution("audit_pass_rate", 0.5, 20.0),
            contribution("financial_health_score", 45.0, 10.0),
            contribution("geographic_risk_score", 60.0, 5.0),
        ],
    };

    let drivers = rank(&breakdown);

    assert_eq!(drivers.len(), 3);
    assert_eq!(
        drivers.iter().map(|driver| driver.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    // The weakest axis fell off; weights renormalize over what is shown.
    let total: f64 = drivers.iter().map(|driver| driver.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(drivers[0].weight > drivers[1].weight);
    assert!(drivers[1].weight > drivers[2].weight);
}

#[test]
fn relative_share_decides_the_impact_tier() {
    let breakdown = ScoreBreakdown {
        score: 70.0,
        contributions: vec![
            contribution("expired_count", 2.0, 40.0),
            contribution("audit_pass_rate", 0.5, 20.0),
            contribution("financial_health_score", 45.0, 10.0),
        ],
    };

    let drivers = rank(&breakdown);

    // Shares are 4/7, 2/7, and 1/7.
    assert_eq!(drivers[0].impact, ImpactTier::High);
    assert_eq!(drivers[1].impact, ImpactTier::Medium);
    assert_eq!(drivers[2].impact, ImpactTier::Low);
}

#[test]
fn zero_impact_features_are_never_padded_in() {
    let breakdown = ScoreBreakdown {
        score: 15.0,
        contributions: vec![
            contribution("days_to_nearest_expiry", 45.0, 15.0),
            contribution("audit_pass_rate", 0.95, 0.0),
            contribution("financial_health_score", 85.0, 0.0),
        ],
    };

    let drivers = rank(&breakdown);

    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].weight, 1.0);
}

#[test]
fn negative_attributions_rank_by_magnitude() {
    let breakdown = ScoreBreakdown {
        score: 25.0,
        contributions: vec![
            contribution("audit_pass_rate", 1.0, -18.0),
            contribution("financial_health_score", 90.0, 6.0),
        ],
    };

    let drivers = rank(&breakdown);

    assert_eq!(drivers[0].factor, "Audit Pass Rate");
    assert!((drivers[0].weight - 0.75).abs() < 1e-9);
    assert!((drivers[1].weight - 0.25).abs() < 1e-9);
}

#[test]
fn unknown_features_get_generic_guidance() {
    let breakdown = ScoreBreakdown {
        score: 12.0,
        contributions: vec![contribution("supply_chain_depth", 4.0, 12.0)],
    };

    let drivers = rank(&breakdown);

    assert_eq!(drivers[0].factor, "Supply Chain Depth");
    assert_eq!(drivers[0].action, "Review and improve");
    assert_eq!(drivers[0].action_path, "/dashboard");
}

#[test]
fn mitigations_mirror_the_ranked_drivers() {
    let breakdown = ScoreBreakdown {
        score: 40.0,
        contributions: vec![
            contribution("expired_count", 1.0, 30.0),
            contribution("geographic_risk_score", 70.0, 10.0),
        ],
    };

    let drivers = rank(&breakdown);
    let entries = mitigations(&drivers);

    assert_eq!(entries.len(), drivers.len());
    assert_eq!(entries[0].risk_factor, drivers[0].factor);
    assert_eq!(entries[0].recommendation, drivers[0].action);
    assert_eq!(entries[0].priority, drivers[0].impact);
}
