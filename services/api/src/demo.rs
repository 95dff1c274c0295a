use crate::infra::{
    seed_demo_portfolio, InMemoryAssessmentHistory, InMemoryAuditLog, InMemoryCertificateStore,
    InMemorySupplierDirectory,
};
use clap::Args;
use std::sync::Arc;
use supplier_risk::error::AppError;
use supplier_risk::risk::{BoostedScorer, RiskEngine, ScorerSelection, SupplierId};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Focus the detailed walkthrough on one seeded supplier id
    #[arg(long)]
    pub(crate) supplier: Option<String>,
    /// Recalculate every assessment instead of reusing cached snapshots
    #[arg(long)]
    pub(crate) force: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let directory = Arc::new(InMemorySupplierDirectory::default());
    let certificates = Arc::new(InMemoryCertificateStore::default());
    let audits = Arc::new(InMemoryAuditLog::default());
    let history = Arc::new(InMemoryAssessmentHistory::default());
    let profiles = seed_demo_portfolio(&directory, &certificates, &audits);

    let engine = RiskEngine::new(
        directory,
        certificates,
        audits,
        history,
        ScorerSelection::new(Some(Arc::new(BoostedScorer::bootstrap()))),
    );

    println!("Supplier risk assessment demo");
    println!("\nPortfolio");
    for profile in &profiles {
        let assessment = engine.calculate(&profile.id, args.force)?;
        println!(
            "- {} ({}): score {:.1}, level {}, trend {}",
            profile.name,
            profile.id,
            assessment.risk_score,
            assessment.risk_level.label(),
            assessment.trend.label()
        );
    }

    let focus = match args.supplier {
        Some(id) => SupplierId(id),
        None => profiles[1].id.clone(),
    };

    let assessment = engine.calculate(&focus, false)?;
    println!("\nAssessment detail for {focus}");
    println!(
        "Score {:.1} ({}), recorded {}",
        assessment.risk_score,
        assessment.risk_level.label(),
        assessment.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Sub-scores: certificates {}, audits {}, financial {:.0}",
        assessment.sub_scores.certificate_health,
        assessment.sub_scores.audit_performance,
        assessment.sub_scores.financial_stability
    );

    println!("\nFeature vector");
    for (name, value) in assessment.features.entries() {
        println!("- {name}: {value:.1}");
    }

    if assessment.drivers.is_empty() {
        println!("\nRisk drivers: none");
    } else {
        println!("\nRisk drivers");
        for driver in &assessment.drivers {
            println!(
                "{}. {} (weight {:.2}, impact {}): {} -> {}",
                driver.rank,
                driver.factor,
                driver.weight,
                driver.impact.label(),
                driver.description,
                driver.action
            );
        }
    }

    let mitigations = engine.mitigations(&focus)?;
    if !mitigations.is_empty() {
        println!("\nRecommended mitigations");
        for mitigation in &mitigations {
            println!(
                "- [{}] {}: {} (see {})",
                mitigation.priority.label(),
                mitigation.risk_factor,
                mitigation.recommendation,
                mitigation.action_path
            );
        }
    }

    let benchmark = engine.benchmark(&focus)?;
    println!(
        "\nBenchmark: score {:.1} vs industry average {:.1}, percentile {:.0} ({})",
        benchmark.supplier_score,
        benchmark.industry_average,
        benchmark.percentile,
        benchmark.comparison.label()
    );

    engine.calculate(&focus, true)?;
    let points = engine.history(&focus, 180)?;
    println!(
        "\nHistory now holds {} snapshot(s) for {focus} after a forced recalculation",
        points.len()
    );

    Ok(())
}
