use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::analytics::BenchmarkReport;
use super::domain::{Driver, Mitigation, RiskAssessment, ScorePoint, SupplierId};
use super::service::{RiskEngine, RiskEngineError, DEFAULT_HISTORY_DAYS};
use super::stores::{AssessmentHistory, AuditLog, CertificateStore, SupplierDirectory};

/// Router builder exposing the engine's HTTP surface.
pub fn risk_router<S, C, A, H>(engine: Arc<RiskEngine<S, C, A, H>>) -> Router
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    Router::new()
        .route(
            "/api/v1/risk/assessments/:supplier_id",
            get(assessment_handler::<S, C, A, H>),
        )
        .route(
            "/api/v1/risk/assessments/:supplier_id/recalculate",
            post(recalculate_handler::<S, C, A, H>),
        )
        .route(
            "/api/v1/risk/history/:supplier_id",
            get(history_handler::<S, C, A, H>),
        )
        .route(
            "/api/v1/risk/drivers/:supplier_id",
            get(drivers_handler::<S, C, A, H>),
        )
        .route(
            "/api/v1/risk/benchmark/:supplier_id",
            get(benchmark_handler::<S, C, A, H>),
        )
        .route(
            "/api/v1/risk/mitigations/:supplier_id",
            get(mitigations_handler::<S, C, A, H>),
        )
        .with_state(engine)
}

/// Assessment payload plus whether the snapshot reached the history store.
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub supplier_id: SupplierId,
    pub period_days: i64,
    pub history: Vec<ScorePoint>,
}

#[derive(Debug, Serialize)]
pub struct DriversView {
    pub supplier_id: SupplierId,
    pub drivers: Vec<Driver>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkView {
    pub supplier_id: SupplierId,
    #[serde(flatten)]
    pub report: BenchmarkReport,
    pub comparison_label: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryParams {
    #[serde(default = "default_history_days")]
    days: i64,
}

fn default_history_days() -> i64 {
    DEFAULT_HISTORY_DAYS
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            days: DEFAULT_HISTORY_DAYS,
        }
    }
}

pub(crate) async fn assessment_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    assessment_response(engine.calculate(&id, false))
}

pub(crate) async fn recalculate_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    assessment_response(engine.calculate(&id, true))
}

pub(crate) async fn history_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    match engine.history(&id, params.days) {
        Ok(history) => (
            StatusCode::OK,
            Json(HistoryView {
                supplier_id: id,
                period_days: params.days,
                history,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn drivers_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    match engine.assessment(&id) {
        Ok(assessment) => (
            StatusCode::OK,
            Json(DriversView {
                supplier_id: id,
                drivers: assessment.drivers,
                last_updated: assessment.created_at,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn benchmark_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    match engine.benchmark(&id) {
        Ok(report) => (
            StatusCode::OK,
            Json(BenchmarkView {
                supplier_id: id,
                comparison_label: report.comparison.label(),
                report,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn mitigations_handler<S, C, A, H>(
    State(engine): State<Arc<RiskEngine<S, C, A, H>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    S: SupplierDirectory + 'static,
    C: CertificateStore + 'static,
    A: AuditLog + 'static,
    H: AssessmentHistory + 'static,
{
    let id = SupplierId(supplier_id);
    match engine.mitigations(&id) {
        Ok(mitigations) => {
            (StatusCode::OK, Json(MitigationsView { supplier_id: id, mitigations }))
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Serialize)]
pub struct MitigationsView {
    pub supplier_id: SupplierId,
    pub mitigations: Vec<Mitigation>,
}

fn assessment_response(result: Result<RiskAssessment, RiskEngineError>) -> Response {
    match result {
        Ok(assessment) => (
            StatusCode::OK,
            Json(AssessmentView {
                assessment,
                persisted: true,
                warning: None,
            }),
        )
            .into_response(),
        // The snapshot was computed but never reached the history store;
        // deliver it anyway and flag the gap.
        Err(RiskEngineError::Recording { assessment, source }) => (
            StatusCode::OK,
            Json(AssessmentView {
                assessment: *assessment,
                persisted: false,
                warning: Some(source.to_string()),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RiskEngineError) -> Response {
    let status = match &err {
        RiskEngineError::SupplierNotFound(_) => StatusCode::NOT_FOUND,
        RiskEngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        RiskEngineError::Recording { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
