// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface over the experiment core.
//!
//! Thin plumbing: deserializes request shapes, invokes the services, and
//! maps each error kind to a status code in one exhaustive match. All
//! wire names are camelCase.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::application::experiment::{ExperimentAssignment, ExperimentService};
use crate::application::metrics::{MetricsService, TestMetrics};
use crate::domain::error::AbTestError;
use crate::domain::experiment::{TestId, TestStatus, Variant, VariantId};
use crate::domain::repository::TestCatalog;

pub struct AppState {
    pub experiment_service: Arc<ExperimentService>,
    pub metrics_service: Arc<MetricsService>,
    pub catalog: Arc<dyn TestCatalog>,
}

/// Build the HTTP router. CORS is wide open, matching the deployment
/// posture of the SDK-embedding frontends this serves.
pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/admin/test", post(create_test))
        .route("/admin/test/{test_id}", put(update_test))
        .route("/admin/test/{test_id}/metrics", get(get_test_metrics))
        .route("/admin/tests", get(list_tests))
        .route("/experiment", get(get_experiment_query).post(get_experiment_body))
        .route("/conversion", post(register_conversion))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for AbTestError {
    fn into_response(self) -> Response {
        let status = match &self {
            AbTestError::TestNotFound(_) => StatusCode::NOT_FOUND,
            AbTestError::TestInactive(_) => StatusCode::NOT_FOUND,
            AbTestError::InvalidDistribution { .. } => StatusCode::BAD_REQUEST,
            AbTestError::TestAlreadyExists(_) => StatusCode::CONFLICT,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRequest {
    pub test_id: TestId,
    pub name: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestRequest {
    pub name: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Serialize)]
pub struct AdminTestResponse {
    pub ok: bool,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentParams {
    pub test_id: TestId,
    pub visitor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub test_id: TestId,
    pub variant_id: VariantId,
    pub event: String,
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestListItem {
    pub test_id: TestId,
    pub name: String,
    pub status: TestStatus,
    pub variant_count: usize,
}

#[derive(Debug, Serialize)]
pub struct TestsListResponse {
    pub tests: Vec<TestListItem>,
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "A/B Testing Backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<Json<AdminTestResponse>, AbTestError> {
    debug!(test_id = %payload.test_id, "create test");
    let message = state
        .experiment_service
        .create_test(payload.test_id, payload.name, payload.variants)
        .await?;
    Ok(Json(AdminTestResponse { ok: true, message }))
}

async fn update_test(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<String>,
    Json(payload): Json<UpdateTestRequest>,
) -> Result<Json<AdminTestResponse>, AbTestError> {
    debug!(%test_id, "update test");
    let message = state
        .experiment_service
        .update_test(TestId::new(test_id), payload.name, payload.variants)
        .await?;
    Ok(Json(AdminTestResponse { ok: true, message }))
}

async fn get_test_metrics(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<String>,
) -> Result<Json<TestMetrics>, AbTestError> {
    let metrics = state
        .metrics_service
        .get_test_metrics(&TestId::new(test_id))
        .await?;
    Ok(Json(metrics))
}

async fn list_tests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestsListResponse>, AbTestError> {
    let tests = state
        .catalog
        .list_all()
        .await?
        .into_iter()
        .map(|test| TestListItem {
            variant_count: test.variant_count(),
            test_id: test.test_id,
            name: test.name,
            status: test.status,
        })
        .collect();
    Ok(Json(TestsListResponse { tests }))
}

/// Query-parameter form: `GET /experiment?testId=..&visitorId=..`.
async fn get_experiment_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExperimentParams>,
) -> Result<Json<ExperimentAssignment>, AbTestError> {
    assign_experiment(&state, params).await
}

/// JSON-body form of the same operation.
async fn get_experiment_body(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ExperimentParams>,
) -> Result<Json<ExperimentAssignment>, AbTestError> {
    assign_experiment(&state, params).await
}

async fn assign_experiment(
    state: &AppState,
    params: ExperimentParams,
) -> Result<Json<ExperimentAssignment>, AbTestError> {
    debug!(test_id = %params.test_id, "experiment requested");
    let assignment = state
        .experiment_service
        .get_experiment(&params.test_id, params.visitor_id.as_deref())
        .await?;
    Ok(Json(assignment))
}

async fn register_conversion(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConversionRequest>,
) -> Result<Json<ConversionResponse>, AbTestError> {
    debug!(test_id = %payload.test_id, variant_id = %payload.variant_id, "conversion");
    state
        .experiment_service
        .register_conversion(&payload.test_id, payload.variant_id, payload.event)
        .await?;
    Ok(Json(ConversionResponse { ok: true }))
}
