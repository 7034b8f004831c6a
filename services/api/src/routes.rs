use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use intern_placement::workflows::allocation::report::views::PlacementReportSummary;
use intern_placement::workflows::allocation::{
    AllocationEngine, FacilityCapacity, Intern, LockedAssignment, OverflowGroup, OverflowPlan,
    OverflowResolution, PlacementReport, PlacementState,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct AllocationRequest {
    pub(crate) roster: Vec<Intern>,
    pub(crate) capacities: Vec<FacilityCapacity>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    #[serde(default)]
    pub(crate) locked: Option<Vec<LockedAssignment>>,
    /// When absent, overflow is returned unresolved for a follow-up overflow call.
    #[serde(default)]
    pub(crate) overflow_plan: Option<OverflowPlan>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllocationResponse {
    pub(crate) seed: u64,
    pub(crate) roster: Vec<Intern>,
    pub(crate) states: Vec<PlacementState>,
    pub(crate) locked: Vec<usize>,
    pub(crate) overflow: Vec<OverflowGroup>,
    pub(crate) warnings: Vec<String>,
    pub(crate) summary: PlacementReportSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverflowRequest {
    pub(crate) roster: Vec<Intern>,
    pub(crate) overflow: Vec<OverflowGroup>,
    #[serde(default)]
    pub(crate) plan: Option<OverflowPlan>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/allocations", post(allocation_endpoint))
        .route("/api/v1/allocations/overflow", post(overflow_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn allocation_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AllocationRequest>,
) -> Json<AllocationResponse> {
    let AllocationRequest {
        roster,
        capacities,
        seed,
        locked,
        overflow_plan,
        today,
    } = payload;

    let engine = AllocationEngine::new(seed.unwrap_or(state.allocation.seed));
    let outcome = match &overflow_plan {
        Some(plan) => engine.allocate_and_resolve(roster, &capacities, locked.as_deref(), plan),
        None => engine.allocate(roster, &capacities, locked.as_deref()),
    };

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let summary = PlacementReport::build(&outcome.roster, &capacities).summary(today);
    let states = outcome.states();

    Json(AllocationResponse {
        seed: engine.seed(),
        roster: outcome.roster,
        states,
        locked: outcome.locked,
        overflow: outcome.overflow,
        warnings: outcome.warnings,
        summary,
    })
}

pub(crate) async fn overflow_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<OverflowRequest>,
) -> Json<OverflowResolution> {
    let plan = payload
        .plan
        .unwrap_or_else(|| OverflowPlan::new(state.allocation.overflow_action));
    let engine = AllocationEngine::new(payload.seed.unwrap_or(state.allocation.seed));

    Json(engine.resolve_overflow(payload.roster, &payload.overflow, &plan))
}
