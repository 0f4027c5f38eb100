use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use parsona_core::{ScoreRecord, SignalRecord, StoreError, DEFAULT_PERSONA};
use parsona_engine::{DashboardView, EngineError, ExplainContext, Explanation, SyncOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct SyncRequest {
    #[serde(default)]
    activities: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PersonaQuery {
    persona: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExplanationRequest {
    persona: Option<String>,
    #[serde(flatten)]
    context: ExplainContext,
}

#[derive(Debug, Serialize)]
pub(super) struct ExplanationData {
    target_persona: String,
    identity_alignment_score: i32,
    #[serde(flatten)]
    explanation: Explanation,
}

fn persona_or_default(persona: Option<&str>) -> &str {
    persona
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PERSONA)
}

fn store_error(request_id: String, error: StoreError) -> ApiError {
    map_engine_error(request_id, &EngineError::Store(error))
}

pub(super) async fn sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    body: Option<Json<SyncRequest>>,
) -> Result<Json<ApiResponse<SyncOutcome>>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let outcome = parsona_engine::sync_activities(
        state.store.as_ref(),
        &state.sync_options,
        user_id,
        request.activities,
    )
    .await
    .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, outcome)))
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PersonaQuery>,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let persona = persona_or_default(query.persona.as_deref());
    let view = parsona_engine::dashboard(
        state.store.as_ref(),
        &state.benchmarks,
        user_id,
        persona,
    )
    .await
    .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, view)))
}

pub(super) async fn latest_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SignalRecord>>, ApiError> {
    let signal = state
        .store
        .latest_signal(user_id)
        .await
        .map_err(|e| store_error(req_id.0.clone(), e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no signal for user {user_id}"),
            )
        })?;

    Ok(Json(ApiResponse::new(req_id.0, signal)))
}

pub(super) async fn latest_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScoreRecord>>, ApiError> {
    let score = state
        .store
        .latest_score(user_id)
        .await
        .map_err(|e| store_error(req_id.0.clone(), e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no score for user {user_id}"),
            )
        })?;

    Ok(Json(ApiResponse::new(req_id.0, score)))
}

pub(super) async fn explanation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    body: Option<Json<ExplanationRequest>>,
) -> Result<Json<ApiResponse<ExplanationData>>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let signal = state
        .store
        .latest_signal(user_id)
        .await
        .map_err(|e| store_error(req_id.0.clone(), e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no signal for user {user_id}"),
            )
        })?;

    let persona = persona_or_default(request.persona.as_deref());
    let report = parsona_engine::analyze(&signal.computed_data, persona, &state.benchmarks);
    let explanation = parsona_engine::explain_gap(
        state.explainer.as_deref(),
        &report,
        &signal.computed_data,
        &request.context,
    )
    .await;

    Ok(Json(ApiResponse::new(
        req_id.0,
        ExplanationData {
            target_persona: report.target_persona,
            identity_alignment_score: report.score,
            explanation,
        },
    )))
}
