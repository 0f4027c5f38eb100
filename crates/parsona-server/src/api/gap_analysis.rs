use axum::{extract::State, Extension, Json};
use parsona_core::{SignalData, DEFAULT_PERSONA};
use parsona_engine::GapReport;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

/// Ad-hoc comparison of caller-supplied signal data against a persona.
#[derive(Debug, Deserialize)]
pub(super) struct GapAnalysisRequest {
    signal: SignalData,
    #[serde(default)]
    persona: Option<String>,
}

pub(super) async fn analyze_gap(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<GapAnalysisRequest>,
) -> Json<ApiResponse<GapReport>> {
    let persona = request.persona.as_deref().unwrap_or(DEFAULT_PERSONA);
    let report = parsona_engine::analyze(&request.signal, persona, &state.benchmarks);
    Json(ApiResponse::new(req_id.0, report))
}
