use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    extractors::AppJson,
    models::SubmitResponseRequest,
    services::{response_service::ResponseService, AppState},
};

/// POST /api/responses - Score and record a submission
pub async fn submit_response(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmitResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "Submitting response for survey_id={}, selected={}, free_text={}",
        req.survey_id,
        req.selected_answer_ids.len(),
        req.free_text_answers.as_ref().map_or(0, |m| m.len())
    );

    let service = ResponseService::new(state.store.clone());
    let result = service.submit_response(&req).await?;

    Ok(Json(result))
}

/// GET /api/responses - All responses with answer text resolved
pub async fn list_responses(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let service = ResponseService::new(state.store.clone());
    let responses = service.list_responses().await?;

    Ok(Json(responses))
}

/// GET /api/responses/{id} - Stored response as recorded
pub async fn get_response(
    State(state): State<Arc<AppState>>,
    Path(response_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Getting response: {}", response_id);

    let service = ResponseService::new(state.store.clone());
    let response = service.get_response(response_id).await?;

    Ok(Json(response))
}
