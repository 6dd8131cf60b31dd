use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    extractors::ValidJson,
    models::CreateSurveyRequest,
    services::{survey_service::SurveyService, AppState},
};

/// GET /api/surveys - All surveys with questions and answers
pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let service = SurveyService::new(state.store.clone());
    let surveys = service.list_surveys().await?;

    Ok(Json(surveys))
}

/// GET /api/surveys/{id}
pub async fn get_survey(
    State(state): State<Arc<AppState>>,
    Path(survey_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Getting survey: {}", survey_id);

    let service = SurveyService::new(state.store.clone());
    let survey = service.get_survey(survey_id).await?;

    Ok(Json(survey))
}

/// POST /api/surveys
pub async fn create_survey(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateSurveyRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Creating survey: {}", req.title);

    let service = SurveyService::new(state.store.clone());
    let survey = service.create_survey(&req).await?;
    let location = format!("/api/surveys/{}", survey.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(survey)))
}

/// PUT /api/surveys/{id}
pub async fn update_survey(
    State(state): State<Arc<AppState>>,
    Path(survey_id): Path<i64>,
    ValidJson(req): ValidJson<CreateSurveyRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Updating survey: {}", survey_id);

    let service = SurveyService::new(state.store.clone());
    service.update_survey(survey_id, &req).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/surveys/{id}
pub async fn delete_survey(
    State(state): State<Arc<AppState>>,
    Path(survey_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Deleting survey: {}", survey_id);

    let service = SurveyService::new(state.store.clone());
    service.delete_survey(survey_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
