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
    models::CreateQuestionRequest,
    services::{question_service::QuestionService, AppState},
};

/// POST /api/questions - Add a question (and its answers) to a survey
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "Creating question for survey_id={}, type={:?}",
        req.survey_id,
        req.question_type
    );

    let service = QuestionService::new(state.store.clone());
    let question = service.create_question(&req).await?;
    let location = format!("/api/questions/{}", question.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(question),
    ))
}

/// GET /api/questions/{id}
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let service = QuestionService::new(state.store.clone());
    let question = service.get_question(question_id).await?;

    Ok(Json(question))
}

/// PUT /api/questions/{id}
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i64>,
    ValidJson(req): ValidJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "Updating question: {}, replace_answers={}",
        question_id,
        req.answers.is_some()
    );

    let service = QuestionService::new(state.store.clone());
    service.update_question(question_id, &req).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/questions/{id}
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Deleting question: {}", question_id);

    let service = QuestionService::new(state.store.clone());
    service.delete_question(question_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
