use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::metrics::{record_authoring_change, track_db_operation};
use crate::models::{CreateQuestionRequest, Question};
use crate::store::SurveyStore;

pub struct QuestionService {
    store: Arc<dyn SurveyStore>,
}

impl QuestionService {
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self { store }
    }

    pub async fn create_question(&self, req: &CreateQuestionRequest) -> AppResult<Question> {
        let answers = req.answers.as_deref().unwrap_or_default();

        let question = track_db_operation(
            "create_question",
            "questions",
            self.store
                .create_question(req.survey_id, &req.text, req.question_type, answers),
        )
        .await?
        .ok_or_else(|| AppError::survey_not_found(req.survey_id))?;

        record_authoring_change("question", "create");
        tracing::info!(
            "Question created: id={}, survey_id={}, answers={}",
            question.id,
            question.survey_id,
            question.answers.len()
        );

        Ok(question)
    }

    pub async fn get_question(&self, id: i64) -> AppResult<Question> {
        track_db_operation("get_question", "questions", self.store.get_question(id))
            .await?
            .ok_or_else(|| AppError::question_not_found(id))
    }

    /// Updates text and type. A present answer list replaces the current one.
    pub async fn update_question(&self, id: i64, req: &CreateQuestionRequest) -> AppResult<()> {
        let survey_exists =
            track_db_operation("get_survey", "surveys", self.store.get_survey(req.survey_id))
                .await?
                .is_some();
        if !survey_exists {
            return Err(AppError::survey_not_found(req.survey_id));
        }

        let updated = track_db_operation(
            "update_question",
            "questions",
            self.store.update_question(
                id,
                &req.text,
                req.question_type,
                req.answers.as_deref(),
            ),
        )
        .await?;

        if !updated {
            return Err(AppError::question_not_found(id));
        }

        record_authoring_change("question", "update");
        Ok(())
    }

    pub async fn delete_question(&self, id: i64) -> AppResult<()> {
        let deleted = track_db_operation(
            "delete_question",
            "questions",
            self.store.delete_question(id),
        )
        .await?;

        if !deleted {
            return Err(AppError::question_not_found(id));
        }

        record_authoring_change("question", "delete");
        tracing::info!("Question deleted with its answers: id={}", id);

        Ok(())
    }
}
