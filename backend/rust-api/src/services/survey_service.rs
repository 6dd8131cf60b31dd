use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::metrics::{record_authoring_change, track_db_operation};
use crate::models::{CreateSurveyRequest, Survey};
use crate::store::SurveyStore;

pub struct SurveyService {
    store: Arc<dyn SurveyStore>,
}

impl SurveyService {
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self { store }
    }

    pub async fn create_survey(&self, req: &CreateSurveyRequest) -> AppResult<Survey> {
        let survey = track_db_operation(
            "create_survey",
            "surveys",
            self.store.create_survey(&req.title, &req.description),
        )
        .await?;

        record_authoring_change("survey", "create");
        tracing::info!("Survey created: id={}, title={}", survey.id, survey.title);

        Ok(survey)
    }

    pub async fn list_surveys(&self) -> AppResult<Vec<Survey>> {
        track_db_operation("list_surveys", "surveys", self.store.list_surveys()).await
    }

    /// Survey with its questions and answers
    pub async fn get_survey(&self, id: i64) -> AppResult<Survey> {
        track_db_operation("get_survey", "surveys", self.store.get_survey(id))
            .await?
            .ok_or_else(|| AppError::survey_not_found(id))
    }

    pub async fn update_survey(&self, id: i64, req: &CreateSurveyRequest) -> AppResult<()> {
        let updated = track_db_operation(
            "update_survey",
            "surveys",
            self.store.update_survey(id, &req.title, &req.description),
        )
        .await?;

        if !updated {
            return Err(AppError::survey_not_found(id));
        }

        record_authoring_change("survey", "update");
        Ok(())
    }

    /// Removes the survey along with its questions and answers.
    /// Stored responses keep their survey id and title snapshot.
    pub async fn delete_survey(&self, id: i64) -> AppResult<()> {
        let deleted =
            track_db_operation("delete_survey", "surveys", self.store.delete_survey(id)).await?;

        if !deleted {
            return Err(AppError::survey_not_found(id));
        }

        record_authoring_change("survey", "delete");
        tracing::info!("Survey deleted with its questions and answers: id={}", id);

        Ok(())
    }
}
