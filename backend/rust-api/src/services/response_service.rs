use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use super::scoring::score_submission;
use crate::error::{AppError, AppResult};
use crate::metrics::{record_submission, track_db_operation};
use crate::models::{
    FreeTextAnswers, NewSurveyResponse, ResponseSummary, SubmitResponseRequest,
    SubmitResponseResult, SurveyResponse,
};
use crate::store::SurveyStore;

pub const SUBMITTED_MESSAGE: &str = "Response submitted successfully";

pub struct ResponseService {
    store: Arc<dyn SurveyStore>,
}

impl ResponseService {
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self { store }
    }

    /// Scores the submission against the survey's current questions and
    /// stores the response. Nothing is written when the survey is missing.
    pub async fn submit_response(
        &self,
        req: &SubmitResponseRequest,
    ) -> AppResult<SubmitResponseResult> {
        let Some(survey) =
            track_db_operation("get_survey", "surveys", self.store.get_survey(req.survey_id))
                .await?
        else {
            record_submission("survey_not_found", None);
            return Err(AppError::survey_not_found(req.survey_id));
        };

        let free_text = req.free_text_answers.as_ref();
        let total_score = score_submission(&survey, &req.selected_answer_ids, free_text);

        let free_text_responses_json = match free_text {
            Some(answers) if !answers.is_empty() => Some(serde_json::to_string(answers)?),
            _ => None,
        };

        let response = NewSurveyResponse {
            survey_id: survey.id,
            survey_title: Some(survey.title.clone()),
            selected_answer_ids: req.selected_answer_ids.clone(),
            total_score,
            free_text_responses_json,
            submitted_at: Utc::now(),
        };

        let stored = track_db_operation(
            "insert_response",
            "responses",
            self.store.insert_response(response),
        )
        .await?;

        record_submission("accepted", Some(total_score));
        tracing::info!(
            "Response stored: id={}, survey_id={}, total_score={}",
            stored.id,
            stored.survey_id,
            total_score
        );

        Ok(SubmitResponseResult {
            message: SUBMITTED_MESSAGE.to_string(),
            survey_id: req.survey_id,
            total_score,
        })
    }

    /// All responses with answer ids resolved against the current answers
    pub async fn list_responses(&self) -> AppResult<Vec<ResponseSummary>> {
        let responses =
            track_db_operation("list_responses", "responses", self.store.list_responses())
                .await?;
        let answers =
            track_db_operation("list_answers", "answers", self.store.list_answers()).await?;

        let answer_texts: HashMap<i64, &str> =
            answers.iter().map(|a| (a.id, a.text.as_str())).collect();

        responses
            .into_iter()
            .map(|response| summarize(response, &answer_texts))
            .collect()
    }

    pub async fn get_response(&self, id: i64) -> AppResult<SurveyResponse> {
        track_db_operation("get_response", "responses", self.store.get_response(id))
            .await?
            .ok_or_else(|| AppError::response_not_found(id))
    }
}

fn summarize(
    response: SurveyResponse,
    answer_texts: &HashMap<i64, &str>,
) -> AppResult<ResponseSummary> {
    let selected_answers = response
        .selected_answer_ids
        .iter()
        .map(|id| match answer_texts.get(id) {
            Some(text) => text.to_string(),
            None => format!("(ID {})", id),
        })
        .collect();

    let free_text = response
        .free_text_responses_json
        .as_deref()
        .map(join_free_text)
        .transpose()?;

    Ok(ResponseSummary {
        id: response.id,
        survey_title: response.survey_title,
        survey_id: response.survey_id,
        total_score: response.total_score,
        submitted_at: response.submitted_at,
        selected_answers,
        free_text,
    })
}

/// Non-blank free-text values joined with "; " in question-id order
fn join_free_text(json: &str) -> AppResult<String> {
    let answers: FreeTextAnswers = serde_json::from_str(json)?;
    Ok(answers
        .values()
        .filter(|text| !text.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(selected: Vec<i64>, free_text: Option<&str>) -> SurveyResponse {
        SurveyResponse {
            id: 1,
            survey_id: 3,
            survey_title: Some("Customer Survey".to_string()),
            selected_answer_ids: selected,
            total_score: 5.0,
            free_text_responses_json: free_text.map(str::to_string),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_answer_ids_render_as_placeholder() {
        let texts: HashMap<i64, &str> = [(1, "Good"), (2, "Bad")].into_iter().collect();

        let summary = summarize(stored(vec![2, 42, 1], None), &texts).unwrap();

        assert_eq!(summary.selected_answers, vec!["Bad", "(ID 42)", "Good"]);
        assert_eq!(summary.free_text, None);
        assert_eq!(summary.survey_title.as_deref(), Some("Customer Survey"));
    }

    #[test]
    fn test_free_text_skips_blank_values() {
        let joined = join_free_text(r#"{"2":"Second","1":"First","3":"  ","4":""}"#).unwrap();
        assert_eq!(joined, "First; Second");
    }

    #[test]
    fn test_free_text_all_blank_is_empty_string() {
        let summary = summarize(stored(vec![], Some(r#"{"5":" "}"#)), &HashMap::new()).unwrap();
        assert_eq!(summary.free_text.as_deref(), Some(""));
    }
}
