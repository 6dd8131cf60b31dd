use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-text answers keyed by question id
pub type FreeTextAnswers = BTreeMap<i64, String>;

/// A stored survey response. Written once at submission, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: i64,
    pub survey_id: i64,
    /// Title of the survey at submission time
    pub survey_title: Option<String>,
    pub selected_answer_ids: Vec<i64>,
    pub total_score: f64,
    /// JSON-encoded [`FreeTextAnswers`], only present when free text was submitted
    pub free_text_responses_json: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Response row before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurveyResponse {
    pub survey_id: i64,
    pub survey_title: Option<String>,
    pub selected_answer_ids: Vec<i64>,
    pub total_score: f64,
    pub free_text_responses_json: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl NewSurveyResponse {
    pub fn with_id(self, id: i64) -> SurveyResponse {
        SurveyResponse {
            id,
            survey_id: self.survey_id,
            survey_title: self.survey_title,
            selected_answer_ids: self.selected_answer_ids,
            total_score: self.total_score,
            free_text_responses_json: self.free_text_responses_json,
            submitted_at: self.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub survey_id: i64,

    #[serde(default)]
    pub selected_answer_ids: Vec<i64>,

    #[serde(default)]
    pub free_text_answers: Option<FreeTextAnswers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseResult {
    pub message: String,
    pub survey_id: i64,
    pub total_score: f64,
}

/// Response listing entry with answer ids resolved to text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub id: i64,
    pub survey_title: Option<String>,
    pub survey_id: i64,
    pub total_score: f64,
    pub submitted_at: DateTime<Utc>,
    pub selected_answers: Vec<String>,
    pub free_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submit_request_accepts_string_keyed_free_text() {
        let req: SubmitResponseRequest = serde_json::from_value(json!({
            "surveyId": 4,
            "selectedAnswerIds": [1, 2],
            "freeTextAnswers": { "3": "It was great!" }
        }))
        .unwrap();

        assert_eq!(req.survey_id, 4);
        assert_eq!(req.selected_answer_ids, vec![1, 2]);
        assert_eq!(
            req.free_text_answers.unwrap().get(&3).map(String::as_str),
            Some("It was great!")
        );
    }

    #[test]
    fn test_submit_request_defaults() {
        let req: SubmitResponseRequest =
            serde_json::from_value(json!({ "surveyId": 1 })).unwrap();

        assert!(req.selected_answer_ids.is_empty());
        assert!(req.free_text_answers.is_none());
    }
}
