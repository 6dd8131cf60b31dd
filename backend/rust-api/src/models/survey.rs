use serde::{Deserialize, Serialize};
use validator::Validate;

/// Question kind. Serialized as its integer code (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    FreeText,
}

impl From<QuestionType> for u8 {
    fn from(kind: QuestionType) -> Self {
        match kind {
            QuestionType::SingleChoice => 0,
            QuestionType::MultipleChoice => 1,
            QuestionType::FreeText => 2,
        }
    }
}

impl TryFrom<u8> for QuestionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(QuestionType::SingleChoice),
            1 => Ok(QuestionType::MultipleChoice),
            2 => Ok(QuestionType::FreeText),
            other => Err(format!("Unknown question type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub text: String,
    pub weight: f64,
    pub question_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub survey_id: i64,
    /// Answers in insertion order
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

/// Request body for creating or updating a survey
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
}

/// Answer choice inside a question payload
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    #[validate(custom(function = "not_blank", message = "Answer text is required"))]
    pub text: String,

    #[serde(default)]
    pub weight: f64,
}

/// Request body for creating or updating a question.
///
/// On update, `answers: None` keeps the current answer set while
/// `answers: Some(..)` replaces it entirely.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub survey_id: i64,

    #[validate(custom(function = "not_blank", message = "Question text is required"))]
    pub text: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    #[validate(nested)]
    #[serde(default)]
    pub answers: Option<Vec<AnswerInput>>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_type_serializes_as_integer() {
        assert_eq!(serde_json::to_value(QuestionType::SingleChoice).unwrap(), 0);
        assert_eq!(serde_json::to_value(QuestionType::MultipleChoice).unwrap(), 1);
        assert_eq!(serde_json::to_value(QuestionType::FreeText).unwrap(), 2);
    }

    #[test]
    fn test_question_type_rejects_unknown_code() {
        let parsed: Result<QuestionType, _> = serde_json::from_value(json!(3));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_create_question_request_parses_camel_case() {
        let req: CreateQuestionRequest = serde_json::from_value(json!({
            "surveyId": 1,
            "text": "How satisfied are you with our support team?",
            "type": 0,
            "answers": [
                { "text": "Very satisfied", "weight": 5 },
                { "text": "Not satisfied", "weight": 1 }
            ]
        }))
        .unwrap();

        assert_eq!(req.survey_id, 1);
        assert_eq!(req.question_type, QuestionType::SingleChoice);
        let answers = req.answers.unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].weight, 5.0);
    }

    #[test]
    fn test_missing_answers_is_none() {
        let req: CreateQuestionRequest = serde_json::from_value(json!({
            "surveyId": 1,
            "text": "Anything else?",
            "type": 2
        }))
        .unwrap();

        assert!(req.answers.is_none());
    }

    #[test]
    fn test_blank_fields_fail_validation() {
        let survey = CreateSurveyRequest {
            title: "   ".to_string(),
            description: "Desc".to_string(),
        };
        assert!(survey.validate().is_err());

        let question = CreateQuestionRequest {
            survey_id: 1,
            text: "Pick one".to_string(),
            question_type: QuestionType::SingleChoice,
            answers: Some(vec![AnswerInput {
                text: "".to_string(),
                weight: 1.0,
            }]),
        };
        assert!(question.validate().is_err());
    }
}
