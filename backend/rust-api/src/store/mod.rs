//! Persistence seam for surveys, questions, answers and responses.
//!
//! Every mutating call is one atomic unit: cascaded children are removed
//! before their parent inside the same transaction.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Answer, AnswerInput, NewSurveyResponse, Question, QuestionType, Survey, SurveyResponse,
};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn create_survey(&self, title: &str, description: &str) -> AppResult<Survey>;

    /// Survey with its full question/answer tree
    async fn get_survey(&self, id: i64) -> AppResult<Option<Survey>>;

    async fn list_surveys(&self) -> AppResult<Vec<Survey>>;

    /// Returns `false` when the survey does not exist
    async fn update_survey(&self, id: i64, title: &str, description: &str) -> AppResult<bool>;

    /// Deletes answers, then questions, then the survey
    async fn delete_survey(&self, id: i64) -> AppResult<bool>;

    /// Returns `None` when the parent survey does not exist
    async fn create_question(
        &self,
        survey_id: i64,
        text: &str,
        question_type: QuestionType,
        answers: &[AnswerInput],
    ) -> AppResult<Option<Question>>;

    async fn get_question(&self, id: i64) -> AppResult<Option<Question>>;

    /// `answers: Some(..)` replaces the whole answer set
    async fn update_question(
        &self,
        id: i64,
        text: &str,
        question_type: QuestionType,
        answers: Option<&[AnswerInput]>,
    ) -> AppResult<bool>;

    /// Deletes answers, then the question
    async fn delete_question(&self, id: i64) -> AppResult<bool>;

    async fn list_answers(&self) -> AppResult<Vec<Answer>>;

    async fn insert_response(&self, response: NewSurveyResponse) -> AppResult<SurveyResponse>;

    async fn get_response(&self, id: i64) -> AppResult<Option<SurveyResponse>>;

    async fn list_responses(&self) -> AppResult<Vec<SurveyResponse>>;

    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
