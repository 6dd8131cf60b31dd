pub mod response;
pub mod survey;

pub use response::{
    FreeTextAnswers, NewSurveyResponse, ResponseSummary, SubmitResponseRequest,
    SubmitResponseResult, SurveyResponse,
};
pub use survey::{
    Answer, AnswerInput, CreateQuestionRequest, CreateSurveyRequest, Question, QuestionType,
    Survey,
};
