use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;
use mongodb::{Client, ClientSession, Collection, Database};
use serde::{Deserialize, Serialize};

use super::SurveyStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    Answer, AnswerInput, NewSurveyResponse, Question, QuestionType, Survey, SurveyResponse,
};

const SURVEYS: &str = "surveys";
const QUESTIONS: &str = "questions";
const ANSWERS: &str = "answers";
const RESPONSES: &str = "responses";
const COUNTERS: &str = "counters";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SurveyDocument {
    #[serde(rename = "_id")]
    id: i64,
    title: String,
    description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDocument {
    #[serde(rename = "_id")]
    id: i64,
    survey_id: i64,
    text: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDocument {
    #[serde(rename = "_id")]
    id: i64,
    question_id: i64,
    text: String,
    weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseDocument {
    #[serde(rename = "_id")]
    id: i64,
    survey_id: i64,
    #[serde(default)]
    survey_title: Option<String>,
    #[serde(default)]
    selected_answer_ids: Vec<i64>,
    total_score: f64,
    #[serde(default)]
    free_text_responses_json: Option<String>,
    #[serde(with = "bson_datetime_as_chrono")]
    submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Counter {
    seq: i64,
}

impl From<AnswerDocument> for Answer {
    fn from(doc: AnswerDocument) -> Self {
        Answer {
            id: doc.id,
            text: doc.text,
            weight: doc.weight,
            question_id: doc.question_id,
        }
    }
}

impl From<ResponseDocument> for SurveyResponse {
    fn from(doc: ResponseDocument) -> Self {
        SurveyResponse {
            id: doc.id,
            survey_id: doc.survey_id,
            survey_title: doc.survey_title,
            selected_answer_ids: doc.selected_answer_ids,
            total_score: doc.total_score,
            free_text_responses_json: doc.free_text_responses_json,
            submitted_at: doc.submitted_at,
        }
    }
}

impl From<SurveyResponse> for ResponseDocument {
    fn from(response: SurveyResponse) -> Self {
        ResponseDocument {
            id: response.id,
            survey_id: response.survey_id,
            survey_title: response.survey_title,
            selected_answer_ids: response.selected_answer_ids,
            total_score: response.total_score,
            free_text_responses_json: response.free_text_responses_json,
            submitted_at: response.submitted_at,
        }
    }
}

// Serde converters for chrono::DateTime <-> mongodb::bson::DateTime
mod bson_datetime_as_chrono {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bson_dt = bson::DateTime::from_millis(date.timestamp_millis());
        bson_dt.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bson_dt = bson::DateTime::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
            .ok_or_else(|| <D::Error as serde::de::Error>::custom("timestamp out of range"))
    }
}

/// MongoDB-backed store.
///
/// Numeric ids come from the `counters` collection. Cascading deletes and
/// answer-set replacement run inside a session transaction, so the server
/// must be a replica set (a single-node `rs0` is enough).
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, database: &str) -> Self {
        let db = client.database(database);
        Self { client, db }
    }

    fn surveys(&self) -> Collection<SurveyDocument> {
        self.db.collection(SURVEYS)
    }

    fn questions(&self) -> Collection<QuestionDocument> {
        self.db.collection(QUESTIONS)
    }

    fn answers(&self) -> Collection<AnswerDocument> {
        self.db.collection(ANSWERS)
    }

    fn responses(&self) -> Collection<ResponseDocument> {
        self.db.collection(RESPONSES)
    }

    /// Reserves `count` consecutive ids and returns the first one
    async fn reserve_ids(&self, sequence: &str, count: i64) -> AppResult<i64> {
        let counter = self
            .db
            .collection::<Counter>(COUNTERS)
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": count } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("Counter {} missing after upsert", sequence)))?;

        Ok(counter.seq - count + 1)
    }

    async fn next_id(&self, sequence: &str) -> AppResult<i64> {
        self.reserve_ids(sequence, 1).await
    }

    async fn answer_documents(
        &self,
        question_id: i64,
        inputs: &[AnswerInput],
    ) -> AppResult<Vec<AnswerDocument>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let first = self.reserve_ids(ANSWERS, inputs.len() as i64).await?;
        Ok(inputs
            .iter()
            .zip(first..)
            .map(|(input, id)| AnswerDocument {
                id,
                question_id,
                text: input.text.clone(),
                weight: input.weight,
            })
            .collect())
    }

    async fn load_answers(&self, question_ids: Vec<i64>) -> AppResult<Vec<AnswerDocument>> {
        let answers = self
            .answers()
            .find(doc! { "questionId": { "$in": question_ids } })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(answers)
    }

    /// Materializes questions with their answers, preserving id order
    async fn assemble_questions(&self, questions: Vec<QuestionDocument>) -> AppResult<Vec<Question>> {
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let mut answers = self.load_answers(ids).await?;

        Ok(questions
            .into_iter()
            .map(|q| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    answers.drain(..).partition(|a| a.question_id == q.id);
                answers = rest;
                Question {
                    id: q.id,
                    text: q.text,
                    question_type: q.question_type,
                    survey_id: q.survey_id,
                    answers: own.into_iter().map(Answer::from).collect(),
                }
            })
            .collect())
    }

    async fn assemble_surveys(&self, surveys: Vec<SurveyDocument>) -> AppResult<Vec<Survey>> {
        let ids: Vec<i64> = surveys.iter().map(|s| s.id).collect();
        let questions: Vec<QuestionDocument> = self
            .questions()
            .find(doc! { "surveyId": { "$in": ids } })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        let mut questions = self.assemble_questions(questions).await?;

        Ok(surveys
            .into_iter()
            .map(|s| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    questions.drain(..).partition(|q| q.survey_id == s.id);
                questions = rest;
                Survey {
                    id: s.id,
                    title: s.title,
                    description: s.description,
                    questions: own,
                }
            })
            .collect())
    }

    /// Commits on success, aborts on failure
    async fn finish<T>(mut session: ClientSession, outcome: AppResult<T>) -> AppResult<T> {
        match outcome {
            Ok(value) => {
                session.commit_transaction().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!("Failed to abort transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }

    async fn begin(&self) -> AppResult<ClientSession> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        Ok(session)
    }

    async fn delete_survey_tx(&self, session: &mut ClientSession, id: i64) -> AppResult<bool> {
        let survey = self
            .surveys()
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        if survey.is_none() {
            return Ok(false);
        }

        let mut cursor = self
            .questions()
            .find(doc! { "surveyId": id })
            .session(&mut *session)
            .await?;
        let questions: Vec<QuestionDocument> = cursor.stream(&mut *session).try_collect().await?;
        let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();

        let answers = self
            .answers()
            .delete_many(doc! { "questionId": { "$in": question_ids } })
            .session(&mut *session)
            .await?;
        let questions = self
            .questions()
            .delete_many(doc! { "surveyId": id })
            .session(&mut *session)
            .await?;
        self.surveys()
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;

        tracing::debug!(
            "Cascade for survey {} removed {} questions and {} answers",
            id,
            questions.deleted_count,
            answers.deleted_count
        );

        Ok(true)
    }

    async fn insert_question_tx(
        &self,
        session: &mut ClientSession,
        question: &QuestionDocument,
        answers: &[AnswerDocument],
    ) -> AppResult<()> {
        self.questions()
            .insert_one(question)
            .session(&mut *session)
            .await?;
        if !answers.is_empty() {
            self.answers()
                .insert_many(answers)
                .session(&mut *session)
                .await?;
        }
        Ok(())
    }

    async fn update_question_tx(
        &self,
        session: &mut ClientSession,
        id: i64,
        text: &str,
        question_type: QuestionType,
        answers: Option<&[AnswerDocument]>,
    ) -> AppResult<bool> {
        let result = self
            .questions()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "text": text, "type": u8::from(question_type) as i32 } },
            )
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Ok(false);
        }

        if let Some(answers) = answers {
            self.answers()
                .delete_many(doc! { "questionId": id })
                .session(&mut *session)
                .await?;
            if !answers.is_empty() {
                self.answers()
                    .insert_many(answers)
                    .session(&mut *session)
                    .await?;
            }
        }

        Ok(true)
    }

    async fn delete_question_tx(&self, session: &mut ClientSession, id: i64) -> AppResult<bool> {
        let question = self
            .questions()
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        if question.is_none() {
            return Ok(false);
        }

        self.answers()
            .delete_many(doc! { "questionId": id })
            .session(&mut *session)
            .await?;
        self.questions()
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;

        Ok(true)
    }
}

#[async_trait]
impl SurveyStore for MongoStore {
    async fn create_survey(&self, title: &str, description: &str) -> AppResult<Survey> {
        let survey = SurveyDocument {
            id: self.next_id(SURVEYS).await?,
            title: title.to_string(),
            description: description.to_string(),
        };
        self.surveys().insert_one(&survey).await?;

        Ok(Survey {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            questions: Vec::new(),
        })
    }

    async fn get_survey(&self, id: i64) -> AppResult<Option<Survey>> {
        let Some(survey) = self.surveys().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        Ok(self.assemble_surveys(vec![survey]).await?.pop())
    }

    async fn list_surveys(&self) -> AppResult<Vec<Survey>> {
        let surveys: Vec<SurveyDocument> = self
            .surveys()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        self.assemble_surveys(surveys).await
    }

    async fn update_survey(&self, id: i64, title: &str, description: &str) -> AppResult<bool> {
        let result = self
            .surveys()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": title, "description": description } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_survey(&self, id: i64) -> AppResult<bool> {
        let mut session = self.begin().await?;
        let outcome = self.delete_survey_tx(&mut session, id).await;
        Self::finish(session, outcome).await
    }

    async fn create_question(
        &self,
        survey_id: i64,
        text: &str,
        question_type: QuestionType,
        answers: &[AnswerInput],
    ) -> AppResult<Option<Question>> {
        if self
            .surveys()
            .find_one(doc! { "_id": survey_id })
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let question = QuestionDocument {
            id: self.next_id(QUESTIONS).await?,
            survey_id,
            text: text.to_string(),
            question_type,
        };
        let answer_docs = self.answer_documents(question.id, answers).await?;

        let mut session = self.begin().await?;
        let outcome = self
            .insert_question_tx(&mut session, &question, &answer_docs)
            .await;
        Self::finish(session, outcome).await?;

        Ok(Some(Question {
            id: question.id,
            text: question.text,
            question_type: question.question_type,
            survey_id,
            answers: answer_docs.into_iter().map(Answer::from).collect(),
        }))
    }

    async fn get_question(&self, id: i64) -> AppResult<Option<Question>> {
        let Some(question) = self.questions().find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        Ok(self.assemble_questions(vec![question]).await?.pop())
    }

    async fn update_question(
        &self,
        id: i64,
        text: &str,
        question_type: QuestionType,
        answers: Option<&[AnswerInput]>,
    ) -> AppResult<bool> {
        let answer_docs = match answers {
            Some(inputs) => Some(self.answer_documents(id, inputs).await?),
            None => None,
        };

        let mut session = self.begin().await?;
        let outcome = self
            .update_question_tx(&mut session, id, text, question_type, answer_docs.as_deref())
            .await;
        Self::finish(session, outcome).await
    }

    async fn delete_question(&self, id: i64) -> AppResult<bool> {
        let mut session = self.begin().await?;
        let outcome = self.delete_question_tx(&mut session, id).await;
        Self::finish(session, outcome).await
    }

    async fn list_answers(&self) -> AppResult<Vec<Answer>> {
        let answers: Vec<AnswerDocument> = self
            .answers()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(answers.into_iter().map(Answer::from).collect())
    }

    async fn insert_response(&self, response: NewSurveyResponse) -> AppResult<SurveyResponse> {
        let stored = response.with_id(self.next_id(RESPONSES).await?);
        self.responses()
            .insert_one(ResponseDocument::from(stored.clone()))
            .await?;
        Ok(stored)
    }

    async fn get_response(&self, id: i64) -> AppResult<Option<SurveyResponse>> {
        Ok(self
            .responses()
            .find_one(doc! { "_id": id })
            .await?
            .map(SurveyResponse::from))
    }

    async fn list_responses(&self) -> AppResult<Vec<SurveyResponse>> {
        let responses: Vec<ResponseDocument> = self
            .responses()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(responses.into_iter().map(SurveyResponse::from).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
