use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::SurveyStore;
use crate::error::AppResult;
use crate::models::{
    Answer, AnswerInput, NewSurveyResponse, Question, QuestionType, Survey, SurveyResponse,
};

#[derive(Debug, Clone)]
struct SurveyRow {
    title: String,
    description: String,
}

#[derive(Debug, Clone)]
struct QuestionRow {
    survey_id: i64,
    text: String,
    question_type: QuestionType,
}

/// Sequences start at 1 and never reuse an id
#[derive(Debug, Default)]
struct Sequences {
    survey: i64,
    question: i64,
    answer: i64,
    response: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    // BTreeMap keeps rows in id (= insertion) order
    surveys: BTreeMap<i64, SurveyRow>,
    questions: BTreeMap<i64, QuestionRow>,
    answers: BTreeMap<i64, Answer>,
    responses: BTreeMap<i64, SurveyResponse>,
}

impl Tables {
    fn insert_answers(&mut self, question_id: i64, inputs: &[AnswerInput]) {
        for input in inputs {
            let id = next(&mut self.seq.answer);
            self.answers.insert(
                id,
                Answer {
                    id,
                    text: input.text.clone(),
                    weight: input.weight,
                    question_id,
                },
            );
        }
    }

    fn question_tree(&self, id: i64) -> Option<Question> {
        let row = self.questions.get(&id)?;
        let answers = self
            .answers
            .values()
            .filter(|a| a.question_id == id)
            .cloned()
            .collect();

        Some(Question {
            id,
            text: row.text.clone(),
            question_type: row.question_type,
            survey_id: row.survey_id,
            answers,
        })
    }

    fn survey_tree(&self, id: i64) -> Option<Survey> {
        let row = self.surveys.get(&id)?;
        let questions = self
            .questions
            .iter()
            .filter(|(_, q)| q.survey_id == id)
            .filter_map(|(qid, _)| self.question_tree(*qid))
            .collect();

        Some(Survey {
            id,
            title: row.title.clone(),
            description: row.description.clone(),
            questions,
        })
    }
}

/// Process-local store. Each mutating call holds the write lock for its
/// whole duration, so cascades are observed all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SurveyStore for InMemoryStore {
    async fn create_survey(&self, title: &str, description: &str) -> AppResult<Survey> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.survey);
        tables.surveys.insert(
            id,
            SurveyRow {
                title: title.to_string(),
                description: description.to_string(),
            },
        );

        Ok(Survey {
            id,
            title: title.to_string(),
            description: description.to_string(),
            questions: Vec::new(),
        })
    }

    async fn get_survey(&self, id: i64) -> AppResult<Option<Survey>> {
        Ok(self.tables.read().await.survey_tree(id))
    }

    async fn list_surveys(&self) -> AppResult<Vec<Survey>> {
        let tables = self.tables.read().await;
        Ok(tables
            .surveys
            .keys()
            .filter_map(|id| tables.survey_tree(*id))
            .collect())
    }

    async fn update_survey(&self, id: i64, title: &str, description: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.surveys.get_mut(&id) {
            Some(row) => {
                row.title = title.to_string();
                row.description = description.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_survey(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.surveys.contains_key(&id) {
            return Ok(false);
        }

        let question_ids: Vec<i64> = tables
            .questions
            .iter()
            .filter(|(_, q)| q.survey_id == id)
            .map(|(qid, _)| *qid)
            .collect();

        tables
            .answers
            .retain(|_, a| !question_ids.contains(&a.question_id));
        tables.questions.retain(|_, q| q.survey_id != id);
        tables.surveys.remove(&id);

        Ok(true)
    }

    async fn create_question(
        &self,
        survey_id: i64,
        text: &str,
        question_type: QuestionType,
        answers: &[AnswerInput],
    ) -> AppResult<Option<Question>> {
        let mut tables = self.tables.write().await;
        if !tables.surveys.contains_key(&survey_id) {
            return Ok(None);
        }

        let id = next(&mut tables.seq.question);
        tables.questions.insert(
            id,
            QuestionRow {
                survey_id,
                text: text.to_string(),
                question_type,
            },
        );
        tables.insert_answers(id, answers);

        Ok(tables.question_tree(id))
    }

    async fn get_question(&self, id: i64) -> AppResult<Option<Question>> {
        Ok(self.tables.read().await.question_tree(id))
    }

    async fn update_question(
        &self,
        id: i64,
        text: &str,
        question_type: QuestionType,
        answers: Option<&[AnswerInput]>,
    ) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.questions.get_mut(&id) {
            Some(row) => {
                row.text = text.to_string();
                row.question_type = question_type;
            }
            None => return Ok(false),
        }

        if let Some(inputs) = answers {
            tables.answers.retain(|_, a| a.question_id != id);
            tables.insert_answers(id, inputs);
        }

        Ok(true)
    }

    async fn delete_question(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&id) {
            return Ok(false);
        }

        tables.answers.retain(|_, a| a.question_id != id);
        tables.questions.remove(&id);

        Ok(true)
    }

    async fn list_answers(&self) -> AppResult<Vec<Answer>> {
        Ok(self.tables.read().await.answers.values().cloned().collect())
    }

    async fn insert_response(&self, response: NewSurveyResponse) -> AppResult<SurveyResponse> {
        let mut tables = self.tables.write().await;
        let id = next(&mut tables.seq.response);
        let stored = response.with_id(id);
        tables.responses.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_response(&self, id: i64) -> AppResult<Option<SurveyResponse>> {
        Ok(self.tables.read().await.responses.get(&id).cloned())
    }

    async fn list_responses(&self) -> AppResult<Vec<SurveyResponse>> {
        Ok(self.tables.read().await.responses.values().cloned().collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
