// These tests need a MongoDB replica set (transactions). Run with:
// MONGO_URI=mongodb://localhost:27017/?replicaSet=rs0 cargo test -- --ignored

use survey_api::models::{AnswerInput, QuestionType};
use survey_api::store::{MongoStore, SurveyStore};

async fn connect() -> MongoStore {
    let uri = std::env::var("MONGO_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/?replicaSet=rs0".to_string());
    let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
    client
        .database("survey_api_test")
        .drop()
        .await
        .unwrap();
    MongoStore::new(client, "survey_api_test")
}

fn answer(text: &str, weight: f64) -> AnswerInput {
    AnswerInput {
        text: text.to_string(),
        weight,
    }
}

#[tokio::test]
#[serial_test::serial]
#[ignore]
async fn test_mongo_question_lifecycle() {
    let store = connect().await;
    store.ping().await.unwrap();

    let survey = store.create_survey("Mongo", "Desc").await.unwrap();
    let question = store
        .create_question(
            survey.id,
            "Pick one",
            QuestionType::SingleChoice,
            &[answer("A", 1.0), answer("B", 2.0)],
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(question.answers.len(), 2);

    let replacement = [answer("C", 3.0)];
    assert!(store
        .update_question(
            question.id,
            "Pick any",
            QuestionType::MultipleChoice,
            Some(&replacement[..]),
        )
        .await
        .unwrap());

    let loaded = store.get_question(question.id).await.unwrap().unwrap();
    assert_eq!(loaded.text, "Pick any");
    assert_eq!(loaded.answers.len(), 1);
    assert_eq!(loaded.answers[0].text, "C");

    assert!(store
        .create_question(i64::MAX, "Orphan", QuestionType::FreeText, &[])
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial_test::serial]
#[ignore]
async fn test_mongo_delete_survey_cascades() {
    let store = connect().await;

    let survey = store.create_survey("Cascade", "Desc").await.unwrap();
    let question = store
        .create_question(survey.id, "Q", QuestionType::FreeText, &[answer("credit", 7.0)])
        .await
        .unwrap()
        .unwrap();

    assert!(store.delete_survey(survey.id).await.unwrap());
    assert!(store.get_survey(survey.id).await.unwrap().is_none());
    assert!(store.get_question(question.id).await.unwrap().is_none());
    assert!(store.list_answers().await.unwrap().is_empty());
    assert!(!store.delete_survey(survey.id).await.unwrap());
}
