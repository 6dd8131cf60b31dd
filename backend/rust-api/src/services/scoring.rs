//! Weighted scoring of a survey submission.
//!
//! Each question contributes at most once to the total:
//! - free text: the first answer's weight when the respondent wrote something
//!   other than whitespace
//! - multiple choice: the highest weight among the selected answers
//! - single choice: the weight of the first selected answer in answer order
//!
//! Selected ids that belong to no question of the survey are ignored.

use std::collections::HashSet;

use crate::models::{FreeTextAnswers, Question, QuestionType, Survey};

pub fn score_submission(
    survey: &Survey,
    selected_answer_ids: &[i64],
    free_text_answers: Option<&FreeTextAnswers>,
) -> f64 {
    let selected: HashSet<i64> = selected_answer_ids.iter().copied().collect();

    survey
        .questions
        .iter()
        .map(|question| question_score(question, &selected, free_text_answers))
        .sum()
}

fn question_score(
    question: &Question,
    selected: &HashSet<i64>,
    free_text_answers: Option<&FreeTextAnswers>,
) -> f64 {
    match question.question_type {
        QuestionType::FreeText => {
            let answered = free_text_answers
                .and_then(|answers| answers.get(&question.id))
                .is_some_and(|text| !text.trim().is_empty());

            if answered {
                question.answers.first().map_or(0.0, |a| a.weight)
            } else {
                0.0
            }
        }
        QuestionType::MultipleChoice => question
            .answers
            .iter()
            .filter(|a| selected.contains(&a.id))
            .map(|a| a.weight)
            .reduce(f64::max)
            .unwrap_or(0.0),
        QuestionType::SingleChoice => question
            .answers
            .iter()
            .find(|a| selected.contains(&a.id))
            .map_or(0.0, |a| a.weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;

    fn question(id: i64, kind: QuestionType, answers: &[(i64, f64)]) -> Question {
        Question {
            id,
            text: format!("Question {}", id),
            question_type: kind,
            survey_id: 1,
            answers: answers
                .iter()
                .map(|(answer_id, weight)| Answer {
                    id: *answer_id,
                    text: format!("Answer {}", answer_id),
                    weight: *weight,
                    question_id: id,
                })
                .collect(),
        }
    }

    fn survey(questions: Vec<Question>) -> Survey {
        Survey {
            id: 1,
            title: "Score Test".to_string(),
            description: "Desc".to_string(),
            questions,
        }
    }

    fn free_text(entries: &[(i64, &str)]) -> FreeTextAnswers {
        entries
            .iter()
            .map(|(id, text)| (*id, text.to_string()))
            .collect()
    }

    #[test]
    fn test_single_choice_uses_selected_weight() {
        let s = survey(vec![question(
            1,
            QuestionType::SingleChoice,
            &[(10, 2.0), (11, 5.0)],
        )]);

        assert_eq!(score_submission(&s, &[11], None), 5.0);
    }

    #[test]
    fn test_single_choice_takes_first_in_answer_order() {
        let s = survey(vec![question(
            1,
            QuestionType::SingleChoice,
            &[(10, 2.0), (11, 5.0)],
        )]);

        // Selection order does not matter, answer order does
        assert_eq!(score_submission(&s, &[10, 11], None), 2.0);
        assert_eq!(score_submission(&s, &[11, 10], None), 2.0);
    }

    #[test]
    fn test_multiple_choice_takes_max_not_sum() {
        let s = survey(vec![question(
            1,
            QuestionType::MultipleChoice,
            &[(10, 1.0), (11, 5.0), (12, 3.0)],
        )]);

        assert_eq!(score_submission(&s, &[10, 11, 12], None), 5.0);
        assert_eq!(score_submission(&s, &[10, 12], None), 3.0);
        assert_eq!(score_submission(&s, &[], None), 0.0);
    }

    #[test]
    fn test_multiple_choice_with_negative_weights() {
        let s = survey(vec![question(
            1,
            QuestionType::MultipleChoice,
            &[(10, -4.0), (11, -1.5)],
        )]);

        assert_eq!(score_submission(&s, &[10, 11], None), -1.5);
    }

    #[test]
    fn test_free_text_credits_first_answer_weight() {
        let s = survey(vec![question(7, QuestionType::FreeText, &[(70, 7.0), (71, 99.0)])]);

        let answered = free_text(&[(7, "It was great!")]);
        assert_eq!(score_submission(&s, &[], Some(&answered)), 7.0);
    }

    #[test]
    fn test_free_text_blank_or_missing_scores_zero() {
        let s = survey(vec![question(7, QuestionType::FreeText, &[(70, 7.0)])]);

        assert_eq!(score_submission(&s, &[], Some(&free_text(&[(7, "")]))), 0.0);
        assert_eq!(score_submission(&s, &[], Some(&free_text(&[(7, "  \t\n")]))), 0.0);
        assert_eq!(score_submission(&s, &[], Some(&free_text(&[(8, "other")]))), 0.0);
        assert_eq!(score_submission(&s, &[], None), 0.0);
    }

    #[test]
    fn test_free_text_without_answers_scores_zero() {
        let s = survey(vec![question(7, QuestionType::FreeText, &[])]);

        let answered = free_text(&[(7, "text")]);
        assert_eq!(score_submission(&s, &[], Some(&answered)), 0.0);
    }

    #[test]
    fn test_free_text_ignores_selected_ids() {
        let s = survey(vec![question(7, QuestionType::FreeText, &[(70, 7.0)])]);

        assert_eq!(score_submission(&s, &[70], None), 0.0);
    }

    #[test]
    fn test_foreign_answer_ids_are_ignored() {
        let s = survey(vec![question(
            1,
            QuestionType::SingleChoice,
            &[(10, 2.0), (11, 5.0)],
        )]);

        assert_eq!(score_submission(&s, &[999, 1000], None), 0.0);
        assert_eq!(score_submission(&s, &[999, 11], None), 5.0);
    }

    #[test]
    fn test_best_answers_sum_to_max_available_weight() {
        let s = survey(vec![
            question(1, QuestionType::SingleChoice, &[(10, 1.0), (11, 4.0)]),
            question(2, QuestionType::MultipleChoice, &[(20, 2.0), (21, 6.0), (22, 3.0)]),
            question(3, QuestionType::FreeText, &[(30, 2.5)]),
        ]);

        let texts = free_text(&[(3, "plenty to say")]);
        let total = score_submission(&s, &[11, 21], Some(&texts));

        assert_eq!(total, 4.0 + 6.0 + 2.5);
    }

    #[test]
    fn test_empty_survey_scores_zero() {
        let s = survey(vec![]);
        assert_eq!(score_submission(&s, &[1, 2, 3], None), 0.0);
    }
}
