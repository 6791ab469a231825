//! Scoring of a submitted attempt.
//!
//! Grading is a pure function of the question set, the stored answers, the
//! passing threshold and the measured time. It never fails: a missing or
//! malformed answer is simply incorrect.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Answer, Question, QuestionKind};

/// Grading outcome for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub answered: bool,
    pub correct: bool,
    pub points_awarded: u32,
    pub points_possible: u32,
}

/// The graded outcome of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub outcomes: Vec<QuestionOutcome>,
    pub earned_points: u64,
    pub total_points: u64,
    pub percentage: u32,
    pub passing_threshold: u8,
    pub passed: bool,
    pub time_spent: Duration,
    /// Set when the time limit forced the submission.
    pub timed_out: bool,
}

impl QuizResult {
    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    pub fn outcome(&self, question_id: &str) -> Option<&QuestionOutcome> {
        self.outcomes.iter().find(|o| o.question_id == question_id)
    }
}

/// Whether `answer` is correct for `question`.
pub fn is_correct(question: &Question, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (question.kind, answer) {
        (QuestionKind::SingleChoice, Answer::Choices(ids)) => {
            // Stray extra ids make the answer incorrect, same as multiple choice.
            ids.len() == 1
                && ids
                    .first()
                    .and_then(|id| question.option(id))
                    .is_some_and(|option| option.is_correct)
        }
        (QuestionKind::TrueFalse, Answer::Choices(ids)) => {
            let Some(id) = ids.first().filter(|_| ids.len() == 1) else {
                return false;
            };
            if question.options.is_empty() {
                question
                    .correct_answer
                    .as_deref()
                    .is_some_and(|canonical| canonical.trim().eq_ignore_ascii_case(id.trim()))
            } else {
                question.option(id).is_some_and(|option| option.is_correct)
            }
        }
        (QuestionKind::MultipleChoice, Answer::Choices(ids)) => {
            let correct = question.correct_option_ids();
            ids.len() == correct.len() && ids.iter().all(|id| correct.contains(id.as_str()))
        }
        (QuestionKind::ShortAnswer, Answer::Text(text)) => question
            .correct_answer
            .as_deref()
            .is_some_and(|canonical| normalize(canonical) == normalize(text)),
        _ => false,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// `round(100 * earned / total)`, halves rounded up. Zero when `total` is zero.
pub fn percentage(earned: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let (earned, total) = (u128::from(earned.min(total)), u128::from(total));
    ((200 * earned + total) / (2 * total)) as u32
}

/// Grades every question in order against the stored answers.
pub fn grade(
    questions: &[Question],
    answers: &HashMap<String, Answer>,
    passing_threshold: u8,
    time_spent: Duration,
    timed_out: bool,
) -> QuizResult {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let answer = answers.get(&question.id).filter(|a| !a.is_empty());
            let correct = is_correct(question, answer);
            QuestionOutcome {
                question_id: question.id.clone(),
                answered: answer.is_some(),
                correct,
                points_awarded: if correct { question.points } else { 0 },
                points_possible: question.points,
            }
        })
        .collect();

    let earned_points = outcomes.iter().map(|o| u64::from(o.points_awarded)).sum();
    let total_points = outcomes.iter().map(|o| u64::from(o.points_possible)).sum();
    let percentage = percentage(earned_points, total_points);

    QuizResult {
        outcomes,
        earned_points,
        total_points,
        percentage,
        passing_threshold,
        passed: percentage >= u32::from(passing_threshold),
        time_spent,
        timed_out,
    }
}
