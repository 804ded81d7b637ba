// src/quiz/results.rs

use serde::Serialize;

use crate::models::{quiz::Quiz, student::Student};

/// Per-question line of a student's result sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub index: usize,
    pub text: String,
    pub given: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
}

/// A student's results once the quiz is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResults {
    pub last_name: String,
    pub first_name: String,
    pub correct: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u32,
    pub details: Vec<QuestionResult>,
}

/// Compares recorded answers against each question's `correct_answer`.
/// An unanswered question counts as wrong.
pub fn grade(quiz: &Quiz, student: &Student) -> StudentResults {
    let details: Vec<QuestionResult> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let given = student.answer_at(index).map(str::to_string);
            let is_correct = given.is_some() && given == question.correct_answer;
            QuestionResult {
                index,
                text: question.text.clone(),
                given,
                correct_answer: question.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    let correct = details.iter().filter(|d| d.is_correct).count();
    let total = details.len();
    let percentage = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    };

    StudentResults {
        last_name: student.last_name.clone(),
        first_name: student.first_name.clone(),
        correct,
        total,
        percentage,
        details,
    }
}
