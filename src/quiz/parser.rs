// src/quiz/parser.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::models::quiz::{AnswerOption, Question};

/// `Вопрос 3: text` / `Вопрос 3 text`.
static QUESTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Вопрос\s+(\d+)[:：]?\s*(.*)$").expect("question marker regex")
});

/// `A. text` / `b) text`.
static ANSWER_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-zа-я])[.)]\s*(.+)$").expect("answer option regex")
});

/// Question under construction.
struct Draft {
    text_lines: Vec<String>,
    text: Option<String>,
    answers: Vec<AnswerOption>,
}

impl Draft {
    fn new(first_line: &str) -> Self {
        let mut text_lines = Vec::new();
        if !first_line.is_empty() {
            text_lines.push(first_line.to_string());
        }
        Self {
            text_lines,
            text: None,
            answers: Vec::new(),
        }
    }

    fn collecting_text(&self) -> bool {
        self.text.is_none()
    }

    fn finish(self) -> Option<Question> {
        let text = self.text?;
        if self.answers.is_empty() {
            return None;
        }
        Some(Question {
            text,
            answers: self.answers,
            correct_answer: None,
        })
    }
}

fn parse_option(line: &str) -> Option<AnswerOption> {
    let caps = ANSWER_OPTION.captures(line)?;
    Some(AnswerOption {
        letter: caps[1].to_uppercase(),
        text: caps[2].to_string(),
    })
}

/// Extracts questions from a markdown test file.
///
/// A question marker opens a question; following non-blank lines form its
/// text until the first option line. Options then accumulate until the next
/// marker. Questions without options are dropped, as is anything before the
/// first marker. `correct_answer` is left unset.
pub fn parse_questions(markdown: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut draft: Option<Draft> = None;

    for raw in markdown.lines() {
        let line = raw.trim();

        if let Some(caps) = QUESTION_MARKER.captures(line) {
            if let Some(question) = draft.take().and_then(Draft::finish) {
                questions.push(question);
            }
            draft = Some(Draft::new(caps[2].trim()));
            continue;
        }

        let Some(current) = draft.as_mut() else {
            continue;
        };

        match parse_option(line) {
            Some(option) => {
                if current.collecting_text() {
                    current.text = Some(current.text_lines.join(" ").trim().to_string());
                    current.text_lines.clear();
                }
                current.answers.push(option);
            }
            None if current.collecting_text() && !line.is_empty() => {
                current.text_lines.push(line.to_string());
            }
            None => {}
        }
    }

    if let Some(question) = draft.and_then(Draft::finish) {
        questions.push(question);
    }

    questions
}
