// src/models/quiz.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a quiz room. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    /// Roster open, no question shown yet.
    Waiting,
    /// One question is live.
    Active,
    /// Terminal; results can be computed.
    Finished,
}

/// A single answer option, e.g. `B. Paris`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub letter: String,
    pub text: String,
}

/// A parsed question with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,

    pub answers: Vec<AnswerOption>,

    /// Letter of the correct option. Unset until the teacher picks one.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl Question {
    pub fn has_option(&self, letter: &str) -> bool {
        self.answers.iter().any(|a| a.letter == letter)
    }
}

/// The full quiz record, published as a whole on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Room code; partitions every record of this session in the store.
    pub id: String,

    pub name: String,

    pub questions: Vec<Question>,

    pub status: QuizStatus,

    #[serde(default)]
    pub current_question_index: usize,

    #[serde(default)]
    pub current_question_started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl Quiz {
    /// Builds a fresh room in the `waiting` state.
    pub fn new(id: impl Into<String>, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions,
            status: QuizStatus::Waiting,
            current_question_index: 0,
            current_question_started_at: None,
            started_at: None,
        }
    }

    /// The question currently live, if the quiz is active.
    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            QuizStatus::Active => self.questions.get(self.current_question_index),
            _ => None,
        }
    }

    /// Time left on the current question, derived from the shared start stamp
    /// so that independently polling clients agree on the countdown.
    pub fn remaining(&self, timeout: Duration, now: DateTime<Utc>) -> Duration {
        let Some(started) = self.current_question_started_at.or(self.started_at) else {
            return timeout;
        };
        let elapsed = (now - started).to_std().unwrap_or(Duration::ZERO);
        timeout.saturating_sub(elapsed)
    }
}
