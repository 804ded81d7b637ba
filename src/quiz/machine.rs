// src/quiz/machine.rs

use chrono::{DateTime, Utc};

use crate::{
    error::SyncError,
    models::quiz::{Quiz, QuizStatus},
};

/// Outcome of an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new question is live at this index.
    Question(usize),
    /// The last question was passed; the quiz is over.
    Finished,
}

impl Quiz {
    /// `waiting → active`: shows the first question and stamps both start times.
    /// The roster check lives with the caller, who owns the roster.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SyncError> {
        if self.status != QuizStatus::Waiting {
            return Err(SyncError::InvalidTransition(format!(
                "cannot start a quiz that is {:?}",
                self.status
            )));
        }
        if self.questions.is_empty() {
            return Err(SyncError::InvalidTransition(
                "cannot start a quiz without questions".to_string(),
            ));
        }

        self.status = QuizStatus::Active;
        self.current_question_index = 0;
        self.started_at = Some(now);
        self.current_question_started_at = Some(now);
        Ok(())
    }

    /// `active → active` on the next question, or `active → finished` when
    /// there is none. The index never points past the last question.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SyncError> {
        if self.status != QuizStatus::Active {
            return Err(SyncError::InvalidTransition(format!(
                "cannot advance a quiz that is {:?}",
                self.status
            )));
        }

        let next = self.current_question_index + 1;
        if next >= self.questions.len() {
            self.finish();
            return Ok(Advance::Finished);
        }

        self.current_question_index = next;
        self.current_question_started_at = Some(now);
        Ok(Advance::Question(next))
    }

    /// Forces the terminal state. Idempotent.
    pub fn finish(&mut self) {
        self.status = QuizStatus::Finished;
    }
}
