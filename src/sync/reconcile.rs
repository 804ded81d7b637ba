// src/sync/reconcile.rs

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::events::SyncEvent;
use crate::models::quiz::{Quiz, QuizStatus};

/// Folds observed quiz records into what a client should render.
///
/// Status changes always apply. A question index applies only if it is not
/// behind the one already rendered, so out-of-order reads never move the
/// view back a question.
#[derive(Debug, Clone)]
pub struct Reconciler {
    timeout: Duration,
    room_id: Option<String>,
    last_status: Option<QuizStatus>,
    rendered_index: Option<usize>,
}

impl Reconciler {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            room_id: None,
            last_status: None,
            rendered_index: None,
        }
    }

    pub fn rendered_index(&self) -> Option<usize> {
        self.rendered_index
    }

    #[cfg(test)]
    fn last_status(&self) -> Option<QuizStatus> {
        self.last_status
    }

    pub fn reset(&mut self) {
        self.room_id = None;
        self.last_status = None;
        self.rendered_index = None;
    }

    /// Applies one observation taken at `now` and returns what changed.
    pub fn apply(&mut self, quiz: &Quiz, now: DateTime<Utc>) -> Vec<SyncEvent> {
        let mut events = Vec::new();

        if self.room_id.as_deref() != Some(quiz.id.as_str()) {
            self.reset();
            self.room_id = Some(quiz.id.clone());
        }

        if self.last_status != Some(quiz.status) {
            tracing::info!(room = %quiz.id, status = ?quiz.status, "quiz status changed");
            self.last_status = Some(quiz.status);
            events.push(SyncEvent::StatusChanged(quiz.status));
            if quiz.status == QuizStatus::Finished {
                events.push(SyncEvent::Finished);
            }
        }

        if quiz.status != QuizStatus::Active {
            return events;
        }

        let observed = quiz.current_question_index;
        match self.rendered_index {
            Some(rendered) if observed < rendered => {
                tracing::warn!(
                    room = %quiz.id,
                    observed,
                    rendered,
                    "ignoring stale question index"
                );
                events.push(SyncEvent::RegressionIgnored { observed, rendered });
            }
            Some(rendered) if observed == rendered => {}
            _ => {
                self.rendered_index = Some(observed);
                let remaining = quiz.remaining(self.timeout, now);
                tracing::info!(room = %quiz.id, index = observed, ?remaining, "showing question");
                events.push(SyncEvent::QuestionShown {
                    index: observed,
                    remaining,
                });
            }
        }

        events
    }
}
