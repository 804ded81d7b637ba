// src/sync/events.rs

use std::time::Duration;

use tokio::sync::broadcast;

use crate::models::{
    quiz::{Quiz, QuizStatus},
    student::Student,
};

/// Notifications emitted by a session, whether the change came from a local
/// action or from a remote poll.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A new copy of the quiz record is in the local cache.
    QuizUpdated(Quiz),
    /// The quiz moved to a new lifecycle state.
    StatusChanged(QuizStatus),
    /// A question should be rendered with this much time left.
    QuestionShown { index: usize, remaining: Duration },
    /// An older index arrived after a newer one had been rendered.
    RegressionIgnored { observed: usize, rendered: usize },
    RosterUpdated(Vec<Student>),
    Finished,
    Reset,
}

/// Fan-out channel for `SyncEvent`s. Sending never fails; with no
/// subscribers the event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: SyncEvent) {
        tracing::debug!(?event, "sync event");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
