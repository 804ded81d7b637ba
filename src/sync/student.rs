// src/sync/student.rs

use std::sync::Arc;

use chrono::Utc;
use tokio::{sync::Mutex, task::JoinHandle};
use validator::Validate;

use super::{
    client::SyncClient,
    events::SyncEvent,
    local::{self, KEY_QUIZ, KEY_QUIZ_ID, KEY_STUDENT_NAME},
    reconcile::Reconciler,
};
use crate::{
    error::SyncError,
    models::{
        quiz::{Quiz, QuizStatus},
        student::{StudentName, join_roster},
    },
    quiz::{StudentResults, grade},
};

struct StudentState {
    room_id: Option<String>,
    name: Option<StudentName>,
    quiz: Option<Quiz>,
    reconciler: Reconciler,
}

struct Inner {
    client: SyncClient,
    state: Mutex<StudentState>,
}

/// A participant: reads the quiz, writes only its own roster entry.
#[derive(Clone)]
pub struct StudentSession {
    inner: Arc<Inner>,
}

impl StudentSession {
    pub fn new(client: SyncClient) -> Self {
        let reconciler = Reconciler::new(client.timing().question_timeout);
        Self {
            inner: Arc::new(Inner {
                client,
                state: Mutex::new(StudentState {
                    room_id: None,
                    name: None,
                    quiz: None,
                    reconciler,
                }),
            }),
        }
    }

    pub fn client(&self) -> &SyncClient {
        &self.inner.client
    }

    pub async fn quiz(&self) -> Option<Quiz> {
        self.inner.state.lock().await.quiz.clone()
    }

    pub async fn rendered_index(&self) -> Option<usize> {
        self.inner.state.lock().await.reconciler.rendered_index()
    }

    /// Restores room and identity remembered by an earlier run.
    pub async fn restore(&self) {
        let local = self.client().local();
        let room_id: Option<String> = local::load_json(local, KEY_QUIZ_ID).await;
        let name: Option<StudentName> = local::load_json(local, KEY_STUDENT_NAME).await;
        let quiz: Option<Quiz> = local::load_json(local, KEY_QUIZ).await;

        let mut state = self.inner.state.lock().await;
        state.quiz = quiz.filter(|q| Some(&q.id) == room_id.as_ref());
        state.room_id = room_id;
        state.name = name;
    }

    /// Looks the room code up in the store and remembers it.
    pub async fn connect(&self, room_code: &str) -> Result<Quiz, SyncError> {
        let room_code = room_code.trim();
        if room_code.is_empty() {
            return Err(SyncError::Validation("Enter the room code".to_string()));
        }

        let quiz = self
            .client()
            .fetch_quiz(room_code)
            .await
            .ok_or_else(|| SyncError::RoomNotFound(room_code.to_string()))?;

        let local = self.client().local();
        local::save_json(local, KEY_QUIZ_ID, &quiz.id).await?;
        local::save_json(local, KEY_QUIZ, &quiz).await?;
        tracing::info!(room = %quiz.id, "connected to room");

        let mut state = self.inner.state.lock().await;
        state.room_id = Some(quiz.id.clone());
        state.quiz = Some(quiz.clone());
        let events = state.reconciler.apply(&quiz, Utc::now());
        drop(state);

        self.emit(SyncEvent::QuizUpdated(quiz.clone()));
        events.into_iter().for_each(|e| self.emit(e));
        Ok(quiz)
    }

    /// Adds this student to the roster. Joining again under the same name is
    /// a no-op; returns whether a new entry was written.
    ///
    /// The roster is read-modified-written without any lock, so two students
    /// joining at the same instant can overwrite each other.
    pub async fn join(&self, last_name: &str, first_name: &str) -> Result<bool, SyncError> {
        let name = StudentName::new(last_name, first_name);
        name.validate()?;

        let room_id = self.room_id().await?;
        local::save_json(self.client().local(), KEY_STUDENT_NAME, &name).await?;

        let mut roster = self.client().fetch_students(&room_id).await;
        let added = join_roster(&mut roster, &name, Utc::now());
        if added {
            self.client().push_students(&room_id, &roster).await?;
            tracing::info!(room = %room_id, count = roster.len(), "joined roster");
        } else {
            tracing::info!(room = %room_id, "already on the roster");
        }

        self.inner.state.lock().await.name = Some(name);
        self.emit(SyncEvent::RosterUpdated(roster));
        Ok(added)
    }

    /// Records `letter` for the question currently rendered.
    pub async fn submit_answer(&self, letter: &str) -> Result<(), SyncError> {
        let letter = letter.trim().to_uppercase();
        let (room_id, name, index) = {
            let state = self.inner.state.lock().await;
            let name = state
                .name
                .clone()
                .ok_or_else(|| SyncError::NotReady("Join the quiz first".to_string()))?;
            let quiz = state
                .quiz
                .as_ref()
                .filter(|q| q.status == QuizStatus::Active)
                .ok_or_else(|| SyncError::NotReady("No question is live".to_string()))?;
            let index = state
                .reconciler
                .rendered_index()
                .unwrap_or(quiz.current_question_index);
            let question = quiz
                .questions
                .get(index)
                .ok_or_else(|| SyncError::NotReady("No question is live".to_string()))?;
            if !question.has_option(&letter) {
                return Err(SyncError::Validation("Choose one of the options".to_string()));
            }
            (quiz.id.clone(), name, index)
        };

        let mut roster = self.client().fetch_students(&room_id).await;
        // Re-add an entry lost to a concurrent roster write.
        join_roster(&mut roster, &name, Utc::now());
        if let Some(student) = roster.iter_mut().find(|s| s.is(&name)) {
            student.record_answer(index, letter.clone());
        }
        self.client().push_students(&room_id, &roster).await?;
        tracing::info!(room = %room_id, index, answer = %letter, "answer submitted");
        Ok(())
    }

    /// One poll tick: fetch the quiz and reconcile it into the view.
    pub async fn poll_once(&self) -> Vec<SyncEvent> {
        let Ok(room_id) = self.room_id().await else {
            return Vec::new();
        };
        let Some(quiz) = self.client().fetch_quiz(&room_id).await else {
            return Vec::new();
        };

        let mut state = self.inner.state.lock().await;
        let events = state.reconciler.apply(&quiz, Utc::now());
        state.quiz = Some(quiz.clone());
        drop(state);

        self.emit(SyncEvent::QuizUpdated(quiz));
        for event in &events {
            self.emit(event.clone());
        }
        events
    }

    /// Grades this student once the quiz is finished.
    pub async fn results(&self) -> Result<StudentResults, SyncError> {
        let (room_id, name, quiz) = {
            let state = self.inner.state.lock().await;
            let name = state
                .name
                .clone()
                .ok_or_else(|| SyncError::NotReady("Join the quiz first".to_string()))?;
            let quiz = state
                .quiz
                .clone()
                .filter(|q| q.status == QuizStatus::Finished)
                .ok_or_else(|| SyncError::NotReady("The quiz is not finished yet".to_string()))?;
            (quiz.id.clone(), name, quiz)
        };

        let roster = self.client().fetch_students(&room_id).await;
        let student = roster
            .iter()
            .find(|s| s.is(&name))
            .ok_or_else(|| SyncError::NotReady("No results found for this student".to_string()))?;
        Ok(grade(&quiz, student))
    }

    /// Polls every `poll_interval` until the returned handle is aborted.
    pub fn run_polling(&self) -> JoinHandle<()> {
        let session = self.clone();
        let period = self.client().timing().poll_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                session.poll_once().await;
            }
        })
    }

    async fn room_id(&self) -> Result<String, SyncError> {
        self.inner
            .state
            .lock()
            .await
            .room_id
            .clone()
            .ok_or_else(|| SyncError::NotReady("Connect to a room first".to_string()))
    }

    fn emit(&self, event: SyncEvent) {
        self.client().events().emit(event);
    }
}
