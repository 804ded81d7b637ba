// src/sync/teacher.rs

use std::sync::Arc;

use chrono::Utc;
use tokio::{sync::Mutex, task::JoinHandle};

use super::{
    client::SyncClient,
    countdown::Countdown,
    events::SyncEvent,
    local::{self, KEY_QUIZ},
};
use crate::{
    error::SyncError,
    models::{
        quiz::{Question, Quiz, QuizStatus},
        student::Student,
    },
    quiz::{Advance, grade},
};

#[derive(Default)]
struct TeacherState {
    quiz: Option<Quiz>,
    roster: Vec<Student>,
    countdown: Countdown,
}

struct Inner {
    client: SyncClient,
    state: Mutex<TeacherState>,
}

/// The quiz owner: sole writer of status and question index.
///
/// Cheap to clone; clones share the same state. Starting or advancing arms a
/// countdown that advances on expiry unless the question already moved on.
#[derive(Clone)]
pub struct TeacherSession {
    inner: Arc<Inner>,
}

impl TeacherSession {
    pub fn new(client: SyncClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                state: Mutex::new(TeacherState::default()),
            }),
        }
    }

    pub fn client(&self) -> &SyncClient {
        &self.inner.client
    }

    pub async fn quiz(&self) -> Option<Quiz> {
        self.inner.state.lock().await.quiz.clone()
    }

    pub async fn roster(&self) -> Vec<Student> {
        self.inner.state.lock().await.roster.clone()
    }

    /// Picks up a quiz left in the local fallback by an earlier run.
    pub async fn restore(&self) -> Option<Quiz> {
        let quiz: Quiz = local::load_json(self.client().local(), KEY_QUIZ).await?;
        if quiz.status == QuizStatus::Finished {
            return None;
        }
        tracing::info!(room = %quiz.id, "restored quiz from local storage");
        let mut state = self.inner.state.lock().await;
        state.quiz = Some(quiz.clone());
        Some(quiz)
    }

    /// Saves a parsed quiz with one correct letter per question and opens the room.
    ///
    /// Rejected, with nothing changed, unless every question has a correct
    /// answer naming one of its options. A waiting quiz is replaced in place
    /// and keeps its room and roster; once started, only `reset` clears it.
    pub async fn create_quiz(
        &self,
        name: &str,
        mut questions: Vec<Question>,
        correct_answers: &[Option<String>],
    ) -> Result<Quiz, SyncError> {
        if questions.is_empty() {
            return Err(SyncError::Validation("Load the questions first".to_string()));
        }
        if correct_answers.len() != questions.len() {
            return Err(SyncError::Validation(
                "Select the correct answer for every question".to_string(),
            ));
        }
        for (index, (question, answer)) in questions.iter_mut().zip(correct_answers).enumerate() {
            match answer {
                Some(letter) if question.has_option(letter) => {
                    question.correct_answer = Some(letter.clone());
                }
                Some(letter) => {
                    return Err(SyncError::Validation(format!(
                        "Question {} has no option '{}'",
                        index + 1,
                        letter
                    )));
                }
                None => {
                    return Err(SyncError::Validation(
                        "Select the correct answer for every question".to_string(),
                    ));
                }
            }
        }

        let mut state = self.inner.state.lock().await;
        let existing = match &state.quiz {
            None => None,
            Some(quiz) if quiz.status == QuizStatus::Waiting => Some(quiz.id.clone()),
            Some(quiz) => {
                return Err(SyncError::InvalidTransition(format!(
                    "quiz {} is {:?}, reset it before creating a new one",
                    quiz.id, quiz.status
                )));
            }
        };

        let is_new_room = existing.is_none();
        let room_id =
            existing.unwrap_or_else(|| format!("quiz_{}", Utc::now().timestamp_millis()));
        let quiz = Quiz::new(room_id, name.trim(), questions);
        self.client().push_quiz(&quiz).await?;
        // A re-saved room keeps whatever roster the store already holds.
        if is_new_room {
            self.client().push_students(&quiz.id, &[]).await?;
        }
        let roster = self.client().fetch_students(&quiz.id).await;

        tracing::info!(room = %quiz.id, questions = quiz.questions.len(), "quiz saved");
        state.countdown.cancel();
        state.quiz = Some(quiz.clone());
        state.roster = roster.clone();
        drop(state);

        self.emit(SyncEvent::QuizUpdated(quiz.clone()));
        self.emit(SyncEvent::RosterUpdated(roster));
        Ok(quiz)
    }

    /// Re-reads the roster from the store.
    pub async fn refresh_roster(&self) -> Result<Vec<Student>, SyncError> {
        let room_id = self.room_id().await?;
        let roster = self.client().fetch_students(&room_id).await;

        let mut state = self.inner.state.lock().await;
        if state.roster != roster {
            tracing::info!(room = %room_id, count = roster.len(), "roster changed");
            state.roster = roster.clone();
            drop(state);
            self.emit(SyncEvent::RosterUpdated(roster.clone()));
        }
        Ok(roster)
    }

    /// `waiting → active`. Needs at least one student on the roster.
    pub async fn start(&self) -> Result<Quiz, SyncError> {
        let roster = self.refresh_roster().await?;
        if roster.is_empty() {
            return Err(SyncError::Validation(
                "Wait for at least one participant".to_string(),
            ));
        }

        let mut state = self.inner.state.lock().await;
        let mut quiz = state
            .quiz
            .clone()
            .ok_or_else(|| SyncError::NotReady("Create a quiz first".to_string()))?;
        quiz.start(Utc::now())?;

        self.client().push_quiz(&quiz).await?;
        state.quiz = Some(quiz.clone());
        tracing::info!(room = %quiz.id, students = roster.len(), "quiz started");
        self.arm_countdown(&mut state.countdown, &quiz);
        drop(state);

        self.emit(SyncEvent::QuizUpdated(quiz.clone()));
        self.emit(SyncEvent::StatusChanged(QuizStatus::Active));
        Ok(quiz)
    }

    /// Manual advance to the next question (or to `finished`).
    pub async fn advance(&self) -> Result<Quiz, SyncError> {
        let expected = {
            let state = self.inner.state.lock().await;
            match &state.quiz {
                Some(quiz) if quiz.status == QuizStatus::Active => quiz.current_question_index,
                Some(quiz) => {
                    return Err(SyncError::InvalidTransition(format!(
                        "cannot advance a quiz that is {:?}",
                        quiz.status
                    )));
                }
                None => return Err(SyncError::NotReady("Create a quiz first".to_string())),
            }
        };
        match self.advance_from(expected).await? {
            Some(quiz) => Ok(quiz),
            None => self
                .quiz()
                .await
                .ok_or_else(|| SyncError::NotReady("Create a quiz first".to_string())),
        }
    }

    /// Advances only if `expected` is still the live question. Returns `None`
    /// when another path (manual advance, countdown) already moved past it.
    pub async fn advance_from(&self, expected: usize) -> Result<Option<Quiz>, SyncError> {
        let mut state = self.inner.state.lock().await;
        let Some(mut quiz) = state.quiz.clone() else {
            return Ok(None);
        };
        if quiz.status != QuizStatus::Active || quiz.current_question_index != expected {
            tracing::debug!(
                room = %quiz.id,
                expected,
                current = quiz.current_question_index,
                "advance skipped, question already moved on"
            );
            return Ok(None);
        }

        let step = quiz.advance(Utc::now())?;
        self.client().push_quiz(&quiz).await?;
        state.quiz = Some(quiz.clone());

        match step {
            Advance::Question(index) => {
                tracing::info!(room = %quiz.id, index, "advanced to next question");
                self.arm_countdown(&mut state.countdown, &quiz);
                drop(state);
                self.emit(SyncEvent::QuizUpdated(quiz.clone()));
            }
            Advance::Finished => {
                tracing::info!(room = %quiz.id, "quiz finished");
                state.countdown.cancel();
                drop(state);
                if let Err(e) = self.record_scores(&quiz).await {
                    tracing::warn!(room = %quiz.id, "Failed to record scores: {}", e);
                }
                self.emit(SyncEvent::QuizUpdated(quiz.clone()));
                self.emit(SyncEvent::StatusChanged(QuizStatus::Finished));
                self.emit(SyncEvent::Finished);
            }
        }
        Ok(Some(quiz))
    }

    /// Discards the quiz and roster everywhere and stops the countdown.
    pub async fn reset(&self) -> Result<(), SyncError> {
        let mut state = self.inner.state.lock().await;
        state.countdown.cancel();
        if let Some(quiz) = state.quiz.take() {
            self.client().remove_room(&quiz.id).await?;
            tracing::info!(room = %quiz.id, "quiz reset");
        }
        state.roster.clear();
        drop(state);

        self.emit(SyncEvent::Reset);
        Ok(())
    }

    /// One poll tick: the teacher only needs a fresh roster.
    pub async fn poll_once(&self) -> Result<(), SyncError> {
        if self.inner.state.lock().await.quiz.is_none() {
            return Ok(());
        }
        self.refresh_roster().await.map(|_| ())
    }

    /// Polls every `poll_interval` until the returned handle is aborted.
    pub fn run_polling(&self) -> JoinHandle<()> {
        let session = self.clone();
        let period = self.client().timing().poll_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = session.poll_once().await {
                    tracing::warn!("Teacher poll failed: {}", e);
                }
            }
        })
    }

    async fn room_id(&self) -> Result<String, SyncError> {
        self.inner
            .state
            .lock()
            .await
            .quiz
            .as_ref()
            .map(|q| q.id.clone())
            .ok_or_else(|| SyncError::NotReady("Create a quiz first".to_string()))
    }

    fn arm_countdown(&self, countdown: &mut Countdown, quiz: &Quiz) {
        let timing = self.client().timing();
        let remaining = quiz.remaining(timing.question_timeout, Utc::now());
        let expected = quiz.current_question_index;
        let session = self.clone();

        countdown.arm(remaining, timing.countdown_tick, move || async move {
            tracing::info!(index = expected, "question time is up");
            if let Err(e) = session.advance_from(expected).await {
                tracing::warn!("Automatic advance failed: {}", e);
            }
        });
    }

    /// Writes each student's final score into the roster.
    async fn record_scores(&self, quiz: &Quiz) -> Result<(), SyncError> {
        let mut roster = self.client().fetch_students(&quiz.id).await;
        for student in roster.iter_mut() {
            student.score = grade(quiz, student).correct as u32;
        }
        self.client().push_students(&quiz.id, &roster).await?;
        self.inner.state.lock().await.roster = roster.clone();
        self.emit(SyncEvent::RosterUpdated(roster));
        Ok(())
    }

    fn emit(&self, event: SyncEvent) {
        self.client().events().emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::{
        config::Timing,
        error::StoreError,
        models::{
            quiz::AnswerOption,
            record::RecordType,
            student::{StudentName, join_roster},
        },
        store::{KvStore, MemoryStore},
        sync::local::{LocalStorage, MemoryLocalStorage},
    };

    /// Local storage whose writes can be switched off.
    #[derive(Default)]
    struct FlakyLocal {
        inner: MemoryLocalStorage,
        broken: AtomicBool,
    }

    #[async_trait]
    impl LocalStorage for FlakyLocal {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get_item(key).await
        }
        async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.set_item(key, value).await
        }
        async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove_item(key).await
        }
    }

    async fn add_student(remote: &MemoryStore, room_id: &str, last_name: &str) {
        let mut roster: Vec<Student> =
            serde_json::from_value(remote.get(RecordType::Students, room_id).await.unwrap())
                .unwrap();
        join_roster(&mut roster, &StudentName::new(last_name, "Test"), Utc::now());
        remote
            .put(RecordType::Students, room_id, serde_json::to_value(&roster).unwrap())
            .await
            .unwrap();
    }

    fn questions() -> Vec<Question> {
        vec![Question {
            text: "Q".to_string(),
            answers: vec![AnswerOption {
                letter: "A".to_string(),
                text: "a".to_string(),
            }],
            correct_answer: None,
        }]
    }

    #[tokio::test]
    async fn restores_unfinished_quiz_from_fallback() {
        let remote = Arc::new(MemoryStore::new());
        let local = Arc::new(MemoryLocalStorage::new());

        let first = TeacherSession::new(SyncClient::new(remote.clone(), local.clone(), Timing::default()));
        let saved = first
            .create_quiz("Demo", questions(), &[Some("A".to_string())])
            .await
            .unwrap();
        assert_eq!(saved.questions[0].correct_answer.as_deref(), Some("A"));

        let second = TeacherSession::new(SyncClient::new(remote, local, Timing::default()));
        assert_eq!(second.restore().await, Some(saved.clone()));
        assert_eq!(second.quiz().await, Some(saved));
    }

    #[tokio::test]
    async fn stale_advance_is_skipped() {
        let remote = Arc::new(MemoryStore::new());
        let session = TeacherSession::new(SyncClient::new(
            remote,
            Arc::new(MemoryLocalStorage::new()),
            Timing::default(),
        ));
        let mut two = questions();
        two.extend(questions());
        session
            .create_quiz("Demo", two, &[Some("A".to_string()), Some("A".to_string())])
            .await
            .unwrap();

        {
            let mut state = session.inner.state.lock().await;
            if let Some(quiz) = state.quiz.as_mut() {
                quiz.start(Utc::now()).unwrap();
            }
        }

        assert!(session.advance_from(0).await.unwrap().is_some());
        // A countdown armed for question 0 arriving late must not skip question 1.
        assert!(session.advance_from(0).await.unwrap().is_none());
        assert_eq!(session.quiz().await.unwrap().current_question_index, 1);
        session.reset().await.unwrap();
    }

    #[tokio::test]
    async fn resaving_a_waiting_quiz_keeps_late_joiners() {
        let remote = Arc::new(MemoryStore::new());
        let session = TeacherSession::new(SyncClient::new(
            remote.clone(),
            Arc::new(MemoryLocalStorage::new()),
            Timing::default(),
        ));
        let first = session
            .create_quiz("Demo", questions(), &[Some("A".to_string())])
            .await
            .unwrap();

        // Joins after the teacher's last look at the roster.
        add_student(&remote, &first.id, "Ivanov").await;

        let second = session
            .create_quiz("Demo, fixed", questions(), &[Some("A".to_string())])
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(session.roster().await.len(), 1);
        assert_eq!(session.refresh_roster().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn new_room_starts_with_empty_roster() {
        let remote = Arc::new(MemoryStore::new());
        let local = Arc::new(MemoryLocalStorage::new());
        let session = TeacherSession::new(SyncClient::new(
            remote.clone(),
            local.clone(),
            Timing::default(),
        ));
        let first = session
            .create_quiz("Demo", questions(), &[Some("A".to_string())])
            .await
            .unwrap();
        add_student(&remote, &first.id, "Ivanov").await;
        session.refresh_roster().await.unwrap();

        // Room ids are millisecond stamps.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // A new session on the same device must not carry the old roster over.
        let other = TeacherSession::new(SyncClient::new(remote.clone(), local, Timing::default()));
        let fresh = other
            .create_quiz("Next", questions(), &[Some("A".to_string())])
            .await
            .unwrap();
        assert_ne!(fresh.id, first.id);
        assert!(other.roster().await.is_empty());
        assert_eq!(
            remote.get(RecordType::Students, &fresh.id).await.unwrap(),
            serde_json::json!([])
        );
    }

    #[tokio::test]
    async fn failed_local_write_leaves_question_in_place() {
        let remote = Arc::new(MemoryStore::new());
        let local = Arc::new(FlakyLocal::default());
        let session = TeacherSession::new(SyncClient::new(
            remote.clone(),
            local.clone(),
            Timing::default(),
        ));
        let mut two = questions();
        two.extend(questions());
        let quiz = session
            .create_quiz("Demo", two, &[Some("A".to_string()), Some("A".to_string())])
            .await
            .unwrap();
        add_student(&remote, &quiz.id, "Ivanov").await;
        session.start().await.unwrap();

        local.broken.store(true, Ordering::SeqCst);
        assert!(session.advance().await.is_err());
        assert_eq!(session.quiz().await.unwrap().current_question_index, 0);

        local.broken.store(false, Ordering::SeqCst);
        assert_eq!(session.advance().await.unwrap().current_question_index, 1);
        session.reset().await.unwrap();
    }
}
