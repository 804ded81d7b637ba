// src/sync/client.rs

use std::sync::Arc;

use serde_json::Value;

use super::{
    events::EventBus,
    local::{self, KEY_QUIZ, KEY_QUIZ_ID, KEY_STUDENTS, KEY_STUDENTS_ROOM, LocalStorage},
};
use crate::{
    config::{ClientConfig, Timing},
    error::{StoreError, SyncError},
    models::{quiz::Quiz, record::RecordType, student::Student},
    store::{HttpStore, KvStore},
};

/// Push/fetch plumbing shared by teacher and student sessions.
///
/// Every write lands in the local fallback first and is then pushed to the
/// remote store. Remote failures are logged and swallowed; reads fall back to
/// the local copy. There is no retry beyond the next poll.
#[derive(Clone)]
pub struct SyncClient {
    remote: Arc<dyn KvStore>,
    local: Arc<dyn LocalStorage>,
    events: EventBus,
    timing: Timing,
}

impl SyncClient {
    pub fn new(remote: Arc<dyn KvStore>, local: Arc<dyn LocalStorage>, timing: Timing) -> Self {
        Self {
            remote,
            local,
            events: EventBus::default(),
            timing,
        }
    }

    /// HTTP remote plus a file-backed fallback, as configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, StoreError> {
        let remote = HttpStore::new(&config.endpoint)?;
        let local = local::FileLocalStorage::new(&config.fallback_dir);
        Ok(Self::new(Arc::new(remote), Arc::new(local), config.timing))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn local(&self) -> &dyn LocalStorage {
        self.local.as_ref()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub async fn push_quiz(&self, quiz: &Quiz) -> Result<(), SyncError> {
        local::save_json(self.local(), KEY_QUIZ, quiz).await?;
        local::save_json(self.local(), KEY_QUIZ_ID, &quiz.id).await?;

        let value = serde_json::to_value(quiz).map_err(StoreError::from)?;
        match self.remote.put(RecordType::Quiz, &quiz.id, value).await {
            Ok(()) => tracing::debug!(room = %quiz.id, "quiz pushed"),
            Err(e) => tracing::warn!(room = %quiz.id, "Failed to push quiz, kept locally: {}", e),
        }
        Ok(())
    }

    pub async fn push_students(&self, room_id: &str, students: &[Student]) -> Result<(), SyncError> {
        self.cache_students(room_id, students).await?;

        let value = serde_json::to_value(students).map_err(StoreError::from)?;
        match self.remote.put(RecordType::Students, room_id, value).await {
            Ok(()) => tracing::debug!(room = %room_id, count = students.len(), "roster pushed"),
            Err(e) => tracing::warn!(room = %room_id, "Failed to push roster, kept locally: {}", e),
        }
        Ok(())
    }

    /// Latest quiz for `room_id`, or `None` if the room has none.
    pub async fn fetch_quiz(&self, room_id: &str) -> Option<Quiz> {
        match self.remote.get(RecordType::Quiz, room_id).await {
            Ok(Value::Null) => None,
            Ok(value) => match serde_json::from_value::<Quiz>(value) {
                Ok(quiz) => {
                    if let Err(e) = local::save_json(self.local(), KEY_QUIZ, &quiz).await {
                        tracing::warn!("Failed to cache quiz locally: {}", e);
                    }
                    Some(quiz)
                }
                Err(e) => {
                    tracing::warn!(room = %room_id, "Ignoring malformed remote quiz: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!(room = %room_id, "Failed to fetch quiz, using local copy: {}", e);
                self.cached_quiz(room_id).await
            }
        }
    }

    /// Latest roster for `room_id`; empty if none is known.
    pub async fn fetch_students(&self, room_id: &str) -> Vec<Student> {
        match self.remote.get(RecordType::Students, room_id).await {
            Ok(value) => match serde_json::from_value::<Vec<Student>>(value) {
                Ok(students) => {
                    if let Err(e) = self.cache_students(room_id, &students).await {
                        tracing::warn!("Failed to cache roster locally: {}", e);
                    }
                    students
                }
                Err(e) => {
                    tracing::warn!(room = %room_id, "Ignoring malformed remote roster: {}", e);
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!(room = %room_id, "Failed to fetch roster, using local copy: {}", e);
                self.cached_students(room_id).await
            }
        }
    }

    /// Local copy of the quiz, only if it belongs to `room_id`.
    pub async fn cached_quiz(&self, room_id: &str) -> Option<Quiz> {
        local::load_json::<Quiz>(self.local(), KEY_QUIZ)
            .await
            .filter(|quiz| quiz.id == room_id)
    }

    /// Local copy of the roster, or empty if it was cached for another room.
    pub async fn cached_students(&self, room_id: &str) -> Vec<Student> {
        let owner: Option<String> = local::load_json(self.local(), KEY_STUDENTS_ROOM).await;
        if owner.as_deref() != Some(room_id) {
            return Vec::new();
        }
        local::load_json(self.local(), KEY_STUDENTS)
            .await
            .unwrap_or_default()
    }

    async fn cache_students(&self, room_id: &str, students: &[Student]) -> Result<(), StoreError> {
        local::save_json(self.local(), KEY_STUDENTS_ROOM, room_id).await?;
        local::save_json(self.local(), KEY_STUDENTS, students).await
    }

    /// Deletes both records of a room, remotely and locally.
    pub async fn remove_room(&self, room_id: &str) -> Result<(), SyncError> {
        for record_type in [RecordType::Quiz, RecordType::Students] {
            if let Err(e) = self.remote.remove(record_type, room_id).await {
                tracing::warn!(room = %room_id, "Failed to remove remote {}: {}", record_type, e);
            }
        }
        self.local.remove_item(KEY_QUIZ).await?;
        self.local.remove_item(KEY_STUDENTS).await?;
        self.local.remove_item(KEY_STUDENTS_ROOM).await?;
        self.local.remove_item(KEY_QUIZ_ID).await?;
        Ok(())
    }
}
