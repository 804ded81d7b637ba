// src/store/mod.rs

pub mod http;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::StoreError, models::record::RecordType};

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key-value contract shared by every backend: one JSON blob per
/// `(record type, room id)`, overwritten whole, last writer wins.
///
/// There is no atomicity across record types. A reader may see a fresh quiz
/// next to a stale roster and must tolerate it.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the stored value, or `RecordType::empty_value` if absent.
    async fn get(&self, record_type: RecordType, room_id: &str) -> Result<Value, StoreError>;

    /// Overwrites the stored value. No merge.
    async fn put(&self, record_type: RecordType, room_id: &str, value: Value) -> Result<(), StoreError>;

    /// Drops the record so later reads see the empty default.
    async fn remove(&self, record_type: RecordType, room_id: &str) -> Result<(), StoreError>;
}

/// Rejects payloads whose shape does not fit the record type.
pub fn check_payload(record_type: RecordType, value: &Value) -> Result<(), StoreError> {
    match record_type {
        RecordType::Students if !value.is_array() => Err(StoreError::InvalidPayload(
            "Students data must be an array".to_string(),
        )),
        RecordType::Quiz if value.is_null() => Err(StoreError::InvalidPayload(
            "Missing body for quiz data".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn students_must_be_an_array() {
        assert!(check_payload(RecordType::Students, &json!([])).is_ok());
        assert!(matches!(
            check_payload(RecordType::Students, &json!({"lastName": "x"})),
            Err(StoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn quiz_must_not_be_null() {
        assert!(check_payload(RecordType::Quiz, &json!({"id": "q"})).is_ok());
        assert!(check_payload(RecordType::Quiz, &Value::Null).is_err());
    }
}
