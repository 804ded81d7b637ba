// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KvStore, check_payload};
use crate::{error::StoreError, models::record::RecordType};

/// Process-memory store. Lost on restart; meant for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(RecordType, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, record_type: RecordType, room_id: &str) -> Result<Value, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(record_type, room_id.to_string()))
            .cloned()
            .unwrap_or_else(|| record_type.empty_value()))
    }

    async fn put(&self, record_type: RecordType, room_id: &str, value: Value) -> Result<(), StoreError> {
        check_payload(record_type, &value)?;
        self.records
            .write()
            .await
            .insert((record_type, room_id.to_string()), value);
        Ok(())
    }

    async fn remove(&self, record_type: RecordType, room_id: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(&(record_type, room_id.to_string()));
        Ok(())
    }
}
