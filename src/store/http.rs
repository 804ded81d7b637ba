// src/store/http.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::KvStore;
use crate::{error::StoreError, models::record::RecordType};

/// Client view of the store endpoint (`/api/quiz?type=..&quizId=..`).
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Transport(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, endpoint })
    }

    fn record_url(&self, record_type: RecordType, room_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("type", record_type.as_str())
            .append_pair("quizId", room_id);
        url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(StoreError::InvalidPayload(format!("{}: {}", status, body)))
        } else {
            Err(StoreError::Transport(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl KvStore for HttpStore {
    async fn get(&self, record_type: RecordType, room_id: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.record_url(record_type, room_id))
            .send()
            .await?;
        let value: Value = Self::check(response).await?.json().await?;
        Ok(value)
    }

    async fn put(&self, record_type: RecordType, room_id: &str, value: Value) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.record_url(record_type, room_id))
            .json(&value)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn remove(&self, record_type: RecordType, room_id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.record_url(record_type, room_id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
