// src/store/sqlite.rs

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::{KvStore, check_payload};
use crate::{error::StoreError, models::record::RecordType};

/// Durable backend keeping every record as a row in the `records` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an existing pool. Call `migrate` before first use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations applied successfully.");
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, record_type: RecordType, room_id: &str) -> Result<Value, StoreError> {
        let row = sqlx::query("SELECT body FROM records WHERE record_type = ? AND room_id = ?")
            .bind(record_type.as_str())
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read {} for room {}: {:?}", record_type, room_id, e);
                StoreError::from(e)
            })?;

        let Some(row) = row else {
            return Ok(record_type.empty_value());
        };
        let body: String = row.try_get("body")?;

        // A corrupt row reads as absent rather than failing the caller.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("Malformed {} record for room {}: {}", record_type, room_id, e);
                Ok(record_type.empty_value())
            }
        }
    }

    async fn put(&self, record_type: RecordType, room_id: &str, value: Value) -> Result<(), StoreError> {
        check_payload(record_type, &value)?;
        let body = serde_json::to_string(&value)?;

        sqlx::query(
            r#"
            INSERT INTO records (record_type, room_id, body, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(record_type, room_id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record_type.as_str())
        .bind(room_id)
        .bind(body)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write {} for room {}: {:?}", record_type, room_id, e);
            StoreError::from(e)
        })?;

        Ok(())
    }

    async fn remove(&self, record_type: RecordType, room_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM records WHERE record_type = ? AND room_id = ?")
            .bind(record_type.as_str())
            .bind(room_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
