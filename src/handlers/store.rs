// src/handlers/store.rs

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::Value;

use crate::{
    error::AppError,
    models::record::{RecordType, SaveResponse, StoreQuery},
    store::KvStore,
};

/// Resolves `?type=` into a record type, with the messages clients expect.
fn record_type(query: &StoreQuery) -> Result<RecordType, AppError> {
    match query.record_type.as_deref() {
        None | Some("") => Err(AppError::BadRequest(
            "Missing required parameter: type. Use ?type=quiz or ?type=students".to_string(),
        )),
        Some(raw) => raw.parse().map_err(AppError::BadRequest),
    }
}

/// Returns the stored record: the quiz object (or `null`), or the roster array (or `[]`).
pub async fn get_record(
    State(store): State<Arc<dyn KvStore>>,
    Query(query): Query<StoreQuery>,
) -> Result<impl IntoResponse, AppError> {
    let record_type = record_type(&query)?;
    let room_id = query.room_id();

    let value = store.get(record_type, room_id).await?;
    match (&record_type, &value) {
        (RecordType::Students, Value::Array(items)) => {
            tracing::info!("Students retrieved for quizId: {}, count: {}", room_id, items.len());
        }
        _ => {
            tracing::info!("{} retrieved for quizId: {}, exists: {}", record_type, room_id, !value.is_null());
        }
    }

    Ok(Json(value))
}

/// Overwrites the record with the request body. No merge, last writer wins.
pub async fn save_record(
    State(store): State<Arc<dyn KvStore>>,
    Query(query): Query<StoreQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let record_type = record_type(&query)?;
    let room_id = query.room_id().to_string();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest(format!(
            "Missing body for {} data",
            record_type
        )));
    }
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Invalid JSON in body for quizId {}: {}", room_id, e);
        AppError::BadRequest(format!("Invalid JSON in body: {}", e))
    })?;

    let count = match (&record_type, &value) {
        (RecordType::Students, Value::Array(items)) => Some(items.len()),
        _ => None,
    };

    store.put(record_type, &room_id, value).await?;

    match count {
        Some(count) => tracing::info!("Students saved for quizId: {}, count: {}", room_id, count),
        None => tracing::info!("Quiz saved for quizId: {}", room_id),
    }

    Ok(Json(SaveResponse {
        success: true,
        quiz_id: room_id,
        count,
    }))
}

/// Drops the record so later reads see the empty default.
pub async fn delete_record(
    State(store): State<Arc<dyn KvStore>>,
    Query(query): Query<StoreQuery>,
) -> Result<impl IntoResponse, AppError> {
    let record_type = record_type(&query)?;
    let room_id = query.room_id().to_string();

    store.remove(record_type, &room_id).await?;
    tracing::info!("{} removed for quizId: {}", record_type, room_id);

    Ok(Json(SaveResponse {
        success: true,
        quiz_id: room_id,
        count: None,
    }))
}
