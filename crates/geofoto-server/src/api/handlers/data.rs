use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{parse_record_id, Record};
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Serialize)]
pub struct ListResponse {
    success: bool,
    data: Vec<Record>,
    total: usize,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct RecordResponse {
    success: bool,
    data: Record,
    timestamp: DateTime<Utc>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<ListResponse>> {
    let data = state.store.list_recent().await?;

    Ok(Json(ListResponse {
        success: true,
        total: data.len(),
        data,
        timestamp: Utc::now(),
    }))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>> {
    let record_id = parse_record_id(&id).ok_or(AppError::InvalidId)?;

    let data = state
        .store
        .find_by_id(record_id)
        .await?
        .ok_or(AppError::NotFound(id))?;

    Ok(Json(RecordResponse {
        success: true,
        data,
        timestamp: Utc::now(),
    }))
}
