//! Listings shaped like the hosted edge functions: one paginated and filterable,
//! one returning every row with a count.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::domain::{PageParams, PageRequest, Pagination, Record};
use crate::error::Result;
use crate::AppState;

const FETCHED: &str = "Data retrieved successfully";

#[derive(Serialize)]
pub struct Filters {
    nama_usaha: Option<String>,
}

#[derive(Serialize)]
pub struct PageResponse {
    success: bool,
    message: &'static str,
    pagination: Pagination,
    filters: Filters,
    data: Vec<Record>,
}

#[derive(Serialize)]
pub struct AllResponse {
    success: bool,
    message: &'static str,
    count: usize,
    data: Vec<Record>,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse>> {
    let req = PageRequest::try_from(params)?;
    let filter = req.business_filter.as_deref();

    let data = state.store.page(filter, req.limit, req.offset).await?;
    let total = state.store.count(filter).await?;

    Ok(Json(PageResponse {
        success: true,
        message: FETCHED,
        pagination: Pagination::new(req.limit, req.offset, total),
        filters: Filters {
            nama_usaha: req.business_filter,
        },
        data,
    }))
}

pub async fn all(State(state): State<Arc<AppState>>) -> Result<Json<AllResponse>> {
    let data = state.store.list_recent().await?;

    Ok(Json(AllResponse {
        success: true,
        message: FETCHED,
        count: data.len(),
        data,
    }))
}
