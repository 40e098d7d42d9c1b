use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{top_contributors, Stats, RECENT_WINDOW_DAYS, TOP_CONTRIBUTOR_LIMIT};
use crate::error::Result;
use crate::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    success: bool,
    stats: Stats,
    timestamp: DateTime<Utc>,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>> {
    let store = state.store.as_ref();
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);

    let (total_entries, recent_entries_7days, names) = tokio::try_join!(
        store.count(None),
        store.count_since(since),
        store.submitter_names(),
    )?;

    let now = Utc::now();
    Ok(Json(StatsResponse {
        success: true,
        stats: Stats {
            total_entries,
            recent_entries_7days,
            top_contributors: top_contributors(&names, TOP_CONTRIBUTOR_LIMIT),
            last_updated: now,
        },
        timestamp: now,
    }))
}
