use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use geofoto_server::config::{Backend, Config, LogFormat};
use geofoto_server::domain::Record;
use geofoto_server::store::MemoryStore;
use geofoto_server::App;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config() -> Config {
    Config {
        bind_address: "0.0.0.0:8080".to_string(),
        backend: Backend::Memory,
        otlp_endpoint: None,
        log_format: LogFormat::Json,
        request_timeout_secs: 30,
    }
}

fn setup(records: Vec<Record>) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_records(records));
    let app = App::with_store(test_config(), store.clone());
    (app.router(), store)
}

fn record(submitter: &str, business: &str, hours_ago: i64) -> Record {
    Record {
        id: Uuid::new_v4(),
        submitter_name: submitter.to_string(),
        business_name: business.to_string(),
        captured_at: Utc::now() - Duration::hours(hours_ago),
        latitude: -6.175392,
        longitude: 106.827153,
        photo_url: format!(
            "https://abc.supabase.co/storage/v1/object/public/fotos/foto_{}.jpg",
            hours_ago
        ),
        created_at: None,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let res = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn timestamps(data: &Value) -> Vec<DateTime<Utc>> {
    data.as_array()
        .unwrap()
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap().parse().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (router, _) = setup(vec![]);
    let (status, json) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_ready_reflects_backend() {
    let (router, store) = setup(vec![]);
    let (status, _) = get(&router, "/ready").await;
    assert_eq!(status, StatusCode::OK);

    store.set_unavailable(true);
    let (status, _) = get(&router, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let (router, _) = setup(vec![
        record("Sari", "Warung Sari", 48),
        record("Budi", "Bengkel Budi", 1),
        record("Andi", "Toko Andi", 200),
        record("Sari", "Kopi Sari", 12),
    ]);

    let (status, json) = get(&router, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 4);
    assert!(json["timestamp"].is_string());

    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["nama_usaha"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Bengkel Budi", "Kopi Sari", "Warung Sari", "Toko Andi"]
    );

    let ts = timestamps(&json["data"]);
    let mut sorted = ts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ts, sorted);
}

#[tokio::test]
async fn test_list_backend_failure_is_500_envelope() {
    let (router, store) = setup(vec![record("Sari", "Warung", 1)]);
    store.set_unavailable(true);

    let (status, json) = get(&router, "/api/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_get_by_id() {
    let target = record("Sari", "Warung Sari", 3);
    let id = target.id;
    let (router, _) = setup(vec![record("Budi", "Bengkel", 1), target]);

    let (status, json) = get(&router, &format!("/api/data/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], id.to_string());
    assert_eq!(json["data"]["nama_penginput"], "Sari");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_get_rejects_malformed_id() {
    let (router, store) = setup(vec![]);

    let (status, json) = get(&router, "/api/data/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid ID format. Must be a valid UUID.");

    // Validation happens before the backend is consulted.
    store.set_unavailable(true);
    let (status, _) = get(&router, "/api/data/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_id_is_404() {
    let (router, _) = setup(vec![record("Sari", "Warung", 1)]);
    let missing = Uuid::new_v4().to_string();

    let (status, json) = get(&router, &format!("/api/data/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Data not found");
    assert_eq!(json["id"], missing);
}

#[tokio::test]
async fn test_get_backend_failure_is_500() {
    let (router, store) = setup(vec![]);
    store.set_unavailable(true);

    let (status, json) = get(&router, &format!("/api/data/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}

fn twenty_five_records() -> Vec<Record> {
    (0..25)
        .map(|i| {
            let business = if i % 5 == 0 { "Kopi Kenangan" } else { "Toko Jaya" };
            record("Sari", &format!("{} {}", business, i), i)
        })
        .collect()
}

#[tokio::test]
async fn test_page_first_page_has_more() {
    let (router, _) = setup(twenty_five_records());

    let (status, json) = get(&router, "/functions/v1/api?limit=10&offset=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 10);
    assert_eq!(json["pagination"]["limit"], 10);
    assert_eq!(json["pagination"]["offset"], 0);
    assert_eq!(json["pagination"]["total"], 25);
    assert_eq!(json["pagination"]["has_more"], true);
    assert!(json["filters"]["nama_usaha"].is_null());
}

#[tokio::test]
async fn test_page_last_page() {
    let (router, _) = setup(twenty_five_records());

    let (status, json) = get(&router, "/functions/v1/api?limit=10&offset=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["has_more"], false);
}

#[tokio::test]
async fn test_page_with_largest_offset_is_empty() {
    let (router, _) = setup(twenty_five_records());

    let (status, json) = get(
        &router,
        "/functions/v1/api?limit=10&offset=9223372036854775807",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].as_array().unwrap().is_empty());
    assert_eq!(json["pagination"]["offset"], i64::MAX);
    assert_eq!(json["pagination"]["total"], 25);
    assert_eq!(json["pagination"]["has_more"], false);
}

#[tokio::test]
async fn test_page_filter_matches_wildcards_literally() {
    let (router, _) = setup(vec![
        record("Sari", "Kopi 100%_asli", 1),
        record("Budi", "Kopi 1000 asli", 2),
    ]);

    let (status, json) = get(&router, "/functions/v1/api?nama_usaha=100%25_asli").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filters"]["nama_usaha"], "100%_asli");
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["nama_usaha"], "Kopi 100%_asli");
}

#[tokio::test]
async fn test_page_defaults() {
    let (router, _) = setup(twenty_five_records());

    let (_, json) = get(&router, "/functions/v1/api").await;
    assert_eq!(json["pagination"]["limit"], 10);
    assert_eq!(json["pagination"]["offset"], 0);
    assert_eq!(json["data"].as_array().unwrap().len(), 10);

    let ts = timestamps(&json["data"]);
    let mut sorted = ts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ts, sorted);
}

#[tokio::test]
async fn test_page_filters_by_business_substring() {
    let (router, _) = setup(twenty_five_records());

    let (status, json) = get(&router, "/functions/v1/api?nama_usaha=kopi&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filters"]["nama_usaha"], "kopi");
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["has_more"], true);

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert!(data
        .iter()
        .all(|r| r["nama_usaha"].as_str().unwrap().starts_with("Kopi Kenangan")));
}

#[tokio::test]
async fn test_page_rejects_bad_params() {
    let (router, _) = setup(vec![]);

    let (status, json) = get(&router, "/functions/v1/api?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = get(&router, "/functions/v1/api?offset=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_data_returns_everything() {
    let (router, _) = setup(twenty_five_records());

    let (status, json) = get(&router, "/functions/v1/get-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 25);
    assert_eq!(json["data"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn test_stats() {
    let mut records = Vec::new();
    for i in 0..2 {
        records.push(record("Andi", "Toko Andi", 24 * 30 + i));
    }
    for i in 0..5 {
        records.push(record("Sari", "Warung Sari", i));
    }
    for i in 0..3 {
        records.push(record("Budi", "Bengkel Budi", 24 * 10 + i));
    }
    let (router, _) = setup(records);

    let (status, json) = get(&router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let stats = &json["stats"];
    assert_eq!(stats["total_entries"], 10);
    assert_eq!(stats["recent_entries_7days"], 5);
    assert!(stats["last_updated"].is_string());

    let top: Vec<(&str, u64)> = stats["top_contributors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["nama_penginput"].as_str().unwrap(),
                c["total_entries"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(top, vec![("Sari", 5), ("Budi", 3), ("Andi", 2)]);
}

#[tokio::test]
async fn test_stats_fails_when_any_query_fails() {
    let (router, store) = setup(vec![record("Sari", "Warung", 1)]);
    store.set_unavailable(true);

    let (status, json) = get(&router, "/api/stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_unknown_route() {
    let (router, _) = setup(vec![]);
    let (status, json) = get(&router, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (router, _) = setup(vec![]);
    let res = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}
