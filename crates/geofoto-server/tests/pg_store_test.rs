//! Runs the Postgres store against a throwaway container. Needs a Docker daemon,
//! so it is ignored by default: `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use geofoto_server::store::{PgStore, RecordStore};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

async fn insert(store: &PgStore, submitter: &str, business: &str, hours_ago: i64) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO usaha_foto (nama_penginput, nama_usaha, "timestamp", latitude, longitude, photo_url)
        VALUES ($1, $2, $3, -6.2, 106.8, 'https://example.com/foto.jpg')
        RETURNING id
        "#,
    )
    .bind(submitter)
    .bind(business)
    .bind(Utc::now() - Duration::hours(hours_ago))
    .fetch_one(store.pool())
    .await
    .expect("insert")
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_pg_store_queries() {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start postgres container");
    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let store = PgStore::connect(&database_url, 2).await.expect("connect");
    store.ping().await.expect("ping");

    let old = insert(&store, "Andi", "Toko Andi", 24 * 30).await;
    insert(&store, "Sari", "Warung 100% Kopi", 2).await;
    insert(&store, "Sari", "Kopi_Kita", 1).await;

    let recent = store.list_recent().await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].business_name, "Kopi_Kita");
    assert_eq!(recent[2].id, old);

    assert_eq!(store.count(Some("kopi")).await.unwrap(), 2);
    assert_eq!(store.count(Some("100%")).await.unwrap(), 1);
    assert_eq!(store.count(Some("_")).await.unwrap(), 1);

    let page = store.page(Some("KOPI"), 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].business_name, "Warung 100% Kopi");

    let since = Utc::now() - Duration::days(7);
    assert_eq!(store.count_since(since).await.unwrap(), 2);

    let found = store.find_by_id(old).await.unwrap().expect("row");
    assert_eq!(found.submitter_name, "Andi");
    assert!(found.created_at.is_some());
    assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());

    let mut names = store.submitter_names().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["Andi", "Sari", "Sari"]);
}
