//! Searches against a real database
//!
//! Runs only when `EVENTSEARCH_TEST_DRIVER` (`postgres` or `mysql`) and
//! `EVENTSEARCH_TEST_DSN` are set. Rows are tagged with a per-run
//! instance id and removed afterwards.
//!
//! The table mirrors the production schema, where only the keys, `event`
//! and `protocol` are required. Empty optional fields are written as NULL.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use eventsearch::config::StoreConfig;
use eventsearch::events::{EventRecord, LogEvent};
use eventsearch::filter::{CommonSearchParams, LogEventSearch};
use eventsearch::search::Searcher;
use eventsearch::store::{Driver, EventStore, MySqlStore, PgStore};

const CREATE_LOG_TABLE: &str = "CREATE TABLE IF NOT EXISTS eventstore_log_events (
    id VARCHAR(64) NOT NULL PRIMARY KEY,
    timestamp BIGINT NOT NULL,
    event INTEGER NOT NULL,
    protocol VARCHAR(30) NOT NULL,
    username VARCHAR(255),
    ip VARCHAR(50),
    message VARCHAR(2048),
    role VARCHAR(255),
    instance_id VARCHAR(60)
)";

fn nullable(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn live_config() -> Option<StoreConfig> {
    let driver = std::env::var("EVENTSEARCH_TEST_DRIVER").ok()?;
    let dsn = std::env::var("EVENTSEARCH_TEST_DSN").ok()?;
    let mut config = StoreConfig::new(driver, dsn);
    config.custom_tls = std::env::var("EVENTSEARCH_TEST_CUSTOM_TLS").unwrap_or_default();
    config.pool_size = 2;
    Some(config)
}

/// Fixture rows: timestamps 100, 101, 101, 101, 102
fn fixture(run: &str) -> Vec<LogEvent> {
    [100, 101, 101, 101, 102]
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| LogEvent {
            id: format!("{run}-{i}"),
            timestamp,
            event: 1,
            protocol: "SSH".to_string(),
            username: "user1".to_string(),
            ip: "127.0.0.1".to_string(),
            message: format!("message {i}"),
            instance_id: run.to_string(),
            ..Default::default()
        })
        .collect()
}

/// Create the log table and insert rows through a driver-specific statement
macro_rules! seed {
    ($pool:expr, $insert:expr, $rows:expr) => {{
        sqlx::query(CREATE_LOG_TABLE).execute($pool).await.unwrap();
        for row in $rows {
            sqlx::query($insert)
                .bind(&row.id)
                .bind(row.timestamp)
                .bind(row.event)
                .bind(&row.protocol)
                .bind(nullable(&row.username))
                .bind(nullable(&row.ip))
                .bind(nullable(&row.message))
                .bind(nullable(&row.role))
                .bind(nullable(&row.instance_id))
                .execute($pool)
                .await
                .unwrap();
        }
    }};
}

/// A row with only the required columns, at a timestamp no other run uses
fn bare_row(run: &str, timestamp: i64) -> LogEvent {
    LogEvent {
        id: format!("{run}-orphan"),
        timestamp,
        event: 2,
        protocol: "FTP".to_string(),
        ..Default::default()
    }
}

/// Rows holding NULL in every optional column decode with empty fields
async fn check_null_columns(store: Arc<dyn EventStore>, expected: &LogEvent) {
    let searcher = Searcher::new(store);
    let page = searcher
        .search_log_events(&LogEventSearch {
            common: CommonSearchParams {
                limit: 10,
                order: 1,
                start_timestamp: expected.timestamp,
                end_timestamp: expected.timestamp,
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.events::<LogEvent>().unwrap(), vec![expected.clone()]);
}

async fn check_pagination(store: Arc<dyn EventStore>, run: &str, expected: &[String]) {
    store.ping().await.unwrap();
    let searcher = Searcher::new(store);

    let filters = |limit, order| LogEventSearch {
        common: CommonSearchParams {
            limit,
            order,
            instance_ids: vec![run.to_string()],
            ..Default::default()
        },
        ..Default::default()
    };

    let page = searcher.search_log_events(&filters(10, 1)).await.unwrap();
    let ids: Vec<String> = page
        .events::<LogEvent>()
        .unwrap()
        .iter()
        .map(|e| e.id().to_string())
        .collect();
    assert_eq!(ids, expected);
    assert_eq!(page.same_ts_at_start, vec![expected[0].clone()]);

    // Forward walk by cursor id
    let mut request = filters(2, 1);
    let mut visited = Vec::new();
    loop {
        let page = searcher.search_log_events(&request).await.unwrap();
        let rows = page.events::<LogEvent>().unwrap();
        let Some(last) = rows.last() else { break };
        visited.extend(rows.iter().map(|e| e.id.clone()));
        request.common.start_timestamp = last.timestamp;
        request.common.from_id = last.id.clone();
        assert!(visited.len() <= expected.len());
    }
    assert_eq!(visited, expected);

    // Backward walk by exclusion
    let mut request = filters(2, 0);
    let mut visited = Vec::new();
    loop {
        let page = searcher.search_log_events(&request).await.unwrap();
        let rows = page.events::<LogEvent>().unwrap();
        let Some(last) = rows.last() else { break };
        visited.extend(rows.iter().map(|e| e.id.clone()));
        request.common.end_timestamp = last.timestamp;
        request.common.exclude_ids = page.same_ts_at_end.clone();
        assert!(visited.len() <= expected.len());
    }
    let mut reversed = expected.to_vec();
    reversed.reverse();
    assert_eq!(visited, reversed);
}

#[tokio::test]
async fn test_live_log_event_pagination() {
    let Some(config) = live_config() else {
        eprintln!("EVENTSEARCH_TEST_DRIVER/EVENTSEARCH_TEST_DSN not set, skipping");
        return;
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let run = format!("t{}", nanos % 1_000_000_000_000);
    let rows = fixture(&run);
    let expected: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let orphan = bare_row(&run, i64::try_from(nanos).unwrap());

    match config.driver.parse::<Driver>().unwrap() {
        Driver::Postgres => {
            let store = PgStore::connect(&config).await.unwrap();
            let pool = store.pool().clone();
            seed!(
                &pool,
                "INSERT INTO eventstore_log_events \
                 (id, timestamp, event, protocol, username, ip, message, role, instance_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                rows.iter().chain([&orphan])
            );
            assert!(store.pool_health().is_some());
            let store: Arc<dyn EventStore> = Arc::new(store);
            check_null_columns(store.clone(), &orphan).await;
            check_pagination(store, &run, &expected).await;
            sqlx::query("DELETE FROM eventstore_log_events WHERE instance_id = $1 OR id = $2")
                .bind(&run)
                .bind(&orphan.id)
                .execute(&pool)
                .await
                .unwrap();
        }
        Driver::MySql => {
            let store = MySqlStore::connect(&config).await.unwrap();
            let pool = store.pool().clone();
            seed!(
                &pool,
                "INSERT INTO eventstore_log_events \
                 (id, timestamp, event, protocol, username, ip, message, role, instance_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rows.iter().chain([&orphan])
            );
            let store: Arc<dyn EventStore> = Arc::new(store);
            check_null_columns(store.clone(), &orphan).await;
            check_pagination(store, &run, &expected).await;
            sqlx::query("DELETE FROM eventstore_log_events WHERE instance_id = ? OR id = ?")
                .bind(&run)
                .bind(&orphan.id)
                .execute(&pool)
                .await
                .unwrap();
        }
    }
}
