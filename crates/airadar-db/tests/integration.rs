//! Offline unit tests for airadar-db pool configuration and row conversions.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use airadar_core::{AppConfig, Environment, Item, ScoreSnapshot, SourceType, Trend};
use airadar_db::{DbError, ItemRow, PoolConfig, SnapshotRow, TrendRow};
use chrono::Utc;
use sqlx::types::Json;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        trend_cron: "0 */30 * * * *".to_string(),
        trend_velocity_weight: 0.3,
        trend_cross_source_weight: 0.5,
        trend_absolute_weight: 0.2,
        trend_min_score: 30.0,
        llm_provider: None,
        llm_api_key: None,
        llm_model: None,
        llm_base_url: None,
        llm_min_score: 6.0,
        llm_timeout_secs: 60,
        api_keys: vec!["test-key".to_string()],
    }
}

fn item_row(source: &str) -> ItemRow {
    ItemRow {
        id: format!("{source}:1"),
        source: source.to_string(),
        external_id: "1".to_string(),
        title: "Llama 4 released".to_string(),
        url: "https://example.com/llama".to_string(),
        description: String::new(),
        author: "meta".to_string(),
        score: 321,
        comments: 12,
        tags: Json(vec!["llm".to_string()]),
        published_at: Utc::now(),
        collected_at: Utc::now(),
        extra: Json(serde_json::json!({ "lang": "en" })),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn item_row_converts_to_item() {
    let item = Item::try_from(item_row("hackernews")).expect("valid row");
    assert_eq!(item.id, "hackernews:1");
    assert_eq!(item.source, SourceType::HackerNews);
    assert_eq!(item.score, 321);
    assert_eq!(item.tags, vec!["llm".to_string()]);
    assert_eq!(item.extra.get("lang"), Some(&serde_json::json!("en")));
}

#[test]
fn item_row_with_unknown_source_is_rejected() {
    let err = Item::try_from(item_row("myspace")).unwrap_err();
    assert!(
        matches!(err, DbError::InvalidValue { column, .. } if column == "items.source"),
        "expected InvalidValue, got {err:?}"
    );
}

#[test]
fn non_object_extra_becomes_empty_map() {
    let mut row = item_row("rss");
    row.extra = Json(serde_json::json!(null));
    let item = Item::try_from(row).expect("valid row");
    assert!(item.extra.is_empty());
}

#[test]
fn snapshot_row_converts_to_snapshot() {
    let checked_at = Utc::now();
    let snapshot = ScoreSnapshot::from(SnapshotRow {
        id: 3,
        item_id: "github:a/b".to_string(),
        score: 50,
        comments: 4,
        checked_at,
    });
    assert_eq!(snapshot.id, 3);
    assert_eq!(snapshot.item_id, "github:a/b");
    assert_eq!(snapshot.score, 50);
    assert_eq!(snapshot.checked_at, checked_at);
}

#[test]
fn trend_row_converts_to_trend() {
    let now = Utc::now();
    let trend = Trend::from(TrendRow {
        id: 9,
        topic: "GPT-5 launch".to_string(),
        score: 71.5,
        source_count: 3,
        item_ids: Json(vec!["hackernews:1".to_string(), "reddit:2".to_string()]),
        first_seen: now,
        last_updated: now,
        alerted: false,
    });
    assert!(trend.is_persisted());
    assert_eq!(trend.item_ids.len(), 2);
    assert!((trend.score - 71.5).abs() < f64::EPSILON);
}
