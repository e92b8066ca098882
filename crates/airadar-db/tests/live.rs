//! Live integration tests for airadar-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use airadar_core::{Item, SourceType, Trend};
use airadar_db::{
    add_snapshot, clear_trends, count_items_by_source, get_item, list_items, list_snapshots,
    list_trends, mark_trend_alerted, upsert_item, upsert_items, upsert_trend, DbError,
    ListItemsFilter, TrendFilter,
};
use chrono::{Duration, Utc};

fn make_item(source: SourceType, external_id: &str, title: &str, score: i64) -> Item {
    let mut item = Item::new(source, external_id, title, Utc::now());
    item.score = score;
    item
}

fn make_trend(topic: &str, score: f64) -> Trend {
    let now = Utc::now();
    Trend {
        id: 0,
        topic: topic.to_string(),
        score,
        source_count: 1,
        item_ids: vec!["hackernews:1".to_string()],
        first_seen: now,
        last_updated: now,
        alerted: false,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn upsert_item_refreshes_mutable_fields_only(pool: sqlx::PgPool) {
    let original = make_item(SourceType::HackerNews, "1", "Original title", 10);
    upsert_item(&pool, &original).await.expect("insert");

    let mut recollected = original.clone();
    recollected.title = "Edited title".to_string();
    recollected.score = 99;
    recollected.comments = 7;
    upsert_item(&pool, &recollected).await.expect("update");

    let stored = get_item(&pool, &original.id).await.expect("get");
    assert_eq!(stored.title, "Original title");
    assert_eq!(stored.score, 99);
    assert_eq!(stored.comments, 7);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_items_filters_by_source_and_since(pool: sqlx::PgPool) {
    let items = vec![
        make_item(SourceType::HackerNews, "1", "a", 1),
        make_item(SourceType::GitHub, "2", "b", 2),
        make_item(SourceType::GitHub, "3", "c", 3),
    ];
    upsert_items(&pool, &items).await.expect("batch insert");

    let github = list_items(
        &pool,
        &ListItemsFilter {
            source: Some(SourceType::GitHub),
            since: Some(Utc::now() - Duration::hours(1)),
            limit: None,
        },
    )
    .await
    .expect("list");
    assert_eq!(github.len(), 2);

    let counts = count_items_by_source(&pool).await.expect("counts");
    assert_eq!(counts.get(&SourceType::GitHub), Some(&2));
    assert_eq!(counts.get(&SourceType::HackerNews), Some(&1));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn snapshots_are_returned_oldest_first(pool: sqlx::PgPool) {
    let item = make_item(SourceType::Reddit, "x", "post", 5);
    upsert_item(&pool, &item).await.expect("insert");
    add_snapshot(&pool, &item.id, 5, 0).await.expect("snap 1");
    add_snapshot(&pool, &item.id, 15, 2).await.expect("snap 2");

    let snaps = list_snapshots(&pool, &item.id, Utc::now() - Duration::hours(6))
        .await
        .expect("list");
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].score, 5);
    assert_eq!(snaps[1].score, 15);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn trends_clear_insert_and_alert(pool: sqlx::PgPool) {
    let mut low = make_trend("low", 10.0);
    let mut high = make_trend("high", 80.0);
    upsert_trend(&pool, &mut low).await.expect("insert low");
    upsert_trend(&pool, &mut high).await.expect("insert high");
    assert!(low.id > 0 && high.id > 0);

    mark_trend_alerted(&pool, high.id).await.expect("alert");
    let unalerted = list_trends(
        &pool,
        &TrendFilter {
            unalerted: true,
            ..TrendFilter::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(unalerted.len(), 1);
    assert_eq!(unalerted[0].topic, "low");

    assert_eq!(clear_trends(&pool).await.expect("clear"), 2);
    let err = mark_trend_alerted(&pool, high.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}
