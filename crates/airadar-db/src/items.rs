//! Database operations for the `items` table.

use std::collections::BTreeMap;

use airadar_core::{Item, SourceType};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use crate::DbError;

const DEFAULT_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: String,
    pub source: String,
    pub external_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub author: String,
    pub score: i64,
    pub comments: i64,
    pub tags: Json<Vec<String>>,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
    pub extra: Json<Value>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let source = row
            .source
            .parse::<SourceType>()
            .map_err(|e| DbError::InvalidValue {
                column: "items.source",
                reason: e.to_string(),
            })?;

        let extra = match row.extra.0 {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };

        Ok(Item {
            id: row.id,
            source,
            external_id: row.external_id,
            title: row.title,
            url: row.url,
            description: row.description,
            author: row.author,
            score: row.score,
            comments: row.comments,
            tags: row.tags.0,
            published_at: row.published_at,
            collected_at: row.collected_at,
            extra,
        })
    }
}

/// Filters for [`list_items`]. `None` fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct ListItemsFilter {
    pub source: Option<SourceType>,
    pub since: Option<DateTime<Utc>>,
    /// Defaults to 100 when `None` or non-positive.
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const ITEM_COLUMNS: &str = "id, source, external_id, title, url, description, author, \
                            score, comments, tags, published_at, collected_at, extra";

fn upsert_query(item: &Item) -> Query<'static, Postgres, PgArguments> {
    let extra: serde_json::Map<String, Value> = item
        .extra
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    // Identity columns (source, external_id, title, url, published_at) are
    // written once; re-collection only refreshes the mutable columns.
    sqlx::query(
        "INSERT INTO items \
             (id, source, external_id, title, url, description, author, \
              score, comments, tags, published_at, collected_at, extra) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (id) DO UPDATE SET \
             score = EXCLUDED.score, \
             comments = EXCLUDED.comments, \
             collected_at = EXCLUDED.collected_at, \
             tags = EXCLUDED.tags, \
             extra = EXCLUDED.extra",
    )
    .bind(item.id.clone())
    .bind(item.source.as_str())
    .bind(item.external_id.clone())
    .bind(item.title.clone())
    .bind(item.url.clone())
    .bind(item.description.clone())
    .bind(item.author.clone())
    .bind(item.score)
    .bind(item.comments)
    .bind(Json(item.tags.clone()))
    .bind(item.published_at)
    .bind(item.collected_at)
    .bind(Json(Value::Object(extra)))
}

/// Insert an item, or refresh its mutable fields if it already exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_item(pool: &PgPool, item: &Item) -> Result<(), DbError> {
    upsert_query(item).execute(pool).await?;
    Ok(())
}

/// Upsert a batch of items in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any upsert fails; the whole batch is rolled back.
pub async fn upsert_items(pool: &PgPool, items: &[Item]) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for item in items {
        upsert_query(item).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Fetch a single item by ID.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, [`DbError::InvalidValue`]
/// if the stored source is unknown, or [`DbError::Sqlx`] if the query fails.
pub async fn get_item(pool: &PgPool, id: &str) -> Result<Item, DbError> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Item::try_from(row)
}

/// List items, newest `collected_at` first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidValue`]
/// if a stored row cannot be converted.
pub async fn list_items(pool: &PgPool, filter: &ListItemsFilter) -> Result<Vec<Item>, DbError> {
    let limit = filter
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT);

    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE ($1::text IS NULL OR source = $1) \
           AND ($2::timestamptz IS NULL OR collected_at >= $2) \
         ORDER BY collected_at DESC, id \
         LIMIT $3"
    ))
    .bind(filter.source.map(SourceType::as_str))
    .bind(filter.since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Item::try_from).collect()
}

/// Count stored items per source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidValue`]
/// if a stored source is unknown.
pub async fn count_items_by_source(pool: &PgPool) -> Result<BTreeMap<SourceType, i64>, DbError> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT source, COUNT(*) FROM items GROUP BY source")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(source, count)| {
            let source = source
                .parse::<SourceType>()
                .map_err(|e| DbError::InvalidValue {
                    column: "items.source",
                    reason: e.to_string(),
                })?;
            Ok((source, count))
        })
        .collect()
}
