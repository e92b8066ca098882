//! Database operations for the `trends` table.
//!
//! Trends are regenerated wholesale every detection cycle: callers clear the
//! table with [`clear_trends`] and insert the new set with [`upsert_trend`].

use airadar_core::Trend;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

const DEFAULT_LIST_LIMIT: i64 = 50;

/// A row from the `trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub topic: String,
    pub score: f64,
    pub source_count: i32,
    pub item_ids: Json<Vec<String>>,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub alerted: bool,
}

impl From<TrendRow> for Trend {
    fn from(row: TrendRow) -> Self {
        Self {
            id: row.id,
            topic: row.topic,
            score: row.score,
            source_count: row.source_count,
            item_ids: row.item_ids.0,
            first_seen: row.first_seen,
            last_updated: row.last_updated,
            alerted: row.alerted,
        }
    }
}

/// Filters for [`list_trends`].
#[derive(Debug, Clone, Default)]
pub struct TrendFilter {
    /// Only trends scoring at least this much; ignored when `None`.
    pub min_score: Option<f64>,
    /// Defaults to 50 when `None` or non-positive.
    pub limit: Option<i64>,
    /// Only trends that have not been alerted yet.
    pub unalerted: bool,
}

/// Delete every trend row.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_trends(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM trends").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Insert a new trend, or update an existing one when `trend.id` is set.
///
/// On insert the generated id is written back into `trend.id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when updating an id that does not exist, or
/// [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_trend(pool: &PgPool, trend: &mut Trend) -> Result<(), DbError> {
    if trend.is_persisted() {
        let result = sqlx::query(
            "UPDATE trends \
             SET topic = $1, score = $2, source_count = $3, item_ids = $4, \
                 last_updated = $5, alerted = $6 \
             WHERE id = $7",
        )
        .bind(&trend.topic)
        .bind(trend.score)
        .bind(trend.source_count)
        .bind(Json(&trend.item_ids))
        .bind(trend.last_updated)
        .bind(trend.alerted)
        .bind(trend.id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        return Ok(());
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO trends \
             (topic, score, source_count, item_ids, first_seen, last_updated, alerted) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&trend.topic)
    .bind(trend.score)
    .bind(trend.source_count)
    .bind(Json(&trend.item_ids))
    .bind(trend.first_seen)
    .bind(trend.last_updated)
    .bind(trend.alerted)
    .fetch_one(pool)
    .await?;

    trend.id = id;
    Ok(())
}

/// List trends, highest score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends(pool: &PgPool, filter: &TrendFilter) -> Result<Vec<Trend>, DbError> {
    let limit = filter
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT);

    let rows = sqlx::query_as::<_, TrendRow>(
        "SELECT id, topic, score, source_count, item_ids, first_seen, last_updated, alerted \
         FROM trends \
         WHERE ($1::float8 IS NULL OR score >= $1) \
           AND (NOT $2 OR alerted = FALSE) \
         ORDER BY score DESC, id \
         LIMIT $3",
    )
    .bind(filter.min_score)
    .bind(filter.unalerted)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Trend::from).collect())
}

/// Set the one-shot `alerted` flag on a trend.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no trend has that id, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn mark_trend_alerted(pool: &PgPool, trend_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE trends SET alerted = TRUE WHERE id = $1")
        .bind(trend_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
