//! Database operations for the append-only `score_snapshots` table.

use airadar_core::ScoreSnapshot;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `score_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub item_id: String,
    pub score: i64,
    pub comments: i64,
    pub checked_at: DateTime<Utc>,
}

impl From<SnapshotRow> for ScoreSnapshot {
    fn from(row: SnapshotRow) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            score: row.score,
            comments: row.comments,
            checked_at: row.checked_at,
        }
    }
}

/// Record a popularity reading for an item, stamped with the current time.
///
/// Returns the generated snapshot id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown `item_id`).
pub async fn add_snapshot(
    pool: &PgPool,
    item_id: &str,
    score: i64,
    comments: i64,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO score_snapshots (item_id, score, comments, checked_at) \
         VALUES ($1, $2, $3, NOW()) \
         RETURNING id",
    )
    .bind(item_id)
    .bind(score)
    .bind(comments)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Snapshots for one item taken at or after `since`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_snapshots(
    pool: &PgPool,
    item_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ScoreSnapshot>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, item_id, score, comments, checked_at \
         FROM score_snapshots \
         WHERE item_id = $1 AND checked_at >= $2 \
         ORDER BY checked_at, id",
    )
    .bind(item_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ScoreSnapshot::from).collect())
}
