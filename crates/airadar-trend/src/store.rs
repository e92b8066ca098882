use std::future::Future;

use airadar_core::{Item, ScoreSnapshot, Trend};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::TrendError;

/// Persistence the engine reads items from and writes trends to.
///
/// Implemented for [`PgPool`]; tests substitute an in-memory store.
pub trait TrendStore: Send + Sync {
    /// Items collected at or after `since`, at most `limit` of them.
    fn list_recent_items(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Item>, TrendError>> + Send;

    /// Snapshots for one item taken at or after `since`, oldest first.
    fn list_snapshots(
        &self,
        item_id: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<ScoreSnapshot>, TrendError>> + Send;

    /// Remove every stored trend.
    fn clear_trends(&self) -> impl Future<Output = Result<(), TrendError>> + Send;

    /// Insert or update `trend`, assigning `trend.id` on insert.
    fn upsert_trend(&self, trend: &mut Trend)
        -> impl Future<Output = Result<(), TrendError>> + Send;

    fn mark_alerted(&self, trend_id: i64) -> impl Future<Output = Result<(), TrendError>> + Send;
}

impl TrendStore for PgPool {
    async fn list_recent_items(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Item>, TrendError> {
        let filter = airadar_db::ListItemsFilter {
            source: None,
            since: Some(since),
            limit: Some(limit),
        };
        Ok(airadar_db::list_items(self, &filter).await?)
    }

    async fn list_snapshots(
        &self,
        item_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ScoreSnapshot>, TrendError> {
        Ok(airadar_db::list_snapshots(self, item_id, since).await?)
    }

    async fn clear_trends(&self) -> Result<(), TrendError> {
        let removed = airadar_db::clear_trends(self).await?;
        tracing::debug!(removed, "cleared previous trends");
        Ok(())
    }

    async fn upsert_trend(&self, trend: &mut Trend) -> Result<(), TrendError> {
        Ok(airadar_db::upsert_trend(self, trend).await?)
    }

    async fn mark_alerted(&self, trend_id: i64) -> Result<(), TrendError> {
        Ok(airadar_db::mark_trend_alerted(self, trend_id).await?)
    }
}
