//! Picking trends worth announcing and handing them to a notifier.

use std::future::Future;

use airadar_core::Trend;

use crate::error::TrendError;
use crate::store::TrendStore;

/// One outgoing alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub score: f64,
    pub item_ids: Vec<String>,
}

impl Notification {
    #[must_use]
    pub fn for_trend(trend: &Trend) -> Self {
        Self {
            title: trend.topic.clone(),
            body: format!(
                "Trending across {} sources with score {:.1}",
                trend.source_count, trend.score
            ),
            score: trend.score,
            item_ids: trend.item_ids.clone(),
        }
    }
}

/// A delivery channel for alerts.
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), TrendError>> + Send;
}

/// Writes each alert to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), TrendError> {
        tracing::info!(
            title = %notification.title,
            score = notification.score,
            items = notification.item_ids.len(),
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Trends scoring at least `min_score` that have not been alerted, in input order.
#[must_use]
pub fn alert_candidates(trends: &[Trend], min_score: f64) -> Vec<&Trend> {
    trends
        .iter()
        .filter(|trend| trend.score >= min_score && !trend.alerted)
        .collect()
}

/// Send every candidate through `notifier` and flag it as alerted.
///
/// A trend is only flagged after a successful send. Send and flag failures
/// are logged and the remaining candidates are still processed. Returns the
/// number of trends flagged.
pub async fn dispatch_alerts<S, N>(
    store: &S,
    notifier: &N,
    trends: &[Trend],
    min_score: f64,
) -> usize
where
    S: TrendStore,
    N: Notifier,
{
    let mut alerted = 0;
    for trend in alert_candidates(trends, min_score) {
        let notification = Notification::for_trend(trend);
        if let Err(e) = notifier.send(&notification).await {
            tracing::error!(trend_id = trend.id, topic = %trend.topic, error = %e, "alert delivery failed");
            continue;
        }
        match store.mark_alerted(trend.id).await {
            Ok(()) => alerted += 1,
            Err(e) => {
                tracing::warn!(trend_id = trend.id, error = %e, "failed to mark trend alerted");
            }
        }
    }
    alerted
}
