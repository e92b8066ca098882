//! Serialized access to the trend engine.
//!
//! Each detection cycle clears and rewrites the trend table, so the HTTP
//! trigger and the scheduled job share one lock and never overlap.

use std::sync::Arc;

use airadar_core::Trend;
use airadar_trend::{dispatch_alerts, Engine, LogNotifier, TrendError, TrendStore};
use sqlx::PgPool;
use tokio::sync::Mutex;

pub struct DetectionRunner<S = PgPool> {
    engine: Arc<Engine<S>>,
    lock: Arc<Mutex<()>>,
    notifier: LogNotifier,
    alert_min_score: f64,
}

impl<S> Clone for DetectionRunner<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            lock: Arc::clone(&self.lock),
            notifier: self.notifier,
            alert_min_score: self.alert_min_score,
        }
    }
}

impl<S: TrendStore> DetectionRunner<S> {
    #[must_use]
    pub fn new(engine: Engine<S>, alert_min_score: f64) -> Self {
        Self {
            engine: Arc::new(engine),
            lock: Arc::new(Mutex::new(())),
            notifier: LogNotifier,
            alert_min_score,
        }
    }

    /// Run one cycle, waiting for any cycle already in flight to finish.
    pub async fn detect(&self) -> Result<Vec<Trend>, TrendError> {
        let _guard = self.lock.lock().await;
        self.engine.detect().await
    }

    /// Run one cycle and alert on qualifying trends, unless a cycle is
    /// already running. Returns the number of trends alerted, or `None`
    /// when the run was skipped or failed.
    pub async fn detect_and_alert(&self) -> Option<usize> {
        let Ok(_guard) = self.lock.try_lock() else {
            tracing::info!("scheduler: detection already in progress; skipping run");
            return None;
        };

        let trends = match self.engine.detect().await {
            Ok(trends) => trends,
            Err(e) => {
                tracing::error!(error = %e, "scheduler: trend detection failed");
                return None;
            }
        };

        let alerted = dispatch_alerts(
            self.engine.store(),
            &self.notifier,
            &trends,
            self.alert_min_score,
        )
        .await;
        tracing::info!(
            trends = trends.len(),
            alerted,
            "scheduler: detection run complete"
        );
        Some(alerted)
    }
}
