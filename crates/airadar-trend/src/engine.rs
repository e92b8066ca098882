//! The detection cycle.

use std::collections::HashMap;

use airadar_core::{AppConfig, Item, Trend};
use chrono::{DateTime, Utc};

use crate::cluster::cluster_items;
use crate::error::TrendError;
use crate::llm::{BatchEvaluator, LlmConfig, LlmEvaluator, LlmResult};
use crate::scorer::composite_score;
use crate::store::TrendStore;
use crate::types::{TopicCluster, TrendConfig};
use crate::velocity::velocity;

/// Runs detection cycles against one store.
///
/// Holds only immutable settings and an optional evaluator, so one instance
/// can serve every cycle. Cycles against the same store must not overlap:
/// each one wipes and rewrites the trend set.
#[derive(Debug)]
pub struct Engine<S, E = LlmEvaluator> {
    store: S,
    config: TrendConfig,
    evaluator: Option<E>,
}

impl<S: TrendStore> Engine<S> {
    /// An engine without the LLM pre-filter.
    #[must_use]
    pub fn new(store: S, config: TrendConfig) -> Self {
        Self {
            store,
            config,
            evaluator: None,
        }
    }

    /// Build an engine from application config, enabling the LLM pre-filter
    /// when a provider key is present.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError::Llm`] for an unknown provider name, or
    /// [`TrendError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(store: S, app: &AppConfig) -> Result<Self, TrendError> {
        let evaluator = LlmConfig::from_app_config(app)?
            .map(|llm| LlmEvaluator::from_config(&llm))
            .transpose()?;
        if let Some(evaluator) = &evaluator {
            tracing::info!(provider = %evaluator.provider(), "LLM pre-filter enabled");
        }
        Ok(Self {
            store,
            config: TrendConfig::from_app_config(app),
            evaluator,
        })
    }
}

impl<S: TrendStore, E: BatchEvaluator> Engine<S, E> {
    #[must_use]
    pub fn with_evaluator(store: S, config: TrendConfig, evaluator: E) -> Self {
        Self {
            store,
            config,
            evaluator: Some(evaluator),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Run one detection cycle and return the new trends, highest score first.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError::Store`] when any read or write against the store
    /// fails: loading items, clearing old trends, reading snapshots or saving
    /// a trend. LLM failures are logged and do not fail the cycle.
    pub async fn detect(&self) -> Result<Vec<Trend>, TrendError> {
        self.detect_at(Utc::now()).await
    }

    /// [`Engine::detect`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::detect`].
    pub async fn detect_at(&self, now: DateTime<Utc>) -> Result<Vec<Trend>, TrendError> {
        let items = self
            .store
            .list_recent_items(now - self.config.lookback, self.config.max_items)
            .await?;
        if items.is_empty() {
            tracing::info!("no recent items; skipping trend detection");
            return Ok(Vec::new());
        }
        let loaded = items.len();

        self.store.clear_trends().await?;

        let items = match &self.evaluator {
            Some(evaluator) => self.prefilter(evaluator, items).await,
            None => items,
        };

        let clusters = cluster_items(&items);
        let velocity_since = now - self.config.velocity_window;

        let mut trends = Vec::with_capacity(clusters.len());
        for cluster in &clusters {
            let max_velocity = self.max_velocity(cluster, velocity_since).await?;
            let mut trend = Trend {
                id: 0,
                topic: cluster.topic.clone(),
                score: composite_score(cluster, max_velocity, &self.config.weights),
                source_count: i32::try_from(cluster.source_count()).unwrap_or(i32::MAX),
                item_ids: cluster.item_ids(),
                first_seen: now,
                last_updated: now,
                alerted: false,
            };
            self.store.upsert_trend(&mut trend).await?;
            trends.push(trend);
        }

        trends.sort_by(|a, b| b.score.total_cmp(&a.score));
        tracing::info!(
            items = loaded,
            filtered = items.len(),
            clusters = clusters.len(),
            trends = trends.len(),
            "trend detection complete"
        );
        Ok(trends)
    }

    /// Narrow and relabel `items` with the evaluator, or hand them back
    /// unchanged if the evaluation fails or comes back empty.
    async fn prefilter(&self, evaluator: &E, items: Vec<Item>) -> Vec<Item> {
        match evaluator.evaluate(&items).await {
            Ok(results) if results.is_empty() => {
                tracing::warn!("LLM pre-filter returned no results; using unfiltered items");
                items
            }
            Ok(results) => {
                let before = items.len();
                let kept = apply_llm_results(items, &results, self.config.llm_min_score);
                tracing::info!(before, after = kept.len(), "LLM pre-filter applied");
                kept
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM pre-filter failed; using unfiltered items");
                items
            }
        }
    }

    /// Highest item velocity in the cluster. Items without enough snapshot
    /// history count as zero.
    async fn max_velocity(
        &self,
        cluster: &TopicCluster,
        since: DateTime<Utc>,
    ) -> Result<f64, TrendError> {
        let mut max: Option<f64> = None;
        for item in &cluster.items {
            let snapshots = self.store.list_snapshots(&item.id, since).await?;
            let v = velocity(&snapshots);
            max = Some(max.map_or(v, |m| m.max(v)));
        }
        Ok(max.unwrap_or(0.0))
    }
}

/// Keep items whose LLM score reaches `min_score`, retitled with the LLM topic
/// when one was given.
///
/// Items the LLM did not mention are dropped. Results naming unknown IDs are
/// ignored; if an ID appears twice the first verdict wins.
#[must_use]
pub fn apply_llm_results(items: Vec<Item>, results: &[LlmResult], min_score: f64) -> Vec<Item> {
    let mut by_id: HashMap<&str, &LlmResult> = HashMap::with_capacity(results.len());
    for result in results {
        by_id.entry(result.id.as_str()).or_insert(result);
    }

    items
        .into_iter()
        .filter_map(|mut item| {
            let result = by_id.get(item.id.as_str())?;
            #[allow(clippy::cast_precision_loss)]
            let score = result.score as f64;
            if score < min_score {
                return None;
            }
            if !result.topic.is_empty() {
                item.title.clone_from(&result.topic);
            }
            Some(item)
        })
        .collect()
}
