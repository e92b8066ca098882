use std::collections::BTreeSet;

use airadar_core::{AppConfig, Item, SourceType};
use chrono::Duration;

/// Items judged to describe the same real-world topic.
///
/// Built by [`crate::cluster_items`], scored once, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCluster {
    /// Title of the highest-scoring member (first one wins on ties).
    pub topic: String,
    /// Members in input order.
    pub items: Vec<Item>,
    pub sources: BTreeSet<SourceType>,
    /// Sum of the members' raw scores.
    pub total_score: i64,
}

impl TopicCluster {
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Mean raw score across members; `0.0` for an empty cluster.
    #[must_use]
    pub fn mean_score(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.total_score as f64 / self.items.len() as f64;
        mean
    }

    #[must_use]
    pub fn item_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

/// Weights applied to the three score components.
///
/// No renormalization happens: weights that do not sum to 1 produce composite
/// scores outside `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub cross_source: f64,
    pub velocity: f64,
    pub absolute: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cross_source: 0.5,
            velocity: 0.3,
            absolute: 0.2,
        }
    }
}

impl ScoringWeights {
    /// Build weights, falling back to the defaults when all three are zero.
    #[must_use]
    pub fn new(cross_source: f64, velocity: f64, absolute: f64) -> Self {
        if cross_source + velocity + absolute == 0.0 {
            return Self::default();
        }
        Self {
            cross_source,
            velocity,
            absolute,
        }
    }
}

/// Immutable settings for one [`crate::Engine`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    pub weights: ScoringWeights,
    /// How far back to load collected items.
    pub lookback: Duration,
    /// Cap on items per detection cycle. Clustering is quadratic in this.
    pub max_items: i64,
    /// Snapshot window used for velocity.
    pub velocity_window: Duration,
    /// Minimum 0-10 LLM relevance an item needs to survive the pre-filter.
    pub llm_min_score: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            lookback: Duration::hours(24),
            max_items: 1000,
            velocity_window: Duration::hours(6),
            llm_min_score: 6.0,
        }
    }
}

impl TrendConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let llm_min_score = if config.llm_min_score > 0.0 {
            config.llm_min_score
        } else {
            Self::default().llm_min_score
        };
        Self {
            weights: ScoringWeights::new(
                config.trend_cross_source_weight,
                config.trend_velocity_weight,
                config.trend_absolute_weight,
            ),
            llm_min_score,
            ..Self::default()
        }
    }
}
