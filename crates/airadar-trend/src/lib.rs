//! Trend detection engine for airadar.
//!
//! Loads recently collected items, optionally narrows and relabels them with a
//! single batched LLM call, groups near-duplicate titles into topic clusters
//! with a union-find over Jaccard token similarity, and scores each cluster
//! from cross-source spread, score velocity and absolute popularity. The
//! scored clusters are persisted as the new trend set.

pub mod alerts;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod llm;
pub mod scorer;
pub mod store;
pub mod tokenize;
pub mod types;
pub mod velocity;

pub use alerts::{alert_candidates, dispatch_alerts, LogNotifier, Notification, Notifier};
pub use cluster::{cluster_items, DisjointSet, SIMILARITY_THRESHOLD};
pub use engine::{apply_llm_results, Engine};
pub use error::TrendError;
pub use llm::{
    AnthropicEvaluator, BatchEvaluator, LlmConfig, LlmEvaluator, LlmProvider, LlmResult,
    OpenAiEvaluator,
};
pub use scorer::{composite_score, normalize_source_score};
pub use store::TrendStore;
pub use tokenize::{jaccard_similarity, significant_tokens};
pub use types::{ScoringWeights, TopicCluster, TrendConfig};
pub use velocity::velocity;
