use thiserror::Error;

/// Errors surfaced by the trend engine.
///
/// Only [`TrendError::Store`] aborts a detection cycle. The LLM variants are
/// returned by the pre-filter and logged by the engine, which then carries on
/// with the unfiltered items.
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("store error: {0}")]
    Store(#[from] airadar_db::DbError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    LlmStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("LLM provider error: {0}")]
    Llm(String),

    #[error("JSON parse error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("notifier error: {0}")]
    Notify(String),
}
