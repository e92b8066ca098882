//! Optional batched LLM relevance pre-filter.
//!
//! One request per detection cycle carries the whole item batch. Both
//! providers decode to the same [`LlmResult`] list.

mod anthropic;
mod openai;
pub(crate) mod prompt;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use airadar_core::{AppConfig, Item};
use serde::{Deserialize, Serialize};

use crate::error::TrendError;

pub use anthropic::AnthropicEvaluator;
pub use openai::OpenAiEvaluator;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest slice of an error body kept in [`TrendError::LlmStatus`].
const ERROR_BODY_MAX_CHARS: usize = 500;

/// Per-item verdict from one batch evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResult {
    pub id: String,
    /// Relevance on a 0-10 scale.
    pub score: i64,
    #[serde(default)]
    pub reason: String,
    /// Normalized topic label; replaces the item title when non-empty.
    #[serde(default)]
    pub topic: String,
}

/// Something that can judge a batch of items in a single call.
pub trait BatchEvaluator {
    /// Evaluate every item in `items` with one request.
    ///
    /// Implementations do not retry; a failure is reported once and the caller
    /// decides how to degrade.
    fn evaluate(
        &self,
        items: &[Item],
    ) -> impl Future<Output = Result<Vec<LlmResult>, TrendError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(TrendError::Llm(format!("unknown LLM provider: {other}"))),
        }
    }
}

/// Connection settings for one provider.
#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    /// Falls back to [`LlmProvider::default_model`].
    pub model: Option<String>,
    /// Falls back to [`LlmProvider::default_base_url`]. Tests point this at a mock server.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    #[must_use]
    pub fn new(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Extract LLM settings from the application config.
    ///
    /// Returns `Ok(None)` when no provider key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError::Llm`] if the configured provider name is unknown.
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, TrendError> {
        let (Some(provider), Some(api_key)) = (&config.llm_provider, &config.llm_api_key) else {
            return Ok(None);
        };
        let timeout_secs = if config.llm_timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            config.llm_timeout_secs
        };
        Ok(Some(Self {
            provider: provider.parse()?,
            api_key: api_key.clone(),
            model: config.llm_model.clone().filter(|m| !m.is_empty()),
            base_url: config.llm_base_url.clone().filter(|u| !u.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
        }))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// `path` joined onto the configured or default base URL.
    fn endpoint(&self, path: &str) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url());
        format!("{}{path}", base.trim_end_matches('/'))
    }

    fn http_client(&self) -> Result<reqwest::Client, TrendError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

/// Runtime-selected provider.
#[derive(Debug, Clone)]
pub enum LlmEvaluator {
    OpenAi(OpenAiEvaluator),
    Anthropic(AnthropicEvaluator),
}

impl LlmEvaluator {
    /// Build the evaluator matching `config.provider`.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self, TrendError> {
        Ok(match config.provider {
            LlmProvider::OpenAi => LlmEvaluator::OpenAi(OpenAiEvaluator::new(config)?),
            LlmProvider::Anthropic => LlmEvaluator::Anthropic(AnthropicEvaluator::new(config)?),
        })
    }

    #[must_use]
    pub fn provider(&self) -> LlmProvider {
        match self {
            LlmEvaluator::OpenAi(_) => LlmProvider::OpenAi,
            LlmEvaluator::Anthropic(_) => LlmProvider::Anthropic,
        }
    }
}

impl BatchEvaluator for LlmEvaluator {
    async fn evaluate(&self, items: &[Item]) -> Result<Vec<LlmResult>, TrendError> {
        match self {
            LlmEvaluator::OpenAi(evaluator) => evaluator.evaluate(items).await,
            LlmEvaluator::Anthropic(evaluator) => evaluator.evaluate(items).await,
        }
    }
}

/// Send `request` and turn a non-2xx status into [`TrendError::LlmStatus`].
async fn send_checked(
    provider: LlmProvider,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, TrendError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TrendError::LlmStatus {
        provider: provider.as_str(),
        status: status.as_u16(),
        body: prompt::truncate_chars(&body, ERROR_BODY_MAX_CHARS),
    })
}

/// Decode the model's text answer into results.
///
/// A surrounding markdown code fence (with or without a language tag) is
/// stripped before parsing.
pub(crate) fn parse_results(
    provider: LlmProvider,
    raw: &str,
) -> Result<Vec<LlmResult>, TrendError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|source| TrendError::Parse {
        context: format!(
            "{provider} response: {}",
            prompt::truncate_chars(body, ERROR_BODY_MAX_CHARS)
        ),
        source,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_ticks) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = after_ticks
        .split_once('\n')
        .map_or(after_ticks, |(_, rest)| rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json_array() {
        let results = parse_results(
            LlmProvider::OpenAi,
            r#"[{"id":"hackernews:1","score":8,"reason":"big","topic":"GPT-5 Release"}]"#,
        )
        .expect("parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "hackernews:1");
        assert_eq!(results[0].score, 8);
        assert_eq!(results[0].topic, "GPT-5 Release");
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let raw = "```json\n[{\"id\":\"a\",\"score\":3}]\n```";
        let results = parse_results(LlmProvider::Anthropic, raw).expect("parse");
        assert_eq!(results[0].id, "a");
        assert!(results[0].reason.is_empty());
        assert!(results[0].topic.is_empty());
    }

    #[test]
    fn strips_fence_without_language_tag() {
        assert_eq!(strip_code_fence("  ```\n[]\n```  "), "[]");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("\n  [1]  \n"), "[1]");
    }

    #[test]
    fn prose_is_a_parse_error() {
        let err = parse_results(LlmProvider::OpenAi, "Sure! Here are the results.")
            .expect_err("should fail");
        assert!(matches!(err, TrendError::Parse { .. }));
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("OpenAI".parse::<LlmProvider>().ok(), Some(LlmProvider::OpenAi));
        assert_eq!(
            " anthropic ".parse::<LlmProvider>().ok(),
            Some(LlmProvider::Anthropic)
        );
        assert!("cohere".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn endpoint_uses_default_base_and_trims_trailing_slash() {
        let mut config = LlmConfig::new(LlmProvider::OpenAi, "sk");
        assert_eq!(
            config.endpoint("/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        config.base_url = Some("http://localhost:9999/".to_string());
        assert_eq!(
            config.endpoint("/v1/chat/completions"),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn model_falls_back_to_provider_default() {
        let mut config = LlmConfig::new(LlmProvider::Anthropic, "sk");
        assert_eq!(config.model(), "claude-sonnet-4-20250514");
        config.model = Some("claude-haiku".to_string());
        assert_eq!(config.model(), "claude-haiku");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = LlmConfig::new(LlmProvider::OpenAi, "sk-very-secret");
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
