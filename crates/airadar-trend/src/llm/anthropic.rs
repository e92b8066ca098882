use airadar_core::Item;
use serde::{Deserialize, Serialize};

use super::{parse_results, prompt, send_checked, BatchEvaluator, LlmConfig, LlmProvider, LlmResult};
use crate::error::TrendError;

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Client for the Anthropic messages endpoint.
#[derive(Debug, Clone)]
pub struct AnthropicEvaluator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicEvaluator {
    /// # Errors
    ///
    /// Returns [`TrendError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, TrendError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.endpoint("/v1/messages"),
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
        })
    }
}

impl BatchEvaluator for AnthropicEvaluator {
    async fn evaluate(&self, items: &[Item]) -> Result<Vec<LlmResult>, TrendError> {
        let prompt = prompt::build_prompt(items);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: &prompt,
            }],
        };

        tracing::debug!(model = %self.model, items = items.len(), "requesting anthropic batch evaluation");
        let response = send_checked(
            LlmProvider::Anthropic,
            self.client
                .post(&self.url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&request),
        )
        .await?;

        let body: MessagesResponse = response.json().await?;
        let text = body
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| TrendError::Llm("anthropic returned no content".to_string()))?;

        parse_results(LlmProvider::Anthropic, &text)
    }
}
