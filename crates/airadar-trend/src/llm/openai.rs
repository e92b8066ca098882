use airadar_core::Item;
use serde::{Deserialize, Serialize};

use super::{parse_results, prompt, send_checked, BatchEvaluator, LlmConfig, LlmProvider, LlmResult};
use crate::error::TrendError;

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiEvaluator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiEvaluator {
    /// # Errors
    ///
    /// Returns [`TrendError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, TrendError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.endpoint("/v1/chat/completions"),
            api_key: config.api_key.clone(),
            model: config.model().to_string(),
        })
    }
}

impl BatchEvaluator for OpenAiEvaluator {
    async fn evaluate(&self, items: &[Item]) -> Result<Vec<LlmResult>, TrendError> {
        let prompt = prompt::build_prompt(items);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.1,
        };

        tracing::debug!(model = %self.model, items = items.len(), "requesting openai batch evaluation");
        let response = send_checked(
            LlmProvider::OpenAi,
            self.client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TrendError::Llm("openai returned no choices".to_string()))?;

        parse_results(LlmProvider::OpenAi, &content)
    }
}
