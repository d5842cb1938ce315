use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionParams {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM not configured or disabled")]
    NotConfigured,
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM response parse error: {0}")]
    ParseError(String),
    #[error("LLM request timed out")]
    Timeout,
    #[error("LLM server unreachable: {0}")]
    Unreachable(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Provider-agnostic LLM interface. Works with any OpenAI-compatible API.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    async fn complete(
        &self,
        messages: &[ChatTurn],
        params: &CompletionParams,
    ) -> Result<String, LlmError>;

    /// Provider name for logging/diagnostics.
    fn name(&self) -> &str;

    /// Default model identifier, recorded on assistant messages.
    fn model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// OpenAI-Compatible Provider
// ---------------------------------------------------------------------------

/// Works with any OpenAI-compatible chat completions API:
/// OpenAI, Ollama, vLLM, LMStudio, Together, Groq, etc.
pub struct OpenAiCompatibleLlm {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompatibleLlm {
    pub fn from_config(config: &LlmConfig, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatibleLlm {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        params: &CompletionParams,
    ) -> Result<String, LlmError> {
        let model = params.model.clone().unwrap_or_else(|| self.model.clone());
        let max_tokens = params.max_tokens.unwrap_or(self.max_tokens);
        let temperature = params.temperature.unwrap_or(self.temperature);

        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model,
            messages: messages.to_vec(),
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        };

        let mut req_builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            req_builder = req_builder.bearer_auth(key);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else if e.is_connect() {
                LlmError::Unreachable(e.to_string())
            } else {
                LlmError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {body}")));
        }

        let chat_resp: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| LlmError::ParseError("no content in response".to_string()))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Provider initialization
// ---------------------------------------------------------------------------

/// Initialize the LLM provider from config. Returns None when neither the
/// config enables a provider nor an API key is present — every chat branch
/// then serves its canned fallback reply.
pub fn init_llm_provider(config: &LlmConfig) -> Option<Arc<dyn LlmProvider>> {
    let api_key = config.api_key.clone();

    if config.enabled {
        let provider = OpenAiCompatibleLlm::from_config(config, api_key);
        info!(
            provider = "openai-compatible",
            base_url = %config.base_url,
            model = %config.model,
            "LLM provider initialized (explicit)"
        );
        return Some(Arc::new(provider));
    }

    if let Some(key) = api_key {
        let openai_config = LlmConfig {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            ..config.clone()
        };
        let provider = OpenAiCompatibleLlm::from_config(&openai_config, Some(key));
        info!(model = %config.model, "LLM provider initialized from API key");
        return Some(Arc::new(provider));
    }

    info!("LLM provider disabled — chat branches use canned fallbacks");
    None
}

/// Strip a markdown code fence from a model reply, if present. Models
/// frequently wrap JSON answers in ```json ... ``` despite instructions.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        let raw = "```json\n{\"type\": \"task_management\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"type\": \"task_management\"}");
    }

    #[test]
    fn leaves_bare_json_alone() {
        let raw = "{\"type\": \"search_query\"}";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn no_provider_without_key_or_enable() {
        let config = LlmConfig::default();
        assert!(init_llm_provider(&config).is_none());
    }

    #[test]
    fn provider_from_api_key() {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let provider = init_llm_provider(&config).expect("provider");
        assert_eq!(provider.name(), "openai-compatible");
        assert_eq!(provider.model(), "gpt-4");
    }
}
