use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::errors::ProviderError;
use crate::config::ModelEntry;

pub const OPENROUTER_DEFAULT_HOST: &str = "https://openrouter.ai";

/// Attribution headers, used by OpenRouter for app rankings.
const OPENROUTER_REFERER: &str = "https://github.com/claude-mcp/ai-assistant";
const OPENROUTER_TITLE: &str = "AI Assistant MCP Server";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the OpenRouter chat-completions endpoint. One HTTPS request
/// per call, no retries; the generated text comes back verbatim.
pub struct OpenRouterProvider {
    client: Client,
    host: String,
    api_key: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_host(OPENROUTER_DEFAULT_HOST.to_string(), api_key)
    }

    /// The host is injectable so tests can point the provider at a local
    /// stub server.
    pub fn with_host(host: String, api_key: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            host,
            api_key,
        })
    }

    /// Sends one chat-completion request and returns the generated text
    /// exactly as received, with no trimming or reformatting.
    pub async fn generate(
        &self,
        prompt: &str,
        model: &ModelEntry,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        let payload = json!({
            "model": model.model_id,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
            "max_tokens": model.max_tokens,
        });

        tracing::debug!(
            "OpenRouter request: model={} temperature={} max_tokens={}",
            model.model_id,
            temperature,
            model.max_tokens
        );

        let response = self.post(&payload).await?;
        let content = extract_content(&response)?;

        tracing::debug!("OpenRouter response received: length={}", content.len());

        Ok(content)
    }

    async fn post(&self, payload: &Value) -> Result<Value, ProviderError> {
        let base_url = Url::parse(&self.host)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid base URL: {}", e)))?;
        let url = base_url.join("api/v1/chat/completions").map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to construct endpoint URL: {}", e))
        })?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", OPENROUTER_REFERER)
            .header("X-Title", OPENROUTER_TITLE)
            .json(payload)
            .send()
            .await?;

        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let body = response.text().await?;

    match status {
        StatusCode::OK => serde_json::from_str(&body).map_err(|e| {
            ProviderError::MalformedResponse(format!("Could not parse response body: {}", e))
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ProviderError::Authentication(format!(
                "Authentication failed. Please ensure your API key is valid. Status: {}. Response: {}",
                status, body
            )))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimitExceeded(format!(
            "Status: {}. Response: {}",
            status, body
        ))),
        s if s.is_server_error() => Err(ProviderError::ServerError(format!(
            "Status: {}. Response: {}",
            status, body
        ))),
        _ => Err(ProviderError::RequestFailed(format!(
            "Request failed with status: {}. Response: {}",
            status, body
        ))),
    }
}

fn extract_content(response: &Value) -> Result<String, ProviderError> {
    response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::MalformedResponse(format!(
                "Response missing choices[0].message.content: {}",
                response
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_from_chat_completion() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "hello  "}}]
        });
        assert_eq!(extract_content(&response).unwrap(), "hello  ");
    }

    #[test]
    fn test_extract_content_missing_choices() {
        let response = json!({"error": "overloaded"});
        let err = extract_content(&response).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        assert!(err.to_string().contains("choices[0].message.content"));
    }

    #[test]
    fn test_extract_content_non_string_content() {
        let response = json!({"choices": [{"message": {"content": 42}}]});
        assert!(matches!(
            extract_content(&response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
