//! HTTP client for the Gemini `generateContent` endpoint.

use allyflow_ai::{GenerationError, TextGenerator};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GenerationConfig;

/// Longest response body kept in a transport error.
const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// [`TextGenerator`] backed by the Gemini REST API. The key travels as the
/// `key` query parameter.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: std::time::Duration,
}

impl GeminiClient {
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| GenerationError::Transport {
                status: None,
                body: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key().map(str::to_string),
            timeout: config.timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        debug!(endpoint = %self.endpoint, "calling text generation service");
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        decode_response(status, &body).inspect_err(|e| {
            warn!(status, error = %e, "text generation response rejected");
        })
    }
}

impl GeminiClient {
    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport {
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            }
        }
    }
}

/// Map a raw HTTP status and body onto the generated text or a failure kind.
pub fn decode_response(status: u16, body: &str) -> Result<String, GenerationError> {
    if !(200..300).contains(&status) {
        return Err(GenerationError::Transport {
            status: Some(status),
            body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
        });
    }

    let root: Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("body is not JSON: {e}")))?;

    if let Some(reason) = root
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
    {
        return Err(GenerationError::ContentBlocked {
            reason: reason.to_string(),
        });
    }

    let candidate = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or_else(|| GenerationError::MalformedResponse("missing candidates".to_string()))?;

    let part = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .ok_or_else(|| GenerationError::MalformedResponse("missing content parts".to_string()))?;

    let text = part.get("text").and_then(Value::as_str).unwrap_or_default().trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyOutput);
    }
    Ok(text.to_string())
}
