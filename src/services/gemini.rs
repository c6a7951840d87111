use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::ai_service::{ProviderError, ProviderErrorKind, TextGenerator};
use crate::config::InsightConfig;
use crate::error::{InsightError, InsightResult};

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Google Generative Language API client
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &InsightConfig) -> InsightResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(InsightError::Configuration(
                "API key is required to initialize the Gemini client".to_string(),
            ));
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        let text: String = response
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
                role: Some("user".to_string()),
            }],
        };

        log::debug!("📤 Gemini request for {} ({} prompt bytes)", model, prompt.len());

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderErrorKind::Other, format!("Failed to send request: {}", e.without_url())))?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(ProviderErrorKind::Other, format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::new(ProviderErrorKind::Other, format!("Failed to parse response: {}", e)))?;

        Self::extract_text(parsed).ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::EmptyResponse,
                format!("Model {} returned no text", model),
            )
            .with_status(status.as_u16())
        })
    }
}

/// Turns a non-2xx Gemini response into a typed provider error.
pub fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| match envelope.error.status {
            Some(code) if !envelope.error.message.contains(&code) => {
                format!("{} ({})", envelope.error.message, code)
            }
            _ => envelope.error.message,
        })
        .unwrap_or_else(|_| body.trim().to_string());

    let message = format!("[{}] {}", status.as_u16(), detail);
    let kind = classify_message(status.as_u16(), &message);
    ProviderError::new(kind, message).with_status(status.as_u16())
}

/// Both "404" and "not found" forms count as a missing model.
pub fn classify_message(status: u16, message: &str) -> ProviderErrorKind {
    let lower = message.to_lowercase();

    if status == 404 || lower.contains("404") || lower.contains("not found") {
        ProviderErrorKind::NotFound
    } else if status == 401
        || lower.contains("api key not valid")
        || lower.contains("api_key_invalid")
        || lower.contains("invalid api key")
    {
        ProviderErrorKind::InvalidCredential
    } else if status == 429 || lower.contains("quota") || lower.contains("resource_exhausted") {
        ProviderErrorKind::RateLimited
    } else {
        ProviderErrorKind::Other
    }
}
