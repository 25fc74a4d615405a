/// AI client — the single point of entry for all inference calls.
///
/// ARCHITECTURAL RULE: no other module may call the Ollama API directly.
/// All model interactions MUST go through this module.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const AVAILABILITY_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty response")]
    EmptyResponse,

    #[error("Inference service unavailable after {retries} retries")]
    Unavailable { retries: u32 },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for a local Ollama instance. Wraps `/api/generate` with retry
/// logic and exposes the liveness probes the health routes use.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl AiClient {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates a completion for `prompt`. Retries connection errors,
    /// 429s and 5xx responses with exponential backoff.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: 2000,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let mut last_error: Option<AiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI API returned {}: {}", status, body);
                last_error = Some(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let generated: GenerateResponse = response.json().await?;

            if generated.response.trim().is_empty() {
                return Err(AiError::EmptyResponse);
            }

            debug!(
                "AI call succeeded: {} chars generated",
                generated.response.len()
            );
            return Ok(generated.response);
        }

        Err(last_error.unwrap_or(AiError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }

    /// Quick liveness check against the model-listing endpoint. Used to pick
    /// the fallback path before committing to a full generation call.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        matches!(
            self.client
                .get(&url)
                .timeout(AVAILABILITY_PROBE_TIMEOUT)
                .send()
                .await,
            Ok(r) if r.status().is_success()
        )
    }

    /// Lists the models the inference service has pulled.
    pub async fn list_models(&self) -> Result<Vec<String>, AiError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(AVAILABILITY_PROBE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AiClient::new(
            "http://localhost:11434/".to_string(),
            "mistral".to_string(),
            Duration::from_secs(60),
        );
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "mistral");
    }

    #[test]
    fn test_generate_request_serializes_ollama_shape() {
        let body = GenerateRequest {
            model: "mistral",
            prompt: "hello",
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: 2000,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "mistral");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);
    }

    #[test]
    fn test_tags_response_tolerates_missing_models() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"mistral:latest"}]}"#).unwrap();
        assert_eq!(tags.models[0].name, "mistral:latest");
    }
}
