//! Model client — the single point of entry for all text-generation calls.
//!
//! No other module may call Bedrock directly; everything goes through the
//! [`TextModel`] trait so tests can substitute a scripted model.
//!
//! Model: amazon.titan-tg1-lite (hardcoded — do not make configurable to
//! prevent drift). The raw completion is returned verbatim, prose and code
//! fences included; content recovery is the extractor's job.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// The model used for all generation calls.
pub const MODEL_ID: &str = "amazon.titan-tg1-lite";
const MAX_OUTPUT_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.0;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model invocation failed: {0}")]
    Unavailable(String),

    #[error("model response envelope was not valid JSON: {0}")]
    MalformedEnvelope(String),
}

/// Generation parameters for one invocation.
/// Temperature is pinned to 0.0 for reproducible extraction.
#[derive(Debug, Clone)]
pub struct InvokeConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
struct TitanRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct TitanResponse {
    completion: String,
}

/// A text-generation service invoked once per pipeline run.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Sends one prompt and returns the raw completion text verbatim.
    async fn invoke(&self, prompt: &str, config: &InvokeConfig) -> Result<String, ModelError>;
}

/// Bedrock-backed implementation of [`TextModel`].
pub struct TitanModel {
    client: aws_sdk_bedrockruntime::Client,
}

impl TitanModel {
    pub fn new(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextModel for TitanModel {
    /// Retries throttling and transport failures with exponential backoff.
    /// Any other failure, including a malformed response envelope, is
    /// surfaced immediately — never silently replaced with empty output.
    async fn invoke(&self, prompt: &str, config: &InvokeConfig) -> Result<String, ModelError> {
        let request = TitanRequest {
            prompt,
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| ModelError::Unavailable(format!("failed to encode request envelope: {e}")))?;

        let mut last_error: Option<ModelError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "model call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .invoke_model()
                .model_id(MODEL_ID)
                .content_type("application/json")
                .accept("application/json")
                .body(Blob::new(body.clone()))
                .send()
                .await;

            match response {
                Ok(output) => {
                    let envelope: TitanResponse = serde_json::from_slice(output.body().as_ref())
                        .map_err(|e| ModelError::MalformedEnvelope(e.to_string()))?;
                    debug!(
                        "model call succeeded ({} chars of completion)",
                        envelope.completion.len()
                    );
                    return Ok(envelope.completion);
                }
                Err(e) if is_retryable(&e) => {
                    warn!("model API returned a retryable error: {e}");
                    last_error = Some(ModelError::Unavailable(e.to_string()));
                }
                Err(e) => return Err(ModelError::Unavailable(e.to_string())),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ModelError::Unavailable("retries exhausted".to_string())))
    }
}

fn is_retryable(err: &SdkError<InvokeModelError>) -> bool {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => true,
        SdkError::ServiceError(ctx) => {
            let e = ctx.err();
            e.is_throttling_exception()
                || e.is_internal_server_exception()
                || e.is_model_timeout_exception()
                || e.is_model_not_ready_exception()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope_shape() {
        let request = TitanRequest {
            prompt: "parse this",
            max_tokens: 500,
            temperature: 0.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompt"], "parse this");
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["temperature"], 0.0);
    }

    #[test]
    fn test_response_envelope_parses_completion() {
        let body = r#"{"completion": "{\"name\": \"John\"}"}"#;
        let envelope: TitanResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.completion, r#"{"name": "John"}"#);
    }

    #[test]
    fn test_response_envelope_missing_completion_is_rejected() {
        let body = r#"{"outputs": []}"#;
        assert!(serde_json::from_str::<TitanResponse>(body).is_err());
    }

    #[test]
    fn test_default_config_is_deterministic() {
        let config = InvokeConfig::default();
        assert_eq!(config.max_output_tokens, 500);
        assert_eq!(config.temperature, 0.0);
    }
}
