use futures::stream;
use tracing::debug;

use crate::errors::{HarnessError, ProviderError};
use crate::model::{ModelRef, ProviderId};
use crate::provider::{ProviderAdapter, ProviderRequest, ProviderStreamHandle};
use crate::vendors::{ByteStream, decoded_event_stream, error_from_response};

use super::config::OllamaConfig;
use super::transport::{GenerateChunk, NdjsonDecoder, TagsResponse, map_final_generate};

/// Provider id under which the Ollama adapter registers.
pub const OLLAMA_PROVIDER: &str = "ollama";

/// Provider adapter for a local Ollama daemon.
pub struct OllamaProvider {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Creates a provider from explicit client configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, HarnessError> {
        if config.base_url.trim().is_empty() {
            return Err(HarnessError::Config(
                "ollama base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| HarnessError::Config(format!("failed to build ollama client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OllamaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(OLLAMA_PROVIDER)
    }

    async fn health_check(&self, model: &ModelRef) -> Result<(), ProviderError> {
        let provider_id = self.id();
        let response = self
            .client
            .get(self.config.tags_url())
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(
                    provider_id.clone(),
                    format!("ollama unreachable at {}: {e}", self.config.base_url),
                )
            })?;
        if !response.status().is_success() {
            return Err(error_from_response(provider_id, "ollama tags", response).await);
        }
        let tags: TagsResponse = response.json().await.map_err(|e| {
            ProviderError::protocol(provider_id.clone(), format!("invalid tags body: {e}"))
        })?;
        if !tags.contains(&model.model) {
            return Err(ProviderError::provider(
                provider_id,
                format!("model '{}' is not pulled", model.model),
                None,
            ));
        }
        Ok(())
    }

    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError> {
        let provider_id = self.id();
        let body = build_request_body(&req);
        debug!(run_id = %req.run_id, model = %req.model.model, max_tokens = req.params.max_tokens, stream = req.params.stream, "starting ollama generate");

        let response = self
            .client
            .post(self.config.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(provider_id.clone(), format!("ollama request failed: {e}"))
            })?;
        if !response.status().is_success() {
            return Err(error_from_response(provider_id, "ollama generate", response).await);
        }

        if !req.params.stream {
            let chunk: GenerateChunk = response.json().await.map_err(|e| {
                ProviderError::protocol(
                    provider_id.clone(),
                    format!("invalid ollama generate body: {e}"),
                )
            })?;
            let events = map_final_generate(&provider_id, chunk)?;
            return Ok(ProviderStreamHandle {
                stream: Box::pin(stream::iter(events.into_iter().map(Ok))),
            });
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(ProviderStreamHandle {
            stream: decoded_event_stream(provider_id, bytes_stream, NdjsonDecoder::default()),
        })
    }
}

pub(crate) fn build_request_body(req: &ProviderRequest) -> serde_json::Value {
    serde_json::json!({
        "model": req.model.model,
        "prompt": req.prompt,
        "stream": req.params.stream,
        "raw": true,
        "options": {
            "num_predict": req.params.max_tokens,
            "temperature": req.params.temperature,
            "top_p": req.params.top_p,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::model::{GenerationParams, RunOptions};
    use crate::vendors::test_server::serve_once;

    fn harness_at(base_url: String, timeout: Duration) -> crate::Harness {
        let provider =
            OllamaProvider::new(OllamaConfig::default().base_url(base_url).timeout(timeout))
                .expect("provider");
        crate::Harness::builder()
            .register_provider(Arc::new(provider))
            .build()
            .expect("harness")
    }

    #[test]
    fn request_body_nests_sampling_options() {
        let req = ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: ModelRef::new(OLLAMA_PROVIDER, "mistral:7b-instruct"),
            prompt: "Create a 5-day itinerary for Oslo.".into(),
            params: GenerationParams {
                max_tokens: 1500,
                temperature: 0.6,
                top_p: 0.9,
                stream: true,
            },
            options: RunOptions::default(),
        };
        let body = build_request_body(&req);
        assert_eq!(body["model"].as_str(), Some("mistral:7b-instruct"));
        assert_eq!(body["raw"].as_bool(), Some(true));
        assert_eq!(body["options"]["num_predict"].as_u64(), Some(1500));
        assert!((body["options"]["top_p"].as_f64().expect("top_p") - 0.9).abs() < 1e-6);
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = OllamaProvider::new(OllamaConfig::default().base_url(""));
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }

    #[tokio::test]
    async fn steady_stream_may_outlast_the_timeout() {
        let base_url = serve_once(
            "application/x-ndjson",
            vec![
                "{\"response\":\"Day 1. \",\"done\":false}\n",
                "{\"response\":\"Day 2. \",\"done\":false}\n",
                "{\"response\":\"Day 3.\",\"done\":false}\n",
                "{\"response\":\"\",\"done\":true,\"done_reason\":\"stop\"}\n",
            ],
            Duration::from_millis(300),
        )
        .await;
        let harness = harness_at(base_url, Duration::from_secs(1));

        let text = harness
            .generate(ModelRef::new(OLLAMA_PROVIDER, "mistral:7b-instruct"))
            .prompt("Create a 3-day itinerary for Oslo.")
            .collect_text()
            .await
            .expect("stream completes");

        assert_eq!(text, "Day 1. Day 2. Day 3.");
    }

    #[tokio::test]
    async fn single_shot_body_ends_the_run() {
        let base_url = serve_once(
            "application/json",
            vec!["{\"response\":\"Day 1: Vigeland Park\",\"done\":true,\"done_reason\":\"stop\"}"],
            Duration::ZERO,
        )
        .await;
        let harness = harness_at(base_url, Duration::from_secs(5));

        let output = harness
            .generate(ModelRef::new(OLLAMA_PROVIDER, "mistral:7b-instruct"))
            .prompt("Create a 1-day itinerary for Oslo.")
            .stream(false)
            .collect_output()
            .await
            .expect("completes");

        assert_eq!(output.text(), "Day 1: Vigeland Park");
        assert_eq!(output.finish_reason.as_deref(), Some("stop"));
    }
}
