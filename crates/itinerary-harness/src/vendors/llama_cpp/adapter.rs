use futures::stream;
use tracing::debug;

use crate::errors::{HarnessError, ProviderError};
use crate::model::{ModelRef, ProviderId};
use crate::provider::{ProviderAdapter, ProviderRequest, ProviderStreamHandle};
use crate::vendors::{ByteStream, decoded_event_stream, error_from_response};

use super::config::LlamaCppConfig;
use super::transport::{CompletionChunk, CompletionStreamDecoder, map_final_completion};

/// Provider id under which the llama.cpp adapter registers.
pub const LLAMA_CPP_PROVIDER: &str = "llama-cpp";

/// Provider adapter for a local llama.cpp `server`.
///
/// The server owns the loaded model; the `model` half of a `ModelRef` is only
/// used for logging.
pub struct LlamaCppProvider {
    client: reqwest::Client,
    config: LlamaCppConfig,
}

impl LlamaCppProvider {
    /// Creates a provider from explicit client configuration.
    pub fn new(config: LlamaCppConfig) -> Result<Self, HarnessError> {
        if config.base_url.trim().is_empty() {
            return Err(HarnessError::Config(
                "llama.cpp base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| HarnessError::Config(format!("failed to build llama.cpp client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for LlamaCppProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(LLAMA_CPP_PROVIDER)
    }

    async fn health_check(&self, _model: &ModelRef) -> Result<(), ProviderError> {
        let provider_id = self.id();
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(
                    provider_id.clone(),
                    format!("llama.cpp server unreachable at {}: {e}", self.config.base_url),
                )
            })?;
        if !response.status().is_success() {
            return Err(error_from_response(provider_id, "llama.cpp health", response).await);
        }
        Ok(())
    }

    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError> {
        let provider_id = self.id();
        let body = build_request_body(&req);
        debug!(run_id = %req.run_id, model = %req.model.model, max_tokens = req.params.max_tokens, stream = req.params.stream, "starting llama.cpp completion");

        let response = self
            .client
            .post(self.config.completion_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(
                    provider_id.clone(),
                    format!("llama.cpp request failed: {e}"),
                )
            })?;
        if !response.status().is_success() {
            return Err(error_from_response(provider_id, "llama.cpp completion", response).await);
        }

        if !req.params.stream {
            let chunk: CompletionChunk = response.json().await.map_err(|e| {
                ProviderError::protocol(
                    provider_id.clone(),
                    format!("invalid llama.cpp completion body: {e}"),
                )
            })?;
            let events = map_final_completion(&provider_id, chunk)?;
            return Ok(ProviderStreamHandle {
                stream: Box::pin(stream::iter(events.into_iter().map(Ok))),
            });
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(ProviderStreamHandle {
            stream: decoded_event_stream(
                provider_id,
                bytes_stream,
                CompletionStreamDecoder::default(),
            ),
        })
    }
}

pub(crate) fn build_request_body(req: &ProviderRequest) -> serde_json::Value {
    serde_json::json!({
        "prompt": req.prompt,
        "n_predict": req.params.max_tokens,
        "temperature": req.params.temperature,
        "top_p": req.params.top_p,
        "stream": req.params.stream,
        "cache_prompt": false,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::errors::{FailureKind, RunFailure};
    use crate::model::{GenerationParams, RunOptions};
    use crate::vendors::test_server::serve_once;

    fn harness_at(base_url: String, timeout: Duration) -> crate::Harness {
        let provider = LlamaCppProvider::new(
            LlamaCppConfig::default().base_url(base_url).timeout(timeout),
        )
        .expect("provider");
        crate::Harness::builder()
            .register_provider(Arc::new(provider))
            .build()
            .expect("harness")
    }

    fn request(params: GenerationParams) -> ProviderRequest {
        ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: ModelRef::new(LLAMA_CPP_PROVIDER, "mistral-7b-instruct"),
            prompt: "Create a 1-day itinerary for Kyoto.".into(),
            params,
            options: RunOptions::default(),
        }
    }

    #[test]
    fn request_body_carries_sampling_parameters() {
        let body = build_request_body(&request(GenerationParams {
            max_tokens: 300,
            temperature: 0.6,
            top_p: 0.9,
            stream: true,
        }));
        assert_eq!(body["n_predict"].as_u64(), Some(300));
        assert_eq!(body["stream"].as_bool(), Some(true));
        assert!((body["temperature"].as_f64().expect("temperature") - 0.6).abs() < 1e-6);
        assert!((body["top_p"].as_f64().expect("top_p") - 0.9).abs() < 1e-6);
        assert_eq!(
            body["prompt"].as_str(),
            Some("Create a 1-day itinerary for Kyoto.")
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = LlamaCppProvider::new(LlamaCppConfig::default().base_url("  "));
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }

    #[tokio::test]
    async fn steady_stream_may_outlast_the_timeout() {
        let base_url = serve_once(
            "text/event-stream",
            vec![
                "data: {\"content\":\"Day 1. \"}\n\n",
                "data: {\"content\":\"Day 2. \"}\n\n",
                "data: {\"content\":\"Day 3.\"}\n\n",
                "data: {\"content\":\"\",\"stop\":true,\"stopped_eos\":true}\n\n",
            ],
            Duration::from_millis(300),
        )
        .await;
        let harness = harness_at(base_url, Duration::from_secs(1));

        let output = harness
            .generate(ModelRef::new(LLAMA_CPP_PROVIDER, "local"))
            .prompt("Create a 3-day itinerary for Kyoto.")
            .collect_output()
            .await
            .expect("stream completes");

        assert_eq!(output.text(), "Day 1. Day 2. Day 3.");
        assert_eq!(output.finish_reason.as_deref(), Some("eos"));
    }

    #[tokio::test]
    async fn stalled_stream_fails_as_transport() {
        let base_url = serve_once(
            "text/event-stream",
            vec!["data: {\"content\":\"Day 1\"}\n\n"],
            Duration::from_millis(1500),
        )
        .await;
        let harness = harness_at(base_url, Duration::from_millis(200));

        let err = harness
            .generate(ModelRef::new(LLAMA_CPP_PROVIDER, "local"))
            .prompt("Create a 1-day itinerary for Kyoto.")
            .collect_text()
            .await
            .expect_err("stalled");

        assert!(matches!(
            err,
            HarnessError::RunFailed(RunFailure {
                kind: FailureKind::Transport,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn single_shot_body_ends_the_run() {
        let base_url = serve_once(
            "application/json",
            vec!["{\"content\":\"Day 1: Gion\",\"stop\":true,\"stopped_limit\":true}"],
            Duration::ZERO,
        )
        .await;
        let harness = harness_at(base_url, Duration::from_secs(5));

        let output = harness
            .generate(ModelRef::new(LLAMA_CPP_PROVIDER, "local"))
            .prompt("Create a 1-day itinerary for Kyoto.")
            .stream(false)
            .collect_output()
            .await
            .expect("completes");

        assert_eq!(output.text(), "Day 1: Gion");
        assert_eq!(output.finish_reason.as_deref(), Some("limit"));
    }

    #[tokio::test]
    async fn env_gated_smoke_stream_if_server_configured() {
        let Ok(base_url) = std::env::var("LLAMA_CPP_SMOKE_URL") else {
            eprintln!("skipping llama.cpp smoke test (LLAMA_CPP_SMOKE_URL missing)");
            return;
        };
        let provider = std::sync::Arc::new(
            LlamaCppProvider::new(LlamaCppConfig::default().base_url(base_url)).expect("provider"),
        );
        let harness = crate::Harness::builder()
            .register_provider(provider)
            .build()
            .expect("harness");
        let text = harness
            .generate(ModelRef::new(LLAMA_CPP_PROVIDER, "local"))
            .prompt("Say hello.")
            .max_tokens(16)
            .collect_text()
            .await;
        assert!(text.is_ok(), "llama.cpp smoke failed: {text:?}");
    }
}
