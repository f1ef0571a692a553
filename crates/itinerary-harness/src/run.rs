use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::content::RunOutput;
use crate::errors::{FailureKind, HarnessError, RunFailure};
use crate::harness::HarnessInner;
use crate::model::{GenerationParams, ModelRef, ProviderId, RunOptions};
use crate::provider::{ProviderAdapter, ProviderEvent, ProviderRequest};
use crate::stream::StreamEvent;

/// Builder for configuring and starting a single generation.
///
/// Set the prompt and sampling parameters, then either stream events with
/// `start_stream` or wait for the whole text with `collect_text`.
pub struct GenerateBuilder {
    harness: Arc<HarnessInner>,
    model: ModelRef,
    prompt: Option<String>,
    params: GenerationParams,
    options: RunOptions,
}

impl GenerateBuilder {
    pub(crate) fn new(harness: Arc<HarnessInner>, model: ModelRef) -> Self {
        Self {
            harness,
            model,
            prompt: None,
            params: GenerationParams::default(),
            options: RunOptions::default(),
        }
    }

    /// Sets the prompt text.
    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    /// Replaces all sampling parameters at once.
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the generated-token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }

    /// Sets the nucleus-sampling cutoff.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.params.top_p = top_p;
        self
    }

    /// Requests a streamed (`true`) or single-shot (`false`) backend reply.
    ///
    /// The run is surfaced as a stream either way; a single-shot reply arrives
    /// as one fragment.
    pub fn stream(mut self, stream: bool) -> Self {
        self.params.stream = stream;
        self
    }

    /// Sets the bounded stream buffer size used between the runtime task and
    /// the consumer.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.options.stream_buffer_capacity = capacity;
        self
    }

    /// Validates the builder state and starts a streaming run.
    ///
    /// The returned `RunStream` yields `Started`, the text `Fragment`s, and
    /// a terminal `Finished` or `Failed` event.
    pub async fn start_stream(self) -> Result<RunStream, HarnessError> {
        let harness = self.harness.clone();
        let request = self.validate_and_build_request()?;
        let provider = harness
            .provider(&request.model.provider)
            .ok_or_else(|| HarnessError::ProviderNotFound {
                provider: request.model.provider.clone(),
            })?;

        let (tx, rx) = mpsc::channel(request.options.stream_buffer_capacity);
        let (final_tx, final_rx) = oneshot::channel();

        let run_id = request.run_id;
        let model = request.model.clone();
        tokio::spawn(run_task(provider, request, tx, final_tx));

        Ok(RunStream {
            run_id,
            provider: model.provider,
            model: model.model,
            rx,
            final_rx,
            saw_terminal: false,
        })
    }

    /// Runs to completion and returns the final aggregated output.
    pub async fn collect_output(self) -> Result<RunOutput, HarnessError> {
        let stream = self.start_stream().await?;
        stream.finish().await
    }

    /// Runs to completion and returns the concatenated text.
    pub async fn collect_text(self) -> Result<String, HarnessError> {
        Ok(self.collect_output().await?.text())
    }

    fn validate_and_build_request(self) -> Result<ProviderRequest, HarnessError> {
        if self.model.provider.as_str().trim().is_empty() {
            return Err(HarnessError::Validation(
                "model provider must not be empty".into(),
            ));
        }
        if self.options.stream_buffer_capacity == 0 {
            return Err(HarnessError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }
        let Some(prompt) = self.prompt.filter(|p| !p.trim().is_empty()) else {
            return Err(HarnessError::Validation("prompt must not be empty".into()));
        };
        if self.params.max_tokens == 0 {
            return Err(HarnessError::Validation(
                "max_tokens must be greater than 0".into(),
            ));
        }
        if !self.params.temperature.is_finite() || self.params.temperature < 0.0 {
            return Err(HarnessError::Validation(
                "temperature must be a non-negative number".into(),
            ));
        }
        if !(self.params.top_p > 0.0 && self.params.top_p <= 1.0) {
            return Err(HarnessError::Validation(
                "top_p must be in (0, 1]".into(),
            ));
        }

        Ok(ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: self.model,
            prompt,
            params: self.params,
            options: self.options,
        })
    }
}

/// Streaming handle returned by `GenerateBuilder::start_stream`.
///
/// Use `next_event()` to pull events as they arrive and `finish()` to obtain
/// the final result after the terminal event. The stream is finite and cannot
/// be restarted.
pub struct RunStream {
    run_id: uuid::Uuid,
    provider: ProviderId,
    model: String,
    rx: mpsc::Receiver<StreamEvent>,
    final_rx: oneshot::Receiver<Result<RunOutput, HarnessError>>,
    saw_terminal: bool,
}

impl RunStream {
    /// Returns the run id for this stream.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Waits for and returns the next normalized stream event.
    ///
    /// Returns `None` after the stream channel is closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = self.rx.recv().await;
        if event.as_ref().is_some_and(StreamEvent::is_terminal) {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains the stream (if needed) and returns the terminal run result.
    ///
    /// This is safe to call after consuming events manually with `next_event()`.
    pub async fn finish(mut self) -> Result<RunOutput, HarnessError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(event) if event.is_terminal() => self.saw_terminal = true,
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(HarnessError::Protocol(format!(
                "run task ended without final result (provider={}, model={})",
                self.provider, self.model
            ))),
        }
    }
}

async fn run_task(
    provider: Arc<dyn ProviderAdapter>,
    request: ProviderRequest,
    tx: mpsc::Sender<StreamEvent>,
    final_tx: oneshot::Sender<Result<RunOutput, HarnessError>>,
) {
    let run_id = request.run_id;
    let provider_id = request.model.provider.clone();
    let model_name = request.model.model.clone();

    if !send_event(
        &tx,
        StreamEvent::Started {
            run_id,
            provider: provider_id.clone(),
            model: model_name.clone(),
        },
    )
    .await
    {
        let _ = final_tx.send(Err(receiver_gone("before the run started")));
        return;
    }

    let mut handle = match provider.start_stream(request).await {
        Ok(handle) => handle,
        Err(err) => {
            fail(&tx, final_tx, run_id, RunFailure::from(&err)).await;
            return;
        }
    };

    let mut seq = 0_u64;
    let mut fragments: Vec<String> = Vec::new();
    while let Some(next) = handle.stream.next().await {
        match next {
            Ok(ProviderEvent::TextDelta { text }) => {
                if text.is_empty() {
                    continue;
                }
                debug!(run_id = %run_id, provider = %provider_id, model = %model_name, seq, "provider text delta");
                fragments.push(text.clone());
                let sent = send_event(&tx, StreamEvent::Fragment { run_id, seq, text }).await;
                seq = seq.saturating_add(1);
                if !sent {
                    let _ = final_tx.send(Err(receiver_gone("during output")));
                    return;
                }
            }
            Ok(ProviderEvent::Completed { finish_reason }) => {
                debug!(run_id = %run_id, provider = %provider_id, fragments = fragments.len(), finish_reason = ?finish_reason, "provider stream completed");
                let output = RunOutput {
                    fragments,
                    finish_reason,
                };
                let sent = send_event(
                    &tx,
                    StreamEvent::Finished {
                        run_id,
                        output: output.clone(),
                    },
                )
                .await;
                let _ = final_tx.send(if sent {
                    Ok(output)
                } else {
                    Err(receiver_gone("before completion"))
                });
                return;
            }
            Err(err) => {
                fail(&tx, final_tx, run_id, RunFailure::from(&err)).await;
                return;
            }
        }
    }

    let failure = RunFailure::new(
        FailureKind::Protocol,
        provider_id,
        "provider stream ended without completion",
    );
    fail(&tx, final_tx, run_id, failure).await;
}

async fn fail(
    tx: &mpsc::Sender<StreamEvent>,
    final_tx: oneshot::Sender<Result<RunOutput, HarnessError>>,
    run_id: uuid::Uuid,
    failure: RunFailure,
) {
    let _ = send_event(
        tx,
        StreamEvent::Failed {
            run_id,
            error: failure.clone(),
        },
    )
    .await;
    let _ = final_tx.send(Err(HarnessError::RunFailed(failure)));
}

fn receiver_gone(stage: &str) -> HarnessError {
    HarnessError::Protocol(format!("run stream receiver dropped {stage}"))
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
