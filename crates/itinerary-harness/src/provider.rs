use std::pin::Pin;

use crate::errors::ProviderError;
use crate::model::{GenerationParams, ModelRef, ProviderId, RunOptions};

/// Boxed stream of provider events for one run.
pub type ProviderEventStream =
    Pin<Box<dyn futures::Stream<Item = Result<ProviderEvent, ProviderError>> + Send + 'static>>;

/// Events produced by a provider adapter, before run bookkeeping is added.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderEvent {
    /// Incremental text produced by the model.
    TextDelta { text: String },
    /// The backend finished generating.
    Completed { finish_reason: Option<String> },
}

/// Fully validated request handed to a provider adapter.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    pub run_id: uuid::Uuid,
    pub model: ModelRef,
    pub prompt: String,
    pub params: GenerationParams,
    pub options: RunOptions,
}

/// Live stream returned by `ProviderAdapter::start_stream`.
pub struct ProviderStreamHandle {
    pub stream: ProviderEventStream,
}

/// Contract implemented by every backend integration.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Identifier used to route `ModelRef`s to this adapter.
    fn id(&self) -> ProviderId;

    /// Probes the backend (and, where the backend can tell, the model) before
    /// any run is attempted.
    async fn health_check(&self, _model: &ModelRef) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Sends the request and returns the backend's event stream.
    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError>;
}
