//! Loading the generation backend once per process.
use std::sync::Arc;

use itinerary_harness::vendors::llama_cpp::{LlamaCppConfig, LlamaCppProvider};
use itinerary_harness::vendors::ollama::{OllamaConfig, OllamaProvider};
use itinerary_harness::{Harness, HarnessError, ModelRef, ProviderAdapter};
use tracing::{info, warn};

use crate::config::{Backend, PlannerConfig};
use crate::ui::FormUi;

/// A reachable backend plus the model to request from it.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct LoadedModel {
    pub harness: Harness,
    pub model: ModelRef,
}

impl LoadedModel {
    /// Wraps an already-built harness without contacting the backend.
    pub fn new(harness: Harness, model: ModelRef) -> Self {
        Self { harness, model }
    }
}

/// Registers the configured backend without contacting it.
pub fn build_model(config: &PlannerConfig) -> Result<LoadedModel, HarnessError> {
    let provider: Arc<dyn ProviderAdapter> = match config.backend {
        Backend::LlamaCpp => Arc::new(LlamaCppProvider::new(
            LlamaCppConfig::default()
                .base_url(config.base_url())
                .timeout(config.http_timeout),
        )?),
        Backend::Ollama => Arc::new(OllamaProvider::new(
            OllamaConfig::default()
                .base_url(config.base_url())
                .timeout(config.http_timeout),
        )?),
    };
    let model = ModelRef::new(provider.id(), config.model());
    let harness = Harness::builder().register_provider(provider).build()?;
    Ok(LoadedModel::new(harness, model))
}

/// Builds the configured backend and runs its health check.
///
/// Failure is reported on the form and yields `None`; generation then stays
/// disabled for the session.
pub async fn load_model<U: FormUi + ?Sized>(
    config: &PlannerConfig,
    ui: &mut U,
) -> Option<LoadedModel> {
    let loaded = match build_model(config) {
        Ok(loaded) => loaded,
        Err(err) => {
            warn!(error = %err, "failed to configure model backend");
            ui.show_error(&format!("Model backend misconfigured: {err}"));
            return None;
        }
    };
    match loaded.harness.health_check(&loaded.model).await {
        Ok(()) => {
            info!(model = %loaded.model, base_url = config.base_url(), "model backend ready");
            Some(loaded)
        }
        Err(err) => {
            warn!(model = %loaded.model, error = %err, base_url = config.base_url(), "model backend unavailable");
            ui.show_error(&format!(
                "Model not found at {}! Please check the backend. ({err})",
                config.base_url()
            ));
            None
        }
    }
}
