use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::HarnessError;
use crate::model::{ModelRef, ProviderId};
use crate::provider::ProviderAdapter;
use crate::run::GenerateBuilder;

pub(crate) struct HarnessInner {
    providers: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl HarnessInner {
    pub(crate) fn provider(&self, id: &ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(id).cloned()
    }
}

/// Entry point for starting generations against registered backends.
///
/// A `Harness` is read-only once built; clone it freely to share one loaded
/// backend between requests.
#[derive(Clone)]
pub struct Harness {
    pub(crate) inner: Arc<HarnessInner>,
}

impl Harness {
    /// Starts a builder for registering providers and creating a `Harness`.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Starts building a generation for the given model.
    pub fn generate(&self, model: ModelRef) -> GenerateBuilder {
        GenerateBuilder::new(self.inner.clone(), model)
    }

    /// Probes the backend serving `model`.
    pub async fn health_check(&self, model: &ModelRef) -> Result<(), HarnessError> {
        let provider =
            self.inner
                .provider(&model.provider)
                .ok_or_else(|| HarnessError::ProviderNotFound {
                    provider: model.provider.clone(),
                })?;
        provider.health_check(model).await.map_err(HarnessError::from)
    }
}

/// Builder used to register provider adapters before creating a `Harness`.
#[derive(Default)]
pub struct HarnessBuilder {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl HarnessBuilder {
    /// Registers a provider adapter.
    ///
    /// Register one adapter per provider id.
    pub fn register_provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Builds the harness and validates provider registration (including duplicates).
    pub fn build(self) -> Result<Harness, HarnessError> {
        let mut map: HashMap<ProviderId, Arc<dyn ProviderAdapter>> = HashMap::new();
        let mut seen: HashSet<ProviderId> = HashSet::new();
        for provider in self.providers {
            let id = provider.id();
            if !seen.insert(id.clone()) {
                return Err(HarnessError::Config(format!(
                    "duplicate provider registration: {id}"
                )));
            }
            map.insert(id, provider);
        }
        Ok(Harness {
            inner: Arc::new(HarnessInner { providers: map }),
        })
    }
}
