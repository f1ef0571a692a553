//! Streaming text-generation harness for locally hosted language models.
//!
//! Backend-specific adapters live under `vendors::*`; the root API only knows
//! about prompts, sampling parameters, and a pull-based stream of text
//! fragments.
//!
//! # Streaming usage (llama.cpp server)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use itinerary_harness::prelude::*;
//! use itinerary_harness::vendors::llama_cpp::{LlamaCppConfig, LlamaCppProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), HarnessError> {
//! let harness = Harness::builder()
//!     .register_provider(Arc::new(LlamaCppProvider::new(LlamaCppConfig::default())?))
//!     .build()?;
//!
//! let mut run = harness
//!     .generate(ModelRef::new("llama-cpp", "mistral-7b-instruct"))
//!     .prompt("Create a 2-day itinerary for Lisbon.")
//!     .max_tokens(600)
//!     .temperature(0.6)
//!     .top_p(0.9)
//!     .start_stream()
//!     .await?;
//!
//! while let Some(event) = run.next_event().await {
//!     if let StreamEvent::Fragment { text, .. } = event {
//!         print!("{text}");
//!     }
//! }
//! let _ = run.finish().await?;
//! # Ok(())
//! # }
//! ```

/// Final run output helpers.
pub mod content;
/// Public error types used by the harness API.
pub mod errors;
/// Harness entry point and builder.
pub mod harness;
/// Model and provider identifiers plus sampling parameters.
pub mod model;
/// Common imports for typical usage.
pub mod prelude;
/// Provider adapter contracts used by backend integrations.
pub mod provider;
/// Generation builder and streaming handle.
pub mod run;
/// Normalized public stream events.
pub mod stream;
/// Backend-specific integrations.
pub mod vendors;

pub use content::RunOutput;
pub use errors::{FailureKind, HarnessError, ProviderError, RunFailure};
pub use harness::{Harness, HarnessBuilder};
pub use model::{GenerationParams, ModelRef, ProviderId, RunOptions};
pub use provider::{ProviderAdapter, ProviderEvent, ProviderRequest, ProviderStreamHandle};
pub use run::{GenerateBuilder, RunStream};
pub use stream::StreamEvent;
