//! Ollama provider.
//!
//! Uses the raw `/api/generate` endpoint so the prompt reaches the model
//! without Ollama's chat template.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::{OLLAMA_PROVIDER, OllamaProvider};
pub use config::OllamaConfig;
