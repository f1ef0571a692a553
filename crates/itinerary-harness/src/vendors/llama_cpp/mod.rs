//! llama.cpp `server` provider.
//!
//! Talks to a locally running `llama-server` over its native `/completion`
//! endpoint, which streams Server-Sent Events carrying `content` fragments.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::{LLAMA_CPP_PROVIDER, LlamaCppProvider};
pub use config::LlamaCppConfig;
