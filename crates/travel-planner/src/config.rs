//! Planner settings from `.env`, the environment and command-line overrides.
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

/// Model requested when none is configured. llama.cpp serves whatever it was
/// started with, so there the name only labels logs.
pub const DEFAULT_MODEL: &str = "mistral:7b-instruct";

/// Local inference backend serving the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    #[default]
    LlamaCpp,
    Ollama,
}

impl Backend {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::LlamaCpp => "http://127.0.0.1:8080",
            Self::Ollama => "http://127.0.0.1:11434",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llama-cpp" | "llamacpp" | "llama.cpp" | "llama_cpp" => Ok(Self::LlamaCpp),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown backend {other:?}")),
        }
    }
}

/// Settings resolved from the environment (and `.env`), before CLI overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    pub backend: Backend,
    base_url: Option<String>,
    model: Option<String>,
    pub http_timeout: Duration,
    pub image_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            base_url: None,
            model: None,
            http_timeout: Duration::from_secs(300),
            image_path: None,
        }
    }
}

/// Values given on the command line; each one wins over the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub backend: Option<Backend>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Loads `.env` from the working directory, if there is one.
pub fn init() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

fn parse_env<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
    }
}

impl PlannerConfig {
    /// Reads `PLANNER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            backend: parse_env(&lookup, "PLANNER_BACKEND")?.unwrap_or(defaults.backend),
            base_url: parse_env(&lookup, "PLANNER_BASE_URL")?,
            model: parse_env(&lookup, "PLANNER_MODEL")?,
            http_timeout: parse_env::<u64>(&lookup, "PLANNER_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            image_path: parse_env(&lookup, "PLANNER_IMAGE_PATH")?,
        })
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if overrides.base_url.is_some() {
            self.base_url = overrides.base_url;
        }
        if overrides.model.is_some() {
            self.model = overrides.model;
        }
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(DEFAULT_MODEL)
    }
}
