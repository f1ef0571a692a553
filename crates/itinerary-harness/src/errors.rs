use std::fmt;

use crate::model::ProviderId;

/// Where a generation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The backend answered with an error (HTTP status, model not loaded, bad sampling values).
    Backend,
    /// The connection failed or the byte stream broke off.
    Transport,
    /// The backend's reply could not be decoded or arrived out of order.
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Backend => "backend",
            Self::Transport => "transport",
            Self::Protocol => "protocol",
        })
    }
}

/// Error raised by a provider adapter, before the run stream normalizes it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error ({provider}): {message}")]
pub struct ProviderError {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub message: String,
    /// HTTP status, when the backend sent one.
    pub status_code: Option<u16>,
}

impl ProviderError {
    fn new(provider: impl Into<ProviderId>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// The backend rejected the request or reported an error payload.
    pub fn provider(
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            status_code,
            ..Self::new(provider, FailureKind::Backend, message)
        }
    }

    pub fn transport(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Transport, message)
    }

    pub fn protocol(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Protocol, message)
    }
}

/// Terminal failure of a started run, carried by `StreamEvent::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("{kind} failure ({provider}): {message}")]
pub struct RunFailure {
    pub kind: FailureKind,
    pub provider: ProviderId,
    pub message: String,
}

impl RunFailure {
    pub fn new(
        kind: FailureKind,
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<&ProviderError> for RunFailure {
    fn from(err: &ProviderError) -> Self {
        Self::new(err.kind, err.provider.clone(), err.message.clone())
    }
}

/// Top-level error type for the public harness API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// Invalid harness/provider configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// Requested provider is not registered in the harness.
    #[error("provider not found: {provider}")]
    ProviderNotFound { provider: ProviderId },
    /// Provider error surfaced outside a run stream, such as a failed health check.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Terminal failure returned from a started run.
    #[error(transparent)]
    RunFailed(#[from] RunFailure),
    /// The run task and its consumer lost track of each other.
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_failure_keeps_kind_and_provider() {
        let failure = RunFailure::from(&ProviderError::protocol("ollama", "bad line"));
        assert_eq!(failure, RunFailure::new(FailureKind::Protocol, "ollama", "bad line"));
        assert_eq!(failure.to_string(), "protocol failure (ollama): bad line");
    }

    #[test]
    fn backend_errors_carry_status() {
        let err = ProviderError::provider("llama-cpp", "model not loaded", Some(503));
        assert_eq!(err.kind, FailureKind::Backend);
        assert_eq!(err.status_code, Some(503));
        assert_eq!(err.to_string(), "backend error (llama-cpp): model not loaded");
        assert_eq!(ProviderError::transport("ollama", "reset").status_code, None);
    }

    #[test]
    fn failure_kind_serializes_in_snake_case() {
        let json = serde_json::to_string(&FailureKind::Transport).expect("serialize");
        assert_eq!(json, "\"transport\"");
    }
}
