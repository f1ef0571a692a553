use std::time::Duration;

/// Configuration for the Ollama client.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Base URL of the Ollama daemon.
    pub base_url: String,
    /// Longest wait for a connection or for the next bytes of a response.
    ///
    /// A response that keeps producing bytes may run longer than this.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        // ollama listens on 11434 unless OLLAMA_HOST says otherwise
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl OllamaConfig {
    /// Overrides the daemon base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the connect and idle-read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }
}
