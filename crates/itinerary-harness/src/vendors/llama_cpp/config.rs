use std::time::Duration;

/// Configuration for the llama.cpp server client.
#[derive(Clone, Debug)]
pub struct LlamaCppConfig {
    /// Base URL of the running `llama-server`.
    pub base_url: String,
    /// Longest wait for a connection or for the next bytes of a response.
    ///
    /// A response that keeps producing bytes may run longer than this.
    pub timeout: Duration,
}

impl Default for LlamaCppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl LlamaCppConfig {
    /// Overrides the server base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the connect and idle-read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn completion_url(&self) -> String {
        format!("{}/completion", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_tolerate_trailing_slash() {
        let config = LlamaCppConfig::default().base_url("http://localhost:9000/");
        assert_eq!(config.completion_url(), "http://localhost:9000/completion");
        assert_eq!(config.health_url(), "http://localhost:9000/health");
    }
}
