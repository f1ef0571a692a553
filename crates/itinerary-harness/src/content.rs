/// Final aggregated output for a completed run.
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RunOutput {
    /// Text fragments in the order they were produced.
    pub fragments: Vec<String>,
    /// Backend-specific finish reason when available (for example `eos`).
    pub finish_reason: Option<String>,
}

impl RunOutput {
    /// Concatenates all fragments in arrival order.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    /// Number of non-empty fragments the backend produced.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}
