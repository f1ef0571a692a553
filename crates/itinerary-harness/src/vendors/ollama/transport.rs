use crate::errors::ProviderError;
use crate::model::ProviderId;
use crate::provider::ProviderEvent;
use crate::vendors::{ChunkDecoder, Decoded};

/// One `/api/generate` line.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Entry of the `/api/tags` model listing.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TaggedModel>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct TaggedModel {
    pub name: String,
}

impl TagsResponse {
    /// Ollama reports `name:latest` for untagged pulls, so a bare name matches it too.
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| {
            m.name == model || m.name.strip_suffix(":latest").is_some_and(|base| base == model)
        })
    }
}

pub(crate) fn map_generate_chunk(
    provider: &ProviderId,
    chunk: GenerateChunk,
) -> Result<Vec<ProviderEvent>, ProviderError> {
    if let Some(error) = chunk.error {
        return Err(ProviderError::provider(provider.clone(), error, None));
    }
    let mut events = Vec::new();
    if !chunk.response.is_empty() {
        events.push(ProviderEvent::TextDelta {
            text: chunk.response,
        });
    }
    if chunk.done {
        events.push(ProviderEvent::Completed {
            finish_reason: chunk.done_reason,
        });
    }
    Ok(events)
}

/// Maps a non-streamed `/api/generate` body, which always ends the run.
pub(crate) fn map_final_generate(
    provider: &ProviderId,
    chunk: GenerateChunk,
) -> Result<Vec<ProviderEvent>, ProviderError> {
    let mut events = map_generate_chunk(provider, chunk)?;
    if !events
        .iter()
        .any(|e| matches!(e, ProviderEvent::Completed { .. }))
    {
        events.push(ProviderEvent::Completed {
            finish_reason: None,
        });
    }
    Ok(events)
}

fn map_line(provider: &ProviderId, line: &[u8]) -> Result<Vec<ProviderEvent>, ProviderError> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|e| {
        ProviderError::protocol(provider.clone(), format!("invalid generate line: {e}"))
    })?;
    map_generate_chunk(provider, chunk)
}

/// Splits the NDJSON body on newlines, holding back a partial trailing line.
#[derive(Default)]
pub(crate) struct NdjsonDecoder {
    buf: Vec<u8>,
    done: bool,
}

impl NdjsonDecoder {
    fn map_lines(&mut self, provider: &ProviderId, lines: Vec<Vec<u8>>) -> Decoded {
        let mut decoded = Decoded::default();
        for line in lines {
            if self.done {
                break;
            }
            match map_line(provider, &line) {
                Ok(events) => {
                    for event in events {
                        if matches!(event, ProviderEvent::Completed { .. }) {
                            self.done = true;
                        }
                        decoded.events.push(event);
                    }
                }
                Err(err) => {
                    self.done = true;
                    decoded.error = Some(err);
                }
            }
        }
        decoded
    }
}

impl ChunkDecoder for NdjsonDecoder {
    fn push_chunk(&mut self, provider: &ProviderId, chunk: &[u8]) -> Decoded {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=idx).take(idx).collect();
            lines.push(line);
        }
        self.map_lines(provider, lines)
    }

    fn finish(&mut self, provider: &ProviderId) -> Decoded {
        let rest = std::mem::take(&mut self.buf);
        self.map_lines(provider, vec![rest])
    }
}
