use crate::errors::ProviderError;
use crate::model::ProviderId;
use crate::provider::ProviderEvent;
use crate::vendors::{ChunkDecoder, Decoded};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Parses a trailing frame that was not followed by a blank line.
    pub fn flush(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buf);
        parse_sse_frame(&rest)
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
            continue;
        }
        // llama-server reports mid-stream failures on a bare `error:` line.
        if let Some(rest) = line.strip_prefix("error:") {
            event = Some("error".to_string());
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// One `/completion` payload, streamed or final.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct CompletionChunk {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub stop: bool,
    #[serde(default)]
    pub stop_type: Option<String>,
    #[serde(default)]
    pub stopped_eos: bool,
    #[serde(default)]
    pub stopped_limit: bool,
    #[serde(default)]
    pub stopped_word: bool,
    #[serde(default)]
    pub error: Option<CompletionError>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CompletionError {
    #[serde(default)]
    pub message: String,
}

impl CompletionChunk {
    fn finish_reason(&self) -> Option<String> {
        if let Some(kind) = self.stop_type.as_deref().filter(|k| *k != "none") {
            return Some(kind.to_string());
        }
        if self.stopped_limit {
            Some("limit".into())
        } else if self.stopped_word {
            Some("word".into())
        } else if self.stopped_eos {
            Some("eos".into())
        } else {
            None
        }
    }
}

pub(crate) fn map_completion_json(
    provider: &ProviderId,
    data: &str,
) -> Result<Vec<ProviderEvent>, ProviderError> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }
    let chunk: CompletionChunk = serde_json::from_str(data).map_err(|e| {
        ProviderError::protocol(provider.clone(), format!("invalid completion JSON: {e}"))
    })?;
    map_completion_chunk(provider, chunk)
}

pub(crate) fn map_completion_chunk(
    provider: &ProviderId,
    chunk: CompletionChunk,
) -> Result<Vec<ProviderEvent>, ProviderError> {
    if let Some(error) = &chunk.error {
        let message = if error.message.is_empty() {
            "llama.cpp server error"
        } else {
            error.message.as_str()
        };
        return Err(ProviderError::provider(provider.clone(), message, None));
    }
    let mut events = Vec::new();
    let finish_reason = chunk.finish_reason();
    if !chunk.content.is_empty() {
        events.push(ProviderEvent::TextDelta {
            text: chunk.content,
        });
    }
    if chunk.stop {
        events.push(ProviderEvent::Completed { finish_reason });
    }
    Ok(events)
}

/// Maps a non-streamed `/completion` body, which always ends the run.
pub(crate) fn map_final_completion(
    provider: &ProviderId,
    chunk: CompletionChunk,
) -> Result<Vec<ProviderEvent>, ProviderError> {
    let mut events = map_completion_chunk(provider, chunk)?;
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

fn map_error_frame(provider: &ProviderId, data: &str) -> ProviderError {
    let message = serde_json::from_str::<CompletionError>(data)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| data.trim().to_string());
    ProviderError::provider(provider.clone(), message, None)
}

/// Turns the `/completion` SSE body into provider events.
#[derive(Default)]
pub(crate) struct CompletionStreamDecoder {
    sse: SseDecoder,
    stopped: bool,
}

impl CompletionStreamDecoder {
    fn map_frames(&mut self, provider: &ProviderId, frames: Vec<SseFrame>) -> Decoded {
        let mut decoded = Decoded::default();
        for frame in frames {
            if self.stopped {
                break;
            }
            let mapped = if frame.event.as_deref() == Some("error") {
                Err(map_error_frame(provider, &frame.data))
            } else {
                map_completion_json(provider, &frame.data)
            };
            match mapped {
                Ok(events) => {
                    for event in events {
                        if matches!(event, ProviderEvent::Completed { .. }) {
                            self.stopped = true;
                        }
                        decoded.events.push(event);
                    }
                }
                Err(err) => {
                    self.stopped = true;
                    decoded.error = Some(err);
                }
            }
        }
        decoded
    }
}

impl ChunkDecoder for CompletionStreamDecoder {
    fn push_chunk(&mut self, provider: &ProviderId, chunk: &[u8]) -> Decoded {
        let frames = self.sse.push_chunk(chunk);
        self.map_frames(provider, frames)
    }

    fn finish(&mut self, provider: &ProviderId) -> Decoded {
        let frames = self.sse.flush().into_iter().collect();
        self.map_frames(provider, frames)
    }
}
