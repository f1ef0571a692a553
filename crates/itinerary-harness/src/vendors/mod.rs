//! Local inference backends.
//!
//! Each backend turns an HTTP response body into `ProviderEvent`s through a
//! `ChunkDecoder`; the shared plumbing that pulls bytes and drains decoded
//! events lives here.
use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;

use crate::errors::ProviderError;
use crate::model::ProviderId;
use crate::provider::{ProviderEvent, ProviderEventStream};

/// llama.cpp `server` integration (`/completion`, Server-Sent Events).
pub mod llama_cpp;
/// Ollama integration (`/api/generate`, newline-delimited JSON).
pub mod ollama;
#[cfg(test)]
mod test_server;

pub(crate) type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Events a decoder completed, plus the error that stopped it, if any.
///
/// Events always precede the error in stream order.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Decoded {
    pub events: Vec<ProviderEvent>,
    pub error: Option<ProviderError>,
}

/// Incremental decoder for a backend's streaming body format.
///
/// After reporting an error a decoder ignores further input.
pub(crate) trait ChunkDecoder: Send + 'static {
    /// Feeds one network chunk and returns every event it completed.
    fn push_chunk(&mut self, provider: &ProviderId, chunk: &[u8]) -> Decoded;

    /// Flushes whatever is still buffered once the body ends.
    fn finish(&mut self, provider: &ProviderId) -> Decoded;
}

pub(crate) fn decoded_event_stream<D: ChunkDecoder>(
    provider_id: ProviderId,
    bytes_stream: ByteStream,
    decoder: D,
) -> ProviderEventStream {
    struct State<D> {
        provider_id: ProviderId,
        bytes_stream: ByteStream,
        decoder: D,
        pending: VecDeque<ProviderEvent>,
        failed: Option<ProviderError>,
        done: bool,
    }

    impl<D> State<D> {
        fn absorb(&mut self, decoded: Decoded) {
            self.pending.extend(decoded.events);
            if let Some(err) = decoded.error {
                self.failed = Some(err);
                self.done = true;
            }
        }
    }

    Box::pin(stream::try_unfold(
        State {
            provider_id,
            bytes_stream,
            decoder,
            pending: VecDeque::new(),
            failed: None,
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if let Some(err) = state.failed.take() {
                    return Err(err);
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        let decoded = state.decoder.push_chunk(&state.provider_id, &chunk);
                        state.absorb(decoded);
                    }
                    Some(Err(e)) => {
                        return Err(ProviderError::transport(
                            state.provider_id,
                            format!("streaming read failed: {e}"),
                        ));
                    }
                    None => {
                        state.done = true;
                        let decoded = state.decoder.finish(&state.provider_id);
                        state.absorb(decoded);
                    }
                }
            }
        },
    ))
}

/// Reads a non-success response into a provider error.
pub(crate) async fn error_from_response(
    provider_id: ProviderId,
    backend: &str,
    response: reqwest::Response,
) -> ProviderError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    ProviderError::provider(
        provider_id,
        format!("{backend} request failed with status {status}: {body}"),
        Some(status.as_u16()),
    )
}
