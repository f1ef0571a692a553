//! Incremental rendering of a streamed itinerary.
use itinerary_harness::{HarnessError, RunStream, StreamEvent};
use tracing::{debug, info};

use crate::errors::TripError;
use crate::ui::FormUi;

/// Text received so far for one generation.
///
/// Only ever grows, by appending fragments in arrival order.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    fragments: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment. Returns false (and changes nothing) for an empty one.
    pub fn push(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        self.fragments += 1;
        true
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Current text with single newlines promoted to paragraph breaks.
    pub fn rendered(&self) -> String {
        paragraph_breaks(&self.text)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Doubles every newline so each line renders as its own paragraph.
pub fn paragraph_breaks(text: &str) -> String {
    text.replace('\n', "\n\n")
}

/// What a completed stream produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedStream {
    pub text: String,
    pub fragment_count: usize,
    pub finish_reason: Option<String>,
}

/// Pulls every event from `run`, redrawing the display after each fragment.
///
/// On a mid-stream failure whatever was already shown stays on screen and is
/// returned inside `TripError::Generation`.
pub async fn render_stream<U: FormUi + ?Sized>(
    run: &mut RunStream,
    ui: &mut U,
) -> Result<RenderedStream, TripError> {
    let mut acc = StreamAccumulator::new();
    let mut finish_reason = None;
    let mut completed = false;

    while let Some(event) = run.next_event().await {
        match event {
            StreamEvent::Started {
                run_id,
                provider,
                model,
            } => {
                info!(%run_id, %provider, %model, "itinerary stream started");
            }
            StreamEvent::Fragment { seq, text, .. } => {
                if acc.push(&text) {
                    debug!(seq, len = acc.as_str().len(), "render fragment");
                    ui.display_text(&acc.rendered());
                }
            }
            StreamEvent::Finished { output, .. } => {
                finish_reason = output.finish_reason;
                completed = true;
                break;
            }
            StreamEvent::Failed { error, .. } => {
                return Err(TripError::Generation {
                    partial: acc.into_text(),
                    source: HarnessError::RunFailed(error),
                });
            }
        }
    }

    if !completed {
        return Err(TripError::Generation {
            partial: acc.into_text(),
            source: HarnessError::Protocol("stream closed without a terminal event".into()),
        });
    }

    Ok(RenderedStream {
        fragment_count: acc.fragment_count(),
        text: acc.into_text(),
        finish_reason,
    })
}
