//! One generation request, from form values to a rendered itinerary.
use itinerary_harness::{Harness, ModelRef};
use tracing::{error, info, warn};

use crate::errors::TripError;
use crate::model::LoadedModel;
use crate::prompt::{build_prompt, generation_params};
use crate::render::render_stream;
use crate::trip::TripRequest;
use crate::ui::FormUi;

pub const SPINNER_LABEL: &str = "Creating your itinerary...";

/// A successfully streamed itinerary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Itinerary {
    pub text: String,
    pub duration_days: u32,
    pub fragment_count: usize,
    pub finish_reason: Option<String>,
}

/// Turns trip requests into streamed itineraries.
///
/// Holds the model loaded at startup, or nothing when loading failed; every
/// request then fails fast with [`TripError::ModelUnavailable`].
pub struct ItineraryPlanner {
    model: Option<LoadedModel>,
}

impl ItineraryPlanner {
    pub fn new(model: Option<LoadedModel>) -> Self {
        Self { model }
    }

    pub fn from_harness(harness: Harness, model: ModelRef) -> Self {
        Self::new(Some(LoadedModel::new(harness, model)))
    }

    pub fn model_available(&self) -> bool {
        self.model.is_some()
    }

    /// Validates `request`, streams the itinerary into `ui`, and reports any
    /// failure on the form before returning it.
    pub async fn plan<U: FormUi + ?Sized>(
        &self,
        request: TripRequest,
        ui: &mut U,
    ) -> Result<Itinerary, TripError> {
        let result = self.run(request, ui).await;
        if let Err(err) = &result {
            ui.show_error(&err.to_string());
            if err.is_validation() {
                warn!(error = %err, "itinerary request rejected");
            } else {
                error!(
                    error = %err,
                    partial_len = err.partial_output().map_or(0, str::len),
                    "itinerary generation failed"
                );
            }
        }
        result
    }

    async fn run<U: FormUi + ?Sized>(
        &self,
        request: TripRequest,
        ui: &mut U,
    ) -> Result<Itinerary, TripError> {
        let trip = request.validate()?;
        let loaded = self.model.as_ref().ok_or(TripError::ModelUnavailable)?;

        let prompt = build_prompt(&trip);
        let params = generation_params(&trip);
        info!(
            destination = trip.destination(),
            days = trip.duration_days(),
            max_tokens = params.max_tokens,
            "generating itinerary"
        );

        ui.show_spinner(SPINNER_LABEL);
        let started = loaded
            .harness
            .generate(loaded.model.clone())
            .prompt(prompt)
            .params(params)
            .start_stream()
            .await;
        let rendered = match started {
            Ok(mut run) => render_stream(&mut run, ui).await,
            Err(source) => Err(TripError::Generation {
                partial: String::new(),
                source,
            }),
        };
        ui.clear_spinner();
        let rendered = rendered?;

        info!(
            fragments = rendered.fragment_count,
            finish_reason = rendered.finish_reason.as_deref().unwrap_or("unknown"),
            "itinerary complete"
        );
        Ok(Itinerary {
            text: rendered.text,
            duration_days: trip.duration_days(),
            fragment_count: rendered.fragment_count,
            finish_reason: rendered.finish_reason,
        })
    }
}
