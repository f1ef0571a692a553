//! Travel itinerary planner backed by a locally hosted language model.
//!
//! The form collects a [`trip::TripRequest`], the [`planner::ItineraryPlanner`]
//! validates it and builds a day-by-day prompt, and the model's reply is
//! streamed into the form's display region fragment by fragment.

pub mod app;
pub mod banner;
pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod model;
pub mod observability;
pub mod planner;
pub mod prompt;
pub mod render;
pub mod trip;
pub mod ui;

#[cfg(test)]
mod testing;

pub use errors::{ConfigError, TripError, UiError};
pub use planner::{Itinerary, ItineraryPlanner};
pub use trip::{TripRequest, ValidatedTrip};
