//! Error types for trip requests, configuration and terminal I/O.
use chrono::NaiveDate;
use itinerary_harness::HarnessError;

/// Reasons a single itinerary request does not produce a full itinerary.
///
/// None of these are fatal to the session; the user may correct the form and
/// try again.
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("Please enter a destination.")]
    EmptyDestination,
    #[error("End date cannot be before the start date!")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("Model not loaded. Please check your setup.")]
    ModelUnavailable,
    /// The backend failed after the request was accepted. `partial` holds
    /// whatever had already been rendered.
    #[error("Itinerary generation failed: {source}")]
    Generation {
        partial: String,
        #[source]
        source: HarnessError,
    },
}

impl TripError {
    /// True for errors raised before any generation call was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyDestination | Self::InvalidDateRange { .. } | Self::ModelUnavailable
        )
    }

    /// Text that was displayed before a mid-stream failure, if any.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Self::Generation { partial, .. } if !partial.is_empty() => Some(partial),
            _ => None,
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("failed to read {path}: {message}")]
    File { path: String, message: String },
}

/// Errors raised by an interactive form front-end.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("input closed")]
    Closed,
}
