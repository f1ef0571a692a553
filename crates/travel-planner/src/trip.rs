//! Trip parameters collected from the form and their validation.
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::TripError;

/// A single-choice form field.
///
/// `ALL` is the selector's option list in display order; its first entry is
/// the default selection.
pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    /// Label shown in the selector and written into the prompt.
    fn label(self) -> &'static str;

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }
}

/// Returned when a label does not name any option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown option {value:?}, expected one of: {expected}")]
pub struct UnknownChoice {
    pub value: String,
    pub expected: String,
}

fn parse_choice<T: Choice>(value: &str) -> Result<T, UnknownChoice> {
    let needle = value.trim();
    T::ALL
        .iter()
        .copied()
        .find(|c| c.label().eq_ignore_ascii_case(needle))
        .ok_or_else(|| UnknownChoice {
            value: value.to_string(),
            expected: T::labels().join(", "),
        })
}

macro_rules! choice_field {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl Choice for $ty {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_choice(s)
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Budget {
    Low,
    Moderate,
    High,
}

choice_field!(Budget {
    Low => "Low",
    Moderate => "Moderate",
    High => "High",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Preference {
    Nature,
    History,
    Adventure,
    Culture,
    Relaxation,
}

choice_field!(Preference {
    Nature => "Nature",
    History => "History",
    Adventure => "Adventure",
    Culture => "Culture",
    Relaxation => "Relaxation",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Accommodation {
    Luxury,
    #[serde(rename = "Mid-range")]
    MidRange,
    Budget,
}

choice_field!(Accommodation {
    Luxury => "Luxury",
    MidRange => "Mid-range",
    Budget => "Budget",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Dietary {
    #[serde(rename = "None")]
    #[value(name = "none")]
    NoRestrictions,
    Vegetarian,
    Vegan,
    #[serde(rename = "Gluten-free")]
    GlutenFree,
}

choice_field!(Dietary {
    NoRestrictions => "None",
    Vegetarian => "Vegetarian",
    Vegan => "Vegan",
    GlutenFree => "Gluten-free",
});

/// Whether the traveller has mobility concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mobility {
    No,
    Yes,
}

choice_field!(Mobility {
    No => "No",
    Yes => "Yes",
});

/// Everything the form collects for one generation.
///
/// Built fresh from the form on each trigger and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub preferences: Preference,
    #[serde(default)]
    pub accommodation: Accommodation,
    #[serde(default)]
    pub dietary: Dietary,
    #[serde(default)]
    pub mobility: Mobility,
}

impl TripRequest {
    /// Creates a request with the default selection for every choice field.
    pub fn new(destination: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            destination: destination.into(),
            start_date,
            end_date,
            budget: Budget::default(),
            preferences: Preference::default(),
            accommodation: Accommodation::default(),
            dietary: Dietary::default(),
            mobility: Mobility::default(),
        }
    }

    /// Checks the destination and date range.
    ///
    /// Model availability is checked separately by the planner; both happen
    /// before any prompt is built.
    pub fn validate(self) -> Result<ValidatedTrip, TripError> {
        if self.destination.trim().is_empty() {
            return Err(TripError::EmptyDestination);
        }
        if self.end_date < self.start_date {
            return Err(TripError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        let span = (self.end_date - self.start_date).num_days() + 1;
        let duration_days = u32::try_from(span).map_err(|_| TripError::InvalidDateRange {
            start: self.start_date,
            end: self.end_date,
        })?;
        Ok(ValidatedTrip {
            request: self,
            duration_days,
        })
    }
}

/// A request whose destination is present and whose dates are ordered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedTrip {
    request: TripRequest,
    duration_days: u32,
}

impl ValidatedTrip {
    pub fn request(&self) -> &TripRequest {
        &self.request
    }

    pub fn destination(&self) -> &str {
        self.request.destination.trim()
    }

    /// Number of calendar days, counting both endpoints.
    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    /// Yields `(day_number, date)` pairs, 1-based, in increasing date order.
    pub fn days(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (1..=self.duration_days).zip(self.request.start_date.iter_days())
    }
}
