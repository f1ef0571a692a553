//! Collecting a trip request, from CLI values first and the form second.
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::UiError;
use crate::trip::{Accommodation, Budget, Choice, Dietary, Mobility, Preference, TripRequest};
use crate::ui::FormUi;

/// Partially filled request. Every `None` is asked on the form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TripDraft {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Budget>,
    pub preferences: Option<Preference>,
    pub accommodation: Option<Accommodation>,
    pub dietary: Option<Dietary>,
    pub mobility: Option<Mobility>,
}

impl TripDraft {
    /// Fills in `other`'s values wherever this draft has none.
    pub fn or(self, other: TripDraft) -> TripDraft {
        TripDraft {
            destination: self.destination.or(other.destination),
            start_date: self.start_date.or(other.start_date),
            end_date: self.end_date.or(other.end_date),
            budget: self.budget.or(other.budget),
            preferences: self.preferences.or(other.preferences),
            accommodation: self.accommodation.or(other.accommodation),
            dietary: self.dietary.or(other.dietary),
            mobility: self.mobility.or(other.mobility),
        }
    }

    /// Completes the draft without asking: missing dates become `today` and
    /// missing choices take their first option.
    pub fn into_request(self, today: NaiveDate) -> TripRequest {
        let start_date = self.start_date.unwrap_or(today);
        TripRequest {
            destination: self.destination.unwrap_or_default(),
            start_date,
            end_date: self.end_date.unwrap_or(start_date),
            budget: self.budget.unwrap_or_default(),
            preferences: self.preferences.unwrap_or_default(),
            accommodation: self.accommodation.unwrap_or_default(),
            dietary: self.dietary.unwrap_or_default(),
            mobility: self.mobility.unwrap_or_default(),
        }
    }
}

fn choose<C, U>(ui: &mut U, label: &str, preset: Option<C>) -> Result<C, UiError>
where
    C: Choice + Default,
    U: FormUi + ?Sized,
{
    if let Some(value) = preset {
        return Ok(value);
    }
    let idx = ui.input_choice(label, &C::labels())?;
    Ok(C::ALL.get(idx).copied().unwrap_or_default())
}

/// Asks for every field `draft` leaves open.
///
/// The start date may not precede `today` and the end date may not precede
/// the start date. Values already in `draft` are taken as given and checked
/// later by [`TripRequest::validate`].
pub fn collect_trip<U: FormUi + ?Sized>(
    ui: &mut U,
    draft: TripDraft,
    today: NaiveDate,
) -> Result<TripRequest, UiError> {
    let destination = match draft.destination {
        Some(destination) => destination,
        None => ui.input_text("Enter your destination:")?,
    };
    let start_date = match draft.start_date {
        Some(date) => date,
        None => ui.input_date("Start date", today)?,
    };
    let end_date = match draft.end_date {
        Some(date) => date,
        None => ui.input_date("End date", start_date)?,
    };
    Ok(TripRequest {
        destination,
        start_date,
        end_date,
        budget: choose(ui, "Budget", draft.budget)?,
        preferences: choose(ui, "Travel Preferences", draft.preferences)?,
        accommodation: choose(ui, "Accommodation Type", draft.accommodation)?,
        dietary: choose(ui, "Dietary Restrictions", draft.dietary)?,
        mobility: choose(ui, "Mobility Concerns?", draft.mobility)?,
    })
}
