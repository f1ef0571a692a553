//! Prompt template and sampling parameters for itinerary generation.
use itinerary_harness::GenerationParams;

use crate::trip::ValidatedTrip;

/// Tokens budgeted per trip day.
pub const TOKENS_PER_DAY: u32 = 300;
/// Upper bound on the token budget regardless of trip length.
pub const MAX_TOKENS: u32 = 1500;
pub const TEMPERATURE: f32 = 0.6;
pub const TOP_P: f32 = 0.9;

const SLOTS: [(&str, &str); 3] = [
    ("Morning", "morning"),
    ("Afternoon", "afternoon"),
    ("Evening", "evening"),
];

/// `min(1500, duration_days * 300)`.
pub fn token_budget(duration_days: u32) -> u32 {
    duration_days.saturating_mul(TOKENS_PER_DAY).min(MAX_TOKENS)
}

/// Sampling parameters for a validated trip. Always streams.
pub fn generation_params(trip: &ValidatedTrip) -> GenerationParams {
    GenerationParams {
        max_tokens: token_budget(trip.duration_days()),
        temperature: TEMPERATURE,
        top_p: TOP_P,
        stream: true,
    }
}

/// Builds the day-by-day prompt skeleton.
///
/// Pure function of the trip: the same trip always yields the same text, with
/// one block per day in date order so the model's completion slots into the
/// labelled sections.
pub fn build_prompt(trip: &ValidatedTrip) -> String {
    let request = trip.request();
    let mut prompt = format!(
        "Create a {}-day itinerary for {}.\n",
        trip.duration_days(),
        trip.destination()
    );
    prompt.push_str(&format!("- Budget: {}\n", request.budget));
    prompt.push_str(&format!("- Preferences: {}\n", request.preferences));
    prompt.push_str(&format!("- Accommodation: {}\n", request.accommodation));
    prompt.push_str(&format!("- Dietary: {}\n", request.dietary));
    prompt.push_str(&format!("- Mobility: {}\n", request.mobility));
    prompt.push_str("\nFormat strictly as:\n");

    for (day_number, date) in trip.days() {
        prompt.push_str(&format!(
            "\n**DAY {day_number} ({})**\n",
            date.format("%Y-%m-%d")
        ));
        for (label, slot) in SLOTS {
            prompt.push_str(&format!(
                "**{label}:**\n[Detailed description of {slot} activity]\n\n"
            ));
        }
    }

    prompt.push_str("\nKeep responses concise, avoid repetition.");
    prompt
}
