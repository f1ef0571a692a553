//! Command-line flags and request-file presets.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;

use crate::config::{Backend, ConfigOverrides};
use crate::errors::ConfigError;
use crate::form::TripDraft;
use crate::trip::{Accommodation, Budget, Dietary, Mobility, Preference};

#[derive(Debug, Parser)]
#[command(name = "travel-planner")]
#[command(about = "Plan a day-by-day trip itinerary with a local language model")]
pub struct Cli {
    /// Where the trip goes
    #[arg(long)]
    pub destination: Option<String>,
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long, value_enum)]
    pub budget: Option<Budget>,
    #[arg(long, value_enum)]
    pub preferences: Option<Preference>,
    #[arg(long, value_enum)]
    pub accommodation: Option<Accommodation>,
    #[arg(long, value_enum)]
    pub dietary: Option<Dietary>,
    /// Whether the traveller has mobility concerns
    #[arg(long, value_enum)]
    pub mobility: Option<Mobility>,
    /// JSON file with request fields; flags given alongside it take precedence
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,
    /// Base URL of the inference server
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    /// Print the prompt and generation parameters instead of generating
    #[arg(long)]
    pub print_prompt: bool,
    /// Never prompt; missing fields take their defaults and one request runs
    #[arg(long)]
    pub non_interactive: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }

    /// Request fields from flags, backed by the `--request` file if given.
    pub fn draft(&self) -> Result<TripDraft, ConfigError> {
        let flags = TripDraft {
            destination: self.destination.clone(),
            start_date: self.start,
            end_date: self.end,
            budget: self.budget,
            preferences: self.preferences,
            accommodation: self.accommodation,
            dietary: self.dietary,
            mobility: self.mobility,
        };
        match &self.request {
            Some(path) => Ok(flags.or(load_request_file(path)?)),
            None => Ok(flags),
        }
    }
}

pub fn load_request_file(path: &Path) -> Result<TripDraft, ConfigError> {
    let file_error = |message: String| ConfigError::File {
        path: path.display().to_string(),
        message,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| file_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::date;
    use std::io::Write as _;

    #[test]
    fn flags_parse_into_a_draft() {
        let cli = Cli::try_parse_from([
            "travel-planner",
            "--destination",
            "Kyoto",
            "--start",
            "2024-06-01",
            "--end",
            "2024-06-03",
            "--accommodation",
            "mid-range",
            "--dietary",
            "gluten-free",
            "--mobility",
            "yes",
            "--backend",
            "ollama",
        ])
        .expect("parse");
        let draft = cli.draft().expect("draft");
        assert_eq!(draft.destination.as_deref(), Some("Kyoto"));
        assert_eq!(draft.start_date, Some(date(2024, 6, 1)));
        assert_eq!(draft.accommodation, Some(Accommodation::MidRange));
        assert_eq!(draft.dietary, Some(Dietary::GlutenFree));
        assert_eq!(draft.mobility, Some(Mobility::Yes));
        assert_eq!(draft.budget, None);
        assert_eq!(cli.overrides().backend, Some(Backend::Ollama));
    }

    #[test]
    fn malformed_date_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["travel-planner", "--start", "06/01/2024"]).is_err());
    }

    #[test]
    fn request_file_fills_fields_not_given_as_flags() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"destination":"Paris","start_date":"2024-06-01","end_date":"2024-06-04","dietary":"Vegan"}}"#
        )
        .expect("write");
        let path = file.path().to_str().expect("utf8 path");
        let cli = Cli::try_parse_from(["travel-planner", "--request", path, "--destination", "Nice"])
            .expect("parse");
        let draft = cli.draft().expect("draft");
        assert_eq!(draft.destination.as_deref(), Some("Nice"));
        assert_eq!(draft.end_date, Some(date(2024, 6, 4)));
        assert_eq!(draft.dietary, Some(Dietary::Vegan));
    }

    #[test]
    fn unreadable_request_file_names_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("trip.json");
        let err = load_request_file(&missing).expect_err("missing file");
        assert!(err.to_string().contains("trip.json"));
    }
}
