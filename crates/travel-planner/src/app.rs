//! The form session: banner, then request after request until the user stops.
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::banner::{CAPTION, TITLE, resolve_banner};
use crate::errors::UiError;
use crate::form::{TripDraft, collect_trip};
use crate::planner::ItineraryPlanner;
use crate::ui::FormUi;

#[derive(Clone, Copy, Debug)]
pub struct SessionOptions<'a> {
    /// Ask for missing fields and offer another round after each request.
    pub interactive: bool,
    pub image_path: Option<&'a Path>,
    pub today: NaiveDate,
}

/// How many requests the session ran and how they ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub planned: usize,
    pub failed: usize,
}

pub fn show_banner<U: FormUi + ?Sized>(ui: &mut U, image_path: Option<&Path>) {
    ui.show_title(TITLE);
    let (image, warning) = resolve_banner(image_path);
    if let Some(warning) = warning {
        ui.show_warning(&warning);
    }
    ui.show_image(&image, CAPTION);
}

/// Runs the form until the user declines another trip or input closes.
///
/// `draft` pre-fills the first request only. Request failures are already
/// reported on the form by the planner and only counted here.
pub async fn run_session<U: FormUi + ?Sized>(
    planner: &ItineraryPlanner,
    ui: &mut U,
    draft: TripDraft,
    options: SessionOptions<'_>,
) -> Result<SessionSummary, UiError> {
    show_banner(ui, options.image_path);

    let mut summary = SessionSummary::default();
    let mut preset = Some(draft);
    loop {
        let draft = preset.take().unwrap_or_default();
        let request = if options.interactive {
            match collect_trip(ui, draft, options.today) {
                Ok(request) => request,
                Err(UiError::Closed) => {
                    debug!("input closed, ending session");
                    break;
                }
                Err(err) => return Err(err),
            }
        } else {
            draft.into_request(options.today)
        };

        match planner.plan(request, ui).await {
            Ok(_) => summary.planned += 1,
            Err(_) => summary.failed += 1,
        }

        if !options.interactive {
            break;
        }
        match ui.confirm("Plan another trip?") {
            Ok(true) => {}
            Ok(false) | Err(UiError::Closed) => break,
            Err(err) => return Err(err),
        }
    }

    info!(planned = summary.planned, failed = summary.failed, "session finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::FALLBACK_IMAGE_URL;
    use crate::testing::{FakeBehavior, ScriptedUi, UiEvent, completed, date, delta, fake_harness};

    fn planner() -> ItineraryPlanner {
        let (harness, model, _) =
            fake_harness(FakeBehavior::Events(vec![delta("**DAY 1**"), completed()]));
        ItineraryPlanner::from_harness(harness, model)
    }

    fn options(interactive: bool) -> SessionOptions<'static> {
        SessionOptions {
            interactive,
            image_path: None,
            today: date(2024, 6, 1),
        }
    }

    #[tokio::test]
    async fn banner_precedes_the_form() {
        let mut ui = ScriptedUi::new(&[]);
        let summary = run_session(&planner(), &mut ui, TripDraft::default(), options(true))
            .await
            .expect("session");
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(ui.events, vec![
            UiEvent::Title(TITLE.into()),
            UiEvent::Image(FALLBACK_IMAGE_URL.into()),
        ]);
    }

    #[test]
    fn missing_banner_image_warns_and_falls_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("img.png");
        let mut ui = ScriptedUi::new(&[]);
        show_banner(&mut ui, Some(&missing));
        assert!(ui.events.contains(&UiEvent::Warning(
            "Image not found! Using default image.".into()
        )));
        assert!(ui.events.contains(&UiEvent::Image(FALLBACK_IMAGE_URL.into())));
    }

    #[tokio::test]
    async fn interactive_session_retries_after_an_error() {
        let mut ui = ScriptedUi::new(&[
            "", "", "", "", "", "", "", "", "y",
            "Lisbon", "", "", "", "", "", "", "", "n",
        ]);
        let summary = run_session(&planner(), &mut ui, TripDraft::default(), options(true))
            .await
            .expect("session");
        assert_eq!(summary, SessionSummary { planned: 1, failed: 1 });
        assert_eq!(ui.errors(), vec!["Please enter a destination."]);
        assert_eq!(ui.displays(), vec!["**DAY 1**"]);
    }

    #[tokio::test]
    async fn non_interactive_session_runs_once_from_the_draft() {
        let draft = TripDraft {
            destination: Some("Lisbon".into()),
            end_date: Some(date(2024, 6, 3)),
            ..TripDraft::default()
        };
        let mut ui = ScriptedUi::new(&[]);
        let summary = run_session(&planner(), &mut ui, draft, options(false))
            .await
            .expect("session");
        assert_eq!(summary, SessionSummary { planned: 1, failed: 0 });
    }
}
