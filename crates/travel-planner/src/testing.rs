//! Test doubles shared by the planner's unit tests.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use futures::stream;
use itinerary_harness::{
    Harness, ModelRef, ProviderAdapter, ProviderError, ProviderEvent, ProviderId, ProviderRequest,
    ProviderStreamHandle,
};

use crate::banner::BannerImage;
use crate::errors::UiError;
use crate::ui::FormUi;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Title(String),
    Image(String),
    Warning(String),
    Error(String),
    Spinner(String),
    SpinnerCleared,
    Display(String),
}

/// Form front-end that answers prompts from a script and records output.
#[derive(Default)]
pub struct ScriptedUi {
    answers: VecDeque<String>,
    pub events: Vec<UiEvent>,
}

impl ScriptedUi {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            events: Vec::new(),
        }
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn displays(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Display(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn next_answer(&mut self) -> Result<String, UiError> {
        self.answers.pop_front().ok_or(UiError::Closed)
    }
}

impl FormUi for ScriptedUi {
    fn show_title(&mut self, title: &str) {
        self.events.push(UiEvent::Title(title.into()));
    }

    fn show_image(&mut self, image: &BannerImage, _caption: &str) {
        self.events.push(UiEvent::Image(image.to_string()));
    }

    fn show_warning(&mut self, message: &str) {
        self.events.push(UiEvent::Warning(message.into()));
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(UiEvent::Error(message.into()));
    }

    fn show_spinner(&mut self, label: &str) {
        self.events.push(UiEvent::Spinner(label.into()));
    }

    fn clear_spinner(&mut self) {
        self.events.push(UiEvent::SpinnerCleared);
    }

    fn display_text(&mut self, content: &str) {
        self.events.push(UiEvent::Display(content.into()));
    }

    fn input_text(&mut self, _label: &str) -> Result<String, UiError> {
        self.next_answer()
    }

    fn input_date(&mut self, _label: &str, min: NaiveDate) -> Result<NaiveDate, UiError> {
        let answer = self.next_answer()?;
        if answer.is_empty() {
            return Ok(min);
        }
        Ok(NaiveDate::parse_from_str(&answer, "%Y-%m-%d").unwrap_or(min))
    }

    fn input_choice(&mut self, _label: &str, options: &[&str]) -> Result<usize, UiError> {
        let answer = self.next_answer()?;
        Ok(options
            .iter()
            .position(|o| o.eq_ignore_ascii_case(&answer))
            .unwrap_or(0))
    }

    fn confirm(&mut self, _label: &str) -> Result<bool, UiError> {
        Ok(self.next_answer()? == "y")
    }
}

pub enum FakeBehavior {
    ImmediateError(ProviderError),
    Events(Vec<Result<ProviderEvent, ProviderError>>),
}

/// Provider that replays canned events and records every request.
pub struct FakeProvider {
    seen: Arc<Mutex<Vec<ProviderRequest>>>,
    behavior: FakeBehavior,
}

#[async_trait::async_trait]
impl ProviderAdapter for FakeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new("fake")
    }

    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError> {
        self.seen.lock().expect("lock").push(req);
        match &self.behavior {
            FakeBehavior::ImmediateError(err) => Err(err.clone()),
            FakeBehavior::Events(events) => Ok(ProviderStreamHandle {
                stream: Box::pin(stream::iter(events.clone())),
            }),
        }
    }
}

pub fn fake_harness(behavior: FakeBehavior) -> (Harness, ModelRef, Arc<Mutex<Vec<ProviderRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let harness = Harness::builder()
        .register_provider(Arc::new(FakeProvider {
            seen: seen.clone(),
            behavior,
        }))
        .build()
        .expect("build harness");
    (harness, ModelRef::new("fake", "mistral"), seen)
}

pub fn delta(text: &str) -> Result<ProviderEvent, ProviderError> {
    Ok(ProviderEvent::TextDelta { text: text.into() })
}

pub fn completed() -> Result<ProviderEvent, ProviderError> {
    Ok(ProviderEvent::Completed {
        finish_reason: Some("eos".into()),
    })
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
