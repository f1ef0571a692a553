//! Process-wide `tracing` setup.
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "warn";
const DEFAULT_LOG_FILE: &str = "travel-planner.logs.jsonl";

/// Where log records go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    /// Compact lines on stderr, leaving stdout to the itinerary.
    Stderr,
    /// JSON lines appended to a file.
    JsonFile(PathBuf),
}

/// Logging settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    /// An `EnvFilter` directive such as `info` or `travel_planner=debug`.
    pub filter: String,
    pub sink: LogSink,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: DEFAULT_FILTER.to_string(),
            sink: LogSink::Stderr,
        }
    }
}

impl LogSettings {
    /// Reads `PLANNER_OBSERVABILITY_ENABLED`, `PLANNER_LOG_LEVEL`, `RUST_LOG`
    /// and `PLANNER_JSON_LOG_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LogSettings::from_env`] with variables taken from `lookup`.
    ///
    /// Unparseable values fall back to the defaults instead of failing start-up.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let enabled = lookup("PLANNER_OBSERVABILITY_ENABLED")
            .and_then(|value| parse_flag(&value))
            .unwrap_or(defaults.enabled);
        let filter = ["PLANNER_LOG_LEVEL", "RUST_LOG"]
            .into_iter()
            .filter_map(&lookup)
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty() && EnvFilter::try_new(value).is_ok())
            .unwrap_or(defaults.filter);
        let sink = lookup("PLANNER_JSON_LOG_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map_or(defaults.sink, |path| LogSink::JsonFile(PathBuf::from(path)));
        Self {
            enabled,
            filter,
            sink,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Splits a log path into the directory to create and the file name to append to.
fn log_file_target(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Installs the global subscriber described by `settings`.
///
/// Only the first call in a process has any effect.
pub fn init_observability(settings: &LogSettings) {
    INIT.get_or_init(|| {
        if !settings.enabled {
            return;
        }
        let env_filter =
            EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        match &settings.sink {
            LogSink::JsonFile(path) => {
                let (dir, file_name) = log_file_target(path);
                let _ = std::fs::create_dir_all(&dir);
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(false)
                    .with_writer(tracing_appender::rolling::never(dir, file_name));
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            LogSink::Stderr => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init();
            }
        }
    });
}
