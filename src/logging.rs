//! Tracing subscriber setup.
//!
//! Console output is plain text or JSON. When a log directory is set, a
//! second non-blocking layer writes `{dir}/{prefix}.YYYY-MM-DD`, rolled
//! daily. The filter comes from `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::ScoutError;

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ScoutError::Config(format!("unknown log format {other:?}"))),
        }
    }
}

/// Where and how to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Directory of the daily log files. `None` logs to the console only.
    pub dir: Option<PathBuf>,
    /// File name prefix of the daily log files.
    pub file_prefix: String,
    /// Console format.
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: "event-scout".into(),
            format: LogFormat::Text,
        }
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive until the process exits.
///
/// # Errors
///
/// Returns [`ScoutError::Config`] if the log directory cannot be used and
/// [`ScoutError::Internal`] if a global subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>, ScoutError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = settings.format == LogFormat::Json;
    let console_text = (!json).then(|| fmt::layer());
    let console_json = json.then(|| fmt::layer().json());

    let mut guard = None;
    let file = match &settings.dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(settings.file_prefix.as_str())
                .build(dir)
                .map_err(|e| ScoutError::Config(format!("log dir {}: {e}", dir.display())))?;
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_text)
        .with(console_json)
        .with(file)
        .try_init()
        .map_err(|e| ScoutError::Internal(format!("logging already initialised: {e}")))?;

    Ok(guard)
}
