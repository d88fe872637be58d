//! Scout configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Unset or malformed numbers fall back to their defaults;
//! [`ScoutConfig::validate`] rejects values a run cannot work with.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::domain::{EventLinks, InterestCriteria};
use crate::error::ScoutError;
use crate::fetcher::{HttpFetcherConfig, RetryPolicy};
use crate::logging::{LogFormat, LogSettings};
use crate::service::ScanSettings;

const DEFAULT_BASE_URL: &str = "https://www.showstart.com";
const DEFAULT_MOBILE_TEMPLATE: &str =
    "https://wap.showstart.com/pages/activity/detail/detail?activityId={id}";
const DEFAULT_TITLE_EXCLUSIONS: &str = "夜猫俱乐部,【JZ Club】";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Top-level scout configuration.
///
/// Loaded once at startup via [`ScoutConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// SQLite file of the status store.
    pub database_path: PathBuf,

    /// Canonical site root. Probes go to `{base_url}/event/{id}`.
    pub base_url: String,

    /// Mobile detail URL with an `{id}` placeholder.
    pub mobile_url_template: String,

    /// Venue prefixes of the home cities.
    pub home_cities: Vec<String>,

    /// Venue prefixes of cities worth an afternoon trip.
    pub secondary_cities: Vec<String>,

    /// Label substrings marking an interesting event.
    pub interest_tags: Vec<String>,

    /// Title substrings that veto an event.
    pub title_exclusions: Vec<String>,

    /// Lowest identifier a scan may start from.
    pub initial_event_id: u64,

    /// Consecutive not-found probes that end a scan.
    pub max_not_found: u64,

    /// Provisional identifiers re-fetched per run.
    pub max_reverify: usize,

    /// Attempts per probe, including the first.
    pub fetch_max_attempts: u32,

    /// Delay before every fetch attempt, in milliseconds.
    pub fetch_delay_ms: u64,

    /// Per-request timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// `User-Agent` sent with every probe.
    pub user_agent: String,

    /// Digest webhook. `None` delivers to the log only.
    pub webhook_url: Option<String>,

    /// Logging output.
    pub log: LogSettings,
}

impl ScoutConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if `LOG_FORMAT` is not recognised.
    pub fn from_env() -> Result<Self, ScoutError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if `LOG_FORMAT` is not recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScoutError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let log = LogSettings {
            dir: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            file_prefix: text("LOG_FILE_PREFIX", "event-scout"),
            format: lookup("LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or_default(),
        };

        Ok(Self {
            database_path: PathBuf::from(text("SCOUT_DATABASE_PATH", "event-scout.db")),
            base_url: text("SCOUT_BASE_URL", DEFAULT_BASE_URL),
            mobile_url_template: text("SCOUT_MOBILE_URL_TEMPLATE", DEFAULT_MOBILE_TEMPLATE),
            home_cities: parse_list(lookup("SCOUT_HOME_CITIES").as_deref().unwrap_or("")),
            secondary_cities: parse_list(lookup("SCOUT_SECONDARY_CITIES").as_deref().unwrap_or("")),
            interest_tags: parse_list(lookup("SCOUT_INTEREST_TAGS").as_deref().unwrap_or("")),
            title_exclusions: parse_list(
                lookup("SCOUT_TITLE_EXCLUSIONS")
                    .as_deref()
                    .unwrap_or(DEFAULT_TITLE_EXCLUSIONS),
            ),
            initial_event_id: parse_var(&lookup, "SCOUT_INITIAL_EVENT_ID", 0),
            max_not_found: parse_var(&lookup, "SCOUT_MAX_NOT_FOUND", 20),
            max_reverify: parse_var(&lookup, "SCOUT_MAX_REVERIFY", 50),
            fetch_max_attempts: parse_var(&lookup, "SCOUT_FETCH_MAX_ATTEMPTS", 5),
            fetch_delay_ms: parse_var(&lookup, "SCOUT_FETCH_DELAY_MS", 1_000),
            fetch_timeout_secs: parse_var(&lookup, "SCOUT_FETCH_TIMEOUT_SECS", 30),
            user_agent: text("SCOUT_USER_AGENT", DEFAULT_USER_AGENT),
            webhook_url: lookup("SCOUT_WEBHOOK_URL").filter(|v| !v.trim().is_empty()),
            log,
        })
    }

    /// Checks values a run cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] for a zero streak threshold, zero
    /// fetch attempts, or an unparsable URL.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.max_not_found == 0 {
            return Err(ScoutError::Config(
                "SCOUT_MAX_NOT_FOUND must be at least 1".into(),
            ));
        }
        if self.fetch_max_attempts == 0 {
            return Err(ScoutError::Config(
                "SCOUT_FETCH_MAX_ATTEMPTS must be at least 1".into(),
            ));
        }
        check_url("SCOUT_BASE_URL", &self.base_url)?;
        if !self.mobile_url_template.contains(EventLinks::ID_PLACEHOLDER) {
            return Err(ScoutError::Config(format!(
                "SCOUT_MOBILE_URL_TEMPLATE must contain {}",
                EventLinks::ID_PLACEHOLDER
            )));
        }
        check_url(
            "SCOUT_MOBILE_URL_TEMPLATE",
            &self
                .mobile_url_template
                .replace(EventLinks::ID_PLACEHOLDER, "0"),
        )?;
        if let Some(webhook) = &self.webhook_url {
            check_url("SCOUT_WEBHOOK_URL", webhook)?;
        }
        if self.home_cities.is_empty() && self.secondary_cities.is_empty() {
            tracing::warn!("no home or secondary city configured, nothing will be interesting");
        }
        Ok(())
    }

    /// Classification rules.
    #[must_use]
    pub fn criteria(&self) -> InterestCriteria {
        InterestCriteria {
            home_cities: self.home_cities.clone(),
            secondary_cities: self.secondary_cities.clone(),
            interest_tags: self.interest_tags.clone(),
            title_exclusions: self.title_exclusions.clone(),
        }
    }

    /// Link builder for the configured site.
    #[must_use]
    pub fn links(&self) -> EventLinks {
        EventLinks::new(&self.base_url, &self.mobile_url_template)
    }

    /// HTTP client settings of the fetcher.
    #[must_use]
    pub fn fetcher_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            user_agent: self.user_agent.clone(),
            retry: RetryPolicy {
                max_attempts: self.fetch_max_attempts,
                delay: Duration::from_millis(self.fetch_delay_ms),
            },
        }
    }

    /// Forward scan limits.
    #[must_use]
    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            floor: self.initial_event_id,
            max_not_found: self.max_not_found,
        }
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated list, dropping blank items.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn check_url(key: &str, raw: &str) -> Result<(), ScoutError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| ScoutError::Config(format!("{key}: {e}")))
}
