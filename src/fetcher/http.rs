//! HTTP implementation of the event fetcher.
//!
//! Probes `{base}/event/{id}` with reqwest, one request at a time:
//!
//! - a fixed politeness delay precedes every attempt;
//! - `404` short-circuits to [`ProbeOutcome::NotFound`] without retry;
//! - transport failures and any other non-2xx status are retried up to
//!   [`RetryPolicy::max_attempts`], then reported as
//!   [`ProbeOutcome::FetchError`];
//! - a 2xx body is parsed with [`PageSelectors`] and classified with
//!   [`InterestCriteria`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use super::EventFetcher;
use super::extract::PageSelectors;
use crate::domain::{EventId, EventLinks, EventRecord, InterestCriteria, ProbeOutcome, Verdict};
use crate::error::ScoutError;

/// Attempt budget and spacing of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per probe, including the first.
    pub max_attempts: u32,
    /// Delay slept before every attempt.
    pub delay: Duration,
}

/// Client settings for [`HttpEventFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Retry policy.
    pub retry: RetryPolicy,
}

/// Fetches and classifies event pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventFetcher {
    client: reqwest::Client,
    links: EventLinks,
    selectors: PageSelectors,
    criteria: InterestCriteria,
    retry: RetryPolicy,
}

impl HttpEventFetcher {
    /// Builds a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the HTTP client cannot be built or
    /// the page selectors fail to compile.
    pub fn new(
        config: &HttpFetcherConfig,
        links: EventLinks,
        criteria: InterestCriteria,
    ) -> Result<Self, ScoutError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ScoutError::Config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            links,
            selectors: PageSelectors::listing_site()?,
            criteria,
            retry: config.retry,
        })
    }

    /// Downloads the page of `id`. `Ok(None)` means the site answered 404.
    async fn download(&self, id: EventId) -> Result<Option<String>, ScoutError> {
        let url = self.links.canonical(id);
        let attempts = self.retry.max_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            tokio::time::sleep(self.retry.delay).await;

            match self.client.get(&url).send().await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    tracing::debug!(event_id = %id, attempt, "event not found");
                    return Ok(None);
                }
                Ok(response) if response.status().is_success() => {
                    return response
                        .text()
                        .await
                        .map(Some)
                        .map_err(|e| ScoutError::Parse(format!("reading body of {url}: {e}")));
                }
                Ok(response) => {
                    last_failure = format!("HTTP {}", response.status());
                }
                Err(e) => {
                    last_failure = format!("request to {url} failed: {e}");
                }
            }

            tracing::debug!(
                event_id = %id,
                attempt,
                max_attempts = attempts,
                failure = %last_failure,
                "probe attempt failed"
            );
        }

        Err(ScoutError::Fetch(format!(
            "{last_failure} after {attempts} attempts"
        )))
    }

    fn classify(&self, id: EventId, html: &str) -> ProbeOutcome {
        let page = self.selectors.extract(html);

        match self.criteria.classify(&page) {
            Verdict::Interesting => ProbeOutcome::Interesting(EventRecord {
                id,
                name: page.title,
                time: page.time,
                artist: page.artist,
                venue: page.venue,
                price: page.price,
                canonical_url: String::new(),
                mobile_url: String::new(),
            }),
            Verdict::NotInterested => ProbeOutcome::NotInterested {
                title: page.title,
                time: page.time,
            },
        }
    }
}

#[async_trait]
impl EventFetcher for HttpEventFetcher {
    async fn fetch(&self, id: EventId) -> ProbeOutcome {
        match self.download(id).await {
            Ok(Some(html)) => self.classify(id, &html),
            Ok(None) => ProbeOutcome::NotFound,
            Err(e) => ProbeOutcome::FetchError {
                reason: e.to_string(),
            },
        }
    }
}
