//! Interest classification of an event page.
//!
//! The rules are a pure function of the extracted [`PageFields`] and the
//! configured [`InterestCriteria`]:
//!
//! 1. venue starts with a home-city prefix and the labels contain an
//!    interest tag → interesting;
//! 2. otherwise, venue starts with a secondary-city prefix, the labels
//!    contain an interest tag and the start time contains one of the
//!    afternoon half-hour marks → interesting;
//! 3. otherwise → not interested;
//! 4. a title containing an exclusion substring is always not interested.

use serde::Serialize;

/// Afternoon start marks accepted for secondary-city events.
///
/// Matched as plain substrings of the free-text start time, so a time such
/// as `15:15` does not match.
pub const AFTERNOON_MARKS: [&str; 14] = [
    "12:00", "12:30", "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30",
    "17:00", "17:30", "18:00", "18:30",
];

/// Text fields extracted from an event page.
///
/// A field that could not be located on the page is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageFields {
    /// Venue text, conventionally prefixed with the city.
    pub venue: String,
    /// Start time text with the site's label prefix removed.
    pub time: String,
    /// Concatenated label/tag text.
    pub labels: String,
    /// Event title.
    pub title: String,
    /// Artist text.
    pub artist: String,
    /// Price text.
    pub price: String,
}

/// Outcome of [`InterestCriteria::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The event should be surfaced.
    Interesting,
    /// The event exists but is not worth surfacing.
    NotInterested,
}

/// Configured interest rules.
#[derive(Debug, Clone, Default)]
pub struct InterestCriteria {
    /// Venue prefixes of the home city.
    pub home_cities: Vec<String>,
    /// Venue prefixes of cities only worth an afternoon show.
    pub secondary_cities: Vec<String>,
    /// Label substrings marking an event as relevant.
    pub interest_tags: Vec<String>,
    /// Title substrings that always exclude an event.
    pub title_exclusions: Vec<String>,
}

impl InterestCriteria {
    /// Classifies a page.
    #[must_use]
    pub fn classify(&self, page: &PageFields) -> Verdict {
        if self.is_excluded_title(&page.title) {
            return Verdict::NotInterested;
        }
        if !self.has_interest_tag(&page.labels) {
            return Verdict::NotInterested;
        }
        if starts_with_any(&page.venue, &self.home_cities) {
            return Verdict::Interesting;
        }
        if starts_with_any(&page.venue, &self.secondary_cities) && is_afternoon(&page.time) {
            return Verdict::Interesting;
        }
        Verdict::NotInterested
    }

    fn has_interest_tag(&self, labels: &str) -> bool {
        self.interest_tags
            .iter()
            .any(|tag| !tag.is_empty() && labels.contains(tag.as_str()))
    }

    fn is_excluded_title(&self, title: &str) -> bool {
        self.title_exclusions
            .iter()
            .any(|needle| !needle.is_empty() && title.contains(needle.as_str()))
    }
}

fn starts_with_any(text: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && text.starts_with(prefix.as_str()))
}

fn is_afternoon(time: &str) -> bool {
    AFTERNOON_MARKS.iter().any(|mark| time.contains(mark))
}
