//! Interesting events and their derived links.

use serde::Serialize;

use super::EventId;

/// Fields of an event judged interesting, ready for the digest.
///
/// Never persisted: only the identifier's status survives the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Identifier the record was fetched for.
    pub id: EventId,
    /// Event title.
    pub name: String,
    /// Free-text start time as shown on the page.
    pub time: String,
    /// Performing artist(s).
    pub artist: String,
    /// Venue text, starting with the city.
    pub venue: String,
    /// Price text.
    pub price: String,
    /// Canonical page URL. Filled by the caller via [`EventLinks`].
    pub canonical_url: String,
    /// Mobile page URL. Filled by the caller via [`EventLinks`].
    pub mobile_url: String,
}

/// Builds the canonical and mobile URLs of an identifier.
#[derive(Debug, Clone)]
pub struct EventLinks {
    base_url: String,
    mobile_template: String,
}

impl EventLinks {
    /// Placeholder substituted with the identifier in the mobile template.
    pub const ID_PLACEHOLDER: &'static str = "{id}";

    /// Creates a link builder.
    ///
    /// `base_url` is the site root (trailing slashes are ignored).
    /// `mobile_template` must contain [`Self::ID_PLACEHOLDER`].
    #[must_use]
    pub fn new(base_url: &str, mobile_template: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            mobile_template: mobile_template.to_string(),
        }
    }

    /// URL probed for `id`: `{base}/event/{id}`.
    #[must_use]
    pub fn canonical(&self, id: EventId) -> String {
        format!("{}/event/{id}", self.base_url)
    }

    /// Mobile detail URL for `id`.
    #[must_use]
    pub fn mobile(&self, id: EventId) -> String {
        self.mobile_template
            .replace(Self::ID_PLACEHOLDER, &id.to_string())
    }

    /// Fills both derived URLs of `record`.
    pub fn fill(&self, record: &mut EventRecord) {
        record.canonical_url = self.canonical(record.id);
        record.mobile_url = self.mobile(record.id);
    }
}
