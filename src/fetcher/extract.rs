//! Positional field extraction from an event page.
//!
//! The listing site renders every event page from the same template, so
//! fields are located by fixed CSS paths rather than by semantic markup.
//! A path that matches nothing yields an empty string.

use scraper::{Html, Selector};

use crate::domain::PageFields;
use crate::error::ScoutError;

const DESCRIBE: &str = "#__layout > section > main > div > div.product > div > div.describe";
const PRICE: &str = "#__layout > section > main > div > div.product > div > div.buy > div.price-tags";

/// Label the site prints in front of the start time.
pub const TIME_LABEL: &str = "演出时间：";

/// Compiled CSS paths of the event page fields.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    venue: Selector,
    time: Selector,
    labels: Selector,
    title: Selector,
    artist: Selector,
    price: Selector,
}

impl PageSelectors {
    /// Compiles the selectors of the listing site's event page template.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if a selector fails to compile.
    pub fn listing_site() -> Result<Self, ScoutError> {
        Ok(Self {
            venue: compile(&format!("{DESCRIBE} > p:nth-child(4) > a"))?,
            time: compile(&format!("{DESCRIBE} > p:nth-child(2)"))?,
            labels: compile(&format!("{DESCRIBE} > div.label"))?,
            title: compile(&format!("{DESCRIBE} > div.title"))?,
            artist: compile(&format!("{DESCRIBE} > p:nth-child(3) > a"))?,
            price: compile(PRICE)?,
        })
    }

    /// Extracts all fields from an HTML document.
    #[must_use]
    pub fn extract(&self, html: &str) -> PageFields {
        let document = Html::parse_document(html);
        let time = text_of(&document, &self.time);

        PageFields {
            venue: text_of(&document, &self.venue),
            time: time
                .strip_prefix(TIME_LABEL)
                .map_or(time.as_str(), str::trim)
                .to_string(),
            labels: text_of(&document, &self.labels),
            title: text_of(&document, &self.title),
            artist: text_of(&document, &self.artist),
            price: text_of(&document, &self.price),
        }
    }
}

fn compile(css: &str) -> Result<Selector, ScoutError> {
    Selector::parse(css).map_err(|e| ScoutError::Config(format!("selector `{css}`: {e}")))
}

/// Concatenated, trimmed text of every element matching `selector`.
fn text_of(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal pages following the listing site's template.

    /// Builds an event page with the given field values.
    pub(crate) fn event_page(title: &str, time: &str, venue: &str, labels: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><head><title>{title}</title></head><body>
<div id="__layout"><section><main><div><div class="product"><div>
  <div class="describe">
    <div class="title">{title}</div>
    <p>演出时间：{time}</p>
    <p>艺人：<a href="/artist/1">Echo Band</a></p>
    <p>场地：<a href="/venue/1">{venue}</a></p>
    <div class="label"><span>{labels}</span></div>
  </div>
  <div class="buy"><div class="price-tags">¥180-280</div></div>
</div></div></div></main></section></div>
</body></html>"#
        )
    }
}
