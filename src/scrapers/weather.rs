//! Single-page weather scrapers for [yr.no](https://www.yr.no) and
//! [klart.se](https://klart.se).
//!
//! Both sources are one fixed URL (Karlstad) and one fixed set of fields.
//! The page is fetched with the retrying [`Fetcher`], parsed once, and every
//! field is looked up through its fallback chain. A field that no rule can
//! find fails the whole run; there is no partially filled record.
//!
//! # Markup variants
//!
//! | Source | Field | Variants |
//! |--------|-------|----------|
//! | Yr | temperature | `temperature--cold` or `temperature--warm` |
//! | Klart | precipitation | normal `rain-value` or `rain-value -disabled` |

use once_cell::sync::Lazy;
use tracing::{debug, info, instrument};

use crate::encode::encode;
use crate::error::ScrapeError;
use crate::fetch::{Fetcher, Transport};
use crate::html::{HtmlDocument, Rule, SelectorRule};
use crate::models::WeatherRecord;

const YR_PATH: &str =
    "https://www.yr.no/nb/værvarsel/daglig-tabell/2-2701680/Sverige/Värmland/Karlstads%20Kommun/Karlstad";

static YR_URL: Lazy<String> = Lazy::new(|| encode(YR_PATH));

static KLART_URL: Lazy<String> =
    Lazy::new(|| encode("https://klart.se/se/värmlands-län/väder-karlstad/"));

/// Length of the "Temperatur" label Yr renders in front of the value.
const YR_TEMPERATURE_LABEL: usize = 10;

/// Length of the "Prognos:" prefix of Klart's weather icon label.
const KLART_CONDITION_PREFIX: usize = 8;

/// Fallback chains for the four weather fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRules {
    pub temperature: SelectorRule,
    pub condition: SelectorRule,
    pub wind: SelectorRule,
    pub precipitation: SelectorRule,
}

/// A weather site: where to fetch and how to read it.
#[derive(Debug, Clone)]
pub struct WeatherSource {
    name: &'static str,
    url: String,
    rules: WeatherRules,
}

impl WeatherSource {
    pub fn yr() -> Self {
        Self {
            name: "yr",
            url: YR_URL.clone(),
            rules: WeatherRules {
                // Either variant may be present; the first in the document is
                // the current reading, the rest belong to the forecast table.
                temperature: SelectorRule::single(
                    Rule::text(".temperature.temperature--cold, .temperature.temperature--warm")
                        .skip_chars(YR_TEMPERATURE_LABEL),
                ),
                condition: SelectorRule::single(Rule::attr("img.weather-symbol__img", "alt")),
                wind: SelectorRule::single(Rule::text(
                    ".wind__value.now-hero__next-hour-wind-value",
                )),
                precipitation: SelectorRule::single(Rule::text(
                    ".now-hero__next-hour-precipitation-value",
                )),
            },
        }
    }

    pub fn klart() -> Self {
        Self {
            name: "klart",
            url: KLART_URL.clone(),
            rules: WeatherRules {
                temperature: SelectorRule::single(Rule::text(".temp-high")),
                condition: SelectorRule::single(
                    Rule::attr("svg[aria-label]", "aria-label").skip_chars(KLART_CONDITION_PREFIX),
                ),
                wind: SelectorRule::single(Rule::text(".item-child.wind-value").trimmed()),
                precipitation: SelectorRule::new(vec![
                    Rule::text(".item-child.rain-value:not(.-disabled)").trimmed(),
                    Rule::text(".item-child.rain-value.-disabled").trimmed(),
                ]),
            },
        }
    }

    /// Point the source at a different URL, keeping its rules.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page and extract one record.
    #[instrument(level = "info", skip_all, fields(source = self.name, url = %self.url))]
    pub async fn run<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
    ) -> Result<WeatherRecord, ScrapeError> {
        let page = fetcher.fetch(&self.url).await?;
        debug!(bytes = page.body.len(), attempts = page.attempts, "Fetched weather page");

        let record = self.extract(&HtmlDocument::parse(&page.body))?;
        info!(
            temperature = %record.temperature,
            condition = %record.condition,
            "Extracted weather"
        );
        Ok(record)
    }

    /// Read all four fields from an already parsed page.
    pub fn extract(&self, doc: &HtmlDocument) -> Result<WeatherRecord, ScrapeError> {
        let field = |field: &'static str, rule: &SelectorRule| -> Result<String, ScrapeError> {
            doc.extract(rule)?.ok_or(ScrapeError::Field {
                source_name: self.name,
                field,
            })
        };

        Ok(WeatherRecord {
            temperature: field("temperature", &self.rules.temperature)?,
            condition: field("condition", &self.rules.condition)?,
            wind: field("wind", &self.rules.wind)?,
            precipitation: field("precipitation", &self.rules.precipitation)?,
        })
    }
}
