//! Normalized records handed to the presentation layer.
//!
//! - [`WeatherRecord`]: one reading from a weather site
//! - [`ArticleRecord`]: one news article, title and body
//! - [`ArticleBatch`]: the articles of one index page, in discovery order
//! - [`RunStats`]: progress counters of one article-list run
//!
//! The serialized shapes are what existing templates consume, so the weather
//! keys are the Swedish labels and an article is a single `{title: body}` map.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A weather reading. Every field is the text as shown on the site, units
/// included; nothing is parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WeatherRecord {
    #[serde(rename = "Temperatur")]
    pub temperature: String,
    #[serde(rename = "Väder")]
    pub condition: String,
    #[serde(rename = "Vind")]
    pub wind: String,
    #[serde(rename = "Nederbörd")]
    pub precipitation: String,
}

/// A news article. Serializes as `{ "<title>": "<body>" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub body: String,
}

impl Serialize for ArticleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.title, &self.body)?;
        map.end()
    }
}

/// Articles from one index page. Titles are not deduplicated: two articles
/// with the same headline are two entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ArticleBatch {
    pub articles: Vec<ArticleRecord>,
}

impl ArticleBatch {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.articles.iter().map(|a| a.title.as_str())
    }
}

/// Counters for one article-list run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunStats {
    /// Teaser nodes found on the index page.
    pub discovered: usize,
    /// Articles that made it into the batch.
    pub extracted: usize,
    /// Teasers without a link; skipped without a fetch.
    pub missing_link: usize,
    /// Articles whose fetch or extraction failed.
    pub failed: usize,
    /// Rate-limit pauses taken.
    pub pauses: usize,
}
