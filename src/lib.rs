//! # Skrapa
//!
//! Weather readings and news articles from sites that only publish HTML.
//!
//! The crate fetches a handful of fixed pages, reads them through ordered
//! fallback selectors and returns plain records for a presentation layer to
//! render:
//!
//! - [`get_yr_weather`] / [`get_klart_weather`]: one [`WeatherRecord`] each
//! - [`get_gp_articles`] / [`get_aftonbladet_articles`]: an [`ArticleBatch`]
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetch`]): HTTP GET with failure classification and
//!    bounded exponential backoff
//! 2. **Parsing** ([`html`]): best-effort HTML tree with fallback selector
//!    chains
//! 3. **Extraction** ([`scrapers`]): per-source rules producing normalized
//!    records, isolating per-article failures
//!
//! Every operation is sequential internally. Separate operations share no
//! mutable state and can run concurrently. A [`Pipeline`] built with a
//! deadline bounds each operation in time.

use std::future::Future;
use std::time::Duration;

use tracing::{instrument, warn};

pub mod config;
pub mod encode;
pub mod error;
pub mod fetch;
pub mod html;
pub mod models;
pub mod scrapers;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use error::{FetchError, ItemError, ScrapeError};
pub use fetch::{Fetcher, HttpTransport, RetryPolicy, Transport};
pub use models::{ArticleBatch, ArticleRecord, RunStats, WeatherRecord};
pub use scrapers::{NewsSource, WeatherSource};

/// The consumer-facing entry point: one fetcher, four sources.
#[derive(Debug, Clone)]
pub struct Pipeline<T = HttpTransport> {
    fetcher: Fetcher<T>,
    settings: Settings,
    yr: WeatherSource,
    klart: WeatherSource,
    gp: NewsSource,
    aftonbladet: NewsSource,
}

impl Pipeline<HttpTransport> {
    pub fn new(settings: Settings) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::from_settings(&settings)?;
        Ok(Self::with_fetcher(fetcher, settings))
    }
}

impl<T: Transport> Pipeline<T> {
    pub fn with_fetcher(fetcher: Fetcher<T>, settings: Settings) -> Self {
        Self {
            fetcher,
            settings,
            yr: WeatherSource::yr(),
            klart: WeatherSource::klart(),
            gp: NewsSource::gp(),
            aftonbladet: NewsSource::aftonbladet(),
        }
    }

    pub fn with_yr(mut self, source: WeatherSource) -> Self {
        self.yr = source;
        self
    }

    pub fn with_klart(mut self, source: WeatherSource) -> Self {
        self.klart = source;
        self
    }

    pub fn with_gp(mut self, source: NewsSource) -> Self {
        self.gp = source;
        self
    }

    pub fn with_aftonbladet(mut self, source: NewsSource) -> Self {
        self.aftonbladet = source;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn yr_weather(&self) -> Result<WeatherRecord, ScrapeError> {
        with_deadline(self.settings.deadline(), self.yr.run(&self.fetcher)).await
    }

    pub async fn klart_weather(&self) -> Result<WeatherRecord, ScrapeError> {
        with_deadline(self.settings.deadline(), self.klart.run(&self.fetcher)).await
    }

    pub async fn gp_articles(&self) -> Result<ArticleBatch, ScrapeError> {
        let pause = self.settings.rate_limit();
        with_deadline(self.settings.deadline(), self.gp.run(&self.fetcher, pause)).await
    }

    pub async fn aftonbladet_articles(&self) -> Result<ArticleBatch, ScrapeError> {
        let pause = self.settings.rate_limit();
        with_deadline(
            self.settings.deadline(),
            self.aftonbladet.run(&self.fetcher, pause),
        )
        .await
    }
}

/// Run `operation`, giving up with [`ScrapeError::Deadline`] once `deadline`
/// has passed. `None` waits for as long as the operation takes.
#[instrument(level = "debug", skip_all, fields(?deadline))]
pub async fn with_deadline<F, O>(
    deadline: Option<Duration>,
    operation: F,
) -> Result<O, ScrapeError>
where
    F: Future<Output = Result<O, ScrapeError>>,
{
    match deadline {
        None => operation.await,
        Some(limit) => match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?limit, "Deadline reached; abandoning operation");
                Err(ScrapeError::Deadline(limit))
            }
        },
    }
}

/// Current weather in Karlstad according to yr.no, with default settings.
pub async fn get_yr_weather() -> Result<WeatherRecord, ScrapeError> {
    Pipeline::new(Settings::default())?.yr_weather().await
}

/// Current weather in Karlstad according to klart.se, with default settings.
pub async fn get_klart_weather() -> Result<WeatherRecord, ScrapeError> {
    Pipeline::new(Settings::default())?.klart_weather().await
}

/// Articles linked from the gp.se front page, with default settings.
pub async fn get_gp_articles() -> Result<ArticleBatch, ScrapeError> {
    Pipeline::new(Settings::default())?.gp_articles().await
}

/// Articles linked from aftonbladet.se/nyheter, with default settings.
pub async fn get_aftonbladet_articles() -> Result<ArticleBatch, ScrapeError> {
    Pipeline::new(Settings::default())?.aftonbladet_articles().await
}
