//! Source-specific scrapers.
//!
//! Each scraper owns its fixed URL(s) and selector rules and borrows a shared
//! [`Fetcher`](crate::fetch::Fetcher) for the network side.
//!
//! # Supported Sources
//!
//! | Source | Module | Output | Notes |
//! |--------|--------|--------|-------|
//! | Yr | [`weather`] | `WeatherRecord` | Karlstad daily table; cold/warm temperature variants |
//! | Klart | [`weather`] | `WeatherRecord` | Karlstad; normal/disabled precipitation variants |
//! | GP | [`news`] | `ArticleBatch` | Front-page teasers, redirects refused |
//! | Aftonbladet | [`news`] | `ArticleBatch` | News section teasers, paragraphs joined |
//!
//! # Common Patterns
//!
//! - Whole pages (weather pages, news indexes) use the retrying fetch.
//! - Individual articles get one attempt; failures are logged and skipped.
//! - Parsed documents are dropped before the next `.await`.

pub mod news;
pub mod weather;

pub use news::NewsSource;
pub use weather::WeatherSource;
