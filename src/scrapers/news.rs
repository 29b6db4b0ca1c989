//! Article-list scrapers for [GP](https://www.gp.se) and
//! [Aftonbladet](https://www.aftonbladet.se/nyheter).
//!
//! Each run follows the same two phases:
//!
//! 1. **Indexing**: fetch the front page with the retrying fetcher and collect
//!    the link of every teaser card, in document order.
//! 2. **Fetching**: visit each link once, extract title and body, and pause
//!    before the next one.
//!
//! A failing article (bad link, error status, markup without a title) is
//! logged with its position and skipped; it never aborts the batch. Only an
//! index page that cannot be fetched at all fails the run.
//!
//! # Source differences
//!
//! | Source | Article fetch | Body |
//! |--------|---------------|------|
//! | GP | no redirects, non-2xx skips the article | first matching content block |
//! | Aftonbladet | follows redirects, any status is parsed | all body paragraphs joined |

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{ItemError, ScrapeError, SelectorError};
use crate::fetch::{Fetcher, Redirects, Transport};
use crate::html::{HtmlDocument, Rule, SelectorRule, child_attr};
use crate::models::{ArticleBatch, ArticleRecord, RunStats};

/// How an article body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRule {
    /// First non-empty match of a fallback chain.
    Chain(SelectorRule),
    /// Text of every node matching the locator, joined without separator.
    Concat(&'static str),
}

/// How an individual article page is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFetch {
    /// No redirects; anything but 2xx skips the article.
    Strict,
    /// Follow redirects and hand whatever comes back to the extractor.
    Lenient,
}

/// A news site: where its index lives and how its pages are read.
#[derive(Debug, Clone)]
pub struct NewsSource {
    name: &'static str,
    index_url: String,
    base_url: String,
    teaser: &'static str,
    link: &'static str,
    title: SelectorRule,
    body: BodyRule,
    item_fetch: ItemFetch,
}

enum Outcome {
    Extracted(ArticleRecord),
    MissingLink,
    Failed,
}

struct Visit {
    outcome: Outcome,
    paused: bool,
}

impl NewsSource {
    pub fn gp() -> Self {
        Self {
            name: "gp",
            index_url: "https://www.gp.se".to_string(),
            base_url: "https://www.gp.se".to_string(),
            teaser: ".c-teaser",
            link: "a.c-teaser__link",
            title: SelectorRule::single(Rule::text("h1.c-article__heading").trimmed()),
            // `.c-article__lead` and `.c-article__body` are guesses at current
            // GP markup, not taken from a recorded page. The legacy `element`
            // locator comes last.
            body: BodyRule::Chain(SelectorRule::new(vec![
                Rule::text(".c-article__lead").trimmed(),
                Rule::text(".c-article__body").trimmed(),
                Rule::text("element").trimmed(),
            ])),
            item_fetch: ItemFetch::Strict,
        }
    }

    pub fn aftonbladet() -> Self {
        Self {
            name: "aftonbladet",
            index_url: "https://www.aftonbladet.se/nyheter".to_string(),
            base_url: "https://www.aftonbladet.se/nyheter".to_string(),
            teaser: "div.hyperion-css-rakwf4",
            link: "a",
            title: SelectorRule::single(Rule::text("h1.h1.hyperion-css-5tht1q").trimmed()),
            body: BodyRule::Concat("p.hyperion-css-n38mho"),
            item_fetch: ItemFetch::Lenient,
        }
    }

    /// Use `index_url` as the front page and resolve article links against
    /// `base_url`.
    pub fn with_urls(
        mut self,
        index_url: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.index_url = index_url.into();
        self.base_url = base_url.into();
        self
    }

    /// Scrape the index and every linked article.
    pub async fn run<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        pause: Duration,
    ) -> Result<ArticleBatch, ScrapeError> {
        self.run_with_stats(fetcher, pause).await.map(|(batch, _)| batch)
    }

    /// [`NewsSource::run`], also returning the run's counters.
    #[instrument(level = "info", skip_all, fields(source = self.name, url = %self.index_url))]
    pub async fn run_with_stats<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        pause: Duration,
    ) -> Result<(ArticleBatch, RunStats), ScrapeError> {
        let index = fetcher.fetch(&self.index_url).await?;
        let links = self.discover(&index.body)?;
        let total = links.len();
        info!(total, "Fetching {} articles from {}", total, self.index_url);

        let visits: Vec<Visit> = stream::iter(links.into_iter().enumerate())
            .then(|(i, link)| self.visit(fetcher, i + 1, total, link, pause))
            .collect()
            .await;

        let mut stats = RunStats {
            discovered: total,
            ..RunStats::default()
        };
        let mut batch = ArticleBatch::default();
        for visit in visits {
            if visit.paused {
                stats.pauses += 1;
            }
            match visit.outcome {
                Outcome::Extracted(record) => {
                    stats.extracted += 1;
                    batch.articles.push(record);
                }
                Outcome::Failed => stats.failed += 1,
                Outcome::MissingLink => stats.missing_link += 1,
            }
        }

        info!(
            total,
            extracted = stats.extracted,
            failed = stats.failed,
            missing_link = stats.missing_link,
            "Done"
        );
        Ok((batch, stats))
    }

    /// Links of all teaser cards, `None` for cards without one.
    pub fn discover(&self, index_body: &[u8]) -> Result<Vec<Option<String>>, SelectorError> {
        let doc = HtmlDocument::parse(index_body);
        let teasers = doc.find_all(self.teaser)?;
        teasers
            .iter()
            .map(|node| {
                child_attr(node, self.link, "href")
                    .map(|href| href.filter(|h| !h.trim().is_empty()))
            })
            .collect()
    }

    async fn visit<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        ordinal: usize,
        total: usize,
        link: Option<String>,
        pause: Duration,
    ) -> Visit {
        let Some(href) = link else {
            info!(article = ordinal, total, "Skipping article {}: teaser has no link", ordinal);
            return Visit {
                outcome: Outcome::MissingLink,
                paused: false,
            };
        };

        let outcome = match self.fetch_article(fetcher, &href).await {
            Ok(record) => {
                info!(
                    article = ordinal,
                    total,
                    title = %record.title,
                    "Article {} of {}",
                    ordinal,
                    total
                );
                Outcome::Extracted(record)
            }
            Err(e) => {
                warn!(
                    article = ordinal,
                    total,
                    %href,
                    error = %e,
                    "Skipping article {}",
                    ordinal
                );
                Outcome::Failed
            }
        };

        sleep(pause).await;
        Visit {
            outcome,
            paused: true,
        }
    }

    async fn fetch_article<T: Transport>(
        &self,
        fetcher: &Fetcher<T>,
        href: &str,
    ) -> Result<ArticleRecord, ItemError> {
        let url = resolve(&self.base_url, href)?;
        let page = match self.item_fetch {
            ItemFetch::Strict => fetcher.fetch_once(&url, Redirects::Refuse).await?,
            ItemFetch::Lenient => fetcher.fetch_lenient(&url, Redirects::Follow).await?,
        };
        self.extract_article(&url, &page.body)
    }

    /// Read title and body from an article page.
    pub fn extract_article(&self, url: &str, body: &[u8]) -> Result<ArticleRecord, ItemError> {
        let doc = HtmlDocument::parse(body);
        let title = doc
            .extract(&self.title)?
            .ok_or_else(|| ItemError::MissingTitle {
                url: url.to_string(),
            })?;

        let text = match &self.body {
            BodyRule::Chain(rule) => doc.extract(rule)?,
            BodyRule::Concat(locator) => {
                Some(doc.concat_text(locator)?).filter(|t| !t.trim().is_empty())
            }
        };
        let body = text.ok_or_else(|| ItemError::MissingBody {
            url: url.to_string(),
        })?;

        Ok(ArticleRecord { title, body })
    }
}

/// Resolve an article `href` against the site's base URL. Absolute links
/// are kept as they are.
fn resolve(base: &str, href: &str) -> Result<String, ItemError> {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .map_err(|source| ItemError::InvalidUrl {
            href: href.to_string(),
            source,
        })
}
