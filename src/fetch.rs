//! HTTP fetching with failure classification and exponential backoff.
//!
//! The fetch layer is split in two, mirroring a client/decorator design:
//!
//! - [`Transport`]: performs exactly one GET and reports what came back.
//!   [`HttpTransport`] is the `reqwest` implementation; tests substitute
//!   scripted transports.
//! - [`Fetcher`]: classifies the response (see [`FetchError::class`]) and,
//!   for whole-page fetches, retries transient failures under a
//!   [`RetryPolicy`].
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```
//!
//! With the default settings the delays are roughly 1s, 2s, 4s, 8s, 16s, 30s,
//! 30s before the eighth attempt gives up. A policy without an attempt
//! ceiling never gives up on transient errors; callers that use one should
//! bound the call with a deadline.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::{Rng, rng};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Settings;
use crate::error::{FailureClass, FetchError, ScrapeError};

const DEFAULT_USER_AGENT: &str = concat!("skrapa/", env!("CARGO_PKG_VERSION"));

/// Upper bound of the random jitter added to every non-zero backoff delay.
const MAX_JITTER_MS: u64 = 250;

/// A fetched page. Lives only as long as the extraction that consumes it.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after any redirects.
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    /// How many requests it took to get this page.
    pub attempts: u32,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Whether a request may follow HTTP redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirects {
    Follow,
    Refuse,
}

/// One HTTP GET, no retries, no status interpretation.
pub trait Transport {
    /// Fetch `url`. Any HTTP status is returned as a [`Page`]; only failures
    /// to obtain a response are errors.
    fn get(
        &self,
        url: &str,
        redirects: Redirects,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

/// [`Transport`] backed by two `reqwest` clients, one per redirect policy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    follow: reqwest::Client,
    refuse: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let ua = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        let follow = reqwest::Client::builder().user_agent(ua).build()?;
        let refuse = reqwest::Client::builder()
            .user_agent(ua)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { follow, refuse })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, redirects: Redirects) -> Result<Page, FetchError> {
        let client = match redirects {
            Redirects::Follow => &self.follow,
            Redirects::Refuse => &self.refuse,
        };
        let transport_err = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = client.get(url).send().await.map_err(transport_err)?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.bytes().await.map_err(transport_err)?.to_vec();
        debug!(%url, status, bytes = body.len(), "GET complete");

        Ok(Page {
            url: final_url,
            status,
            body,
            attempts: 1,
        })
    }
}

/// Bounded (or unbounded) exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first. `None` retries forever.
    max_attempts: Option<u32>,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Settings::default().retry_policy()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: Option<u32>, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.map(|n| n.max(1)),
            base_delay,
            max_delay,
        }
    }

    /// Retry forever. Only sensible under a caller deadline.
    pub fn unbounded(base_delay: Duration, max_delay: Duration) -> Self {
        Self::new(None, base_delay, max_delay)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// True once `attempts` requests have been made and no more are allowed.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Backoff before the attempt following failed attempt `attempt`
    /// (1-indexed), without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay_for(attempt);
        if delay.is_zero() {
            return delay;
        }
        delay + Duration::from_millis(rng().random_range(0..=MAX_JITTER_MS))
    }
}

/// Fetches pages through a [`Transport`], classifying and retrying failures.
///
/// A `Fetcher` holds no per-request state, so one instance can serve any
/// number of extractors, sequentially or concurrently.
#[derive(Debug, Clone)]
pub struct Fetcher<T = HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl Fetcher<HttpTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self, ScrapeError> {
        let transport =
            HttpTransport::new(settings.user_agent.as_deref()).map_err(ScrapeError::Client)?;
        Ok(Self::new(transport, settings.retry_policy()))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetch a whole page, retrying transient failures.
    ///
    /// Every failed attempt is logged with its attempt number and the delay
    /// before the next one. Returns the first 2xx response, a fatal error as
    /// soon as it occurs, or [`FetchError::Exhausted`] when the policy runs
    /// out of attempts.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.fetch_once(url, Redirects::Follow).await {
                Ok(mut page) => {
                    page.attempts = attempt;
                    if attempt > 1 {
                        info!(
                            attempt,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            "fetch succeeded after retrying"
                        );
                    }
                    return Ok(page);
                }
                Err(e) if e.class() == FailureClass::Fatal => {
                    error!(attempt, error = %e, "fetch failed; not retrying");
                    return Err(e);
                }
                Err(e) => {
                    if self.policy.exhausted(attempt) {
                        error!(
                            attempt,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    let delay = self.policy.jittered_delay(attempt);
                    warn!(
                        attempt,
                        max = ?self.policy.max_attempts,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch failed; retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// One attempt; a non-2xx status is an error.
    pub async fn fetch_once(&self, url: &str, redirects: Redirects) -> Result<Page, FetchError> {
        let page = self.transport.get(url, redirects).await?;
        if page.is_success() {
            Ok(page)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: page.status,
            })
        }
    }

    /// One attempt; the page is returned whatever its status.
    pub async fn fetch_lenient(
        &self,
        url: &str,
        redirects: Redirects,
    ) -> Result<Page, FetchError> {
        let page = self.transport.get(url, redirects).await?;
        if !page.is_success() {
            debug!(%url, status = page.status, "keeping non-success page");
        }
        Ok(page)
    }
}
