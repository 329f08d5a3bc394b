//! HTTP client with retry logic for profile pages
//!
//! Every request is retried immediately on transient failure, up to a fixed
//! number of attempts. A 404 is a terminal answer and is never retried.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::error::{Result, ScraperError};
use crate::url::build_page_url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout in seconds (default: 5)
    pub timeout_secs: u64,
    /// Maximum attempts per request, first try included (default: 10)
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_attempts: 10,
        }
    }
}

/// Answer to a single page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// HTTP 2xx with the response body
    Body(String),
    /// HTTP 404, the listing has no such page
    NotFound,
}

/// A successful or not-found response, with the URL reached after redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub final_url: String,
    pub outcome: PageOutcome,
}

/// Source of listing pages
///
/// Implemented by [`ProfileClient`]; the collector only depends on this
/// trait so it can be driven by any page source.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetches page `page` (1-based) of the listing at `listing_url`
    async fn fetch_page(&self, listing_url: &str, page: u32) -> Result<PageOutcome>;
}

/// HTTP client wrapper with retry logic
///
/// Owns one `reqwest::Client`, so the connection pool is reused for every
/// page of a run and released when the wrapper is dropped.
pub struct ProfileClient {
    client: reqwest::Client,
    max_attempts: u32,
}

impl ProfileClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(ScraperError::Http)?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Maximum attempts per request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetch a URL, retrying transient failures
    ///
    /// # Errors
    /// - `RetriesExhausted` when every attempt failed transiently
    /// - `Http` for errors that cannot be fixed by retrying
    pub async fn fetch(&self, url: &str) -> Result<Fetched> {
        let mut attempt = 1;

        loop {
            match self.do_fetch(url).await {
                Ok(fetched) => return Ok(fetched),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(url, attempt, max_attempts = self.max_attempts, error = %e, "request failed, retrying");
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    warn!(url, attempts = attempt, error = %e, "request failed, giving up");
                    return Err(ScraperError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Perform a single attempt
    async fn do_fetch(&self, url: &str) -> Result<Fetched> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::NOT_FOUND {
            debug!(url, "not found");
            return Ok(Fetched {
                final_url,
                outcome: PageOutcome::NotFound,
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched");

        Ok(Fetched {
            final_url,
            outcome: PageOutcome::Body(body),
        })
    }
}

impl PageSource for ProfileClient {
    async fn fetch_page(&self, listing_url: &str, page: u32) -> Result<PageOutcome> {
        let url = build_page_url(listing_url, page);
        Ok(self.fetch(&url).await?.outcome)
    }
}
