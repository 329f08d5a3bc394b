//! Main scraper API for profile pages
//!
//! Combines URL validation, the HTTP client, the listing catalogue and the
//! incremental collector behind one type.

use std::path::PathBuf;

use tracing::info;

use crate::cache::{CacheStore, JsonFileCache, NoCache};
use crate::client::{ClientConfig, PageOutcome, ProfileClient};
use crate::collector::IncrementalCollector;
use crate::error::{Result, ScraperError};
use crate::listing::{Listing, ListingConfig};
use crate::parser::ListingExtractor;
use crate::types::Video;
use crate::url::{ProfileUrl, Site, parse_profile_url};

/// Everything needed to build a [`ProfileScraper`]
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Profile URL as given by the user
    pub url: String,
    pub client: ClientConfig,
    /// Cache file; `None` disables persistence
    pub cache_path: Option<PathBuf>,
    /// Ignore the stored cache but still write results
    pub discard_cache: bool,
    pub site: Site,
}

impl ScraperConfig {
    /// Configuration with defaults for everything but the URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: ClientConfig::default(),
            cache_path: None,
            discard_cache: false,
            site: Site::default(),
        }
    }

    /// Maximum attempts per request
    pub fn retries(mut self, attempts: u32) -> Self {
        self.client.max_attempts = attempts;
        self
    }

    /// Per-request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.client.timeout_secs = secs;
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn discard_cache(mut self, discard: bool) -> Self {
        self.discard_cache = discard;
        self
    }

    pub fn site(mut self, site: Site) -> Self {
        self.site = site;
        self
    }
}

/// A single operation to run on a freshly built scraper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Resolve and describe the profile URL
    UrlInfo,
    /// Collect the profile's public videos
    PublicVideos,
}

/// Result of an [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    UrlInfo(ProfileUrl),
    Videos(Vec<Video>),
}

/// Scraper bound to one profile
///
/// Owns the HTTP client and the loaded cache. Dropping it releases the
/// client's connections.
pub struct ProfileScraper {
    collector: IncrementalCollector<ProfileClient, Box<dyn CacheStore>>,
    profile: ProfileUrl,
    site: Site,
}

impl ProfileScraper {
    /// Validates the URL, loads the cache and resolves the profile
    ///
    /// # Errors
    /// - `InvalidUrl`, `InvalidDomain`, `UnsupportedContentType`,
    ///   `EmptyProfileName` before any request is made
    /// - `Io` or `Json` if the cache file cannot be read
    /// - `ProfileNotFound` if the profile page returns 404
    /// - `RetriesExhausted` if the profile page cannot be fetched
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> ph_scraper_core::Result<()> {
    /// use ph_scraper_core::{ProfileScraper, ScraperConfig};
    /// let config = ScraperConfig::new("https://www.pornhub.com/model/jane").cache_path("cache.json");
    /// let mut scraper = ProfileScraper::connect(config).await?;
    /// for video in scraper.public_videos().await? {
    ///     println!("{}", video.url(scraper.site()));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: ScraperConfig) -> Result<Self> {
        let requested = parse_profile_url(&config.site, &config.url)?;

        let client = ProfileClient::with_config(&config.client)?;
        let store: Box<dyn CacheStore> = match &config.cache_path {
            Some(path) => Box::new(JsonFileCache::new(path)),
            None => Box::new(NoCache),
        };
        let collector = IncrementalCollector::new(client, store, config.discard_cache)?;

        let profile = resolve_profile(collector.source(), &config.site, requested).await?;

        Ok(Self {
            collector,
            profile,
            site: config.site,
        })
    }

    /// Builds a scraper, runs one operation and drops the scraper
    pub async fn run(config: ScraperConfig, operation: Operation) -> Result<OperationOutput> {
        let mut scraper = Self::connect(config).await?;
        match operation {
            Operation::UrlInfo => Ok(OperationOutput::UrlInfo(scraper.url_info().clone())),
            Operation::PublicVideos => Ok(OperationOutput::Videos(scraper.public_videos().await?)),
        }
    }

    /// Resolved profile
    pub fn url_info(&self) -> &ProfileUrl {
        &self.profile
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Collects the profile's public videos, newest first
    pub async fn public_videos(&mut self) -> Result<Vec<Video>> {
        self.collect(Listing::PublicVideos).await
    }

    /// Collects `listing`, merging it with the cache
    ///
    /// # Errors
    /// - `RetriesExhausted` if a page cannot be fetched
    /// - `Io` or `Json` if the cache cannot be written
    pub async fn collect(&mut self, listing: Listing) -> Result<Vec<Video>> {
        let config = ListingConfig::for_profile(self.profile.content_type, listing);
        let extractor = ListingExtractor::new(&config.selectors)?;
        let listing_url = config.listing_url(&self.profile.profile_url);

        info!(%listing, url = %listing_url, "collecting listing");
        self.collector
            .collect(listing.cache_key(), &listing_url, &extractor)
            .await
    }
}

/// Fetches the profile page and validates where it ended up
async fn resolve_profile(
    client: &ProfileClient,
    site: &Site,
    requested: ProfileUrl,
) -> Result<ProfileUrl> {
    let fetched = client.fetch(&requested.profile_url).await?;
    if fetched.outcome == PageOutcome::NotFound {
        return Err(ScraperError::ProfileNotFound(requested.profile_url));
    }

    let resolved = parse_profile_url(site, &fetched.final_url)?;
    if resolved != requested {
        info!(from = %requested.profile_url, to = %resolved.profile_url, "profile redirected");
    }
    Ok(resolved)
}

/// Resolves and describes a profile URL
pub async fn get_profile_url_info(config: ScraperConfig) -> Result<ProfileUrl> {
    let scraper = ProfileScraper::connect(config).await?;
    Ok(scraper.profile.clone())
}

/// Collects a profile's public videos
pub async fn get_profile_public_videos(config: ScraperConfig) -> Result<Vec<Video>> {
    let mut scraper = ProfileScraper::connect(config).await?;
    scraper.public_videos().await
}
