//! Profile Scraper Core Library
//!
//! Incrementally collects the video listings of a profile and keeps them in a
//! JSON cache, so repeated runs only fetch what is new.
//!
//! # Overview
//!
//! - HTTP client with immediate retries for transient failures
//! - HTML parser turning a listing page into video records
//! - Incremental collector that stops at the first page without new videos
//! - Atomically replaced JSON cache file
//!
//! # Example
//!
//! ```no_run
//! use ph_scraper_core::{ProfileScraper, Result, ScraperConfig, render_urls};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ScraperConfig::new("https://www.pornhub.com/users/jane")
//!         .cache_path("jane.json")
//!         .retries(5);
//!     let mut scraper = ProfileScraper::connect(config).await?;
//!
//!     // First run walks every page, later runs stop at the first known video
//!     let videos = scraper.public_videos().await?;
//!     println!("{}", render_urls(scraper.site(), &videos));
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
mod client;
mod collector;
mod error;
pub mod listing;
mod output;
pub mod parser;
mod scraper;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, Fetched, PageOutcome, PageSource, ProfileClient};

// Re-export cache types
pub use cache::{CacheSnapshot, CacheStore, JsonFileCache, NoCache};

// Re-export the collector
pub use collector::IncrementalCollector;

// Re-export error types
pub use error::{Result, ScraperError};

// Re-export listing catalogue
pub use listing::{Listing, ListingConfig};

// Re-export parser functions
pub use parser::{ListingExtractor, Selectors, parse_listing};

// Re-export main scraper API
pub use scraper::{
    Operation, OperationOutput, ProfileScraper, ScraperConfig, get_profile_public_videos,
    get_profile_url_info,
};

// Re-export output helpers
pub use output::{render_json, render_urls, to_json_pretty};

// Re-export data types
pub use types::Video;

// Re-export URL helper functions for convenience
pub use url::{ContentType, ProfileUrl, Site, build_page_url, build_video_url, parse_profile_url};
