//! URL helpers for profile pages
//!
//! Validates user supplied profile URLs and builds listing page and
//! video URLs.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ScraperError};

const BASE_URL: &str = "https://www.pornhub.com";

/// Site the scraper talks to
///
/// `domain` is the host of `base_url` without a leading `www.`; any host
/// ending with it is accepted as belonging to the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base_url: String,
    domain: String,
}

impl Site {
    /// Build a site from its base URL (scheme, host and optional port)
    ///
    /// # Errors
    /// `InvalidUrl` if `base_url` cannot be parsed or has no host
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ScraperError::InvalidUrl(format!("{base_url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ScraperError::InvalidUrl(format!("{base_url}: missing host")))?;
        let domain = host.strip_prefix("www.").unwrap_or(host).to_string();

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            domain,
        })
    }

    /// Base URL without trailing slash (e.g. "https://www.pornhub.com")
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registrable domain used for host validation (e.g. "pornhub.com")
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Default for Site {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            domain: "pornhub.com".to_string(),
        }
    }
}

/// Kind of profile, taken from the first path segment of a profile URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Model,
    Pornstar,
    Channels,
    Users,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Model,
        ContentType::Pornstar,
        ContentType::Channels,
        ContentType::Users,
    ];

    /// Path segment as it appears in profile URLs
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Model => "model",
            ContentType::Pornstar => "pornstar",
            ContentType::Channels => "channels",
            ContentType::Users => "users",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == segment)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, canonical profile URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUrl {
    pub content_type: ContentType,
    pub profile_name: String,
    pub profile_url: String,
}

/// Validates a profile URL and normalizes it against `site`
///
/// Query, fragment and any path segments after the profile name are
/// discarded, so `https://www.pornhub.com/model/jane/videos?o=mr` becomes
/// `https://www.pornhub.com/model/jane`.
///
/// # Errors
/// - `InvalidUrl` if the URL cannot be parsed or has fewer than two path segments
/// - `InvalidDomain` if the host does not belong to `site`
/// - `UnsupportedContentType` if the first segment is not a known content type
/// - `EmptyProfileName` if the profile name segment is empty
///
/// # Example
/// ```
/// use ph_scraper_core::url::{parse_profile_url, ContentType, Site};
/// let info = parse_profile_url(&Site::default(), "https://pornhub.com/users/jane/videos").unwrap();
/// assert_eq!(info.content_type, ContentType::Users);
/// assert_eq!(info.profile_url, "https://www.pornhub.com/users/jane");
/// ```
pub fn parse_profile_url(site: &Site, input: &str) -> Result<ProfileUrl> {
    let input = input.trim();
    let parsed =
        Url::parse(input).map_err(|e| ScraperError::InvalidUrl(format!("{input}: {e}")))?;

    let host = parsed.host_str().unwrap_or_default();
    if !host.ends_with(site.domain()) {
        return Err(ScraperError::InvalidDomain {
            host: host.to_string(),
            expected: site.domain().to_string(),
        });
    }

    let path = parsed.path().trim_matches('/');
    let mut parts = path.split('/');
    let (Some(content_type), Some(profile_name)) = (parts.next(), parts.next()) else {
        return Err(ScraperError::InvalidUrl(
            "Invalid profile URL structure".to_string(),
        ));
    };

    let content_type = ContentType::from_segment(content_type)
        .ok_or_else(|| ScraperError::UnsupportedContentType(content_type.to_string()))?;
    if profile_name.is_empty() {
        return Err(ScraperError::EmptyProfileName);
    }

    Ok(ProfileUrl {
        content_type,
        profile_name: profile_name.to_string(),
        profile_url: format!("{}/{}/{}", site.base_url(), content_type, profile_name),
    })
}

/// Builds the URL of one listing page
///
/// Page 1 is the bare listing URL, later pages carry `?page=N`.
///
/// # Example
/// ```
/// use ph_scraper_core::url::build_page_url;
/// assert_eq!(build_page_url("https://host/model/jane/videos", 1), "https://host/model/jane/videos");
/// assert_eq!(build_page_url("https://host/model/jane/videos", 3), "https://host/model/jane/videos?page=3");
/// ```
pub fn build_page_url(listing_url: &str, page: u32) -> String {
    if page > 1 {
        format!("{}?page={}", listing_url, page)
    } else {
        listing_url.to_string()
    }
}

/// Builds the watch page URL for a video key
///
/// # Example
/// ```
/// use ph_scraper_core::url::{build_video_url, Site};
/// let url = build_video_url(&Site::default(), "ph5f1a2b3c");
/// assert_eq!(url, "https://www.pornhub.com/view_video.php?viewkey=ph5f1a2b3c");
/// ```
pub fn build_video_url(site: &Site, vkey: &str) -> String {
    format!(
        "{}/view_video.php?viewkey={}",
        site.base_url(),
        urlencoding::encode(vkey)
    )
}
