//! Listing catalogue
//!
//! Maps a profile content type and a listing kind to the path suffix and
//! selectors used to walk that listing. A new listing kind is a new
//! [`Listing`] variant plus its rows here.

use std::fmt;

use crate::parser::Selectors;
use crate::url::ContentType;

/// A named, paginated collection of videos on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    /// Publicly visible uploads
    PublicVideos,
}

impl Listing {
    /// Name under which the listing is stored in the cache file
    pub fn cache_key(self) -> &'static str {
        match self {
            Listing::PublicVideos => "pub_videos",
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key())
    }
}

/// Where a listing lives relative to the profile URL and how to parse it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    /// Path appended to the canonical profile URL
    pub path: &'static str,
    pub selectors: Selectors,
}

impl ListingConfig {
    /// Resolves the configuration for `listing` on a `content_type` profile
    pub fn for_profile(content_type: ContentType, listing: Listing) -> Self {
        let (path, container) = match (content_type, listing) {
            (ContentType::Model, Listing::PublicVideos) => ("/videos", "mostRecentVideosSection"),
            (ContentType::Pornstar, Listing::PublicVideos) => {
                ("/videos/upload", "mostRecentVideosSection")
            }
            (ContentType::Channels, Listing::PublicVideos) => ("/videos", "showAllChanelVideos"),
            (ContentType::Users, Listing::PublicVideos) => ("/videos/public", "moreData"),
        };

        Self {
            path,
            selectors: Selectors::for_container(container),
        }
    }

    /// Absolute URL of the first listing page
    pub fn listing_url(&self, profile_url: &str) -> String {
        format!("{}{}", profile_url.trim_end_matches('/'), self.path)
    }
}
