//! Core data types for the profile scraper
//!
//! Contains the record type stored in the cache and returned to callers.

use serde::{Deserialize, Serialize};

use crate::url::{Site, build_video_url};

/// A video listed on a profile page
///
/// Identity is `vkey` alone; the remaining fields are informational and
/// never take part in deduplication. Field names match the cache file
/// layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video key (e.g., "ph5f1a2b3c4d5e6")
    pub vkey: String,

    /// Video title
    pub title: Option<String>,

    /// Duration as displayed (e.g., "12:34")
    pub duration: Option<String>,

    /// Thumbnail image URL
    pub thumb_url: Option<String>,

    /// Uploader display name
    pub uploader: Option<String>,

    /// View count as displayed (e.g., "1.2M")
    pub views: Option<String>,

    /// Rating as displayed (e.g., "87%")
    pub rating: Option<String>,
}

impl Video {
    /// Creates a video with only its key set
    pub fn new(vkey: impl Into<String>) -> Self {
        Self {
            vkey: vkey.into(),
            title: None,
            duration: None,
            thumb_url: None,
            uploader: None,
            views: None,
            rating: None,
        }
    }

    /// Absolute watch page URL on `site`
    pub fn url(&self, site: &Site) -> String {
        build_video_url(site, &self.vkey)
    }
}
