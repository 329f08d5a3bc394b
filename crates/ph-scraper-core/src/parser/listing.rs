//! Listing page parser
//!
//! Extracts video records from one page of a profile listing.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScraperError};
use crate::types::Video;

/// CSS selectors describing where records live on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// `id` attribute of the element wrapping the listing
    pub list_container_id: String,
    /// One record per match inside the container
    pub item: String,
    /// Attribute on the item element holding the unique key
    pub key_attribute: String,
    pub title: String,
    pub duration: String,
    pub thumbnail: String,
    /// Attribute on the thumbnail element holding the image URL
    pub thumbnail_attribute: String,
    pub uploader: String,
    pub views: String,
    pub rating: String,
}

impl Selectors {
    /// Default record selectors for a listing wrapped in `#{list_container_id}`
    pub fn for_container(list_container_id: impl Into<String>) -> Self {
        Self {
            list_container_id: list_container_id.into(),
            item: "li".to_string(),
            key_attribute: "data-video-vkey".to_string(),
            title: ".thumbnailTitle".to_string(),
            duration: ".duration".to_string(),
            thumbnail: "img.js-videoThumb".to_string(),
            thumbnail_attribute: "src".to_string(),
            uploader: ".usernameWrap a".to_string(),
            views: ".views var".to_string(),
            rating: ".rating-container .value".to_string(),
        }
    }
}

/// Listing parser with its selectors compiled once
///
/// Building it validates every selector, so a bad configuration fails
/// before the first request is sent.
#[derive(Debug)]
pub struct ListingExtractor {
    container: Selector,
    item: Selector,
    key_attribute: String,
    title: Selector,
    duration: Selector,
    thumbnail: Selector,
    thumbnail_attribute: String,
    uploader: Selector,
    views: Selector,
    rating: Selector,
}

impl ListingExtractor {
    /// Compile `selectors`
    ///
    /// # Errors
    /// Returns `ParseError` if any selector string is invalid
    pub fn new(selectors: &Selectors) -> Result<Self> {
        let container = format!("[id=\"{}\"]", selectors.list_container_id);

        Ok(Self {
            container: compile(&container)?,
            item: compile(&selectors.item)?,
            key_attribute: selectors.key_attribute.clone(),
            title: compile(&selectors.title)?,
            duration: compile(&selectors.duration)?,
            thumbnail: compile(&selectors.thumbnail)?,
            thumbnail_attribute: selectors.thumbnail_attribute.clone(),
            uploader: compile(&selectors.uploader)?,
            views: compile(&selectors.views)?,
            rating: compile(&selectors.rating)?,
        })
    }

    /// Extracts the records of one page, in page order
    ///
    /// A missing list container yields an empty vector: the end of the
    /// listing and an empty profile look the same. Items without a key are
    /// skipped.
    pub fn extract(&self, html: &str) -> Vec<Video> {
        let document = Html::parse_document(html);

        let Some(container) = document.select(&self.container).next() else {
            return Vec::new();
        };

        container
            .select(&self.item)
            .filter_map(|item| self.parse_item(&item))
            .collect()
    }

    /// Parses a single listing item
    fn parse_item(&self, item: &ElementRef) -> Option<Video> {
        let vkey = item
            .value()
            .attr(&self.key_attribute)
            .map(str::trim)
            .filter(|k| !k.is_empty())?;

        Some(Video {
            vkey: vkey.to_string(),
            title: select_text(item, &self.title),
            duration: select_text(item, &self.duration),
            thumb_url: item
                .select(&self.thumbnail)
                .next()
                .and_then(|img| img.value().attr(&self.thumbnail_attribute))
                .map(str::to_string),
            uploader: select_text(item, &self.uploader),
            views: select_text(item, &self.views),
            rating: select_text(item, &self.rating),
        })
    }
}

/// Parses a listing page and returns its video records
///
/// Convenience wrapper around [`ListingExtractor`] for one-off parsing.
///
/// # Errors
/// Returns `ParseError` if any selector string is invalid
pub fn parse_listing(html: &str, selectors: &Selectors) -> Result<Vec<Video>> {
    Ok(ListingExtractor::new(selectors)?.extract(html))
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::ParseError(format!("Invalid selector '{}': {:?}", selector, e)))
}

/// Trimmed text of the first match under `element`
fn select_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
