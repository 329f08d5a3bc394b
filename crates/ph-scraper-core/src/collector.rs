//! Incremental listing collection
//!
//! Listings are newest first and only ever grow at the front, so a run walks
//! pages from the start and stops at the first page that adds nothing new.
//! Everything past that page is already in the cache.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::cache::{CacheSnapshot, CacheStore};
use crate::client::{PageOutcome, PageSource};
use crate::error::Result;
use crate::parser::ListingExtractor;
use crate::types::Video;

/// Walks listing pages and merges new videos into the cache
///
/// The snapshot is loaded once at construction and written back at most once
/// per [`collect`](Self::collect) call, only when something new was found.
/// A failed run writes nothing.
pub struct IncrementalCollector<S, C> {
    source: S,
    store: C,
    snapshot: CacheSnapshot,
}

impl<S: PageSource, C: CacheStore> IncrementalCollector<S, C> {
    /// Creates a collector, loading the snapshot from `store`
    ///
    /// With `discard_cache` the stored snapshot is ignored and collection
    /// starts empty; results are still saved to `store`.
    ///
    /// # Errors
    /// Returns `Io` or `Json` if the stored snapshot cannot be read
    pub fn new(source: S, store: C, discard_cache: bool) -> Result<Self> {
        let snapshot = if discard_cache {
            CacheSnapshot::default()
        } else {
            store.load()?
        };

        Ok(Self {
            source,
            store,
            snapshot,
        })
    }

    /// Current in-memory snapshot
    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collects the listing at `listing_url`, cached under `listing_key`
    ///
    /// Returns newly found videos followed by the previously cached ones.
    /// Stops at a 404, an empty body, or a page without unknown keys. A video
    /// already cached is never updated, even if its fields changed.
    ///
    /// # Errors
    /// Propagates fatal fetch errors and cache write failures; the stored
    /// snapshot is untouched in both cases.
    pub async fn collect(
        &mut self,
        listing_key: &str,
        listing_url: &str,
        extractor: &ListingExtractor,
    ) -> Result<Vec<Video>> {
        let cached = self.snapshot.get(listing_key);
        let mut known: HashSet<String> = cached.iter().map(|v| v.vkey.clone()).collect();
        let mut fresh_videos: Vec<Video> = Vec::new();
        let mut page = 1;

        loop {
            let body = match self.source.fetch_page(listing_url, page).await? {
                PageOutcome::NotFound => {
                    debug!(listing_key, page, "page not found, end of listing");
                    break;
                }
                PageOutcome::Body(body) if body.is_empty() => {
                    debug!(listing_key, page, "empty page, stopping");
                    break;
                }
                PageOutcome::Body(body) => body,
            };

            let fresh: Vec<Video> = extractor
                .extract(&body)
                .into_iter()
                .filter(|v| known.insert(v.vkey.clone()))
                .collect();

            if fresh.is_empty() {
                debug!(listing_key, page, "no new videos, stopping");
                break;
            }

            debug!(listing_key, page, new = fresh.len(), "new videos on page");
            fresh_videos.extend(fresh);
            page += 1;
        }

        if fresh_videos.is_empty() {
            info!(listing_key, cached = cached.len(), "no new videos");
            return Ok(cached.to_vec());
        }

        info!(
            listing_key,
            new = fresh_videos.len(),
            cached = cached.len(),
            pages = page,
            "collected new videos"
        );

        fresh_videos.extend_from_slice(cached);
        let mut updated = self.snapshot.clone();
        updated.set(listing_key, fresh_videos.clone());
        self.store.save(&updated)?;
        self.snapshot = updated;

        Ok(fresh_videos)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::error::ScraperError;
    use crate::parser::Selectors;

    const LISTING: &str = "pub_videos";
    const URL: &str = "https://host/users/jane/videos/public";

    enum Page {
        Html(String),
        NotFound,
        Failure,
    }

    /// Serves pages from a script and records which pages were requested
    #[derive(Default)]
    struct ScriptedPages {
        pages: HashMap<u32, Page>,
        requested: RefCell<Vec<u32>>,
    }

    impl ScriptedPages {
        fn with(mut self, page: u32, content: Page) -> Self {
            self.pages.insert(page, content);
            self
        }

        fn take_requested(&self) -> Vec<u32> {
            self.requested.take()
        }
    }

    impl PageSource for ScriptedPages {
        async fn fetch_page(&self, listing_url: &str, page: u32) -> Result<PageOutcome> {
            assert_eq!(listing_url, URL);
            self.requested.borrow_mut().push(page);
            match self.pages.get(&page) {
                Some(Page::Html(html)) => Ok(PageOutcome::Body(html.clone())),
                Some(Page::NotFound) | None => Ok(PageOutcome::NotFound),
                Some(Page::Failure) => Err(ScraperError::RetriesExhausted {
                    url: URL.to_string(),
                    attempts: 10,
                    last: Box::new(ScraperError::UnexpectedStatus {
                        status: 503,
                        url: URL.to_string(),
                    }),
                }),
            }
        }
    }

    /// Keeps the snapshot in memory and counts saves
    #[derive(Default)]
    struct MemoryStore {
        stored: RefCell<CacheSnapshot>,
        saves: Cell<usize>,
    }

    impl MemoryStore {
        fn holding(keys: &[&str]) -> Self {
            let store = Self::default();
            store.stored.borrow_mut().set(LISTING, videos(keys));
            store
        }
    }

    impl CacheStore for &MemoryStore {
        fn load(&self) -> Result<CacheSnapshot> {
            Ok(self.stored.borrow().clone())
        }

        fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            *self.stored.borrow_mut() = snapshot.clone();
            Ok(())
        }
    }

    fn videos(keys: &[&str]) -> Vec<Video> {
        keys.iter().map(|k| Video::new(*k)).collect()
    }

    fn listing_page(items: &[(&str, &str)]) -> Page {
        let lis: String = items
            .iter()
            .map(|(key, title)| {
                format!(r#"<li data-video-vkey="{key}"><a class="thumbnailTitle">{title}</a></li>"#)
            })
            .collect();
        Page::Html(format!(r#"<html><body><ul id="moreData">{lis}</ul></body></html>"#))
    }

    fn keys_page(keys: &[&str]) -> Page {
        let items: Vec<(&str, &str)> = keys.iter().map(|k| (*k, "title")).collect();
        listing_page(&items)
    }

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&Selectors::for_container("moreData")).unwrap()
    }

    fn keys_of(videos: &[Video]) -> Vec<&str> {
        videos.iter().map(|v| v.vkey.as_str()).collect()
    }

    #[tokio::test]
    async fn test_new_videos_are_prepended_to_cache() {
        let store = MemoryStore::holding(&["c1", "c2", "c3"]);
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1", "n2"]))
            .with(2, keys_page(&["c1", "c2"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1", "n2", "c1", "c2", "c3"]);
        assert_eq!(collector.source().take_requested(), vec![1, 2]);
        assert_eq!(store.saves.get(), 1);
        assert_eq!(store.stored.borrow().get(LISTING), result.as_slice());
    }

    #[tokio::test]
    async fn test_second_run_only_fetches_first_page() {
        let store = MemoryStore::holding(&["c1"]);
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1", "n2"]))
            .with(2, keys_page(&["c1"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let first = collector.collect(LISTING, URL, &extractor()).await.unwrap();
        collector.source().take_requested();
        let second = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(collector.source().take_requested(), vec![1]);
        assert_eq!(store.saves.get(), 1);
    }

    #[tokio::test]
    async fn test_not_found_on_first_page_returns_cache() {
        let store = MemoryStore::holding(&["c1", "c2"]);
        let pages = ScriptedPages::default().with(1, Page::NotFound);
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["c1", "c2"]);
        assert_eq!(store.saves.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_profile_without_cache() {
        let store = MemoryStore::default();
        let pages = ScriptedPages::default().with(1, keys_page(&[]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(store.saves.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_stops() {
        let store = MemoryStore::default();
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1"]))
            .with(2, Page::Html(String::new()))
            .with(3, keys_page(&["n3"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1"]);
        assert_eq!(collector.source().take_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_missing_container_stops() {
        let store = MemoryStore::default();
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1"]))
            .with(2, Page::Html("<html><body>Try again later</body></html>".to_string()));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1"]);
        assert_eq!(store.saves.get(), 1);
    }

    #[tokio::test]
    async fn test_single_fresh_video_keeps_walking() {
        let store = MemoryStore::holding(&["c1", "c2"]);
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1", "n2"]))
            .with(2, keys_page(&["c1", "n3"]))
            .with(3, keys_page(&["c2"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1", "n2", "n3", "c1", "c2"]);
        assert_eq!(collector.source().take_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_video_repeated_across_pages_is_kept_once() {
        let store = MemoryStore::default();
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1", "n2"]))
            .with(2, keys_page(&["n2", "n3"]))
            .with(3, keys_page(&["n3"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1", "n2", "n3"]);
        assert_eq!(collector.source().take_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cached_video_is_not_updated() {
        let store = MemoryStore::default();
        store.stored.borrow_mut().set(
            LISTING,
            vec![Video {
                title: Some("old title".to_string()),
                ..Video::new("c1")
            }],
        );
        let pages = ScriptedPages::default()
            .with(1, listing_page(&[("n1", "new"), ("c1", "renamed")]))
            .with(2, listing_page(&[("c1", "renamed again")]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["n1", "c1"]);
        assert_eq!(result[1].title.as_deref(), Some("old title"));
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let store = MemoryStore::holding(&["c1"]);
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["n1"]))
            .with(2, Page::Failure);
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await;

        assert!(matches!(result, Err(ScraperError::RetriesExhausted { .. })));
        assert_eq!(store.saves.get(), 0);
        assert_eq!(keys_of(collector.snapshot().get(LISTING)), vec!["c1"]);
    }

    #[tokio::test]
    async fn test_discard_cache_starts_empty_and_overwrites() {
        let store = MemoryStore::holding(&["c1", "c2"]);
        let pages = ScriptedPages::default()
            .with(1, keys_page(&["c1", "n1"]))
            .with(2, Page::NotFound);
        let mut collector = IncrementalCollector::new(pages, &store, true).unwrap();

        let result = collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(&result), vec!["c1", "n1"]);
        assert_eq!(keys_of(store.stored.borrow().get(LISTING)), vec!["c1", "n1"]);
    }

    #[tokio::test]
    async fn test_other_listings_survive_a_write() {
        let store = MemoryStore::holding(&["c1"]);
        store.stored.borrow_mut().set("favorites", videos(&["f1"]));
        let pages = ScriptedPages::default().with(1, keys_page(&["n1"]));
        let mut collector = IncrementalCollector::new(pages, &store, false).unwrap();

        collector.collect(LISTING, URL, &extractor()).await.unwrap();

        assert_eq!(keys_of(store.stored.borrow().get("favorites")), vec!["f1"]);
    }

    proptest! {
        #[test]
        fn prop_output_is_unique_and_ends_with_cache(
            cached in proptest::collection::btree_set("[a-f]", 0..4),
            pages in proptest::collection::vec(proptest::collection::vec("[a-j]", 0..5), 0..5),
        ) {
            let cached: Vec<&str> = cached.iter().map(String::as_str).collect();
            let store = MemoryStore::holding(&cached);
            let mut script = ScriptedPages::default();
            for (i, keys) in pages.iter().enumerate() {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                script = script.with(i as u32 + 1, keys_page(&keys));
            }
            let mut collector = IncrementalCollector::new(script, &store, false).unwrap();

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = runtime
                .block_on(collector.collect(LISTING, URL, &extractor()))
                .unwrap();

            let keys = keys_of(&result);
            let unique: HashSet<&str> = keys.iter().copied().collect();
            prop_assert_eq!(unique.len(), keys.len());
            prop_assert!(keys.ends_with(&cached));
        }
    }
}
