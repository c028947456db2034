//! Source trait and registry.
//!
//! This module defines the [`Source`] trait that every site adapter
//! implements, mirroring the operations the reader host calls, and the
//! [`Sources`] registry for looking adapters up by id.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::prelude::*;
//! use hondana::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::with_defaults();
//!
//! if let Some(source) = sources.get("lelmangavf") {
//!     let manga = source.get_manga_details("one-piece").await?;
//!     let chapters = source.get_chapters(&manga.id).await?;
//!     println!("{} has {} chapters", manga.titles[0], chapters.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::{
    error::Result,
    types::{
        Chapter, ChapterDetails, HomeSection, MangaDetails, MangaUpdates, PageMetadata,
        PagedResults, SearchRequest, SourceInfo, TagSection,
    },
    updates::{self, UpdatedManga},
};

/// Callback receiving home sections, first as empty skeletons and then again
/// once their items are loaded.
pub type SectionCallback<'a> = &'a (dyn Fn(HomeSection) + Send + Sync);

/// Callback receiving the ids found by each page of an update poll.
pub type UpdatesCallback<'a> = &'a mut (dyn FnMut(MangaUpdates) + Send);

/// Trait that all site adapters implement.
///
/// Every operation fetches fresh pages; nothing is cached between calls.
/// Fetches inside one operation are awaited one after another, except where a
/// source documents otherwise for its home sections.
///
/// # Required Methods
///
/// * [`id()`](Source::id), [`info()`](Source::info), [`base_url()`](Source::base_url)
/// * [`get_manga_details()`](Source::get_manga_details)
/// * [`get_chapters()`](Source::get_chapters)
/// * [`get_chapter_details()`](Source::get_chapter_details)
/// * [`get_home_page_sections()`](Source::get_home_page_sections)
/// * [`search_request()`](Source::search_request)
/// * [`get_view_more_items()`](Source::get_view_more_items)
/// * [`get_tags()`](Source::get_tags)
/// * [`updated_manga_page()`](Source::updated_manga_page)
///
/// [`filter_updated_manga()`](Source::filter_updated_manga) is provided on top
/// of `updated_manga_page` and normally not overridden.
#[async_trait]
pub trait Source: Send + Sync {
    /// Lowercase identifier, unique within a [`Sources`] registry.
    fn id(&self) -> &'static str;

    fn info(&self) -> SourceInfo;

    /// Site root without a trailing slash.
    fn base_url(&self) -> &str;

    /// Link to the manga's page on the site, for sharing.
    fn manga_share_url(&self, manga_id: &str) -> String;

    /// Fetches the manga landing page and extracts its metadata.
    async fn get_manga_details(&self, manga_id: &str) -> Result<MangaDetails>;

    /// Fetches the manga's chapter list in the order the site lists it.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>>;

    /// Resolves the ordered page image URLs of one chapter.
    async fn get_chapter_details(&self, manga_id: &str, chapter_id: &str)
    -> Result<ChapterDetails>;

    /// Loads the home screen sections, reporting them through `callback`.
    async fn get_home_page_sections(&self, callback: SectionCallback<'_>) -> Result<()>;

    /// Runs a search. `metadata` is the token returned with the previous page,
    /// or `None` for the first page.
    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<PageMetadata>,
    ) -> Result<PagedResults>;

    /// Pages through a home section. Returns `None` for a section id the
    /// source does not know.
    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<PageMetadata>,
    ) -> Result<Option<PagedResults>>;

    async fn get_tags(&self) -> Result<Vec<TagSection>>;

    /// Fetches and scans page `page` (from 1) of the latest-updates listing.
    async fn updated_manga_page(
        &self,
        page: u32,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<UpdatedManga>;

    /// Reports which of `ids` were updated after `since`.
    ///
    /// Walks the latest-updates listing page by page through
    /// [`updated_manga_page`](Source::updated_manga_page) and calls `callback`
    /// once per page that yielded tracked ids.
    async fn filter_updated_manga(
        &self,
        callback: UpdatesCallback<'_>,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<()> {
        updates::poll_updates(
            |page| self.updated_manga_page(page, since, ids),
            callback,
        )
        .await
    }
}

/// A registry of sources, indexed by id.
///
/// # Examples
///
/// ```rust
/// use hondana::prelude::*;
///
/// let sources = Sources::with_defaults();
/// println!("Available sources: {:?}", sources.list_ids());
/// ```
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
}

impl Sources {
    /// Creates a new empty registry.
    ///
    /// ```rust
    /// use hondana::prelude::*;
    ///
    /// let sources = Sources::new();
    /// assert!(sources.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Creates a registry holding every source compiled into the crate, each
    /// with its default configuration.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut sources = Self::new();

        #[cfg(feature = "source-bainian")]
        sources.add(crate::sources::BainianManga::new());

        #[cfg(feature = "source-lelmangavf")]
        sources.add(crate::sources::Lelmangavf::new());

        sources
    }

    /// Adds a source. A source with the same id replaces the earlier one.
    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        match self.by_id.get(&id) {
            Some(&index) => self.sources[index] = Box::new(source),
            None => {
                self.by_id.insert(id, self.sources.len());
                self.sources.push(Box::new(source));
            }
        }
        self
    }

    /// Retrieves a source by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    /// IDs of all registered sources, in insertion order.
    pub fn list_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
