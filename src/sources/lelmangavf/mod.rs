//! Lelmangavf, a French scanlation aggregator.
//!
//! Home sections are three sort orders of the browse page and are the only
//! place in the crate where requests run concurrently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::debug;
use std::sync::Arc;

use crate::{
    config::SiteConfig,
    error::{Error, Result},
    net::{Fetch, HttpClient, html},
    pages::{ImageListDecoder, PageListDecoder},
    source::{SectionCallback, Source},
    types::{
        Chapter, ChapterDetails, HomeSection, MangaDetails, PageMetadata, PagedResults,
        SearchRequest, SourceInfo, SourceTag, TagSection, TagType,
    },
    updates::{ScanRule, UpdatedManga, scan_listing},
};

pub mod parser;

const ID: &str = "lelmangavf";
const DOMAIN: &str = "https://www.lelmangavf.com";

/// Home sections as `(id, title, browse sort order)`. View more pages through
/// the same sort order as the section it belongs to.
const SECTIONS: [(&str, &str, &str); 3] = [
    ("0", "RECENTLY ADDED", "create"),
    ("1", "RECENTLY UPDATED", "update"),
    ("2", "POPULAR", "views_a"),
];

/// Lelmangavf source.
///
/// # Examples
///
/// ```rust
/// use hondana::config::SiteConfig;
/// use hondana::prelude::*;
/// use hondana::sources::Lelmangavf;
///
/// let mirror = SiteConfig::new("https://mirror.example.org/");
/// let source = Lelmangavf::with_config(mirror);
/// assert_eq!(source.manga_share_url("one-piece"), "https://mirror.example.org/scan-manga/one-piece");
/// ```
pub struct Lelmangavf {
    config: SiteConfig,
    fetcher: Arc<dyn Fetch>,
    pages: Arc<dyn PageListDecoder>,
}

impl Lelmangavf {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn default_config() -> SiteConfig {
        SiteConfig::new(DOMAIN).with_header("Referer", DOMAIN)
    }

    pub fn with_config(config: SiteConfig) -> Self {
        let client = HttpClient::from_config(ID, &config);
        Self::with_fetcher(config, Arc::new(client))
    }

    /// Uses `fetcher` for every request instead of the network.
    pub fn with_fetcher(config: SiteConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let pages = ImageListDecoder::new(".col-sm-8 div#all img", config.base_url())
            .with_attrs(&["data-src"]);
        Self {
            config,
            fetcher,
            pages: Arc::new(pages),
        }
    }

    /// Replaces the reader page decoder.
    pub fn with_page_decoder(mut self, decoder: impl PageListDecoder + 'static) -> Self {
        self.pages = Arc::new(decoder);
        self
    }

    async fn fetch(&self, path: &str) -> Result<String> {
        self.fetcher.get_text(&self.config.url(path)).await
    }

    fn browse_path(sort: &str, page: Option<u32>) -> String {
        match page {
            Some(page) => format!("/browse?sort={}&page={}", sort, page),
            None => format!("/browse?sort={}", sort),
        }
    }
}

impl Default for Lelmangavf {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Lelmangavf {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            version: "1.0.6".to_string(),
            name: "Lelmangavf".to_string(),
            icon: "default_favicon.png".to_string(),
            author: "getBoolean".to_string(),
            author_website: "https://github.com/getBoolean".to_string(),
            description: "Extension that pulls manga from Lelmangavf".to_string(),
            hentai_source: false,
            website_base_url: self.config.base_url().to_string(),
            source_tags: vec![
                SourceTag {
                    text: "Notifications".to_string(),
                    kind: TagType::Green,
                },
                SourceTag {
                    text: "French".to_string(),
                    kind: TagType::Grey,
                },
            ],
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn manga_share_url(&self, manga_id: &str) -> String {
        self.config.url(&format!("/scan-manga/{}", manga_id))
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<MangaDetails> {
        let body = self.fetch(&format!("/scan-manga/{}", manga_id)).await?;
        Ok(parser::parse_manga_details(
            &html::parse(&body),
            manga_id,
            self.base_url(),
        ))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let body = self.fetch(&format!("/scan-manga/{}", manga_id)).await?;
        let chapters = parser::parse_chapters(&html::parse(&body), manga_id, Utc::now());
        debug!("[{}] {} chapters for {}", ID, chapters.len(), manga_id);
        Ok(chapters)
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let body = self
            .fetch(&format!("/scan-manga/{}/{}", manga_id, chapter_id))
            .await?;
        let pages = self.pages.decode(&html::parse(&body))?;

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages,
            long_strip: false,
        })
    }

    async fn get_home_page_sections(&self, callback: SectionCallback<'_>) -> Result<()> {
        for (id, title, _) in SECTIONS {
            callback(HomeSection::new(id, title, true));
        }

        let loads = SECTIONS.iter().map(|&(id, title, sort)| async move {
            let body = self.fetch(&Self::browse_path(sort, None)).await?;
            let mut section = HomeSection::new(id, title, true);
            section.items = parser::parse_home_section(&html::parse(&body), Utc::now());
            debug!("[{}] home section {:?}: {} items", ID, title, section.items.len());
            callback(section);
            Ok::<(), Error>(())
        });

        join_all(loads).await.into_iter().collect()
    }

    /// Filters the site's autosuggest list by title. Results are not paged.
    async fn search_request(
        &self,
        query: &SearchRequest,
        _metadata: Option<PageMetadata>,
    ) -> Result<PagedResults> {
        let title = query.title.as_deref().unwrap_or_default();
        let body = self
            .fetch(&format!("/search?query={}", urlencoding::encode(title)))
            .await?;

        Ok(PagedResults {
            results: parser::parse_search(&body, title, self.base_url())?,
            metadata: None,
        })
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<PageMetadata>,
    ) -> Result<Option<PagedResults>> {
        let Some(&(_, _, sort)) = SECTIONS.iter().find(|(id, _, _)| *id == section_id) else {
            return Ok(None);
        };
        let page = PageMetadata::page_or_first(metadata);

        let body = self.fetch(&Self::browse_path(sort, Some(page))).await?;
        let document = html::parse(&body);
        Ok(Some(PagedResults::paged(
            parser::parse_home_section(&document, Utc::now()),
            page,
            parser::is_last_page(&document),
        )))
    }

    async fn get_tags(&self) -> Result<Vec<TagSection>> {
        let body = self.fetch("/scan-manga-list").await?;
        Ok(parser::parse_tags(&html::parse(&body)))
    }

    async fn updated_manga_page(
        &self,
        page: u32,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<UpdatedManga> {
        let body = self
            .fetch(&format!("/latest-release?page={}", page))
            .await?;
        let entries = parser::parse_updates(&html::parse(&body), Utc::now());
        Ok(scan_listing(entries, since, ids, ScanRule::UntilPassed))
    }
}
