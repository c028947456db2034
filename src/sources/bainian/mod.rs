//! BainianManga (百年漫画), a Chinese mobile manga site.
//!
//! Everything is served as static HTML. Chapters are split over several
//! reader pages with one image each, so resolving a chapter takes one request
//! per page unless an embedded page list decoder is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;

use crate::{
    config::SiteConfig,
    error::Result,
    net::{Fetch, HttpClient, html},
    pages::PageListDecoder,
    source::{SectionCallback, Source},
    types::{
        Chapter, ChapterDetails, HomeSection, MangaDetails, PageMetadata, PagedResults,
        SearchRequest, SourceInfo, SourceTag, TagSection, TagType,
    },
    updates::{ScanRule, UpdatedManga, scan_listing},
};

pub mod parser;

const ID: &str = "bainian";
const DOMAIN: &str = "https://m.bnmanhua.com";

/// Upper bound on reader pages requested for one chapter.
pub const MAX_CHAPTER_PAGES: u32 = 500;

/// How chapter pages are turned into image URLs.
#[derive(Clone)]
pub enum PageStrategy {
    /// Read `#k_total` from the chapter page, then fetch `?p=1..=total` and
    /// take the image of each.
    PerPage,
    /// Decode the whole list from the first chapter page.
    Embedded(Arc<dyn PageListDecoder>),
}

/// BainianManga source.
///
/// # Examples
///
/// ```rust
/// use hondana::prelude::*;
/// use hondana::sources::BainianManga;
///
/// let source = BainianManga::new();
/// assert_eq!(source.manga_share_url("12345"), "https://m.bnmanhua.com/comic/12345.html");
/// ```
pub struct BainianManga {
    config: SiteConfig,
    fetcher: Arc<dyn Fetch>,
    pages: PageStrategy,
}

impl BainianManga {
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    /// The public site, with the referer it expects.
    pub fn default_config() -> SiteConfig {
        SiteConfig::new(DOMAIN).with_header("Referer", DOMAIN)
    }

    pub fn with_config(config: SiteConfig) -> Self {
        let client = HttpClient::from_config(ID, &config);
        Self::with_fetcher(config, Arc::new(client))
    }

    /// Uses `fetcher` for every request instead of the network.
    pub fn with_fetcher(config: SiteConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            config,
            fetcher,
            pages: PageStrategy::PerPage,
        }
    }

    /// Resolves chapters with `decoder` from a single request.
    pub fn with_page_decoder(mut self, decoder: impl PageListDecoder + 'static) -> Self {
        self.pages = PageStrategy::Embedded(Arc::new(decoder));
        self
    }

    async fn fetch(&self, path: &str) -> Result<String> {
        self.fetcher.get_text(&self.config.url(path)).await
    }

    async fn listing(&self, path: &str, page: u32) -> Result<PagedResults> {
        let body = self.fetch(path).await?;
        let document = html::parse(&body);
        let tiles = parser::parse_view_more(&document, Utc::now());
        Ok(PagedResults::paged(tiles, page, parser::is_last_page(&document)))
    }
}

impl Default for BainianManga {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for BainianManga {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            version: "0.0.1".to_string(),
            name: "BainianManga (百年漫画)".to_string(),
            icon: "favicon.ico".to_string(),
            author: "getBoolean".to_string(),
            author_website: "https://github.com/getBoolean".to_string(),
            description: "Extension that pulls manga from BainianManga, includes Advanced Search"
                .to_string(),
            hentai_source: false,
            website_base_url: self.config.url("/comic.html"),
            source_tags: vec![SourceTag {
                text: "WIP".to_string(),
                kind: TagType::Red,
            }],
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn manga_share_url(&self, manga_id: &str) -> String {
        self.config.url(&format!("/comic/{}.html", manga_id))
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<MangaDetails> {
        let body = self.fetch(&format!("/comic/{}.html", manga_id)).await?;
        Ok(parser::parse_manga_details(&html::parse(&body), manga_id))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let body = self.fetch(&format!("/comic/{}.html", manga_id)).await?;
        let chapters = parser::parse_chapters(&html::parse(&body), manga_id);
        debug!("[{}] {} chapters for {}", ID, chapters.len(), manga_id);
        Ok(chapters)
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let path = format!("/comic/{}/{}.html", manga_id, chapter_id);
        let body = self.fetch(&path).await?;

        let pages = match &self.pages {
            PageStrategy::Embedded(decoder) => decoder.decode(&html::parse(&body))?,
            PageStrategy::PerPage => {
                let mut total = parser::parse_total_pages(&html::parse(&body));
                debug!("[{}] chapter {} has {} pages", ID, chapter_id, total);
                if total > MAX_CHAPTER_PAGES {
                    warn!(
                        "[{}] chapter {} claims {} pages, reading the first {}",
                        ID, chapter_id, total, MAX_CHAPTER_PAGES
                    );
                    total = MAX_CHAPTER_PAGES;
                }

                let mut pages = Vec::new();
                for page in 1..=total {
                    let body = self.fetch(&format!("{}?p={}", path, page)).await?;
                    match parser::parse_page_image(&html::parse(&body), self.base_url()) {
                        Some(image) => pages.push(image),
                        None => warn!("[{}] no image on page {} of {}", ID, page, chapter_id),
                    }
                }
                pages
            }
        };

        Ok(ChapterDetails {
            id: chapter_id.to_string(),
            manga_id: manga_id.to_string(),
            pages,
            long_strip: false,
        })
    }

    async fn get_home_page_sections(&self, callback: SectionCallback<'_>) -> Result<()> {
        let mut sections = vec![
            HomeSection::new("a_recommended", "推荐漫画", false),
            HomeSection::new("z_new_updates", "最近更新", true),
            HomeSection::new("hot_comics", "热门漫画", true),
        ];
        for section in &sections {
            callback(section.clone());
        }

        let body = self.fetch("/comic.html").await?;
        let tiles = parser::parse_home_sections(&html::parse(&body));
        sections[0].items = tiles.recommended;
        sections[1].items = tiles.new_updates;
        sections[2].items = tiles.hot_comics;

        for section in sections {
            callback(section);
        }
        Ok(())
    }

    async fn search_request(
        &self,
        query: &SearchRequest,
        metadata: Option<PageMetadata>,
    ) -> Result<PagedResults> {
        let page = PageMetadata::page_or_first(metadata);
        let keyword = parser::search_keyword(query);
        debug!("[{}] search {:?} page {}", ID, keyword, page);

        let body = self.fetch(&format!("/search/{}/{}.html", keyword, page)).await?;
        let document = html::parse(&body);
        Ok(PagedResults::paged(
            parser::parse_search(&document),
            page,
            parser::is_last_page(&document),
        ))
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        metadata: Option<PageMetadata>,
    ) -> Result<Option<PagedResults>> {
        let page = PageMetadata::page_or_first(metadata);
        let path = match section_id {
            "hot_comics" => format!("/page/hot/{}.html", page),
            "z_new_updates" => format!("/page/new/{}.html", page),
            _ => return Ok(None),
        };
        self.listing(&path, page).await.map(Some)
    }

    async fn get_tags(&self) -> Result<Vec<TagSection>> {
        let body = self.fetch("/page/list.html").await?;
        Ok(parser::parse_tags(&html::parse(&body)))
    }

    async fn updated_manga_page(
        &self,
        page: u32,
        since: DateTime<Utc>,
        ids: &[String],
    ) -> Result<UpdatedManga> {
        let body = self.fetch(&format!("/page/all/{}.html", page)).await?;
        let entries = parser::parse_updates(&html::parse(&body));
        Ok(scan_listing(entries, since, ids, ScanRule::WhileNewer))
    }
}
