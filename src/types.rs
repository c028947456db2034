//! Core data types shared by every source.
//!
//! These records mirror the shapes the reader host expects back from a source:
//!
//! - [`MangaDetails`] - Full metadata for one manga
//! - [`Chapter`] - One entry of a manga's chapter list
//! - [`ChapterDetails`] - Ordered page image URLs for one chapter
//! - [`MangaTile`] - Lightweight listing record used by search, home sections
//!   and "view more" pages
//! - [`PagedResults`] - Tiles plus the continuation token for the next page
//! - [`MangaUpdates`] - Ids reported by the update poll
//!
//! Nothing here is persisted; every record is rebuilt from scratch on each
//! call.
//!
//! # Examples
//!
//! ```rust
//! use hondana::types::*;
//!
//! let tile = MangaTile {
//!     id: "abc-123".to_string(),
//!     title: "One Piece".to_string(),
//!     image: "https://example.com/cover.jpg".to_string(),
//!     ..Default::default()
//! };
//! assert!(tile.primary_text.is_none());
//! ```

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Publication status of a manga.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
}

/// A single genre or category label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

/// A named group of tags, e.g. "genres".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSection {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl TagSection {
    /// Creates an empty section.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tags: Vec::new(),
        }
    }
}

/// Full metadata for one manga.
///
/// The id is the site's URL slug. Fields the page does not provide are left
/// at their defaults: empty strings, zero counters, no date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaDetails {
    /// URL slug of the manga
    pub id: String,

    /// Main title first, alternative titles after it
    #[serde(default)]
    pub titles: Vec<String>,

    /// Cover image URL
    pub image: String,

    pub rating: f64,

    pub status: MangaStatus,

    pub author: String,

    pub artist: String,

    #[serde(default)]
    pub tags: Vec<TagSection>,

    pub views: u64,

    pub follows: u64,

    /// Last update as shown on the page; `None` when the text is not a date
    pub last_update: Option<DateTime<Utc>>,

    pub description: String,

    pub hentai: bool,
}

/// Language of a chapter, as reported by the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageCode {
    #[default]
    Unknown,
    English,
    French,
    Spanish,
    German,
    Italian,
    Portuguese,
    Japanese,
    Korean,
    Chinese,
    Russian,
}

impl LanguageCode {
    /// Maps the value of an `<html lang="...">` attribute to a language.
    ///
    /// Only the primary subtag is considered, so `fr-FR` and `fr` both map to
    /// [`LanguageCode::French`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::types::LanguageCode;
    ///
    /// assert_eq!(LanguageCode::from_html_lang("fr-FR"), LanguageCode::French);
    /// assert_eq!(LanguageCode::from_html_lang("xx"), LanguageCode::Unknown);
    /// ```
    pub fn from_html_lang(lang: &str) -> Self {
        let primary = lang
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match primary.as_str() {
            "en" => Self::English,
            "fr" => Self::French,
            "es" => Self::Spanish,
            "de" => Self::German,
            "it" => Self::Italian,
            "pt" => Self::Portuguese,
            "ja" | "jp" => Self::Japanese,
            "ko" | "kr" => Self::Korean,
            "zh" | "cn" => Self::Chinese,
            "ru" => Self::Russian,
            _ => Self::Unknown,
        }
    }
}

/// One entry of a manga's chapter list.
///
/// The chapter number can be decimal: unnumbered extras sitting between
/// chapter N and N+1 are numbered N + 0.5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique identifier within the source
    pub id: String,

    /// Associated manga ID
    pub manga_id: String,

    /// Display name
    pub name: String,

    /// Chapter number (can be decimal for .5 chapters)
    pub number: f64,

    pub volume: Option<f64>,

    /// Scanlation group or list grouping, when the site exposes one
    pub group: Option<String>,

    pub lang_code: LanguageCode,

    /// Publish date; `None` when the page text is not a date
    pub time: Option<DateTime<Utc>>,
}

/// Page image URLs for one chapter, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDetails {
    pub id: String,
    pub manga_id: String,
    #[serde(default)]
    pub pages: Vec<String>,
    pub long_strip: bool,
}

/// A short text with an optional icon name, used for tile annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconText {
    pub text: String,
    pub icon: Option<String>,
}

impl IconText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: Some(icon.into()),
        }
    }
}

/// Lightweight summary record used by listing views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaTile {
    pub id: String,
    pub title: String,
    pub image: String,
    pub subtitle_text: Option<IconText>,
    /// Usually a rating
    pub primary_text: Option<IconText>,
    /// Usually an update time
    pub secondary_text: Option<IconText>,
}

/// A titled row of tiles shown on the host's home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<MangaTile>,
    /// Whether [`Source::get_view_more_items`](crate::Source::get_view_more_items)
    /// can page through this section
    pub view_more: bool,
}

impl HomeSection {
    /// Creates a section skeleton without items.
    pub fn new(id: impl Into<String>, title: impl Into<String>, view_more: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
            view_more,
        }
    }
}

/// Continuation token handed back to the caller for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
}

impl PageMetadata {
    /// Page to fetch for a request carrying `metadata`; the first page is 1.
    pub fn page_or_first(metadata: Option<PageMetadata>) -> u32 {
        metadata.map(|m| m.page).unwrap_or(1)
    }
}

/// One page of tiles plus the token for the next page.
///
/// `metadata` is `None` on the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResults {
    #[serde(default)]
    pub results: Vec<MangaTile>,
    pub metadata: Option<PageMetadata>,
}

impl PagedResults {
    /// Builds a page of results, emitting a token for `page + 1` unless this
    /// is the last page.
    pub fn paged(results: Vec<MangaTile>, page: u32, last_page: bool) -> Self {
        Self {
            results,
            metadata: (!last_page).then_some(PageMetadata { page: page + 1 }),
        }
    }
}

/// Search parameters as sent by the host.
///
/// # Examples
///
/// ```rust
/// use hondana::types::SearchRequestBuilder;
///
/// let query = SearchRequestBuilder::default()
///     .title(Some("one piece".to_string()))
///     .build()
///     .unwrap();
/// assert!(query.author.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct SearchRequest {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl From<&str> for SearchRequest {
    fn from(title: &str) -> Self {
        SearchRequest {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

impl From<String> for SearchRequest {
    fn from(title: String) -> Self {
        SearchRequest {
            title: Some(title),
            ..Default::default()
        }
    }
}

/// Ids found by one step of the update poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaUpdates {
    pub ids: Vec<String>,
}

/// Colour of a badge shown next to a source in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    Blue,
    Green,
    Grey,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTag {
    pub text: String,
    pub kind: TagType,
}

/// Static description of a source, shown by the host's source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub version: String,
    pub name: String,
    pub icon: String,
    pub author: String,
    pub author_website: String,
    pub description: String,
    pub hentai_source: bool,
    pub website_base_url: String,
    #[serde(default)]
    pub source_tags: Vec<SourceTag>,
}
