//! # Hondana - Manga site adapters for reader hosts
//!
//! Hondana scrapes manga aggregator websites and maps what it finds into the
//! records a manga reader host works with: manga details, chapter lists, page
//! image URLs, search results, tags, home sections and "updated since" polls.
//!
//! ## Features
//!
//! - **One trait per host contract**: every site implements [`Source`]
//! - **Lenient scraping**: missing markup degrades to empty values, never errors
//! - **Pluggable page decoding**: plain images, embedded script arrays and
//!   encrypted image hosts behind [`pages::PageListDecoder`]
//! - **Configurable sites**: domains and headers come from a [`SiteConfig`]
//! - **Testable networking**: sources fetch through the [`net::Fetch`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hondana::prelude::*;
//! use hondana::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sources = Sources::with_defaults();
//!     let source = sources.get("lelmangavf").expect("compiled in by default");
//!
//!     let results = source.search_request(&"one piece".into(), None).await?;
//!     for tile in &results.results {
//!         println!("{} ({})", tile.title, tile.id);
//!     }
//!
//!     let chapters = source.get_chapters("one-piece").await?;
//!     let pages = source.get_chapter_details("one-piece", &chapters[0].id).await?;
//!     println!("{} pages", pages.pages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Checking for updates
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use hondana::prelude::*;
//! use hondana::sources::BainianManga;
//!
//! # async fn example() -> hondana::Result<()> {
//! let source = BainianManga::new();
//! let tracked = vec!["12345".to_string(), "67890".to_string()];
//! let mut updated = Vec::new();
//!
//! source
//!     .filter_updated_manga(
//!         &mut |found: MangaUpdates| updated.extend(found.ids),
//!         Utc::now() - Duration::days(1),
//!         &tracked,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: the [`Source`] trait and the [`Sources`] registry
//! - [`sources`]: one adapter per site, each with a pure `parser` module
//! - [`types`]: records handed back to the host
//! - [`net`]: HTTP client, rate limiting, HTML and JSON helpers
//! - [`pages`]: chapter page list decoders
//! - [`updates`]: the shared update poll driver
//! - [`text`]: chapter number and date normalisation
//! - [`config`]: per-site configuration
//! - [`error`]: error handling

pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod source;
pub mod sources;
pub mod text;
pub mod types;
pub mod updates;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hondana::prelude::*;
///
/// // Now you have access to:
/// // - Sources, Source trait
/// // - the host records (MangaDetails, Chapter, MangaTile, ...)
/// // - SearchRequest, PageMetadata, PagedResults
/// ```
pub mod prelude {
    pub use crate::{
        config::SiteConfig,
        source::{Source, Sources},
        types::{
            Chapter, ChapterDetails, HomeSection, IconText, LanguageCode, MangaDetails,
            MangaStatus, MangaTile, MangaUpdates, PageMetadata, PagedResults, SearchRequest,
            SourceInfo, Tag, TagSection,
        },
    };
}

// Re-export main types at crate root for direct access
pub use config::SiteConfig;
pub use error::{Error, Result};
pub use source::{Source, Sources};
pub use types::{Chapter, ChapterDetails, MangaDetails, MangaTile, PagedResults, SearchRequest};
