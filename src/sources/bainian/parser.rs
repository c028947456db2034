//! Page parsers for BainianManga.
//!
//! Every function takes an already parsed document and never fails: missing
//! nodes become empty strings, zero or `None`.

use chrono::{DateTime, Utc};
use log::trace;
use scraper::{ElementRef, Html};

use crate::net::{html, json};
use crate::text;
use crate::types::{
    Chapter, IconText, LanguageCode, MangaDetails, MangaStatus, MangaTile, SearchRequest, Tag,
    TagSection,
};
use crate::updates::ListingEntry;

const ONGOING: &str = "连载中";
const AUTHOR_PREFIX: &str = "作者：";
const UPDATED_PREFIX: &str = "更新：";
const HENTAI_GENRE: &str = "biantai";

const STAR: &str = "star.fill";
const CLOCK: &str = "clock.fill";

/// Tiles for the three home sections, all read from `/comic.html`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeTiles {
    pub recommended: Vec<MangaTile>,
    pub new_updates: Vec<MangaTile>,
    pub hot_comics: Vec<MangaTile>,
}

fn annotation(text: &str, icon: &str) -> Option<IconText> {
    let text = text.trim();
    (!text.is_empty()).then(|| IconText::with_icon(text, icon))
}

fn subtitle(text: &str) -> Option<IconText> {
    let text = text.trim();
    (!text.is_empty()).then(|| IconText::new(text))
}

fn first_link_id(item: ElementRef<'_>) -> String {
    html::first_attr(item, "a", "href")
        .map(|href| html::id_from_url(&href))
        .unwrap_or_default()
}

fn author_from_json_ld(document: &Html) -> Option<String> {
    html::json_ld(document).iter().find_map(|block| {
        json::extract_str(block, "author.name")
            .or_else(|| json::extract_str(block, "author.0.name"))
            .or_else(|| json::extract_str(block, "author"))
    })
}

/// Parses a manga landing page (`/comic/{id}.html`).
pub fn parse_manga_details(document: &Html, manga_id: &str) -> MangaDetails {
    let root = document.root_element();
    let info = html::first(root, "div.data").unwrap_or(root);

    let title = html::first_text(info, "h4").trim().to_string();
    let image = html::select_attr(document, "div.img .mip-fill-content", "src").unwrap_or_default();

    let mut author = html::first_text(info, ".dir")
        .trim()
        .replace(AUTHOR_PREFIX, "")
        .trim()
        .to_string();
    if author.is_empty() {
        author = author_from_json_ld(document).unwrap_or_default();
    }

    let status = match html::select_text(document, "span.list_item") {
        Some(status) if status == ONGOING => MangaStatus::Ongoing,
        _ => MangaStatus::Completed,
    };

    let mut hentai = false;
    let mut genres = TagSection::new("0", "genres");
    for link in html::find_all(info, ".yac a") {
        let href = link.value().attr("href").unwrap_or_default();
        if href.contains(HENTAI_GENRE) {
            hentai = true;
        }
        let stem = html::id_from_url(href);
        let id = stem.rsplit('-').next().unwrap_or_default().to_string();
        genres.tags.push(Tag {
            id,
            label: html::element_text(link).trim().to_string(),
        });
    }

    let activity = html::first_text(info, ".act");
    let last_update = activity
        .split("  /  ")
        .next()
        .map(|updated| updated.replace(UPDATED_PREFIX, ""))
        .and_then(|updated| text::parse_date(&updated));

    MangaDetails {
        id: manga_id.to_string(),
        titles: vec![title],
        image,
        status,
        author,
        tags: vec![genres],
        last_update,
        description: html::select_text(document, "div.tbox_js").unwrap_or_default(),
        hentai,
        ..Default::default()
    }
}

/// Parses the chapter list on the manga landing page.
///
/// Chapter numbers come from a leading `第N` in the label; labels without one
/// are numbered from the chapter listed after them.
pub fn parse_chapters(document: &Html, manga_id: &str) -> Vec<Chapter> {
    let mut rows = Vec::new();

    for item in html::find_all(document.root_element(), ".list_block li") {
        let Some(href) = html::first_attr(item, "a", "href") else {
            trace!("skipping chapter row without a link");
            continue;
        };
        let name = html::first_text(item, "a").trim().to_string();
        let time = html::first_attr(item, ".chapter-time", "title")
            .and_then(|title| text::parse_date(&title));
        rows.push((html::id_from_url(&href), name, time));
    }

    let parsed: Vec<Option<f64>> = rows
        .iter()
        .map(|(_, name, _)| text::leading_chapter_number(name))
        .collect();
    let numbers = text::interpolate_chapter_numbers(&parsed);

    rows.into_iter()
        .zip(numbers)
        .map(|((id, name, time), number)| Chapter {
            id,
            manga_id: manga_id.to_string(),
            name,
            number,
            lang_code: LanguageCode::Chinese,
            time,
            ..Default::default()
        })
        .collect()
}

/// Number of reader pages a chapter is split into, from `#k_total`.
pub fn parse_total_pages(document: &Html) -> u32 {
    html::select_text(document, ".bo_tit span#k_total")
        .and_then(|total| total.parse().ok())
        .unwrap_or(0)
}

/// The single page image on one reader page.
pub fn parse_page_image(document: &Html, base_url: &str) -> Option<String> {
    html::select_attr(document, "img[src]", "src")
        .map(|src| html::absolute_url(&src, base_url))
        .filter(|src| !src.is_empty())
}

/// Rows of an updates listing (`/page/all/{n}.html`), newest first.
///
/// The update time is the text of the second `h4` of each row.
pub fn parse_updates(document: &Html) -> Vec<ListingEntry> {
    html::find_all(document.root_element(), ".tbox_m .vbox")
        .into_iter()
        .map(|item| {
            let time = html::find_all(item, "h4")
                .get(1)
                .and_then(|h4| text::parse_date(&html::element_text(*h4)));
            ListingEntry::new(first_link_id(item), time)
        })
        .collect()
}

/// Parses the three home sections from the `/comic.html` page.
pub fn parse_home_sections(document: &Html) -> HomeTiles {
    let root = document.root_element();

    let recommended = html::find_all(root, ".owl-carousel .item")
        .into_iter()
        .map(|item| MangaTile {
            id: first_link_id(item),
            title: html::first_text(item, "a").trim().to_string(),
            image: html::first_attr(item, "img", "src").unwrap_or_default(),
            subtitle_text: subtitle(&html::first_text(item, "[rel=nofollow]")),
            ..Default::default()
        })
        .collect();

    let new_updates = html::find_all(root, ".panel-content-homepage .content-homepage-item")
        .into_iter()
        .map(|item| {
            let right = html::first(item, ".content-homepage-item-right").unwrap_or(item);
            let latest = html::first(right, ".item-chapter")
                .map(|chapter| html::first_text(chapter, "i"))
                .unwrap_or_default();
            MangaTile {
                id: first_link_id(item),
                title: html::first_text(right, "a").trim().to_string(),
                image: html::first_attr(item, "img", "src").unwrap_or_default(),
                subtitle_text: subtitle(&html::first_text(right, ".item-author")),
                primary_text: annotation(&html::first_text(item, ".genres-item-rate"), STAR),
                secondary_text: annotation(&latest, CLOCK),
            }
        })
        .collect();

    let hot_comics = html::find_all(root, ".panel-newest-content a")
        .into_iter()
        .map(|link| MangaTile {
            id: html::id_from_url(link.value().attr("href").unwrap_or_default()),
            title: html::first_attr(link, "img", "alt").unwrap_or_default(),
            image: html::first_attr(link, "img", "src").unwrap_or_default(),
            ..Default::default()
        })
        .collect();

    HomeTiles {
        recommended,
        new_updates,
        hot_comics,
    }
}

/// Keyword path segment for `/search/{keyword}/{page}.html`.
///
/// Words of the title and then the author are joined with `+`.
///
/// ```rust
/// use hondana::sources::bainian::parser::search_keyword;
/// use hondana::types::SearchRequest;
///
/// assert_eq!(search_keyword(&SearchRequest::from("one piece")), "one+piece");
/// ```
pub fn search_keyword(query: &SearchRequest) -> String {
    [query.title.as_deref(), query.author.as_deref()]
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace)
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// Result tiles of a search page.
pub fn parse_search(document: &Html) -> Vec<MangaTile> {
    html::find_all(document.root_element(), ".tbox_m .vbox")
        .into_iter()
        .map(|item| MangaTile {
            id: first_link_id(item),
            title: html::first_attr(item, ".vbox_t", "title").unwrap_or_default(),
            image: html::first_attr(item, ".img-loading", "src").unwrap_or_default(),
            primary_text: annotation(&html::first_text(item, ".genres-item-rate"), STAR),
            secondary_text: annotation(&html::first_text(item, ".genres-item-time"), CLOCK),
            ..Default::default()
        })
        .collect()
}

/// Genre list of the advanced search page (`/page/list.html`).
pub fn parse_tags(document: &Html) -> Vec<TagSection> {
    let mut genres = TagSection::new("genre", "Genre");
    genres.tags = html::find_all(document.root_element(), ".advanced-search-tool-genres-list span")
        .into_iter()
        .map(|span| Tag {
            id: span.value().attr("data-i").unwrap_or_default().to_string(),
            label: html::element_text(span).trim().to_string(),
        })
        .collect();
    vec![genres]
}

/// Tiles of a hot / new listing page.
///
/// Listing times can run ahead of `now`; they are shown as one minute ago.
pub fn parse_view_more(document: &Html, now: DateTime<Utc>) -> Vec<MangaTile> {
    html::find_all(document.root_element(), ".panel-content-genres .content-genres-item")
        .into_iter()
        .map(|item| {
            let raw_time = html::first_text(item, ".genres-item-time");
            let time = match text::parse_date(&raw_time) {
                Some(time) => text::date_string(&text::clamp_to_past(time, now)),
                None => raw_time.trim().to_string(),
            };
            MangaTile {
                id: first_link_id(item),
                title: html::first_text(item, ".genres-item-name").trim().to_string(),
                image: html::first_attr(item, "img", "src").unwrap_or_default(),
                subtitle_text: subtitle(&html::first_text(item, ".genres-item-chap")),
                primary_text: annotation(&html::first_text(item, ".genres-item-rate"), STAR),
                secondary_text: annotation(&time, CLOCK),
            }
        })
        .collect()
}

/// A listing page is the last one when the final pagination control (the
/// "next" arrow) is disabled. A disabled "previous" arrow on page 1 does not
/// count.
pub fn is_last_page(document: &Html) -> bool {
    html::last_has_class(document, ".pagination li", "disabled")
}
