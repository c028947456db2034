//! Page parsers for Lelmangavf.
//!
//! The site double-encodes accented characters in titles, names and
//! descriptions, so those go through [`html::decode_entities`] once more.

use chrono::{DateTime, Utc};
use log::trace;
use scraper::{ElementRef, Html};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::Result;
use crate::net::{html, json};
use crate::text;
use crate::types::{
    Chapter, IconText, LanguageCode, MangaDetails, MangaStatus, MangaTile, Tag, TagSection,
};
use crate::updates::ListingEntry;

const MATURE_GENRE: &str = "Mature";
const DEFAULT_LANG: &str = "fr";

/// Labelled fields of the `.dl-horizontal` block, keyed by lowercased label.
fn definition_list(list: ElementRef<'_>) -> Vec<(String, ElementRef<'_>)> {
    let mut fields = Vec::new();
    let mut label = String::new();

    for child in html::child_elements(list) {
        match child.value().name() {
            "dt" => label = html::element_text(child).trim().to_lowercase(),
            "dd" => fields.push((label.clone(), child)),
            _ => {}
        }
    }
    fields
}

fn single_line(element: ElementRef<'_>) -> String {
    html::element_text(element)
        .replace(['\r', '\n'], "")
        .trim()
        .to_string()
}

fn genre_labels(scope: ElementRef<'_>) -> Vec<String> {
    html::first(scope, ".tag-links")
        .map(html::child_elements)
        .unwrap_or_default()
        .into_iter()
        .map(|tag| html::element_text(tag).trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parses a manga page (`/scan-manga/{id}`).
///
/// Author, artist, status and alternative titles are looked up by their
/// label in the definition list, in French or English.
pub fn parse_manga_details(document: &Html, manga_id: &str, base_url: &str) -> MangaDetails {
    let root = document.root_element();
    let panel = html::first(root, ".row").unwrap_or(root);
    let table = html::first(panel, ".dl-horizontal");

    let title = html::decode_entities(html::first_text(panel, ".widget-title").trim());
    let mut titles = vec![title];
    let mut details = MangaDetails {
        id: manga_id.to_string(),
        image: html::first_attr(panel, "img", "src")
            .map(|src| html::absolute_url(&src, base_url))
            .unwrap_or_default(),
        ..Default::default()
    };

    for (label, value) in table.map(definition_list).unwrap_or_default() {
        if label.contains("auteur") || label.contains("author") {
            details.author = html::decode_entities(&single_line(value));
        } else if label.contains("artist") {
            details.artist = html::decode_entities(&single_line(value));
        } else if label.contains("statut") || label.contains("status") {
            let status = single_line(value).to_lowercase();
            details.status = if status.contains("ongoing") || status.contains("en cours") {
                MangaStatus::Ongoing
            } else {
                MangaStatus::Completed
            };
        } else if label.contains("autres noms") || label.contains("other names") {
            titles.extend(
                single_line(value)
                    .split(", ")
                    .map(|alt| html::decode_entities(alt).trim().to_string())
                    .filter(|alt| !alt.is_empty()),
            );
        }
    }

    let genres = table.map(genre_labels).unwrap_or_default();
    details.hentai = genres.iter().any(|genre| genre == MATURE_GENRE);
    let mut section = TagSection::new("0", "genres");
    section.tags = genres
        .into_iter()
        .map(|genre| Tag {
            id: genre.clone(),
            label: genre,
        })
        .collect();
    details.tags = vec![section];

    details.rating = html::select_attr(document, ".rating div#item-rating", "data-score")
        .and_then(|score| score.trim().parse().ok())
        .unwrap_or(0.0);

    details.last_update = html::select_text(document, ".chapters .date-chapter-title-rtl")
        .and_then(|date| text::parse_date(&date));

    details.description = html::first(panel, ".well")
        .and_then(|well| html::child_elements(well).pop())
        .map(|last| html::decode_entities(html::element_text(last).trim()))
        .unwrap_or_default();

    details.titles = titles;
    details
}

/// Parses the chapter list of a manga page.
///
/// Chapter ids are the last path segment of the chapter link; the reader page
/// lives at `/scan-manga/{manga_id}/{chapter_id}`.
pub fn parse_chapters(document: &Html, manga_id: &str, now: DateTime<Utc>) -> Vec<Chapter> {
    let lang = document.root_element().value().attr("lang").unwrap_or(DEFAULT_LANG);
    let lang_code = LanguageCode::from_html_lang(lang);

    html::find_all(document.root_element(), r#".chapters li[class^="volume-"]"#)
        .into_iter()
        .filter_map(|item| {
            let title = html::first(item, ".chapter-title-rtl")?;
            let href = html::first_attr(title, "a", "href")?;
            let number = text::trailing_number(&html::first_text(title, "a")).unwrap_or(0.0);
            let group = item
                .value()
                .attr("class")
                .map(|class| html::decode_entities(class.trim()))
                .filter(|class| !class.is_empty());
            let date = html::first_text(item, ".action .date-chapter-title-rtl");

            Some(Chapter {
                id: html::last_path_segment(&href),
                manga_id: manga_id.to_string(),
                name: html::decode_entities(html::first_text(title, "em").trim()),
                number,
                group,
                lang_code,
                time: Some(text::relative_date(date.trim(), now)),
                ..Default::default()
            })
        })
        .collect()
}

/// Rows of the latest release listing, newest first.
pub fn parse_updates(document: &Html, now: DateTime<Utc>) -> Vec<ListingEntry> {
    html::find_all(document.root_element(), ".mangalist .manga-item")
        .into_iter()
        .filter_map(|item| {
            let href = html::first_attr(item, "a", "href")?;
            let id = html::last_path_segment(&href);
            if id.is_empty() {
                return None;
            }
            let time = text::relative_date(html::first_text(item, ".pull-right").trim(), now);
            Some(ListingEntry::new(id, Some(time)))
        })
        .collect()
}

/// Filters the site's autosuggest JSON for entries whose title contains
/// `search`, ignoring case.
///
/// The payload is `{"suggestions": [{"value": title, "data": slug}, ...]}`.
/// Malformed JSON is an error.
pub fn parse_search(payload: &str, search: &str, base_url: &str) -> Result<Vec<MangaTile>> {
    let data: Value = serde_json::from_str(payload)?;
    let search = search.trim().to_lowercase();

    let tiles = json::extract_array(&data, "suggestions")
        .iter()
        .filter_map(|entry| {
            let title = json::extract_str(entry, "value")?;
            let slug = json::extract_str(entry, "data")?;
            if !title.to_lowercase().contains(&search) {
                return None;
            }
            trace!("search match {:?} ({})", title, slug);
            Some(MangaTile {
                image: format!("{}/uploads/manga/{}/cover/cover_250x350.jpg", base_url, slug),
                id: slug,
                title: html::decode_entities(&title),
                ..Default::default()
            })
        })
        .collect();
    Ok(tiles)
}

/// Genre list of the manga directory page.
pub fn parse_tags(document: &Html) -> Vec<TagSection> {
    let mut genres = TagSection::new("0", "genres");
    genres.tags = html::select_all_text(document, ".tag-links a")
        .into_iter()
        .map(|label| Tag {
            id: label.clone(),
            label,
        })
        .collect();
    vec![genres]
}

/// Manga id of a series link such as `/series/one-piece/` or
/// `/scan-manga/one-piece`.
fn series_id(href: &str) -> String {
    let path = href.trim().split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    segments
        .iter()
        .position(|s| *s == "series" || *s == "scan-manga")
        .and_then(|i| segments.get(i + 1))
        .map(|s| s.to_string())
        .unwrap_or_else(|| html::last_path_segment(href))
}

/// Tiles of a browse page. Items without a cover are skipped and repeated ids
/// are kept once.
pub fn parse_home_section(document: &Html, now: DateTime<Utc>) -> Vec<MangaTile> {
    let mut seen = HashSet::new();

    html::find_all(document.root_element(), "#series-list .item")
        .into_iter()
        .filter_map(|item| {
            let id = series_id(&html::first_attr(item, "a", "href")?);
            let image = html::first_attr(item, "img", "src")?;
            if id.is_empty() || !seen.insert(id.clone()) {
                return None;
            }

            let time = text::relative_date(html::first_text(item, "i").trim(), now);
            let subtitle = html::first_text(item, ".visited").trim().to_string();
            Some(MangaTile {
                id,
                title: html::decode_entities(html::first_text(item, ".item-title").trim()),
                image,
                subtitle_text: (!subtitle.is_empty()).then(|| IconText::new(subtitle)),
                primary_text: Some(IconText::with_icon(text::date_string(&time), "clock.fill")),
                ..Default::default()
            })
        })
        .collect()
}

/// The last page has its final pagination control disabled.
pub fn is_last_page(document: &Html) -> bool {
    html::last_has_class(document, ".page-item", "disabled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_id() {
        assert_eq!(series_id("/series/one-piece/"), "one-piece");
        assert_eq!(series_id("https://www.lelmangavf.com/scan-manga/naruto"), "naruto");
        assert_eq!(series_id("/manga/bleach?page=2"), "bleach");
    }

    #[test]
    fn test_search_filters_case_insensitively() {
        let payload = r#"{"suggestions": [
            {"value": "One Piece", "data": "one-piece"},
            {"value": "Pok&#233;mon", "data": "pokemon"},
            {"value": "Naruto", "data": "naruto"}
        ]}"#;
        let tiles = parse_search(payload, "PIECE", "https://example.com").unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].id, "one-piece");
        assert_eq!(
            tiles[0].image,
            "https://example.com/uploads/manga/one-piece/cover/cover_250x350.jpg"
        );

        let tiles = parse_search(payload, "", "https://example.com").unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[1].title, "Pokémon");
    }

    #[test]
    fn test_search_rejects_malformed_payload() {
        assert!(parse_search("<html>", "x", "https://example.com").is_err());
    }

    #[test]
    fn test_home_section_dedupes_and_needs_cover() {
        let now = Utc::now();
        let document = html::parse(
            r#"<div id="series-list">
                <div class="item"><a href="/series/a/"><img src="a.jpg"></a><span class="item-title">A</span></div>
                <div class="item"><a href="/series/a/"><img src="a2.jpg"></a><span class="item-title">A again</span></div>
                <div class="item"><a href="/series/b/"></a><span class="item-title">No cover</span></div>
            </div>"#,
        );
        let tiles = parse_home_section(&document, now);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].image, "a.jpg");
        assert_eq!(
            tiles[0].primary_text.as_ref().unwrap().text,
            text::date_string(&now)
        );
    }
}
