//! HTML parsing utilities for sources.
//!
//! Thin helpers over the `scraper` crate. Every helper is lenient: an invalid
//! selector or a missing node yields `None`, an empty string or an empty
//! vector, never an error. Sources are expected to fall back to defaults.
//!
//! # Examples
//!
//! ```rust
//! use hondana::net::html;
//!
//! let document = html::parse(r#"
//!     <div class="vbox">
//!         <a href="/comic/abc-123.html"><h4>One Piece</h4></a>
//!         <img class="img-loading" src="cover.jpg">
//!     </div>
//! "#);
//!
//! let title = html::select_text(&document, ".vbox h4").unwrap();
//! let href = html::select_attr(&document, ".vbox a", "href").unwrap();
//! assert_eq!(title, "One Piece");
//! assert_eq!(html::id_from_url(&href), "abc-123");
//! ```

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:(\d+)|[xX]([0-9a-fA-F]+));").expect("valid entity regex"));

static RELATIVE_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost/").expect("valid placeholder base"));

/// Parses an HTML document from a string.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

fn selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            trace!("invalid selector {:?}: {}", selector, e);
            None
        }
    }
}

/// Concatenated text of an element, untrimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Extracts trimmed text from the first element matching a CSS selector.
///
/// ```rust
/// use hondana::net::html;
///
/// let document = html::parse(r#"<h1 class="title"> One Piece </h1>"#);
/// assert_eq!(html::select_text(&document, ".title"), Some("One Piece".to_string()));
/// assert_eq!(html::select_text(&document, ".missing"), None);
/// ```
pub fn select_text(html: &Html, selector: &str) -> Option<String> {
    first(html.root_element(), selector).map(|el| element_text(el).trim().to_string())
}

/// Extracts an attribute value from the first element matching a CSS selector.
pub fn select_attr(html: &Html, selector: &str, attr: &str) -> Option<String> {
    first(html.root_element(), selector)
        .and_then(|el| el.value().attr(attr).map(String::from))
}

/// Extracts trimmed text content from all elements matching a CSS selector.
///
/// ```rust
/// use hondana::net::html;
///
/// let document = html::parse(r#"
///     <div class="tag-links"><a>Action</a><a>Drame</a></div>
/// "#);
/// assert_eq!(html::select_all_text(&document, ".tag-links a"), vec!["Action", "Drame"]);
/// ```
pub fn select_all_text(html: &Html, selector: &str) -> Vec<String> {
    find_all(html.root_element(), selector)
        .into_iter()
        .map(|el| element_text(el).trim().to_string())
        .collect()
}

/// Extracts attribute values from all elements matching a CSS selector.
///
/// Elements without the attribute are skipped.
pub fn select_all_attr(html: &Html, selector: &str, attr: &str) -> Vec<String> {
    find_all(html.root_element(), selector)
        .into_iter()
        .filter_map(|el| el.value().attr(attr).map(String::from))
        .collect()
}

/// First descendant of `scope` matching `selector`.
pub fn first<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = self::selector(selector)?;
    scope.select(&sel).next()
}

/// All descendants of `scope` matching `selector`, in document order.
pub fn find_all<'a>(scope: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    self::selector(selector)
        .map(|sel| scope.select(&sel).collect())
        .unwrap_or_default()
}

/// Untrimmed text of the first match below `scope`, or an empty string.
pub fn first_text(scope: ElementRef<'_>, selector: &str) -> String {
    first(scope, selector).map(element_text).unwrap_or_default()
}

/// Attribute of the first match below `scope`.
pub fn first_attr(scope: ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    first(scope, selector).and_then(|el| el.value().attr(attr).map(String::from))
}

/// Child elements of `element`, skipping text and comment nodes.
pub fn child_elements<'a>(element: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

/// Whether `element` carries `class` in its class list.
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Whether the last element matching `selector` carries `class`.
///
/// Used for pagination controls, where a `disabled` class on the last
/// control marks the last page.
///
/// ```rust
/// use hondana::net::html;
///
/// let last = html::parse(r#"<ul><li class="page-item">1</li><li class="page-item disabled">»</li></ul>"#);
/// let more = html::parse(r#"<ul><li class="page-item disabled">«</li><li class="page-item">»</li></ul>"#);
/// assert!(html::last_has_class(&last, ".page-item", "disabled"));
/// assert!(!html::last_has_class(&more, ".page-item", "disabled"));
/// ```
pub fn last_has_class(html: &Html, selector: &str, class: &str) -> bool {
    find_all(html.root_element(), selector)
        .last()
        .is_some_and(|el| has_class(*el, class))
}

/// Whether anything below `scope` matches `selector`.
pub fn exists(scope: ElementRef<'_>, selector: &str) -> bool {
    first(scope, selector).is_some()
}

/// Last non-empty path segment of a URL or site-relative href.
///
/// Query strings and fragments are ignored. Returns an empty string when the
/// href has no path.
pub fn last_path_segment(href: &str) -> String {
    let href = href.trim();
    let parsed = Url::parse(href).or_else(|_| RELATIVE_BASE.join(href));

    match parsed {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .unwrap_or_default(),
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Derives a stable id from a URL: its last path segment without a file
/// extension.
///
/// ```rust
/// use hondana::net::html;
///
/// assert_eq!(html::id_from_url("https://site/comic/abc-123.html"), "abc-123");
/// assert_eq!(html::id_from_url("/scan-manga/one-piece/"), "one-piece");
/// assert_eq!(html::id_from_url(""), "");
/// ```
pub fn id_from_url(href: &str) -> String {
    let segment = last_path_segment(href);
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem.to_string()
        }
        _ => segment,
    }
}

/// Completes protocol-relative and site-relative image URLs.
///
/// ```rust
/// use hondana::net::html;
///
/// assert_eq!(html::absolute_url(" //cdn.example.com/a.jpg", "https://example.com"), "https://cdn.example.com/a.jpg");
/// assert_eq!(html::absolute_url("/uploads/a.jpg", "https://example.com/"), "https://example.com/uploads/a.jpg");
/// assert_eq!(html::absolute_url("https://x.org/a.jpg", "https://example.com"), "https://x.org/a.jpg");
/// ```
pub fn absolute_url(src: &str, base_url: &str) -> String {
    let src = src.trim();
    if src.is_empty() || src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            src.trim_start_matches('/')
        )
    }
}

/// Decodes numeric HTML character references (`&#233;`, `&#xE9;`).
///
/// Some sites double-encode text, so entities survive the HTML parser and
/// must be decoded once more. Invalid code points are left untouched.
///
/// ```rust
/// use hondana::net::html;
///
/// assert_eq!(html::decode_entities("&#233;"), "é");
/// assert_eq!(html::decode_entities("Pok&#xE9;mon &#39;XY&#39;"), "Pokémon 'XY'");
/// ```
pub fn decode_entities(text: &str) -> String {
    NUMERIC_ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(dec), _) => dec.as_str().parse::<u32>().ok(),
                (_, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Text content of every `<script>` element, in document order.
pub fn scripts(html: &Html) -> Vec<String> {
    find_all(html.root_element(), "script")
        .into_iter()
        .map(element_text)
        .collect()
}

/// Parsed JSON-LD blocks of the page.
///
/// Blocks that are not valid JSON are skipped; JSON-LD is only ever a
/// fallback for fields the markup also carries.
pub fn json_ld(html: &Html) -> Vec<Value> {
    find_all(html.root_element(), r#"script[type="application/ld+json"]"#)
        .into_iter()
        .filter_map(|el| match serde_json::from_str::<Value>(&element_text(el)) {
            Ok(value) => Some(value),
            Err(e) => {
                trace!("skipping invalid JSON-LD block: {}", e);
                None
            }
        })
        .collect()
}
