//! Page list decoding for chapter reader pages.
//!
//! Sites hand out a chapter's image URLs in one of a few shapes:
//!
//! - plain `<img>` tags, read by [`ImageListDecoder`]
//! - a JSON array of relative paths inside a script literal, joined with a
//!   static image host by [`ScriptArrayDecoder`]
//! - relative paths plus an image host that is encrypted with a key shipped in
//!   the same script, handled by [`EncryptedHostDecoder`]
//!
//! Every shape sits behind [`PageListDecoder`], so a source can swap one for
//! another without touching the rest of its scraping code.
//!
//! # Examples
//!
//! ```rust
//! use hondana::net::html;
//! use hondana::pages::{PageListDecoder, ScriptArrayDecoder};
//!
//! let document = html::parse(r#"
//!     <script>var z_img='["/comic/1.jpg","/comic/2.jpg"]';</script>
//! "#);
//! let decoder = ScriptArrayDecoder::new("z_img", "https://img.example.com");
//! assert_eq!(
//!     decoder.decode(&document).unwrap(),
//!     vec!["https://img.example.com/comic/1.jpg", "https://img.example.com/comic/2.jpg"]
//! );
//! ```

use log::trace;
use regex::Regex;
use scraper::Html;

use crate::error::{Error, Result};
use crate::net::html;

mod encrypted;

pub use encrypted::{EncryptedHostDecoder, decrypt_host};

/// Turns a parsed chapter page into its ordered list of image URLs.
pub trait PageListDecoder: Send + Sync {
    fn decode(&self, document: &Html) -> Result<Vec<String>>;
}

/// Reads image URLs straight from `<img>` elements.
///
/// The first attribute in `attrs` that an element carries wins, which covers
/// lazy-loading markup (`data-src`) next to plain `src`. Protocol-relative and
/// site-relative URLs are completed against `base_url`.
#[derive(Debug, Clone)]
pub struct ImageListDecoder {
    selector: String,
    attrs: Vec<String>,
    base_url: String,
}

impl ImageListDecoder {
    pub fn new(selector: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attrs: vec!["data-src".to_string(), "src".to_string()],
            base_url: base_url.into(),
        }
    }

    /// Replaces the attributes looked up on each image, in priority order.
    pub fn with_attrs(mut self, attrs: &[&str]) -> Self {
        self.attrs = attrs.iter().map(|a| a.to_string()).collect();
        self
    }
}

impl PageListDecoder for ImageListDecoder {
    fn decode(&self, document: &Html) -> Result<Vec<String>> {
        let pages = html::find_all(document.root_element(), &self.selector)
            .into_iter()
            .filter_map(|img| {
                self.attrs
                    .iter()
                    .find_map(|attr| img.value().attr(attr))
                    .map(str::trim)
                    .filter(|src| !src.is_empty())
                    .map(|src| html::absolute_url(src, &self.base_url))
            })
            .collect();
        Ok(pages)
    }
}

/// Reads a JSON array of relative image paths from a script variable and
/// prefixes each path with a static image host.
///
/// Both `var z_img = ["a.jpg"]` and the string-wrapped
/// `var z_img = '["a.jpg"]'` forms are accepted.
#[derive(Debug, Clone)]
pub struct ScriptArrayDecoder {
    images_var: String,
    image_host: String,
}

impl ScriptArrayDecoder {
    pub fn new(images_var: impl Into<String>, image_host: impl Into<String>) -> Self {
        Self {
            images_var: images_var.into(),
            image_host: image_host.into(),
        }
    }
}

impl PageListDecoder for ScriptArrayDecoder {
    fn decode(&self, document: &Html) -> Result<Vec<String>> {
        let paths = script_array(document, &self.images_var)?.ok_or_else(|| {
            Error::parse(format!("no `{}` image list in page scripts", self.images_var))
        })?;

        Ok(paths
            .iter()
            .map(|path| join_host(&self.image_host, path))
            .collect())
    }
}

fn variable_regex(pattern: String) -> Result<Regex> {
    Regex::new(&pattern).map_err(|e| Error::parse(format!("invalid script pattern: {}", e)))
}

/// Value of a quoted string assigned to `var` in any script of the page.
pub(crate) fn script_string(document: &Html, var: &str) -> Result<Option<String>> {
    let re = variable_regex(format!(
        r#"(?:var|let|const)?\s*\b{}\s*=\s*(?:'([^']*)'|"([^"]*)")"#,
        regex::escape(var)
    ))?;

    Ok(html::scripts(document).iter().find_map(|script| {
        re.captures(script).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        })
    }))
}

/// JSON string array assigned to `var`, either as a literal or wrapped in a
/// quoted string. Malformed JSON is an error.
pub(crate) fn script_array(document: &Html, var: &str) -> Result<Option<Vec<String>>> {
    let literal = variable_regex(format!(
        r#"(?s)(?:var|let|const)?\s*\b{}\s*=\s*(\[.*?\])\s*;"#,
        regex::escape(var)
    ))?;

    let raw = match script_string(document, var)? {
        Some(wrapped) => Some(wrapped),
        None => html::scripts(document).iter().find_map(|script| {
            literal
                .captures(script)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        }),
    };

    match raw {
        Some(raw) => {
            trace!("decoding `{}` image list ({} bytes)", var, raw.len());
            let paths: Vec<String> = serde_json::from_str(&raw)?;
            Ok(Some(paths))
        }
        None => Ok(None),
    }
}

/// Prefixes a relative image path with `host`. Absolute URLs pass through.
pub(crate) fn join_host(host: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_list_prefers_lazy_attribute() {
        let document = html::parse(
            r#"<div id="all">
                <img data-src=" //cdn.example.com/1.jpg " src="placeholder.gif">
                <img src="/uploads/2.jpg">
                <img>
            </div>"#,
        );
        let decoder = ImageListDecoder::new("#all img", "https://example.com");
        assert_eq!(
            decoder.decode(&document).unwrap(),
            vec![
                "https://cdn.example.com/1.jpg",
                "https://example.com/uploads/2.jpg"
            ]
        );
    }

    #[test]
    fn test_script_array_literal_form() {
        let document = html::parse(
            r#"<script>
                var chapterImages = ["a/1.png", "https://other.host/2.png"];
                var next = 3;
            </script>"#,
        );
        let decoder = ScriptArrayDecoder::new("chapterImages", "https://img.host/");
        assert_eq!(
            decoder.decode(&document).unwrap(),
            vec!["https://img.host/a/1.png", "https://other.host/2.png"]
        );
    }

    #[test]
    fn test_script_array_missing_variable() {
        let document = html::parse("<script>var other = 1;</script>");
        let decoder = ScriptArrayDecoder::new("z_img", "https://img.host");
        assert!(matches!(decoder.decode(&document), Err(Error::Parse(_))));
    }

    #[test]
    fn test_script_array_malformed_json() {
        let document = html::parse(r#"<script>var z_img='["a.jpg",';</script>"#);
        let decoder = ScriptArrayDecoder::new("z_img", "https://img.host");
        assert!(matches!(decoder.decode(&document), Err(Error::Json(_))));
    }

    #[test]
    fn test_script_string_both_quotes() {
        let document = html::parse(r#"<script>var a = "double"; let b='single';</script>"#);
        assert_eq!(script_string(&document, "a").unwrap().as_deref(), Some("double"));
        assert_eq!(script_string(&document, "b").unwrap().as_deref(), Some("single"));
        assert_eq!(script_string(&document, "c").unwrap(), None);
    }
}
