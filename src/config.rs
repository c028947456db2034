//! Per-site configuration.
//!
//! A [`SiteConfig`] carries everything a source needs to know about the site
//! it scrapes: the domain, the headers to send and how politely to send them.
//! Every source ships a `default_config()` and accepts a replacement through
//! its `with_config` constructor, so a mirror domain only needs a new config.
//!
//! Configs can be built in code or deserialized from JSON:
//!
//! ```rust
//! use hondana::config::SiteConfig;
//!
//! let config = SiteConfig::from_json(r#"{ "base_url": "https://mirror.example.com/" }"#).unwrap();
//! assert_eq!(config.base_url(), "https://mirror.example.com");
//! assert_eq!(config.max_retries, 0);
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

fn default_rate_limit_ms() -> u64 {
    500
}

/// Connection settings for one site.
///
/// # Builder Usage
///
/// ```rust
/// use hondana::config::SiteConfigBuilder;
///
/// let config = SiteConfigBuilder::default()
///     .base_url("https://m.bnmanhua.com")
///     .rate_limit_ms(1000u64)
///     .build()
///     .unwrap();
/// assert!(config.headers.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct SiteConfig {
    /// Site root, e.g. `https://www.lelmangavf.com`
    base_url: String,

    /// Minimum delay between two requests to this site
    #[builder(default = "default_rate_limit_ms()")]
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Extra attempts after a failed request. Zero disables retrying.
    #[builder(default)]
    #[serde(default)]
    pub max_retries: u32,

    #[builder(default)]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request, e.g. `Referer`
    #[builder(default)]
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl SiteConfig {
    /// Creates a config for `base_url` with default politeness settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            rate_limit_ms: default_rate_limit_ms(),
            max_retries: 0,
            user_agent: None,
            headers: HashMap::new(),
        }
    }

    /// Parses a config from JSON. Missing optional fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Site root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Resolves a site-relative path against the base URL.
    ///
    /// ```rust
    /// use hondana::config::SiteConfig;
    ///
    /// let config = SiteConfig::new("https://example.com/");
    /// assert_eq!(config.url("/comic/abc.html"), "https://example.com/comic/abc.html");
    /// assert_eq!(config.url("page/list.html"), "https://example.com/page/list.html");
    /// ```
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}
