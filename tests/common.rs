//! Common test utilities
//!
//! Shared functionality used across all test modules. Sources are driven
//! through [`FixtureFetcher`], so no test touches the network.

use async_trait::async_trait;
use hondana::net::Fetch;
use hondana::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

#[allow(dead_code)]
pub const BAINIAN_BASE: &str = "https://bainian.test";
#[allow(dead_code)]
pub const LELMANGAVF_BASE: &str = "https://lelmangavf.test";

/// Installs `env_logger` once per test binary. Set `RUST_LOG=hondana=trace`
/// to see request and parser logs.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reads a file from `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
}

/// Serves canned bodies by exact URL and records every requested URL.
///
/// Unknown URLs fail with [`Error::NotFound`].
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Serves the fixture file `name` for `url`.
    pub fn with_fixture(self, url: impl Into<String>, name: &str) -> Self {
        self.with_page(url, fixture(name))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Fetch for FixtureFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requests.lock().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no fixture for {}", url)))
    }
}
