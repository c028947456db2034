//! "Updated since" polling over a site's latest-updates listing.
//!
//! Listings are assumed to be in descending update order. A scan walks one
//! listing page from the top and reports every entry newer than the reference
//! time whose id the caller tracks. The first entry at or before the reference
//! time ends the scan.
//!
//! The two supported sites disagree on what an entry without a readable time
//! means and on whether an empty page asks for more, so the decision is
//! captured per source as a [`ScanRule`].
//!
//! # Examples
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use hondana::updates::{ListingEntry, ScanRule, scan_listing};
//!
//! let since = Utc::now() - Duration::hours(6);
//! let entries = vec![
//!     ListingEntry::new("a", Some(since + Duration::hours(2))),
//!     ListingEntry::new("b", Some(since + Duration::hours(1))),
//!     ListingEntry::new("c", Some(since - Duration::hours(1))),
//!     ListingEntry::new("d", Some(since + Duration::hours(3))),
//! ];
//! let tracked = vec!["b".to_string(), "c".to_string(), "d".to_string()];
//!
//! let scan = scan_listing(entries, since, &tracked, ScanRule::WhileNewer);
//! assert_eq!(scan.ids, vec!["b"]);
//! assert!(!scan.load_more);
//! ```

use chrono::{DateTime, Utc};
use log::debug;
use std::future::Future;

use crate::error::Result;
use crate::types::MangaUpdates;

/// One row of an updates listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub id: String,
    /// Update time; `None` when the listing text is not a date
    pub time: Option<DateTime<Utc>>,
}

impl ListingEntry {
    /// Creates an entry for `id` updated at `time`.
    pub fn new(id: impl Into<String>, time: Option<DateTime<Utc>>) -> Self {
        Self {
            id: id.into(),
            time,
        }
    }
}

/// How a source decides whether an entry is newer and whether to load more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRule {
    /// An entry counts only if its time is known and after the reference.
    /// More pages are requested only while the last examined entry was newer,
    /// so an empty page ends the poll.
    WhileNewer,
    /// An entry counts unless its time is known and at or before the
    /// reference. More pages are requested until the reference time is
    /// passed, so an empty page asks for the next one.
    UntilPassed,
}

impl ScanRule {
    fn is_newer(self, time: Option<DateTime<Utc>>, since: DateTime<Utc>) -> bool {
        match self {
            ScanRule::WhileNewer => time.is_some_and(|t| t > since),
            ScanRule::UntilPassed => !time.is_some_and(|t| t <= since),
        }
    }

    fn load_more_on_empty(self) -> bool {
        matches!(self, ScanRule::UntilPassed)
    }
}

/// Result of scanning one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatedManga {
    /// Tracked ids found newer than the reference time, in listing order
    pub ids: Vec<String>,
    /// Whether the next listing page may hold more updates
    pub load_more: bool,
    /// Number of entries on the page, whether or not they were examined
    pub entries: usize,
}

/// Scans one listing page. See the module docs for the stopping rule.
pub fn scan_listing<I>(
    entries: I,
    since: DateTime<Utc>,
    tracked: &[String],
    rule: ScanRule,
) -> UpdatedManga
where
    I: IntoIterator<Item = ListingEntry>,
{
    let entries: Vec<ListingEntry> = entries.into_iter().collect();
    let mut ids = Vec::new();
    let mut load_more = rule.load_more_on_empty();

    for entry in &entries {
        let newer = rule.is_newer(entry.time, since);
        load_more = newer;
        if !newer {
            break;
        }
        if tracked.contains(&entry.id) {
            ids.push(entry.id.clone());
        }
    }

    UpdatedManga {
        ids,
        load_more,
        entries: entries.len(),
    }
}

/// Drives a page-by-page update poll.
///
/// `fetch_page` loads and scans listing page `n`, starting at 1. Found ids are
/// reported through `callback` after each page that has any. The poll ends when
/// a page says not to load more, or when a page has no entries at all.
pub async fn poll_updates<F, Fut>(
    mut fetch_page: F,
    callback: &mut (dyn FnMut(MangaUpdates) + Send),
) -> Result<()>
where
    F: FnMut(u32) -> Fut + Send,
    Fut: Future<Output = Result<UpdatedManga>> + Send,
{
    let mut page = 1;

    loop {
        let scan = fetch_page(page).await?;
        debug!(
            "update poll page {}: {} entries, {} tracked ids updated, load_more={}",
            page,
            scan.entries,
            scan.ids.len(),
            scan.load_more
        );

        if !scan.ids.is_empty() {
            callback(MangaUpdates { ids: scan.ids });
        }

        if !scan.load_more || scan.entries == 0 {
            return Ok(());
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tracked(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_newer_asks_for_more() {
        let since = Utc::now() - Duration::days(1);
        let entries = vec![
            ListingEntry::new("a", Some(since + Duration::hours(3))),
            ListingEntry::new("b", Some(since + Duration::hours(2))),
        ];
        for rule in [ScanRule::WhileNewer, ScanRule::UntilPassed] {
            let scan = scan_listing(entries.clone(), since, &tracked(&["a", "b"]), rule);
            assert_eq!(scan.ids, vec!["a", "b"]);
            assert!(scan.load_more);
        }
    }

    #[test]
    fn test_equal_time_is_not_newer() {
        let since = Utc::now();
        let entries = vec![ListingEntry::new("a", Some(since))];
        for rule in [ScanRule::WhileNewer, ScanRule::UntilPassed] {
            let scan = scan_listing(entries.clone(), since, &tracked(&["a"]), rule);
            assert!(scan.ids.is_empty());
            assert!(!scan.load_more);
        }
    }

    #[test]
    fn test_unknown_time_depends_on_rule() {
        let since = Utc::now();
        let entries = vec![
            ListingEntry::new("a", None),
            ListingEntry::new("b", Some(since - Duration::hours(1))),
        ];

        let scan = scan_listing(entries.clone(), since, &tracked(&["a"]), ScanRule::WhileNewer);
        assert!(scan.ids.is_empty());
        assert!(!scan.load_more);

        let scan = scan_listing(entries, since, &tracked(&["a"]), ScanRule::UntilPassed);
        assert_eq!(scan.ids, vec!["a"]);
        assert!(!scan.load_more);
    }

    #[test]
    fn test_empty_page_depends_on_rule() {
        let since = Utc::now();
        let scan = scan_listing(Vec::new(), since, &[], ScanRule::WhileNewer);
        assert!(!scan.load_more);
        let scan = scan_listing(Vec::new(), since, &[], ScanRule::UntilPassed);
        assert!(scan.load_more);
        assert_eq!(scan.entries, 0);
    }

    #[tokio::test]
    async fn test_poll_walks_pages_until_reference() {
        let since = Utc::now() - Duration::days(2);
        let pages = vec![
            vec![
                ListingEntry::new("a", Some(since + Duration::hours(30))),
                ListingEntry::new("x", Some(since + Duration::hours(20))),
            ],
            vec![
                ListingEntry::new("b", Some(since + Duration::hours(10))),
                ListingEntry::new("c", Some(since - Duration::hours(1))),
            ],
            vec![ListingEntry::new("d", Some(since + Duration::hours(5)))],
        ];
        let ids = tracked(&["a", "b", "c", "d"]);

        let mut requested = Vec::new();
        let mut reported = Vec::new();
        let mut callback = |updates: MangaUpdates| reported.push(updates.ids);

        poll_updates(
            |page| {
                requested.push(page);
                let entries = pages[(page - 1) as usize].clone();
                let scan = scan_listing(entries, since, &ids, ScanRule::WhileNewer);
                async move { Ok(scan) }
            },
            &mut callback,
        )
        .await
        .unwrap();

        assert_eq!(requested, vec![1, 2]);
        assert_eq!(reported, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[tokio::test]
    async fn test_poll_stops_on_empty_page() {
        let since = Utc::now();
        let mut calls = 0;
        let mut callback = |_: MangaUpdates| {};

        poll_updates(
            |_| {
                calls += 1;
                let scan = scan_listing(Vec::new(), since, &[], ScanRule::UntilPassed);
                async move { Ok(scan) }
            },
            &mut callback,
        )
        .await
        .unwrap();

        assert_eq!(calls, 1);
    }
}
