//! Lelmangavf source tests
//!
//! Drives the source end to end against saved pages.

use chrono::{Duration, TimeZone, Utc};
use hondana::config::SiteConfig;
use hondana::prelude::*;
use hondana::sources::Lelmangavf;
use hondana::sources::lelmangavf::parser;
use parking_lot::Mutex;
use std::sync::Arc;

mod common;
use common::{FixtureFetcher, LELMANGAVF_BASE, fixture, init_logging};

fn url(path: &str) -> String {
    format!("{}{}", LELMANGAVF_BASE, path)
}

fn source(fetcher: &Arc<FixtureFetcher>) -> Lelmangavf {
    init_logging();
    Lelmangavf::with_fetcher(SiteConfig::new(LELMANGAVF_BASE), fetcher.clone())
}

#[cfg(test)]
mod lelmangavf_tests {
    use super::*;

    #[tokio::test]
    async fn test_manga_details() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/scan-manga/one-piece"), "lelmangavf_manga.html"),
        );
        let details = source(&fetcher).get_manga_details("one-piece").await.unwrap();

        let genre = |label: &str| Tag {
            id: label.to_string(),
            label: label.to_string(),
        };
        let expected = MangaDetails {
            id: "one-piece".to_string(),
            titles: vec![
                "One Piece".to_string(),
                "Wan Pisu".to_string(),
                "Légende des pirates".to_string(),
            ],
            image: "https://lelmangavf.test/uploads/manga/one-piece/cover/cover_250x350.jpg"
                .to_string(),
            rating: 4.5,
            status: MangaStatus::Ongoing,
            author: "Eiichiro Oda".to_string(),
            artist: "Eiichiro Oda".to_string(),
            tags: vec![TagSection {
                id: "0".to_string(),
                label: "genres".to_string(),
                tags: vec![genre("Action"), genre("Aventure"), genre("Mature")],
            }],
            last_update: Some(Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap()),
            description: "Luffy veut devenir le Roi des Pirates et trouver le trésor légendaire."
                .to_string(),
            hentai: true,
            ..Default::default()
        };
        assert_eq!(details, expected);
    }

    #[test]
    fn test_chapter_list_parser() {
        let now = Utc.with_ymd_and_hms(2021, 3, 20, 12, 0, 0).unwrap();
        let document = hondana::net::html::parse(&fixture("lelmangavf_manga.html"));
        let chapters = parser::parse_chapters(&document, "one-piece", now);

        let expected = vec![
            Chapter {
                id: "1001".to_string(),
                manga_id: "one-piece".to_string(),
                name: "Le roi des bêtes".to_string(),
                number: 1001.0,
                group: Some("volume-0".to_string()),
                lang_code: LanguageCode::French,
                time: Some(Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap()),
                ..Default::default()
            },
            Chapter {
                id: "1000.5".to_string(),
                manga_id: "one-piece".to_string(),
                name: "Bonus".to_string(),
                number: 1000.5,
                group: Some("volume-0".to_string()),
                lang_code: LanguageCode::French,
                time: Some(now - Duration::days(1)),
                ..Default::default()
            },
            Chapter {
                id: "oneshot".to_string(),
                manga_id: "one-piece".to_string(),
                name: "Romance Dawn".to_string(),
                number: 0.0,
                group: Some("volume-0".to_string()),
                lang_code: LanguageCode::French,
                time: Some(Utc.with_ymd_and_hms(2021, 3, 8, 0, 0, 0).unwrap()),
                ..Default::default()
            },
        ];
        assert_eq!(chapters, expected);
    }

    #[tokio::test]
    async fn test_chapters_through_source() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/scan-manga/one-piece"), "lelmangavf_manga.html"),
        );
        let chapters = source(&fetcher).get_chapters("one-piece").await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert!(chapters[1].time.unwrap() < Utc::now());
    }

    #[tokio::test]
    async fn test_chapter_details() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/scan-manga/one-piece/1001"), "lelmangavf_chapter.html"),
        );
        let details = source(&fetcher)
            .get_chapter_details("one-piece", "1001")
            .await
            .unwrap();

        assert_eq!(
            details.pages,
            vec![
                "https://cdn.lelmangavf.test/uploads/manga/one-piece/chapters/1001/01.jpg",
                "https://cdn.lelmangavf.test/uploads/manga/one-piece/chapters/1001/02.jpg",
            ]
        );
        assert_eq!(details.manga_id, "one-piece");
        assert!(!details.long_strip);
    }

    #[tokio::test]
    async fn test_search_filters_suggestions() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/search?query=One%20P"), "lelmangavf_search.json"),
        );
        let results = source(&fetcher)
            .search_request(&"One P".into(), None)
            .await
            .unwrap();

        let ids: Vec<&str> = results.results.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["one-piece", "one-punch-man"]);
        assert_eq!(
            results.results[0].image,
            url("/uploads/manga/one-piece/cover/cover_250x350.jpg")
        );
        assert!(results.metadata.is_none());
    }

    #[tokio::test]
    async fn test_search_decodes_titles() {
        let fetcher = Arc::new(
            FixtureFetcher::new().with_fixture(url("/search?query=pok"), "lelmangavf_search.json"),
        );
        let results = source(&fetcher)
            .search_request(&"pok".into(), None)
            .await
            .unwrap();
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].title, "Pokémon");
    }

    #[tokio::test]
    async fn test_search_with_malformed_payload_fails() {
        let fetcher = Arc::new(
            FixtureFetcher::new().with_page(url("/search?query=x"), "<html>cloudflare</html>"),
        );
        let result = source(&fetcher).search_request(&"x".into(), None).await;
        assert!(matches!(result, Err(hondana::Error::Json(_))));
    }

    #[tokio::test]
    async fn test_home_sections_load_concurrently() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/browse?sort=create"), "lelmangavf_browse.html")
                .with_fixture(url("/browse?sort=update"), "lelmangavf_browse.html")
                .with_fixture(url("/browse?sort=views_a"), "lelmangavf_browse.html"),
        );
        let reported = Mutex::new(Vec::new());

        source(&fetcher)
            .get_home_page_sections(&|section: HomeSection| reported.lock().push(section))
            .await
            .unwrap();

        let reported = reported.into_inner();
        assert_eq!(reported.len(), 6);

        let skeletons: Vec<&str> = reported[..3].iter().map(|s| s.title.as_str()).collect();
        assert_eq!(skeletons, vec!["RECENTLY ADDED", "RECENTLY UPDATED", "POPULAR"]);
        assert!(reported.iter().all(|s| s.view_more));

        for section in &reported[3..] {
            let ids: Vec<&str> = section.items.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, vec!["one-piece", "pokemon"]);
            assert_eq!(section.items[1].title, "Pokémon");
            assert_eq!(
                section.items[0].primary_text,
                Some(IconText::with_icon("Mon Mar 08 2021", "clock.fill"))
            );
            assert_eq!(
                section.items[0].subtitle_text,
                Some(IconText::new("Chapitre 1001"))
            );
        }
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_home_section_failure_is_reported() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/browse?sort=create"), "lelmangavf_browse.html")
                .with_fixture(url("/browse?sort=views_a"), "lelmangavf_browse.html"),
        );
        let reported = Mutex::new(Vec::new());

        let result = source(&fetcher)
            .get_home_page_sections(&|section: HomeSection| reported.lock().push(section.id))
            .await;

        assert!(result.is_err());
        assert_eq!(reported.into_inner().len(), 5);
    }

    #[tokio::test]
    async fn test_view_more_follows_section_sort() {
        let last_page = r#"<div id="series-list"></div>
            <ul><li class="page-item">«</li><li class="page-item disabled">»</li></ul>"#;
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/browse?sort=views_a&page=1"), "lelmangavf_browse.html")
                .with_page(url("/browse?sort=views_a&page=2"), last_page),
        );
        let source = source(&fetcher);

        let first = source.get_view_more_items("2", None).await.unwrap().unwrap();
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.metadata, Some(PageMetadata { page: 2 }));

        let second = source
            .get_view_more_items("2", first.metadata)
            .await
            .unwrap()
            .unwrap();
        assert!(second.results.is_empty());
        assert!(second.metadata.is_none());

        assert!(source.get_view_more_items("3", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tags() {
        let fetcher = Arc::new(
            FixtureFetcher::new().with_fixture(url("/scan-manga-list"), "lelmangavf_list.html"),
        );
        let tags = source(&fetcher).get_tags().await.unwrap();
        let labels: Vec<&str> = tags[0].tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Action", "Aventure", "Comédie"]);
        assert_eq!(tags[0].tags[2].id, "Comédie");
    }

    #[tokio::test]
    async fn test_filter_updated_until_reference_passed() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/latest-release?page=1"), "lelmangavf_latest_1.html")
                .with_fixture(url("/latest-release?page=2"), "lelmangavf_latest_2.html"),
        );
        let tracked = vec!["one-piece".to_string(), "bleach".to_string()];
        let mut found = Vec::new();

        source(&fetcher)
            .filter_updated_manga(
                &mut |updates: MangaUpdates| found.push(updates.ids),
                Utc::now() - Duration::days(3),
                &tracked,
            )
            .await
            .unwrap();

        assert_eq!(found, vec![vec!["one-piece".to_string()]]);
        assert_eq!(
            fetcher.requests(),
            vec![url("/latest-release?page=1"), url("/latest-release?page=2")]
        );
    }

    #[tokio::test]
    async fn test_filter_updated_stops_on_empty_listing() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(url("/latest-release?page=1"), "lelmangavf_latest_1.html")
                .with_page(url("/latest-release?page=2"), r#"<div class="mangalist"></div>"#),
        );
        let tracked = vec!["naruto".to_string()];
        let mut found = Vec::new();

        source(&fetcher)
            .filter_updated_manga(
                &mut |updates: MangaUpdates| found.extend(updates.ids),
                Utc::now() - Duration::days(3),
                &tracked,
            )
            .await
            .unwrap();

        assert_eq!(found, vec!["naruto".to_string()]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn test_source_metadata() {
        let source = Lelmangavf::new();
        assert_eq!(source.id(), "lelmangavf");
        assert_eq!(
            source.manga_share_url("one-piece"),
            "https://www.lelmangavf.com/scan-manga/one-piece"
        );

        let info = source.info();
        assert_eq!(info.version, "1.0.6");
        let tags: Vec<&str> = info.source_tags.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(tags, vec!["Notifications", "French"]);
    }
}
