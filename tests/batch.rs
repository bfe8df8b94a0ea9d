use std::collections::HashMap;

use anyhow::{Result, anyhow};
use situation_room::batch::run_batch;
use situation_room::fetch::FeedSource;
use situation_room::listing::ListingEntry;
use situation_room::ruling::ParseError;
use situation_room::tracker::{Watermark, select_new};

/// Canned feed: article HTML keyed by URL, no network.
struct StubFeed {
    articles: HashMap<String, String>,
}

impl StubFeed {
    fn new(articles: &[(&str, &str)]) -> StubFeed {
        StubFeed {
            articles: articles
                .iter()
                .map(|(url, body)| {
                    (
                        url.to_string(),
                        format!(
                            "<article><div class=\"oc-c-body-part oc-c-markdown-stories\">\
                             {body}</div></article>"
                        ),
                    )
                })
                .collect(),
        }
    }
}

impl FeedSource for StubFeed {
    fn listing_html(&self) -> Result<String> {
        Err(anyhow!("stub feed has no listing"))
    }

    fn article_html(&self, article_url: &str) -> Result<String> {
        self.articles
            .get(article_url)
            .cloned()
            .ok_or_else(|| anyhow!("unreachable article: {article_url}"))
    }
}

fn entry(title: &str, url: &str) -> ListingEntry {
    ListingEntry::new(title, url)
}

#[test]
fn malformed_entry_is_dropped_without_aborting_the_batch() {
    let feed = StubFeed::new(&[
        ("/news/a", "<p>Result: Good Goal</p>"),
        ("/news/c", "<p>Result: No Goal</p>"),
    ]);
    let entries = vec![
        entry("Goal Review: TOR @ MTL-Good Call", "/news/a"),
        entry("a title with no separators", "/news/b"),
        entry("Video Review: WPG @ SEA-No Goal", "/news/c"),
    ];

    let outcome = run_batch(&feed, &entries);

    assert_eq!(outcome.rulings.len(), 2);
    assert_eq!(outcome.rulings[0].url, "/news/a");
    assert_eq!(outcome.rulings[1].url, "/news/c");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, "/news/b");
    assert!(matches!(
        outcome.failures[0].error,
        ParseError::MalformedTitle { .. }
    ));
}

#[test]
fn unreachable_article_is_a_fetch_failure_for_that_entry_only() {
    let feed = StubFeed::new(&[("/news/b", "<p>Result: Good Goal</p>")]);
    let entries = vec![
        entry("Goal Review: TOR @ MTL-Good Call", "/news/a"),
        entry("Video Review: WPG @ SEA-No Goal", "/news/b"),
    ];

    let outcome = run_batch(&feed, &entries);

    assert_eq!(outcome.rulings.len(), 1);
    assert_eq!(outcome.rulings[0].url, "/news/b");
    assert!(matches!(
        outcome.failures[0].error,
        ParseError::FetchFailure { .. }
    ));
}

#[test]
fn new_watermark_is_newest_ruling_url() {
    let feed = StubFeed::new(&[
        ("/news/a", "<p>Result: Good Goal</p>"),
        ("/news/b", "<p>Result: No Goal</p>"),
    ]);
    let entries = vec![
        entry("Goal Review: TOR @ MTL-Good Call", "/news/a"),
        entry("Video Review: WPG @ SEA-No Goal", "/news/b"),
    ];

    let outcome = run_batch(&feed, &entries);
    assert_eq!(outcome.new_watermark(), Some("/news/a"));
}

#[test]
fn empty_batch_has_no_watermark() {
    let feed = StubFeed::new(&[]);
    let outcome = run_batch(&feed, &[]);
    assert!(outcome.rulings.is_empty());
    assert_eq!(outcome.new_watermark(), None);
}

#[test]
fn select_new_then_batch_processes_only_entries_past_the_watermark() {
    let feed = StubFeed::new(&[("/news/a", "<p>Result: Good Goal</p>")]);
    let entries = vec![
        entry("Goal Review: TOR @ MTL-Good Call", "/news/a"),
        entry("Video Review: WPG @ SEA-No Goal", "/news/b"),
        entry("Goal Review: BOS @ NYR-Good Call", "/news/c"),
    ];

    let fresh = select_new(entries, &Watermark::Url("/news/b".into()));
    let outcome = run_batch(&feed, &fresh);

    assert_eq!(outcome.rulings.len(), 1);
    assert_eq!(outcome.rulings[0].url, "/news/a");
    assert!(outcome.failures.is_empty());
}
