use anyhow::{Result, anyhow};
use scraper::{Html, Selector};
use tracing::warn;

use crate::normalize::normalize;

const CARD_SELECTOR: &str = "div.d3-l-col__col-3";

/// One item lifted off the feed listing page. Title-only; the article body is
/// fetched separately. `article_url` doubles as the dedup key and watermark
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub article_url: String,
}

impl ListingEntry {
    pub fn new(title: &str, article_url: &str) -> ListingEntry {
        ListingEntry {
            title: normalize(title),
            article_url: normalize(article_url),
        }
    }
}

/// Extract listing entries from the feed page HTML, newest first (document
/// order). Cards missing a heading or link are skipped with a warning rather
/// than failing the whole listing.
pub fn parse_listing(html: &str) -> Result<Vec<ListingEntry>> {
    let document = Html::parse_document(html);
    let card = Selector::parse(CARD_SELECTOR).map_err(|e| anyhow!("bad card selector: {e}"))?;
    let heading = Selector::parse("h3").map_err(|e| anyhow!("bad heading selector: {e}"))?;
    let link = Selector::parse("a[href]").map_err(|e| anyhow!("bad link selector: {e}"))?;

    let mut entries = Vec::new();
    for element in document.select(&card) {
        let title = element
            .select(&heading)
            .next()
            .map(|h| h.text().collect::<String>());
        let href = element
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"));

        match (title, href) {
            (Some(title), Some(href)) => entries.push(ListingEntry::new(&title, href)),
            _ => warn!("listing card without title or link, skipping"),
        }
    }
    Ok(entries)
}
