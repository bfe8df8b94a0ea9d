use tracing::{info, warn};

use crate::fetch::{FeedSource, extract_article_body};
use crate::listing::ListingEntry;
use crate::ruling::{ParseError, Ruling, TitleFields};

/// Result of one batch run: the rulings that parsed, the entries that were
/// dropped and why. Failures are kept alongside the successes so callers and
/// tests can assert on both halves.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rulings: Vec<Ruling>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub url: String,
    pub error: ParseError,
}

impl BatchOutcome {
    /// URL of the newest ruling produced, the value the watermark advances to.
    /// `None` on an empty batch; the stored watermark must then stay put.
    pub fn new_watermark(&self) -> Option<&str> {
        self.rulings.first().map(|ruling| ruling.url.as_str())
    }
}

/// Parse each listing entry in order, newest first. A single malformed title
/// or unreachable article never aborts the batch: the entry is recorded as a
/// failure and processing moves on.
pub fn run_batch(feed: &dyn FeedSource, entries: &[ListingEntry]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for entry in entries {
        match process_entry(feed, entry) {
            Ok(ruling) => {
                info!(url = %ruling.url, call_type = %ruling.call_type, "parsed ruling");
                outcome.rulings.push(ruling);
            }
            Err(error) => {
                warn!(url = %entry.article_url, %error, "skipping entry");
                outcome.failures.push(BatchFailure {
                    url: entry.article_url.clone(),
                    error,
                });
            }
        }
    }

    outcome
}

fn process_entry(feed: &dyn FeedSource, entry: &ListingEntry) -> Result<Ruling, ParseError> {
    let title = TitleFields::parse(&entry.title)?;

    // The article page is fetched exactly once per entry, after the title has
    // already proven well-formed.
    let body = feed
        .article_html(&entry.article_url)
        .and_then(|html| extract_article_body(&html))
        .map_err(|source| ParseError::FetchFailure {
            url: entry.article_url.clone(),
            source,
        })?;

    Ok(Ruling::from_parts(entry, title, &body))
}
