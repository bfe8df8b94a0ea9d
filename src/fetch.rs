use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use tracing::info;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const LISTING_PATH: &str = "/news/topic/situation-room/";
const ARTICLE_BODY_SELECTOR: &str = "article div.oc-c-body-part.oc-c-markdown-stories";

pub const DEFAULT_BASE_URL: &str = "https://www.nhl.com";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// The feed collaborator boundary: everything the pipeline needs from the
/// network is raw page text. Tests substitute a canned implementation.
pub trait FeedSource {
    fn listing_html(&self) -> Result<String>;
    fn article_html(&self, article_url: &str) -> Result<String>;
}

pub struct HttpFeedSource {
    base_url: String,
}

impl HttpFeedSource {
    pub fn new(base_url: impl Into<String>) -> HttpFeedSource {
        HttpFeedSource {
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> HttpFeedSource {
        let base_url = std::env::var("SITUATION_ROOM_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        HttpFeedSource::new(base_url)
    }
}

impl FeedSource for HttpFeedSource {
    fn listing_html(&self) -> Result<String> {
        // The listing sits behind an aggressive CDN cache; a timestamp query
        // parameter forces a fresh page.
        let stamp = Local::now().format("%d-%m-%YT%H-%M-%S");
        let url = format!(
            "{}{}?date_cache_busting={}",
            self.base_url, LISTING_PATH, stamp
        );
        info!(%url, "fetching listing");
        fetch_text(&url)
    }

    fn article_html(&self, article_url: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, article_url);
        info!(%url, "fetching article");
        fetch_text(&url)
    }
}

fn fetch_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {url}"));
    }
    Ok(body)
}

/// Pull the ruling text out of an article page: the markdown-stories block
/// inside the `article` element, text-joined.
pub fn extract_article_body(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(ARTICLE_BODY_SELECTOR).map_err(|e| anyhow!("bad body selector: {e}"))?;
    let block = document
        .select(&selector)
        .next()
        .ok_or_else(|| anyhow!("article body block not found"))?;
    Ok(block.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::extract_article_body;

    #[test]
    fn extracts_body_block_text() {
        let html = r#"
            <article>
              <h1>Goal Review: TOR @ MTL</h1>
              <div class="oc-c-body-part oc-c-markdown-stories">
                <p>Result: Good Goal</p>
                <p>Explanation: the puck fully crossed the goal line.</p>
              </div>
            </article>
        "#;
        let body = extract_article_body(html).expect("body should extract");
        assert!(body.contains("Result: Good Goal"));
        assert!(body.contains("Explanation: the puck fully crossed the goal line."));
        assert!(!body.contains("Goal Review"));
    }

    #[test]
    fn missing_body_block_is_an_error() {
        let html = "<article><p>nothing structured</p></article>";
        assert!(extract_article_body(html).is_err());
    }
}
