use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::ruling::Ruling;
use crate::teams::team_name;
use crate::tracker::Watermark;

const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";
const MESSAGE_TTL_SECS: &str = "86400";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delivery boundary. One call per subscriber group; no retry on failure.
pub trait NotificationSink {
    fn send(&self, group: &str, title: &str, message: &str) -> Result<()>;
}

pub struct PushoverSink {
    client: Client,
    token: String,
}

impl PushoverSink {
    pub fn from_env() -> Result<PushoverSink> {
        let token = std::env::var("PUSHOVER_APPLICATION_TOKEN")
            .context("PUSHOVER_APPLICATION_TOKEN is not set")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")?;
        Ok(PushoverSink { client, token })
    }
}

impl NotificationSink for PushoverSink {
    fn send(&self, group: &str, title: &str, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(PUSHOVER_MESSAGES_URL)
            .form(&[
                ("token", self.token.as_str()),
                ("user", group),
                ("title", title),
                ("message", message),
                ("ttl", MESSAGE_TTL_SECS),
                ("html", "1"),
            ])
            .send()
            .context("pushover request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("pushover rejected send: {status} {body}"));
        }
        Ok(())
    }
}

/// Fan out one pass over the persisted rulings, newest first.
///
/// The incremental boundary is re-derived here from the pre-run watermark: the
/// pass stops at the first ruling already notified. A `NeverUpdated` baseline
/// suppresses the whole pass so the first run never replays the backlog.
/// Returns the number of sends.
pub fn run_notifier(
    rulings: &[Ruling],
    watermark: &Watermark,
    groups: &HashMap<String, String>,
    sink: &dyn NotificationSink,
) -> usize {
    if *watermark == Watermark::NeverUpdated {
        info!("never notified before, suppressing all sends this run");
        return 0;
    }

    let mut sent = 0;
    for ruling in rulings {
        if watermark.matches(&ruling.url) {
            info!(url = %ruling.url, "reached last notified ruling, stopping");
            break;
        }
        sent += notify_ruling(ruling, groups, sink);
    }
    sent
}

/// Send one ruling to every subscriber group its teams resolve to. Unresolved
/// codes (or an Officials Update, which has none) simply contribute no sends.
pub fn notify_ruling(
    ruling: &Ruling,
    groups: &HashMap<String, String>,
    sink: &dyn NotificationSink,
) -> usize {
    let destinations = resolve_groups(ruling, groups);
    if destinations.is_empty() {
        info!(url = %ruling.url, "no subscriber groups resolve for ruling");
        return 0;
    }

    let title = build_title(ruling);
    let message = build_message(ruling);

    let mut sent = 0;
    for group in destinations {
        match sink.send(&group, &title, &message) {
            Ok(()) => {
                info!(url = %ruling.url, %group, "notification sent");
                sent += 1;
            }
            Err(error) => warn!(url = %ruling.url, %group, %error, "notification failed"),
        }
    }
    sent
}

fn resolve_groups(ruling: &Ruling, groups: &HashMap<String, String>) -> Vec<String> {
    [ruling.home.as_deref(), ruling.away.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(team_name)
        .filter_map(|name| groups.get(name).cloned())
        .collect()
}

fn build_title(ruling: &Ruling) -> String {
    format!(
        "{} vs {}: {}",
        ruling.home.as_deref().unwrap_or_default(),
        ruling.away.as_deref().unwrap_or_default(),
        ruling.call_type
    )
}

/// Fixed-order concatenation of the non-null fields as `<b>Label</b>: value`
/// HTML lines.
fn build_message(ruling: &Ruling) -> String {
    let fields = [
        ("Desc", ruling.short_description.as_deref()),
        ("Initiated By", ruling.challenge_initiator.as_deref()),
        ("Challenge Type", ruling.type_of_challenge.as_deref()),
        ("Result", ruling.result.as_deref()),
        ("Explanation", ruling.explanation.as_deref()),
        ("Penalty", ruling.penalty.as_deref()),
    ];

    let mut message = String::new();
    for (label, value) in fields {
        if let Some(value) = value {
            message.push_str(&format!("<b>{label}</b>: {value}\n"));
        }
    }
    message
}
