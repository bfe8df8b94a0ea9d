use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::ListingEntry;
use crate::normalize::normalize;

/// Call type whose titles carry no home/away framing and whose result is the
/// whole article body.
pub const OFFICIALS_UPDATE: &str = "Officials Update";

const LABEL_CHALLENGE_INITIATOR: &str = "Challenge Initiated By: ";
const LABEL_TYPE_OF_CHALLENGE: &str = "Type of Challenge: ";
const LABEL_RESULT: &str = "Result: ";
const LABEL_EXPLANATION: &str = "Explanation: ";
const LABEL_PENALTY: &str = "Penalty: ";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed title {title:?}: {reason}")]
    MalformedTitle { title: String, reason: &'static str },
    #[error("failed to fetch article body for {url}")]
    FetchFailure {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Structured ruling extracted from one listing entry plus its article body.
/// `url` is the natural key and the value used for watermark comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    #[serde(rename = "type")]
    pub call_type: String,
    pub home: Option<String>,
    pub away: Option<String>,
    pub short_description: Option<String>,
    pub url: String,
    pub challenge_initiator: Option<String>,
    pub type_of_challenge: Option<String>,
    pub result: Option<String>,
    pub explanation: Option<String>,
    pub penalty: Option<String>,
}

/// Title-only stage of a ruling. Produced without any network access; folded
/// into a [`Ruling`] once the article body has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFields {
    pub call_type: String,
    pub home: Option<String>,
    pub away: Option<String>,
    pub short_description: Option<String>,
}

impl TitleFields {
    /// Parse a listing title of the shape `"<Type>: <Home> @ <Away>-<rest>"`,
    /// or `"Officials Update: ..."` which carries no team framing.
    pub fn parse(raw_title: &str) -> Result<TitleFields, ParseError> {
        let title = normalize(raw_title);

        let Some((call_type, rest)) = title.split_once(": ") else {
            return Err(ParseError::MalformedTitle {
                title,
                reason: "missing \": \" separator",
            });
        };
        let call_type = normalize(call_type);

        if call_type == OFFICIALS_UPDATE {
            return Ok(TitleFields {
                call_type,
                home: None,
                away: None,
                short_description: None,
            });
        }

        let Some((home, away_tail)) = rest.split_once(" @ ") else {
            return Err(ParseError::MalformedTitle {
                title,
                reason: "missing \" @ \" separator",
            });
        };

        let away = away_tail
            .split('-')
            .next()
            .unwrap_or(away_tail)
            .to_string();
        // Only the segment immediately after the first hyphen; anything past a
        // second hyphen is dropped, matching the feed's observed titles.
        let Some(short_description) = rest.split('-').nth(1) else {
            return Err(ParseError::MalformedTitle {
                title,
                reason: "missing \"-\" before description",
            });
        };

        Ok(TitleFields {
            call_type,
            home: Some(normalize(home)),
            away: Some(normalize(&away)),
            short_description: Some(normalize(short_description)),
        })
    }
}

impl Ruling {
    /// Fold the title-stage fields and the fetched article body into the final
    /// immutable record. The body is normalized here; labeled lines absent from
    /// it leave their fields unset.
    pub fn from_parts(entry: &ListingEntry, title: TitleFields, raw_body: &str) -> Ruling {
        let body = normalize(raw_body);
        let is_officials_update = title.call_type == OFFICIALS_UPDATE;

        let result = if is_officials_update {
            // Officials Updates have no "Result:" label; the whole body is the
            // result.
            Some(body.clone())
        } else {
            labeled_value(&body, LABEL_RESULT)
        };

        Ruling {
            call_type: title.call_type,
            home: title.home,
            away: title.away,
            short_description: title.short_description,
            url: normalize(&entry.article_url),
            challenge_initiator: labeled_value(&body, LABEL_CHALLENGE_INITIATOR),
            type_of_challenge: labeled_value(&body, LABEL_TYPE_OF_CHALLENGE),
            result,
            explanation: labeled_value(&body, LABEL_EXPLANATION),
            penalty: labeled_value(&body, LABEL_PENALTY),
        }
    }
}

/// Value of a `"Label: value"` line: the text from right after the label up to
/// the next line break. `None` when the label never appears.
fn labeled_value(body: &str, label: &str) -> Option<String> {
    let (_, tail) = body.split_once(label)?;
    let value = tail.lines().next().unwrap_or(tail);
    Some(normalize(value))
}
