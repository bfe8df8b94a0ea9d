//! Scrapes the NHL situation-room news feed into structured ruling records and
//! fans them out to per-team subscriber groups.
//!
//! The pipeline runs as two sequential processes sharing a storage directory:
//! the scrape run (`situation-room`) parses new listing entries into rulings
//! and persists them, and the notify pass (`notify`) delivers them and then
//! advances the watermark.

pub mod batch;
pub mod fetch;
pub mod listing;
pub mod normalize;
pub mod notify;
pub mod ruling;
pub mod store;
pub mod teams;
pub mod tracker;
