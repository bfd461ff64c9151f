// src/specs/sec_times.rs

//! Extraction rules for the live-departures page.
//!
//! Purpose:
//! - Find the `div` whose attributes include the value `sec-times`.
//! - From its first child onward, take the text of the first `<strong>` in
//!   each sibling (`"= 12 mins"`), one per terminal, in page order.
//! - Turn those into `TerminalSecurityRecord`s, all stamped with the same
//!   capture time.
//!
//! Rules:
//! - A harvest whose length differs from the terminal list is a structural
//!   error. Terminals are assigned by position only, so a short or long
//!   harvest would silently mislabel them.
//! - One unreadable value voids the whole cycle: the result is empty, never
//!   partial.
//!
//! No networking and no persistence here; the runner owns both.

use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::{debug, warn};

use crate::config::consts::{EMPHASIS_TAG, MARKER_TAG, MARKER_VALUE};
use crate::core::html::{self, Marker};
use crate::core::sanitize::minute_value;
use crate::data::TerminalSecurityRecord;
use crate::error::{Result, ScrapeError};

pub const MARKER: Marker<'static> = Marker { tag: Some(MARKER_TAG), value: MARKER_VALUE };

/// Pair harvested fragments with terminals by position and normalize them.
///
/// Returns an empty set when the lengths differ or when any fragment fails
/// to normalize. Each failure is logged with the fragment and terminal.
pub fn build_records(
    raw: &[String],
    terminals: &[String],
    at: DateTime<Utc>,
) -> Vec<TerminalSecurityRecord> {
    if raw.len() != terminals.len() {
        warn!(got = raw.len(), want = terminals.len(), "harvest does not match terminal list");
        return Vec::new();
    }
    normalize_all(raw, terminals, at)
}

fn normalize_all(
    raw: &[String],
    terminals: &[String],
    at: DateTime<Utc>,
) -> Vec<TerminalSecurityRecord> {
    let mut records = Vec::with_capacity(raw.len());
    for (i, (text, terminal)) in raw.iter().zip(terminals).enumerate() {
        match minute_value(text) {
            Ok(mins) => records.push(TerminalSecurityRecord::new(terminal.as_str(), at, mins)),
            Err(e) => {
                warn!(index = i, terminal = %terminal, value = %text, error = %e,
                      "encountered error when converting minute value; discarding cycle");
                return Vec::new();
            }
        }
    }
    records
}

/// Fragments under the marker, in sibling order.
///
/// `MarkerNotFound` if no element carries the marker. A marker with no
/// children yields an empty harvest (logged), which the count check rejects.
pub fn harvest(doc: &Html) -> Result<Vec<String>> {
    let marker = html::find_marker(doc.tree.root(), &MARKER)
        .ok_or_else(|| ScrapeError::MarkerNotFound(MARKER_VALUE.to_string()))?;

    let Some(first) = marker.first_child() else {
        warn!("no children of tag with attribute '{MARKER_VALUE}'");
        return Ok(Vec::new());
    };
    let raw = html::harvest_sibling_text(first, EMPHASIS_TAG);
    debug!(?raw, "harvested");
    Ok(raw)
}

/// Whole page → records.
///
/// Structural problems (marker missing, wrong number of values) are errors.
/// A value that will not normalize gives `Ok` with no records.
pub fn extract(
    doc: &Html,
    terminals: &[String],
    at: DateTime<Utc>,
) -> Result<Vec<TerminalSecurityRecord>> {
    let raw = harvest(doc)?;
    if raw.len() != terminals.len() {
        return Err(ScrapeError::HarvestCount { got: raw.len(), want: terminals.len() });
    }
    Ok(normalize_all(&raw, terminals, at))
}

/// Convenience over `extract` for a raw body.
pub fn extract_page(
    body: &str,
    terminals: &[String],
    at: DateTime<Utc>,
) -> Result<Vec<TerminalSecurityRecord>> {
    extract(&Html::parse_document(body), terminals, at)
}
