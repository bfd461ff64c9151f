// src/core/sanitize.rs

use crate::error::{Result, ScrapeError};

/// Reduce an annotation like `"= 12 mins"` to its minute count.
///
/// Strips every `min` (and its plural `mins`), every `=` and all whitespace
/// (tabs, newlines and the non-breaking space from `&nbsp;` included), then reads what is left as a base-10 integer. Anything else left over
/// (letters, a sign, a decimal point) is a `ScrapeError::Parse` carrying
/// the raw fragment.
pub fn minute_value(raw: &str) -> Result<u32> {
    let digits: String = raw
        .replace("mins", "")
        .replace("min", "")
        .replace('=', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    digits
        .parse::<u32>()
        .map_err(|_| ScrapeError::Parse { raw: raw.to_string() })
}
