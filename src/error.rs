// src/error.rs
//
// One error type for the whole scrape → persist pipeline.
// The poll loop decides which of these end the process and which only
// discard the current cycle.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Transport-level failure while loading the page.
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// No element carries the marker attribute value; the page layout changed.
    #[error("unable to find tag with attribute '{0}'")]
    MarkerNotFound(String),

    /// Harvest length does not line up with the configured terminals.
    #[error("got {got} terminal values, should only be {want}")]
    HarvestCount { got: usize, want: usize },

    /// A harvested fragment did not reduce to a minute count.
    #[error("cannot read a minute value from '{raw}'")]
    Parse { raw: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Liveness ping failed and a fresh connection could not be opened.
    #[error("could not re-establish database connection: {0}")]
    Reconnect(#[source] sqlx::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
