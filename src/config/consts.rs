// src/config/consts.rs

// Source page
pub const AIRPORT_PAGE: &str = "https://www.dublinairport.com/flight-information/live-departures";
pub const USER_AGENT: &str = concat!("sec_scrape/", env!("CARGO_PKG_VERSION"));

// Page structure
pub const MARKER_TAG: &str = "div";
pub const MARKER_VALUE: &str = "sec-times";
pub const EMPHASIS_TAG: &str = "strong";

// Order matters: terminals are assigned by sibling position on the page.
pub const DEFAULT_TERMINALS: &str = "T1,T2";

// Cadence
pub const POLL_INTERVAL_SECS: u64 = 600;
pub const FETCH_TIMEOUT_SECS: u64 = 30;

// Relational store
pub const TABLE: &str = "terminalrecords";
pub const MAX_TX_ATTEMPTS: u32 = 5; // serialization conflicts only

// Day files
pub const DEFAULT_DATA_DIR: &str = "./data";
