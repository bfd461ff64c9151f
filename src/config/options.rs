// src/config/options.rs
//
// Process configuration. Every knob is a CLI flag with an environment
// fallback, so the service runs unchanged under a supervisor that only
// sets env vars (DB_URL, SHOW_ROWS, ADD_ROWS, ...).

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use super::consts::*;
use crate::error::{Result, ScrapeError};

#[derive(Parser, Clone, Debug)]
#[command(name = "sec_scrape", version, about = "Poll airport security queue times and store them")]
pub struct Options {
    /// Postgres / CockroachDB connection string. Without it no relational sink runs.
    #[arg(long, env = "DB_URL", hide_env_values = true)]
    pub db_url: Option<String>,

    /// Log every stored row before each insert.
    #[arg(long, env = "SHOW_ROWS", action = ArgAction::Set, value_parser = parse_flag,
          default_value = "false", num_args = 0..=1, default_missing_value = "true")]
    pub show_rows: bool,

    /// Actually write records. Otherwise cycles run read-only.
    #[arg(long, env = "ADD_ROWS", action = ArgAction::Set, value_parser = parse_flag,
          default_value = "false", num_args = 0..=1, default_missing_value = "true")]
    pub add_rows: bool,

    /// Also append records to one JSON file per day in this directory.
    #[arg(long, env = "JSON_DIR", num_args = 0..=1, default_missing_value = DEFAULT_DATA_DIR)]
    pub json_dir: Option<PathBuf>,

    /// Terminal ids in the order their values appear on the page.
    #[arg(long, env = "TERMINALS", value_delimiter = ',', default_value = DEFAULT_TERMINALS)]
    pub terminals: Vec<String>,

    #[arg(long, env = "PAGE_URL", default_value = AIRPORT_PAGE)]
    pub page_url: String,

    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Run a single cycle and exit.
    #[arg(long)]
    pub once: bool,
}

// Only a case-insensitive "true" switches a flag on.
fn parse_flag(s: &str) -> std::result::Result<bool, String> {
    Ok(s.trim().eq_ignore_ascii_case("true"))
}

/// Validated, ready-to-use configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub db_url: Option<String>,
    pub show_rows: bool,
    pub add_rows: bool,
    pub json_dir: Option<PathBuf>,
    pub terminals: Vec<String>,
    pub page_url: String,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub once: bool,
}

impl Settings {
    pub fn from_options(opts: Options) -> Result<Self> {
        let terminals: Vec<String> = opts.terminals.iter().map(|t| t.trim().to_string()).collect();
        if terminals.is_empty() || terminals.iter().any(String::is_empty) {
            return Err(ScrapeError::Config(format!("bad terminal list: {:?}", opts.terminals)));
        }
        if opts.poll_interval_secs == 0 {
            return Err(ScrapeError::Config("poll interval must be at least one second".to_string()));
        }
        if opts.fetch_timeout_secs == 0 {
            return Err(ScrapeError::Config("fetch timeout must be at least one second".to_string()));
        }
        let db_url = opts.db_url.filter(|u| !u.trim().is_empty());

        Ok(Self {
            db_url,
            show_rows: opts.show_rows,
            add_rows: opts.add_rows,
            json_dir: opts.json_dir,
            terminals,
            page_url: opts.page_url,
            poll_interval: Duration::from_secs(opts.poll_interval_secs),
            fetch_timeout: Duration::from_secs(opts.fetch_timeout_secs),
            once: opts.once,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: None,
            show_rows: false,
            add_rows: false,
            json_dir: None,
            terminals: DEFAULT_TERMINALS.split(',').map(str::to_string).collect(),
            page_url: AIRPORT_PAGE.to_string(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            once: false,
        }
    }
}
