// src/log.rs
//
// tracing subscriber setup. Lines carry wall-clock UTC plus time since
// start, e.g. `2026-10-19T08:30:00Z [00:20:00.004]  INFO ...`, so a
// restart by the supervisor is obvious in the log.

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Timer for `tracing_subscriber::fmt`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let elapsed = fmt_elapsed(start().elapsed().as_millis());
        write!(w, "{} [{elapsed}]", Utc::now().format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

/// Install the global subscriber. `RUST_LOG` wins; default is `info`.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    start();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(Uptime)
        .with_target(false)
        .try_init()
}
