// src/data.rs
//
// The one domain record: a terminal's security queue length at capture time.
//
// Records are built once per cycle by `specs::sec_times` and handed straight
// to the sinks. Fields are private so nothing downstream can rewrite a record
// after it was stamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSecurityRecord {
    terminal: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "waitlen")]
    wait_len: u32,
}

impl TerminalSecurityRecord {
    pub fn new(terminal: impl Into<String>, timestamp: DateTime<Utc>, wait_len: u32) -> Self {
        Self { terminal: terminal.into(), timestamp, wait_len }
    }

    #[inline] pub fn terminal(&self) -> &str { &self.terminal }
    #[inline] pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    #[inline] pub fn wait_len(&self) -> u32 { self.wait_len }
}
