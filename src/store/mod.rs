// src/store/mod.rs
//
// Where a cycle's records end up. The runner holds a list of sinks and hands
// each the same record set; it never needs to know what is behind them.

pub mod postgres;

use async_trait::async_trait;

use crate::data::TerminalSecurityRecord;
use crate::error::Result;

pub use postgres::PgSink;

#[async_trait]
pub trait Sink: Send {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Called before every cycle. Sinks holding a connection ping it here
    /// and reconnect if needed; an error ends the run.
    async fn ensure_ready(&mut self) -> Result<()> {
        Ok(())
    }

    /// Log what is already stored, when the sink can. Diagnostic only.
    async fn show_rows(&mut self) -> Result<()> {
        Ok(())
    }

    /// Append one cycle's records, all or nothing.
    async fn persist(&mut self, records: &[TerminalSecurityRecord]) -> Result<()>;
}
