// src/runner.rs
//
// The poll loop:
//   FETCHING → PARSING → LOCATING → HARVESTING → BUILDING → PERSISTING → SLEEPING → …
//
// Everything runs in sequence on one task. Most failures end the run and the
// supervisor restarts the process; the exceptions are a lost database
// connection (reconnected before the next cycle) and an unreadable value
// (that cycle's records are dropped, the loop carries on).

use std::fmt;

use chrono::Utc;
use scraper::Html;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::core::{HttpSource, PageSource};
use crate::data::TerminalSecurityRecord;
use crate::error::{Result, ScrapeError};
use crate::file::JsonDaySink;
use crate::specs::sec_times;
use crate::store::{PgSink, Sink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Connecting,
    Fetching,
    Parsing,
    Locating,
    Harvesting,
    Building,
    Persisting,
    Sleeping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Connecting => "connecting",
            Stage::Fetching => "fetching",
            Stage::Parsing => "parsing",
            Stage::Locating => "locating",
            Stage::Harvesting => "harvesting",
            Stage::Building => "building",
            Stage::Persisting => "persisting",
            Stage::Sleeping => "sleeping",
        };
        f.write_str(s)
    }
}

/// What one cycle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Records handed to every sink.
    Persisted(Vec<TerminalSecurityRecord>),
    /// Records built but writes are switched off.
    DryRun(Vec<TerminalSecurityRecord>),
    /// A value would not normalize; nothing was kept.
    Discarded,
}

pub struct Runner {
    settings: Settings,
    source: Box<dyn PageSource>,
    sinks: Vec<Box<dyn Sink>>,
}

impl Runner {
    /// Wire up the HTTP source and whichever sinks the settings enable.
    pub async fn connect(settings: Settings) -> Result<Self> {
        let source = HttpSource::new(settings.page_url.clone(), settings.fetch_timeout)?;
        let mut sinks: Vec<Box<dyn Sink>> = Vec::new();

        if let Some(url) = &settings.db_url {
            let pg = PgSink::connect(url).await.map_err(|e| fail(Stage::Connecting, e))?;
            info!("connected to database");
            sinks.push(Box::new(pg));
        }
        if let Some(dir) = &settings.json_dir {
            let json = JsonDaySink::new(dir);
            info!(dir = %json.dir().display(), "writing day files");
            sinks.push(Box::new(json));
        }
        if sinks.is_empty() {
            warn!("no sink configured; records will only be logged");
        }

        Ok(Self::with_parts(settings, Box::new(source), sinks))
    }

    pub fn with_parts(settings: Settings, source: Box<dyn PageSource>, sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { settings, source, sinks }
    }

    /// Cycle, sleep, repeat. Returns only on a fatal error, or after one
    /// cycle when `once` is set.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.cycle().await?;
            if self.settings.once {
                return Ok(());
            }
            info!(
                stage = %Stage::Sleeping,
                "finished submitting data, loop will begin again in {}s",
                self.settings.poll_interval.as_secs()
            );
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// One fetch → persist pass.
    pub async fn cycle(&mut self) -> Result<CycleOutcome> {
        for sink in &mut self.sinks {
            sink.ensure_ready().await.map_err(|e| fail(Stage::Connecting, e))?;
        }

        info!(source = self.source.describe(), "getting and submitting airport departure data");
        let body = self.source.fetch().await.map_err(|e| fail(Stage::Fetching, e))?;
        let captured = Utc::now();

        let records = {
            let doc = Html::parse_document(&body);
            if !doc.errors.is_empty() {
                // html5ever recovers from malformed markup; note it and carry on.
                warn!(stage = %Stage::Parsing, count = doc.errors.len(), "page has markup errors");
            }
            sec_times::extract(&doc, &self.settings.terminals, captured).map_err(|e| {
                let stage = match &e {
                    ScrapeError::MarkerNotFound(_) => Stage::Locating,
                    ScrapeError::HarvestCount { .. } => Stage::Harvesting,
                    _ => Stage::Building,
                };
                fail(stage, e)
            })?
        };

        if self.settings.show_rows {
            for sink in &mut self.sinks {
                sink.show_rows().await.map_err(|e| fail(Stage::Persisting, e))?;
            }
        }

        if records.is_empty() {
            warn!(stage = %Stage::Building, "cycle discarded, nothing to store");
            return Ok(CycleOutcome::Discarded);
        }
        for r in &records {
            info!(terminal = r.terminal(), wait = r.wait_len(), at = %r.timestamp(), "security queue");
        }

        if !self.settings.add_rows {
            info!("ADD_ROWS not set to true so not adding rows");
            return Ok(CycleOutcome::DryRun(records));
        }
        for sink in &mut self.sinks {
            let name = sink.name();
            sink.persist(&records).await.map_err(|e| {
                error!(sink = name, "sink write failed");
                fail(Stage::Persisting, e)
            })?;
        }
        Ok(CycleOutcome::Persisted(records))
    }
}

fn fail(stage: Stage, e: ScrapeError) -> ScrapeError {
    error!(%stage, error = %e, "fatal");
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Vec<TerminalSecurityRecord>>>>;

    struct Recorder {
        seen: Seen,
        fail: bool,
    }

    #[async_trait]
    impl Sink for Recorder {
        fn name(&self) -> &'static str { "recorder" }

        async fn persist(&mut self, records: &[TerminalSecurityRecord]) -> Result<()> {
            if self.fail {
                return Err(ScrapeError::Io(std::io::Error::other("disk full")));
            }
            self.seen.lock().unwrap().push(records.to_vec());
            Ok(())
        }
    }

    fn page(a: &str, b: &str) -> String {
        format!(
            "<html><body><div class=\"sec-times\">\
             <div><strong>{a}</strong></div><div><strong>{b}</strong></div>\
             </div></body></html>"
        )
    }

    fn runner(body: String, add_rows: bool, fail: bool) -> (Runner, Seen) {
        let seen: Seen = Arc::default();
        let settings = Settings { add_rows, once: true, ..Settings::default() };
        let sinks: Vec<Box<dyn Sink>> = vec![Box::new(Recorder { seen: Arc::clone(&seen), fail })];
        let r = Runner::with_parts(settings, Box::new(crate::core::StaticPage::new("test", body)), sinks);
        (r, seen)
    }

    #[tokio::test]
    async fn persists_every_terminal() {
        let (mut r, seen) = runner(page("= 7 mins", "= 3 mins"), true, false);
        let CycleOutcome::Persisted(recs) = r.cycle().await.unwrap() else { panic!("not persisted") };
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].timestamp(), recs[1].timestamp());
        assert_eq!(seen.lock().unwrap().as_slice(), &[recs]);
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let (mut r, seen) = runner(page("= 7 mins", "= 3 mins"), false, false);
        assert!(matches!(r.cycle().await.unwrap(), CycleOutcome::DryRun(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_value_discards_and_continues() {
        let (mut r, seen) = runner(page("= 7 mins", "closed"), true, false);
        assert_eq!(r.cycle().await.unwrap(), CycleOutcome::Discarded);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_marker_is_fatal() {
        let (mut r, _) = runner("<html><body></body></html>".into(), true, false);
        assert!(matches!(r.cycle().await, Err(ScrapeError::MarkerNotFound(_))));
    }

    #[tokio::test]
    async fn sink_error_is_fatal() {
        let (mut r, _) = runner(page("= 1 mins", "= 2 mins"), true, true);
        assert!(matches!(r.run().await, Err(ScrapeError::Io(_))));
    }

    type Events = Arc<Mutex<Vec<&'static str>>>;

    /// Sink and page that log every call into one shared timeline.
    struct Traced {
        events: Events,
        ready_fails: bool,
    }

    #[async_trait]
    impl Sink for Traced {
        fn name(&self) -> &'static str { "traced" }

        async fn ensure_ready(&mut self) -> Result<()> {
            self.events.lock().unwrap().push("ready");
            if self.ready_fails {
                return Err(ScrapeError::Config("connection refused".into()));
            }
            Ok(())
        }

        async fn persist(&mut self, _: &[TerminalSecurityRecord]) -> Result<()> {
            self.events.lock().unwrap().push("persist");
            Ok(())
        }
    }

    struct TracedPage {
        events: Events,
        body: String,
    }

    #[async_trait]
    impl PageSource for TracedPage {
        fn describe(&self) -> &str { "traced" }

        async fn fetch(&self) -> Result<String> {
            self.events.lock().unwrap().push("fetch");
            Ok(self.body.clone())
        }
    }

    fn traced_runner(ready_fails: bool) -> (Runner, Events) {
        let events: Events = Arc::default();
        let settings = Settings { add_rows: true, once: true, ..Settings::default() };
        let sinks: Vec<Box<dyn Sink>> =
            vec![Box::new(Traced { events: Arc::clone(&events), ready_fails })];
        let page = TracedPage { events: Arc::clone(&events), body: page("= 4 mins", "= 9 mins") };
        (Runner::with_parts(settings, Box::new(page), sinks), events)
    }

    #[tokio::test]
    async fn sinks_are_readied_before_every_fetch() {
        let (mut r, events) = traced_runner(false);
        r.cycle().await.unwrap();
        r.cycle().await.unwrap();
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &["ready", "fetch", "persist", "ready", "fetch", "persist"]
        );
    }

    #[tokio::test]
    async fn failed_reconnect_ends_cycle_before_fetch() {
        let (mut r, events) = traced_runner(true);
        assert!(matches!(r.cycle().await, Err(ScrapeError::Config(_))));
        assert_eq!(events.lock().unwrap().as_slice(), &["ready"]);
    }

    #[tokio::test]
    async fn failed_reconnect_stops_the_loop() {
        let (mut r, events) = traced_runner(true);
        r.settings.once = false;
        assert!(r.run().await.is_err());
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn once_returns_after_one_cycle() {
        let (mut r, seen) = runner(page("= 1 mins", "= 2 mins"), true, false);
        r.run().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
