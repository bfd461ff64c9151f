// src/file.rs
//
// Day-partitioned JSON files: `<dir>/<year>-<MonthName>-<day>.json`, each
// holding one JSON array of records. Every append reads the whole file,
// extends the array, writes it to a sibling `.tmp` and renames that over the
// original, so a crash mid-write leaves the previous contents intact.
// No locking: one writer process only.

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::data::TerminalSecurityRecord;
use crate::error::{Result, ScrapeError};
use crate::store::Sink;

pub struct JsonDaySink {
    dir: PathBuf,
}

impl JsonDaySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// File holding the records captured on `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(day_file_name(date))
    }

    /// Append `records` to `date`'s file, creating it as `[]` first if needed.
    pub fn append(&self, date: NaiveDate, records: &[TerminalSecurityRecord]) -> Result<PathBuf> {
        ensure_directory(&self.dir)?;
        let path = self.path_for(date);
        if !path.exists() {
            fs::write(&path, "[]")?;
        }

        let mut list = read_records(&path)?;
        list.extend_from_slice(records);
        replace_file(&path, &serde_json::to_vec(&list)?)?;
        Ok(path)
    }

    /// Everything stored for `date`; empty if the file does not exist yet.
    pub fn load(&self, date: NaiveDate) -> Result<Vec<TerminalSecurityRecord>> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_records(&path)
    }
}

#[async_trait]
impl Sink for JsonDaySink {
    fn name(&self) -> &'static str { "json" }

    async fn persist(&mut self, records: &[TerminalSecurityRecord]) -> Result<()> {
        // All records of a cycle share one timestamp; file them under its local date.
        let Some(first) = records.first() else { return Ok(()) };
        let date = first.timestamp().with_timezone(&Local).date_naive();
        let path = self.append(date, records)?;
        info!(path = %path.display(), rows = records.len(), "appended to day file");
        Ok(())
    }
}

/// `2026-October-9.json`: full month name, day without padding.
pub fn day_file_name(date: NaiveDate) -> String {
    format!("{}.json", date.format("%Y-%B-%-d"))
}

/// Write `bytes` next to `path`, then rename into place.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_records(path: &Path) -> Result<Vec<TerminalSecurityRecord>> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(ScrapeError::Config(format!("path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rec(terminal: &str, minute: u32, wait: u32) -> TerminalSecurityRecord {
        let at = Utc.with_ymd_and_hms(2026, 10, 9, 7, minute, 0).unwrap();
        TerminalSecurityRecord::new(terminal, at, wait)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 9).unwrap()
    }

    #[test]
    fn file_name_spells_out_month() {
        assert_eq!(day_file_name(day()), "2026-October-9.json");
        assert_eq!(day_file_name(NaiveDate::from_ymd_opt(2027, 1, 31).unwrap()), "2027-January-31.json");
    }

    #[test]
    fn first_append_creates_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path().join("data"));

        let path = sink.append(day(), &[rec("T1", 0, 4)]).unwrap();
        assert_eq!(path, tmp.path().join("data").join("2026-October-9.json"));
        assert_eq!(sink.load(day()).unwrap(), vec![rec("T1", 0, 4)]);
    }

    #[test]
    fn repeated_appends_keep_order() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path());

        let first = [rec("T1", 0, 4), rec("T2", 0, 9)];
        let second = [rec("T1", 10, 5), rec("T2", 10, 11)];
        sink.append(day(), &first).unwrap();
        sink.append(day(), &second).unwrap();

        let all: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
        assert_eq!(sink.load(day()).unwrap(), all);
    }

    #[test]
    fn existing_empty_array_is_extended() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path());
        fs::write(sink.path_for(day()), "[]").unwrap();

        sink.append(day(), &[rec("T2", 5, 1)]).unwrap();
        assert_eq!(sink.load(day()).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path());
        fs::write(sink.path_for(day()), "{not json").unwrap();

        let err = sink.append(day(), &[rec("T1", 0, 1)]).unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
        assert_eq!(fs::read_to_string(sink.path_for(day())).unwrap(), "{not json");
    }

    #[test]
    fn append_leaves_no_temp_file_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path());
        sink.append(day(), &[rec("T1", 0, 4)]).unwrap();
        sink.append(day(), &[rec("T1", 10, 6)]).unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["2026-October-9.json".to_string()]);
    }

    #[test]
    fn stale_temp_from_interrupted_write_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonDaySink::new(tmp.path());
        sink.append(day(), &[rec("T1", 0, 4)]).unwrap();

        // a write that died before the rename: half a file, original untouched
        let stale = temp_path(&sink.path_for(day()));
        fs::write(&stale, "[{\"terminal\":").unwrap();
        assert_eq!(sink.load(day()).unwrap(), vec![rec("T1", 0, 4)]);

        sink.append(day(), &[rec("T2", 0, 8)]).unwrap();
        assert_eq!(sink.load(day()).unwrap(), vec![rec("T1", 0, 4), rec("T2", 0, 8)]);
        assert!(!stale.exists());
    }

    #[test]
    fn missing_day_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(JsonDaySink::new(tmp.path()).load(day()).unwrap().is_empty());
    }

    #[test]
    fn directory_path_must_not_be_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("data");
        fs::write(&blocker, "x").unwrap();
        assert!(matches!(ensure_directory(&blocker), Err(ScrapeError::Config(_))));
    }
}
