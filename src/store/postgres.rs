// src/store/postgres.rs
//
// Relational sink over a single long-lived connection. Works against
// Postgres and CockroachDB (same wire protocol); the retry on SQLSTATE 40001
// is for CockroachDB, which asks clients to replay serialization conflicts.
//
// Expected table:
//   CREATE TABLE terminalrecords (
//       terminal  TEXT        NOT NULL,
//       wait_len  INT         NOT NULL,
//       timestamp TIMESTAMPTZ NOT NULL
//   );

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Row};
use tracing::{info, warn};

use super::Sink;
use crate::config::consts::{MAX_TX_ATTEMPTS, TABLE};
use crate::data::TerminalSecurityRecord;
use crate::error::{Result, ScrapeError};

const SERIALIZATION_FAILURE: &str = "40001";

pub struct PgSink {
    url: String,
    conn: PgConnection,
}

impl PgSink {
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = PgConnection::connect(url).await?;
        Ok(Self { url: url.to_string(), conn })
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

#[async_trait]
impl Sink for PgSink {
    fn name(&self) -> &'static str { "postgres" }

    async fn ensure_ready(&mut self) -> Result<()> {
        if let Err(e) = self.conn.ping().await {
            warn!(error = %e, "database connection lost, re-establishing");
            self.conn = PgConnection::connect(&self.url).await.map_err(ScrapeError::Reconnect)?;
            info!("database connection re-established");
        }
        Ok(())
    }

    async fn show_rows(&mut self) -> Result<()> {
        let rows = select_all(&mut self.conn).await?;
        for (terminal, wait_len, at) in &rows {
            info!("{terminal} {wait_len} {at}");
        }
        info!(count = rows.len(), "listed {TABLE}");
        Ok(())
    }

    async fn persist(&mut self, records: &[TerminalSecurityRecord]) -> Result<()> {
        let n = insert_records(&mut self.conn, records).await?;
        info!(rows = n, "successfully added rows");
        Ok(())
    }
}

/// Insert every record in one statement inside one transaction.
///
/// Serialization conflicts are replayed up to `MAX_TX_ATTEMPTS` times; any
/// other error rolls back and is returned. An empty slice is a no-op.
pub async fn insert_records(
    conn: &mut PgConnection,
    records: &[TerminalSecurityRecord],
) -> std::result::Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }
    let mut attempt = 1;
    loop {
        match insert_once(conn, records).await {
            Err(e) if is_retryable(&e) && attempt < MAX_TX_ATTEMPTS => {
                warn!(attempt, error = %e, "transaction conflict, retrying");
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn insert_once(
    conn: &mut PgConnection,
    records: &[TerminalSecurityRecord],
) -> std::result::Result<u64, sqlx::Error> {
    info!("creating new rows...");
    let mut tx = conn.begin().await?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("INSERT INTO {TABLE} (terminal, wait_len, timestamp) "));
    qb.push_values(records, |mut row, rec| {
        row.push_bind(rec.terminal().to_string())
            .push_bind(i64::from(rec.wait_len()))
            .push_bind(rec.timestamp());
    });

    let res = qb.build().execute(&mut *tx).await;
    match res {
        Ok(done) => {
            tx.commit().await?;
            Ok(done.rows_affected())
        }
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e)
        }
    }
}

fn is_retryable(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(SERIALIZATION_FAILURE),
        _ => false,
    }
}

/// Every stored row as `(terminal, wait_len, timestamp)`.
pub async fn select_all(
    conn: &mut PgConnection,
) -> std::result::Result<Vec<(String, i64, DateTime<Utc>)>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT terminal, wait_len::INT8 AS wait_len, timestamp FROM {TABLE}"
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|r| -> std::result::Result<_, sqlx::Error> {
            Ok((r.try_get("terminal")?, r.try_get("wait_len")?, r.try_get("timestamp")?))
        })
        .collect()
}
