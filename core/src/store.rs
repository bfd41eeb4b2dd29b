//! SQLite persistence layer: the extraction feed and the risk data mart.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never executes SQL; it receives rows and returns records.

use crate::{
    error::RiskResult,
    ingest::{RawRow, REQUIRED_COLUMNS},
    transaction::{ScoredTransaction, Transaction},
};
use rusqlite::{params, types::ValueRef, Connection};
use serde_json::{Number, Value};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct RiskStore {
    conn: Connection,
}

impl RiskStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> RiskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RiskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RiskResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_risk_mart.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, version: &str, started_at: &str) -> RiskResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, version, started_at) VALUES (?1, ?2, ?3)",
            params![run_id, version, started_at],
        )?;
        Ok(())
    }

    // ── Extraction feed ────────────────────────────────────────

    /// Append typed transactions to the feed table in one transaction.
    pub fn insert_transactions(&self, rows: &[Transaction]) -> RiskResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        write_feed(&tx, rows)?;
        tx.commit()?;
        log::info!("Inserted {} rows into transaction_feed", rows.len());
        Ok(rows.len())
    }

    /// Swap the whole feed for `rows` in one transaction.
    pub fn replace_transactions(&self, rows: &[Transaction]) -> RiskResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let cleared = tx.execute("DELETE FROM transaction_feed", [])?;
        write_feed(&tx, rows)?;
        tx.commit()?;
        log::info!(
            "Replaced transaction_feed: {cleared} rows cleared, {} inserted",
            rows.len()
        );
        Ok(rows.len())
    }

    /// Read the feed as untyped rows so they pass through the same schema
    /// validation as file input.
    pub fn fetch_transactions(&self) -> RiskResult<Vec<RawRow>> {
        let sql = format!(
            "SELECT {} FROM transaction_feed ORDER BY rowid ASC",
            REQUIRED_COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                let mut raw = RawRow::new();
                for (i, column) in REQUIRED_COLUMNS.iter().enumerate() {
                    raw.insert(column.to_string(), sql_to_json(row.get_ref(i)?));
                }
                Ok(raw)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Fetched {} rows from transaction_feed", rows.len());
        Ok(rows)
    }

    // ── Data mart ──────────────────────────────────────────────

    /// Bulk-load scored records for `run_id`. An empty batch is skipped.
    pub fn load_scored(&self, run_id: &str, rows: &[ScoredTransaction]) -> RiskResult<usize> {
        if rows.is_empty() {
            log::info!("No scored rows, data mart load skipped");
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO risk_data_mart (
                    run_id, transaction_id, client_id, client_age, date_time, amount,
                    t_type, birth_date, sender_latitude, sender_longitude,
                    is_suspicious, risk_score, reason_flags, risk_status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for s in rows {
                let t = &s.transaction;
                stmt.execute(params![
                    run_id,
                    &t.transaction_id,
                    &t.client_id,
                    s.client_age,
                    t.date_time.format(DATE_TIME_FORMAT).to_string(),
                    t.amount,
                    &t.t_type,
                    t.birth_date.format(DATE_FORMAT).to_string(),
                    t.sender_latitude,
                    t.sender_longitude,
                    s.is_suspicious,
                    s.risk_score,
                    &s.reason_flags,
                    s.risk_status.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        log::info!("Loaded {} rows into risk_data_mart for run {run_id}", rows.len());
        Ok(rows.len())
    }

    /// Column names of the data mart table, in schema order.
    pub fn mart_columns(&self) -> RiskResult<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(risk_data_mart)")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn scored_count(&self, run_id: &str) -> RiskResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM risk_data_mart WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn status_counts(&self, run_id: &str) -> RiskResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT risk_status, COUNT(*) FROM risk_data_mart
             WHERE run_id = ?1 GROUP BY risk_status ORDER BY risk_status ASC",
        )?;
        let counts = stmt
            .query_map(params![run_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// Score and reasons of one stored record.
    pub fn scored_record(
        &self,
        run_id: &str,
        transaction_id: &str,
    ) -> RiskResult<Option<(u32, String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT risk_score, reason_flags, risk_status FROM risk_data_mart
             WHERE run_id = ?1 AND transaction_id = ?2",
        )?;
        let mut rows = stmt.query(params![run_id, transaction_id])?;
        match rows.next()? {
            Some(row) => Ok(Some((row.get(0)?, row.get(1)?, row.get(2)?))),
            None => Ok(None),
        }
    }
}

fn write_feed(conn: &Connection, rows: &[Transaction]) -> RiskResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO transaction_feed (
            transaction_id, client_id, date_time, amount, t_type,
            birth_date, sender_latitude, sender_longitude
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for t in rows {
        stmt.execute(params![
            &t.transaction_id,
            &t.client_id,
            t.date_time.format(DATE_TIME_FORMAT).to_string(),
            t.amount,
            &t.t_type,
            t.birth_date.format(DATE_FORMAT).to_string(),
            t.sender_latitude,
            t.sender_longitude,
        ])?;
    }
    Ok(())
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
