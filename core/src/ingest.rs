//! Input schema validation: untyped rows → typed transactions.
//!
//! Rows arrive as column maps from either a JSON file or the store's feed
//! table, so both sources go through the same checks. Any missing column
//! or unparseable required value fails the whole batch.

use crate::{
    error::{RiskError, RiskResult},
    transaction::Transaction,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// One input row, keyed by column name.
pub type RawRow = Map<String, Value>;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "transaction_id",
    "client_id",
    "date_time",
    "amount",
    "t_type",
    "birth_date",
    "sender_latitude",
    "sender_longitude",
];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Read a JSON array of row objects.
pub fn read_json_rows(path: &str) -> RiskResult<Vec<RawRow>> {
    let content = std::fs::read_to_string(path)?;
    let rows: Vec<RawRow> = serde_json::from_str(&content)?;
    log::info!("Read {} rows from {path}", rows.len());
    Ok(rows)
}

pub fn parse_rows(rows: &[RawRow]) -> RiskResult<Vec<Transaction>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_row(i, row))
        .collect()
}

pub fn parse_row(row_idx: usize, row: &RawRow) -> RiskResult<Transaction> {
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !row.contains_key(**c)) {
        return Err(RiskError::missing_column(*missing));
    }
    Ok(Transaction {
        transaction_id:   parse_id(row_idx, "transaction_id", &row["transaction_id"])?,
        client_id:        parse_id(row_idx, "client_id", &row["client_id"])?,
        date_time:        parse_date_time(row_idx, "date_time", &row["date_time"])?,
        amount:           parse_amount(row_idx, &row["amount"])?,
        t_type:           parse_text(&row["t_type"]),
        birth_date:       parse_date(row_idx, "birth_date", &row["birth_date"])?,
        sender_latitude:  parse_coordinate(&row["sender_latitude"]),
        sender_longitude: parse_coordinate(&row["sender_longitude"]),
    })
}

fn invalid(column: &str, row: usize, value: &Value) -> RiskError {
    RiskError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

fn parse_id(row: usize, column: &str, value: &Value) -> RiskResult<String> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(invalid(column, row, other)),
    }
}

pub fn parse_date_time_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_date_time(row: usize, column: &str, value: &Value) -> RiskResult<NaiveDateTime> {
    value
        .as_str()
        .and_then(parse_date_time_str)
        .ok_or_else(|| invalid(column, row, value))
}

fn parse_date(row: usize, column: &str, value: &Value) -> RiskResult<NaiveDate> {
    value
        .as_str()
        .and_then(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .ok()
                .or_else(|| parse_date_time_str(s).map(|dt| dt.date()))
        })
        .ok_or_else(|| invalid(column, row, value))
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn parse_amount(row: usize, value: &Value) -> RiskResult<f64> {
    parse_number(value)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| invalid("amount", row, value))
}

fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Absent or unparseable coordinates are tolerated here; the geolocation
/// detector reports them.
fn parse_coordinate(value: &Value) -> Option<f64> {
    parse_number(value)
}
