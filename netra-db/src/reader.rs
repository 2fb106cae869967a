//! Lenient column access for rows read from the dataset library.
//!
//! Reads never fail on NULLs, missing columns or malformed text; each
//! accessor degrades to a documented default instead. Write paths are where
//! validation happens.

use chrono::{NaiveDate, NaiveDateTime};
use netra_types::{now_timestamp, parse_date, parse_timestamp};
use rusqlite::Row;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::schema::legacy_names;

/// Name-based, never-failing accessors over a [`rusqlite::Row`].
///
/// Columns are looked up by name so the same code reads rows produced by
/// `SELECT *` against any schema revision. When a column is absent, the
/// legacy names recorded in [`COLUMN_RENAMES`](crate::COLUMN_RENAMES) are
/// tried before giving up.
pub struct SafeRow<'a, 'stmt> {
    row: &'a Row<'stmt>,
}

impl<'a, 'stmt> SafeRow<'a, 'stmt> {
    pub fn new(row: &'a Row<'stmt>) -> Self {
        Self { row }
    }

    /// Raw value for `column`, or `None` if neither it nor a legacy alias exists.
    fn value(&self, column: &str) -> Option<ValueRef<'_>> {
        if let Some(value) = self.lookup(column) {
            return Some(value);
        }
        for legacy in legacy_names(column) {
            if let Some(value) = self.lookup(legacy) {
                debug!(column, legacy, "read fell back to legacy column");
                return Some(value);
            }
        }
        None
    }

    fn lookup(&self, column: &str) -> Option<ValueRef<'_>> {
        let idx = self.row.as_ref().column_index(column).ok()?;
        self.row.get_ref(idx).ok()
    }

    /// Text value; empty for NULL or a missing column.
    pub fn string(&self, column: &str) -> String {
        match self.value(column) {
            Some(ValueRef::Text(bytes)) | Some(ValueRef::Blob(bytes)) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            Some(ValueRef::Integer(i)) => i.to_string(),
            Some(ValueRef::Real(f)) => f.to_string(),
            Some(ValueRef::Null) | None => String::new(),
        }
    }

    /// Integer value; zero for NULL, a missing column or non-numeric text.
    pub fn int(&self, column: &str) -> i64 {
        match self.value(column) {
            Some(ValueRef::Integer(i)) => i,
            Some(ValueRef::Real(f)) => f as i64,
            Some(ValueRef::Text(bytes)) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            Some(ValueRef::Null) | Some(ValueRef::Blob(_)) | None => 0,
        }
    }

    /// Non-negative count; negative stored values read as zero.
    pub fn count(&self, column: &str) -> usize {
        usize::try_from(self.int(column)).unwrap_or(0)
    }

    /// Stored timestamp, or `default` (the current time when `None`) if the
    /// value is NULL, missing or unparsable.
    pub fn timestamp(&self, column: &str, default: Option<NaiveDateTime>) -> NaiveDateTime {
        match self.text(column).as_deref().and_then(parse_timestamp) {
            Some(ts) => ts,
            None => {
                debug!(column, "unreadable timestamp, using default");
                default.unwrap_or_else(now_timestamp)
            }
        }
    }

    /// Stored calendar date, with the same fallback rules as [`timestamp`](Self::timestamp).
    pub fn date(&self, column: &str, default: Option<NaiveDate>) -> NaiveDate {
        match self.text(column).as_deref().and_then(parse_date) {
            Some(date) => date,
            None => {
                debug!(column, "unreadable date, using default");
                default.unwrap_or_else(|| now_timestamp().date())
            }
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        match self.value(column)? {
            ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}
