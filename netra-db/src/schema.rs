use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::DbError;

const SCHEMA_SQL: &str = r#"
-- One row per ingested scan batch
CREATE TABLE IF NOT EXISTS Datasets (
    Id             INTEGER PRIMARY KEY AUTOINCREMENT,
    CompanyName    TEXT NOT NULL,
    ScanDate       TEXT NOT NULL,
    TotalAssets    INTEGER DEFAULT 0,
    ActiveAssets   INTEGER DEFAULT 0,
    AllServices    TEXT DEFAULT '',
    ScansProcessed INTEGER DEFAULT 0,
    RiskLevel      TEXT DEFAULT '',
    LastModified   TEXT NOT NULL,
    FileNotes      TEXT DEFAULT '',
    OriginalFiles  TEXT DEFAULT '',
    CreatedDate    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_datasets_modified ON Datasets(LastModified);

-- One row per discovered host, owned by exactly one dataset
CREATE TABLE IF NOT EXISTS Assets (
    Id            INTEGER PRIMARY KEY AUTOINCREMENT,
    DatasetId     INTEGER NOT NULL REFERENCES Datasets(Id) ON DELETE CASCADE,
    IpAddress     TEXT NOT NULL,
    Hostname      TEXT DEFAULT '',
    Vendor        TEXT DEFAULT '',
    OpenPortCount INTEGER DEFAULT 0,
    OpenServices  TEXT DEFAULT '',
    RawData       TEXT DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_assets_dataset ON Assets(DatasetId);
"#;

/// A column that was renamed after databases using the old name shipped.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRename {
    pub table: &'static str,
    pub old: &'static str,
    pub new: &'static str,
    /// Column declaration used when adding `new` to an existing table.
    pub decl: &'static str,
}

/// Every tracked rename. Schema initialization backfills `new` from `old`,
/// and [`SafeRow`](crate::SafeRow) falls back to `old` when `new` is absent.
pub const COLUMN_RENAMES: &[ColumnRename] = &[ColumnRename {
    table: "Datasets",
    old: "TopServices",
    new: "AllServices",
    decl: "TEXT DEFAULT ''",
}];

/// Legacy names a column has been known by, newest first.
pub(crate) fn legacy_names(column: &str) -> impl Iterator<Item = &'static str> + '_ {
    COLUMN_RENAMES
        .iter()
        .filter(move |r| r.new.eq_ignore_ascii_case(column))
        .map(|r| r.old)
}

pub fn initialize(conn: &Connection) -> Result<(), DbError> {
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // Renames must be backfilled before CREATE TABLE IF NOT EXISTS, which is a
    // no-op on an existing table and cannot add the missing column itself.
    apply_column_renames(conn)?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Add each renamed column that is missing and copy the old values across.
///
/// The old column stays in place: older readers may still reference it.
fn apply_column_renames(conn: &Connection) -> Result<(), DbError> {
    for rename in COLUMN_RENAMES {
        let columns = table_columns(conn, rename.table)?;
        if columns.is_empty() {
            // Table not created yet; SCHEMA_SQL will create it with the new name.
            continue;
        }
        let has = |name: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(name));
        if !has(rename.old) || has(rename.new) {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            "ALTER TABLE {table} ADD COLUMN {new} {decl};
             UPDATE {table} SET {new} = {old};",
            table = rename.table,
            new = rename.new,
            old = rename.old,
            decl = rename.decl,
        ))?;
        tx.commit()?;
        info!(
            table = rename.table,
            from = rename.old,
            to = rename.new,
            "migrated renamed column"
        );
    }
    Ok(())
}

/// Column names of `table`, in declaration order. Empty if the table does not exist.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    debug!(table, count = columns.len(), "introspected table columns");
    Ok(columns)
}
