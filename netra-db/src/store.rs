use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use netra_types::{
    Asset, Dataset, DatasetId, format_date, format_timestamp, now_timestamp, parse_timestamp,
};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};

use crate::error::DbError;
use crate::reader::SafeRow;
use crate::schema;

/// Persistent dataset library backed by SQLite.
///
/// Every method runs its statements (and transaction, where there is one)
/// inside its own scope; a transaction that is not committed is rolled back
/// when the method returns, on error paths included.
pub struct DatasetStore {
    conn: Connection,
}

fn default_db_path() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("Netra").join("datasets.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".netra").join("datasets.db")
    }
}

impl DatasetStore {
    /// Location used by [`open_default`](Self::open_default).
    pub fn default_path() -> PathBuf {
        default_db_path()
    }

    /// Open (or create) the library at the default location.
    pub fn open_default() -> Result<Self, DbError> {
        Self::open(&default_db_path())
    }

    /// Open a library at a specific path.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DbError::Other(format!(
                        "failed to create db directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        register_functions(&conn)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        schema::initialize(&conn)?;
        debug!(path = %path.display(), journal_mode = %mode, "dataset library opened");
        Ok(Self { conn })
    }

    /// Open an in-memory library (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        register_functions(&conn)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Persist a dataset and its assets atomically, returning the new id.
    ///
    /// Summary fields are stored as given; derive them before calling.
    pub fn save_dataset(&self, dataset: &Dataset, assets: &[Asset]) -> Result<DatasetId, DbError> {
        validate_dataset(dataset)?;
        if dataset.last_modified < dataset.created_date {
            return Err(DbError::Invalid(
                "last modified time precedes creation time".into(),
            ));
        }

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO Datasets (CompanyName, ScanDate, TotalAssets, ActiveAssets, AllServices, \
             ScansProcessed, RiskLevel, LastModified, FileNotes, OriginalFiles, CreatedDate) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                dataset.company_name.trim(),
                format_date(dataset.scan_date),
                dataset.total_assets as i64,
                dataset.active_assets as i64,
                dataset.all_services,
                dataset.scans_processed as i64,
                dataset.risk_level,
                format_timestamp(dataset.last_modified),
                dataset.file_notes,
                dataset.original_files_joined(),
                format_timestamp(dataset.created_date),
            ],
        )?;
        let dataset_id = tx.last_insert_rowid();

        if !assets.is_empty() {
            let mut stmt = tx.prepare(
                "INSERT INTO Assets (DatasetId, IpAddress, Hostname, Vendor, OpenPortCount, \
                 OpenServices) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (index, asset) in assets.iter().enumerate() {
                // Dropping `tx` without commit rolls back the dataset row too.
                if asset.ip_address.trim().is_empty() {
                    return Err(DbError::Invalid(format!(
                        "asset #{index} has no IP address"
                    )));
                }
                stmt.execute(params![
                    dataset_id,
                    asset.ip_address.trim(),
                    asset.hostname,
                    asset.vendor,
                    asset.open_port_count as i64,
                    asset.open_services,
                ])?;
            }
        }

        tx.commit()?;
        debug!(dataset_id, assets = assets.len(), "dataset saved");
        Ok(dataset_id)
    }

    /// All datasets, most recently modified first.
    pub fn list_datasets(&self) -> Result<Vec<Dataset>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM Datasets ORDER BY LastModified DESC, Id DESC")?;
        let rows = stmt.query_map([], |row| Ok(dataset_from_row(row)))?;

        let mut datasets = Vec::new();
        for row in rows {
            datasets.push(row?);
        }
        Ok(datasets)
    }

    /// Load one dataset by id.
    pub fn get_dataset(&self, id: DatasetId) -> Result<Option<Dataset>, DbError> {
        let mut stmt = self.conn.prepare("SELECT * FROM Datasets WHERE Id = ?1")?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(dataset_from_row(row)))
        } else {
            Ok(None)
        }
    }

    /// Assets owned by a dataset (no particular order).
    pub fn dataset_assets(&self, dataset_id: DatasetId) -> Result<Vec<Asset>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM Assets WHERE DatasetId = ?1")?;
        let rows = stmt.query_map(params![dataset_id], |row| Ok(asset_from_row(row)))?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row?);
        }
        Ok(assets)
    }

    /// Update the mutable fields of an existing dataset.
    ///
    /// `LastModified` is stamped by the store; the value carried by `dataset`
    /// is ignored. The stamp is the current time, pushed forward when needed
    /// so it is later than the row's previous stamp, later than any other
    /// dataset stamped up to now, and never before `CreatedDate`. Returns
    /// `false` if no dataset has that id.
    pub fn update_dataset(&self, dataset: &Dataset) -> Result<bool, DbError> {
        let id = dataset
            .id
            .ok_or_else(|| DbError::Invalid("cannot update a dataset that was never saved".into()))?;
        validate_dataset(dataset)?;

        let tx = self.conn.unchecked_transaction()?;
        let stored = tx
            .query_row("SELECT * FROM Datasets WHERE Id = ?1", params![id], |row| {
                Ok(dataset_from_row(row))
            })
            .optional()?;
        let Some(stored) = stored else {
            warn!(dataset_id = id, "update matched no dataset");
            return Ok(false);
        };

        let now = now_timestamp();
        let latest_other: Option<String> = tx.query_row(
            "SELECT MAX(LastModified) FROM Datasets WHERE Id <> ?1 AND LastModified <= ?2",
            params![id, format_timestamp(now)],
            |row| row.get(0),
        )?;
        let stamp = next_modified(
            now,
            stored.last_modified,
            stored.created_date,
            latest_other.as_deref().and_then(parse_timestamp),
        );

        tx.execute(
            "UPDATE Datasets SET CompanyName = ?1, ScanDate = ?2, TotalAssets = ?3, \
             ActiveAssets = ?4, AllServices = ?5, ScansProcessed = ?6, RiskLevel = ?7, \
             LastModified = ?8, FileNotes = ?9 WHERE Id = ?10",
            params![
                dataset.company_name.trim(),
                format_date(dataset.scan_date),
                dataset.total_assets as i64,
                dataset.active_assets as i64,
                dataset.all_services,
                dataset.scans_processed as i64,
                dataset.risk_level,
                format_timestamp(stamp),
                dataset.file_notes,
                id,
            ],
        )?;
        tx.commit()?;

        debug!(dataset_id = id, last_modified = %format_timestamp(stamp), "dataset updated");
        Ok(true)
    }

    /// Delete a dataset and every asset it owns.
    ///
    /// Assets are removed explicitly before the dataset row, in one
    /// transaction, so ordering and atomicity do not depend on the cascade.
    pub fn delete_dataset(&self, id: DatasetId) -> Result<bool, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let assets = tx.execute("DELETE FROM Assets WHERE DatasetId = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM Datasets WHERE Id = ?1", params![id])?;
        tx.commit()?;

        debug!(dataset_id = id, assets, "dataset deleted");
        Ok(deleted > 0)
    }

    /// Case-insensitive substring search over company name, services,
    /// risk level and notes. Ordered like [`list_datasets`](Self::list_datasets).
    ///
    /// Case is folded with Unicode rules on both sides, not SQLite's
    /// ASCII-only `LIKE` folding.
    pub fn search_datasets(&self, term: &str) -> Result<Vec<Dataset>, DbError> {
        let pattern = like_pattern(&term.to_lowercase());
        let mut stmt = self.conn.prepare(
            "SELECT * FROM Datasets \
             WHERE netra_lower(CompanyName) LIKE ?1 ESCAPE '\\' \
                OR netra_lower(AllServices) LIKE ?1 ESCAPE '\\' \
                OR netra_lower(RiskLevel) LIKE ?1 ESCAPE '\\' \
                OR netra_lower(FileNotes) LIKE ?1 ESCAPE '\\' \
             ORDER BY LastModified DESC, Id DESC",
        )?;
        let rows = stmt.query_map(params![pattern], |row| Ok(dataset_from_row(row)))?;

        let mut datasets = Vec::new();
        for row in rows {
            datasets.push(row?);
        }
        Ok(datasets)
    }

    /// Number of stored datasets.
    pub fn count_datasets(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Datasets", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// SQL functions the queries rely on. `netra_lower(x)` lowercases text with
/// Unicode case folding; NULL stays NULL.
fn register_functions(conn: &Connection) -> Result<(), DbError> {
    conn.create_scalar_function(
        "netra_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lowered = match ctx.get_raw(0) {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(t) | ValueRef::Blob(t) => {
                    Some(String::from_utf8_lossy(t).to_lowercase())
                }
            };
            Ok(lowered)
        },
    )?;
    Ok(())
}

/// Stamp for an update made at `now`.
fn next_modified(
    now: NaiveDateTime,
    previous: NaiveDateTime,
    created: NaiveDateTime,
    latest_other: Option<NaiveDateTime>,
) -> NaiveDateTime {
    let second = Duration::seconds(1);
    let stamp = now.max(previous + second).max(created);
    match latest_other {
        Some(latest) => stamp.max(latest + second),
        None => stamp,
    }
}

fn validate_dataset(dataset: &Dataset) -> Result<(), DbError> {
    if dataset.company_name.trim().is_empty() {
        return Err(DbError::Invalid("company name is required".into()));
    }
    if dataset.active_assets > dataset.total_assets {
        return Err(DbError::Invalid(format!(
            "active assets ({}) exceed total assets ({})",
            dataset.active_assets, dataset.total_assets
        )));
    }
    Ok(())
}

fn dataset_from_row(row: &Row<'_>) -> Dataset {
    let r = SafeRow::new(row);
    let created_date = r.timestamp("CreatedDate", None);
    Dataset {
        id: Some(r.int("Id")),
        company_name: r.string("CompanyName"),
        scan_date: r.date("ScanDate", Some(created_date.date())),
        total_assets: r.count("TotalAssets"),
        active_assets: r.count("ActiveAssets"),
        all_services: r.string("AllServices"),
        scans_processed: r.count("ScansProcessed"),
        risk_level: r.string("RiskLevel"),
        last_modified: r.timestamp("LastModified", Some(created_date)),
        file_notes: r.string("FileNotes"),
        original_files: Dataset::split_original_files(&r.string("OriginalFiles")),
        created_date,
    }
}

fn asset_from_row(row: &Row<'_>) -> Asset {
    let r = SafeRow::new(row);
    Asset {
        ip_address: r.string("IpAddress"),
        hostname: r.string("Hostname"),
        vendor: r.string("Vendor"),
        open_port_count: u32::try_from(r.int("OpenPortCount")).unwrap_or(0),
        open_services: r.string("OpenServices"),
    }
}

/// `%term%` with LIKE wildcards in `term` escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use netra_types::{RISK_NOT_COMPUTED, parse_timestamp};

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn mock_dataset(company: &str, modified: &str) -> Dataset {
        let mut ds = Dataset::new(company, date("2025-06-08"));
        ds.created_date = ts("2025-06-01 08:00:00");
        ds.last_modified = ts(modified);
        ds
    }

    fn mock_assets() -> Vec<Asset> {
        vec![
            Asset::new("192.168.1.1")
                .with_hostname("gw.acme.local")
                .with_vendor("Cisco")
                .with_open_ports(2)
                .with_services("http, ssh"),
            Asset::new("192.168.1.20")
                .with_open_ports(2)
                .with_services("ssh, ftp"),
            Asset::new("192.168.1.30").with_open_ports(1).with_services("http"),
        ]
    }

    fn acme() -> Dataset {
        let mut ds = mock_dataset("ACME-CORP", "2025-06-08 11:20:00");
        ds.total_assets = 25;
        ds.active_assets = 23;
        ds.all_services = "http, ssh, mysql".into();
        ds.scans_processed = 6;
        ds.file_notes = "quarterly external sweep".into();
        ds.original_files = vec!["scan1.txt".into(), "scan2.zip".into()];
        ds
    }

    fn asset_count(store: &DatasetStore) -> i64 {
        store
            .conn
            .query_row("SELECT COUNT(*) FROM Assets", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn save_and_get_roundtrip() {
        let store = DatasetStore::open_in_memory().unwrap();
        let input = acme();
        let id = store.save_dataset(&input, &mock_assets()).unwrap();

        let loaded = store.get_dataset(id).unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(Dataset { id: None, ..loaded }, input);
    }

    #[test]
    fn saved_assets_match_input() {
        let store = DatasetStore::open_in_memory().unwrap();
        let assets = mock_assets();
        let id = store.save_dataset(&acme(), &assets).unwrap();

        let mut loaded = store.dataset_assets(id).unwrap();
        loaded.sort_by(|a, b| a.ip_address.cmp(&b.ip_address));
        assert_eq!(loaded, assets);
    }

    #[test]
    fn save_without_assets() {
        let store = DatasetStore::open_in_memory().unwrap();
        let id = store.save_dataset(&acme(), &[]).unwrap();
        assert!(store.dataset_assets(id).unwrap().is_empty());
        assert_eq!(store.count_datasets().unwrap(), 1);
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = DatasetStore::open_in_memory().unwrap();
        assert!(store.get_dataset(999).unwrap().is_none());
    }

    #[test]
    fn save_rejects_empty_company() {
        let store = DatasetStore::open_in_memory().unwrap();
        let ds = mock_dataset("   ", "2025-06-08 11:20:00");
        let err = store.save_dataset(&ds, &[]).unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
        assert_eq!(store.count_datasets().unwrap(), 0);
    }

    #[test]
    fn save_rejects_more_active_than_total() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = acme();
        ds.active_assets = 26;
        assert!(matches!(
            store.save_dataset(&ds, &[]),
            Err(DbError::Invalid(_))
        ));
    }

    #[test]
    fn save_rejects_modified_before_created() {
        let store = DatasetStore::open_in_memory().unwrap();
        let ds = mock_dataset("CLIENT-A", "2025-05-01 00:00:00");
        assert!(matches!(
            store.save_dataset(&ds, &[]),
            Err(DbError::Invalid(_))
        ));
    }

    #[test]
    fn save_rolls_back_on_invalid_asset() {
        let store = DatasetStore::open_in_memory().unwrap();
        store.save_dataset(&acme(), &mock_assets()).unwrap();

        let mut assets = mock_assets();
        assets.insert(2, Asset::new("  "));
        let err = store.save_dataset(&acme(), &assets).unwrap_err();
        assert!(err.to_string().contains("asset #2"));

        assert_eq!(store.count_datasets().unwrap(), 1);
        assert_eq!(asset_count(&store), 3);
    }

    #[test]
    fn save_rolls_back_on_database_failure() {
        let store = DatasetStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_asset BEFORE INSERT ON Assets \
                 WHEN NEW.IpAddress = '192.168.1.30' \
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let err = store.save_dataset(&acme(), &mock_assets()).unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
        assert_eq!(store.count_datasets().unwrap(), 0);
        assert_eq!(asset_count(&store), 0);
    }

    #[test]
    fn list_orders_by_last_modified_desc() {
        let store = DatasetStore::open_in_memory().unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT-C", "2025-06-10 09:15:00"), &[])
            .unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT-A", "2025-06-13 14:30:00"), &[])
            .unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT-B", "2025-06-12 16:45:00"), &[])
            .unwrap();

        let names: Vec<String> = store
            .list_datasets()
            .unwrap()
            .into_iter()
            .map(|d| d.company_name)
            .collect();
        assert_eq!(names, vec!["CLIENT-A", "CLIENT-B", "CLIENT-C"]);
    }

    #[test]
    fn newly_saved_dataset_listed_first() {
        let store = DatasetStore::open_in_memory().unwrap();
        store
            .save_dataset(&mock_dataset("OLD", "2025-06-10 09:15:00"), &[])
            .unwrap();
        let fresh = Dataset::new("FRESH", date("2025-06-14"));
        let id = store.save_dataset(&fresh, &[]).unwrap();

        let all = store.list_datasets().unwrap();
        assert_eq!(all[0].id, Some(id));
    }

    #[test]
    fn same_timestamp_breaks_ties_by_newest_id() {
        let store = DatasetStore::open_in_memory().unwrap();
        let first = store
            .save_dataset(&mock_dataset("A", "2025-06-10 09:15:00"), &[])
            .unwrap();
        let second = store
            .save_dataset(&mock_dataset("B", "2025-06-10 09:15:00"), &[])
            .unwrap();
        let ids: Vec<_> = store
            .list_datasets()
            .unwrap()
            .into_iter()
            .map(|d| d.id.unwrap())
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn update_changes_fields_and_stamps_now() {
        let store = DatasetStore::open_in_memory().unwrap();
        let id = store.save_dataset(&acme(), &mock_assets()).unwrap();
        let original = store.get_dataset(id).unwrap().unwrap();

        let mut edited = original.clone();
        edited.risk_level = "High".into();
        edited.file_notes = "reviewed".into();
        // Callers cannot backdate the modification time.
        edited.last_modified = original.last_modified - Duration::days(30);
        assert!(store.update_dataset(&edited).unwrap());

        let reloaded = store.get_dataset(id).unwrap().unwrap();
        assert_eq!(reloaded.risk_level, "High");
        assert_eq!(reloaded.file_notes, "reviewed");
        assert_eq!(reloaded.total_assets, 25);
        assert_eq!(reloaded.active_assets, 23);
        assert!(reloaded.last_modified > original.last_modified);
        assert_eq!(reloaded.created_date, original.created_date);
        assert_eq!(reloaded.original_files, original.original_files);
        assert_eq!(store.dataset_assets(id).unwrap().len(), 3);
    }

    #[test]
    fn update_unknown_id_returns_false() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = acme();
        ds.id = Some(42);
        assert!(!store.update_dataset(&ds).unwrap());
    }

    #[test]
    fn update_unsaved_dataset_is_invalid() {
        let store = DatasetStore::open_in_memory().unwrap();
        assert!(matches!(
            store.update_dataset(&acme()),
            Err(DbError::Invalid(_))
        ));
    }

    #[test]
    fn update_in_same_second_moves_dataset_to_front() {
        let store = DatasetStore::open_in_memory().unwrap();
        let first = store
            .save_dataset(&Dataset::new("FIRST", date("2025-06-14")), &[])
            .unwrap();
        store
            .save_dataset(&Dataset::new("SECOND", date("2025-06-14")), &[])
            .unwrap();
        let original = store.get_dataset(first).unwrap().unwrap();

        let mut edited = original.clone();
        edited.file_notes = "touched".into();
        assert!(store.update_dataset(&edited).unwrap());

        let reloaded = store.get_dataset(first).unwrap().unwrap();
        assert!(reloaded.last_modified > original.last_modified);
        let names: Vec<String> = store
            .list_datasets()
            .unwrap()
            .into_iter()
            .map(|d| d.company_name)
            .collect();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
    }

    #[test]
    fn update_never_stamps_before_creation() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = Dataset::new("SKEWED", date("2025-06-14"));
        ds.created_date = now_timestamp() + Duration::hours(2);
        ds.last_modified = ds.created_date;
        let id = store.save_dataset(&ds, &[]).unwrap();

        let mut edited = store.get_dataset(id).unwrap().unwrap();
        edited.risk_level = "Low".into();
        assert!(store.update_dataset(&edited).unwrap());

        let reloaded = store.get_dataset(id).unwrap().unwrap();
        assert!(reloaded.last_modified >= reloaded.created_date);
    }

    #[test]
    fn future_stamped_dataset_does_not_drag_updates_forward() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut future = Dataset::new("FUTURE", date("2025-06-14"));
        future.created_date = now_timestamp() + Duration::days(1);
        future.last_modified = future.created_date;
        store.save_dataset(&future, &[]).unwrap();
        let id = store.save_dataset(&acme(), &[]).unwrap();

        let before = now_timestamp();
        let edited = store.get_dataset(id).unwrap().unwrap();
        assert!(store.update_dataset(&edited).unwrap());

        let reloaded = store.get_dataset(id).unwrap().unwrap();
        assert!(reloaded.last_modified < before + Duration::hours(1));
    }

    #[test]
    fn next_modified_advances_past_previous_and_peers() {
        let now = ts("2025-06-13 14:30:00");
        let created = ts("2025-06-01 08:00:00");
        assert_eq!(next_modified(now, ts("2025-06-10 09:00:00"), created, None), now);
        assert_eq!(
            next_modified(now, now, created, None),
            ts("2025-06-13 14:30:01")
        );
        assert_eq!(
            next_modified(now, ts("2025-06-10 09:00:00"), created, Some(now)),
            ts("2025-06-13 14:30:01")
        );
        assert_eq!(
            next_modified(now, now, ts("2025-06-13 16:30:00"), None),
            ts("2025-06-13 16:30:00")
        );
    }

    #[test]
    fn update_validates_company() {
        let store = DatasetStore::open_in_memory().unwrap();
        let id = store.save_dataset(&acme(), &[]).unwrap();
        let mut ds = store.get_dataset(id).unwrap().unwrap();
        ds.company_name = String::new();
        assert!(store.update_dataset(&ds).is_err());
        assert_eq!(
            store.get_dataset(id).unwrap().unwrap().company_name,
            "ACME-CORP"
        );
    }

    #[test]
    fn delete_removes_dataset_and_assets() {
        let store = DatasetStore::open_in_memory().unwrap();
        let keep = store
            .save_dataset(&mock_dataset("KEEP", "2025-06-01 08:00:00"), &mock_assets())
            .unwrap();
        let id = store.save_dataset(&acme(), &mock_assets()).unwrap();

        assert!(store.delete_dataset(id).unwrap());
        assert!(store.get_dataset(id).unwrap().is_none());
        assert!(store.dataset_assets(id).unwrap().is_empty());
        assert_eq!(store.dataset_assets(keep).unwrap().len(), 3);
        assert_eq!(asset_count(&store), 3);
    }

    #[test]
    fn delete_nonexistent_returns_false() {
        let store = DatasetStore::open_in_memory().unwrap();
        assert!(!store.delete_dataset(7).unwrap());
    }

    #[test]
    fn cascade_removes_assets_without_explicit_delete() {
        let store = DatasetStore::open_in_memory().unwrap();
        let id = store.save_dataset(&acme(), &mock_assets()).unwrap();
        store
            .conn
            .execute("DELETE FROM Datasets WHERE Id = ?1", params![id])
            .unwrap();
        assert_eq!(asset_count(&store), 0);
    }

    #[test]
    fn search_matches_each_field_case_insensitively() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut a = mock_dataset("ACME-CORP", "2025-06-08 11:20:00");
        a.all_services = "http, ssh, mysql".into();
        let mut b = mock_dataset("TECH-START", "2025-06-05 13:10:00");
        b.risk_level = "Low".into();
        b.file_notes = "Guest WiFi segment".into();
        store.save_dataset(&a, &[]).unwrap();
        store.save_dataset(&b, &[]).unwrap();

        let company = |term: &str| -> Vec<String> {
            store
                .search_datasets(term)
                .unwrap()
                .into_iter()
                .map(|d| d.company_name)
                .collect()
        };

        assert_eq!(company("acme"), vec!["ACME-CORP"]);
        assert_eq!(company("MYSQL"), vec!["ACME-CORP"]);
        assert_eq!(company("low"), vec!["TECH-START"]);
        assert_eq!(company("wifi"), vec!["TECH-START"]);
        assert_eq!(company("-"), vec!["ACME-CORP", "TECH-START"]);
        assert!(company("telnet").is_empty());
    }

    #[test]
    fn search_does_not_match_unlisted_fields() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = acme();
        ds.original_files = vec!["secret-audit.txt".into()];
        store.save_dataset(&ds, &[]).unwrap();
        assert!(store.search_datasets("secret-audit").unwrap().is_empty());
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = mock_dataset("ÉCOLE-Ü", "2025-06-08 11:20:00");
        ds.file_notes = "Straße segment".into();
        store.save_dataset(&ds, &[]).unwrap();

        assert_eq!(store.search_datasets("école-ü").unwrap().len(), 1);
        assert_eq!(store.search_datasets("STRASSE").unwrap().len(), 0);
        assert_eq!(store.search_datasets("STRAßE").unwrap().len(), 1);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let store = DatasetStore::open_in_memory().unwrap();
        let mut ds = acme();
        ds.file_notes = "100% coverage".into();
        store.save_dataset(&ds, &[]).unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT_B", "2025-06-12 16:45:00"), &[])
            .unwrap();

        assert_eq!(store.search_datasets("0% c").unwrap().len(), 1);
        let underscore = store.search_datasets("_").unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].company_name, "CLIENT_B");
    }

    #[test]
    fn search_results_ordered_by_last_modified() {
        let store = DatasetStore::open_in_memory().unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT-C", "2025-06-10 09:15:00"), &[])
            .unwrap();
        store
            .save_dataset(&mock_dataset("CLIENT-A", "2025-06-13 14:30:00"), &[])
            .unwrap();
        let hits = store.search_datasets("client").unwrap();
        assert_eq!(hits[0].company_name, "CLIENT-A");
        assert_eq!(hits[1].company_name, "CLIENT-C");
    }

    #[test]
    fn null_columns_read_as_defaults() {
        let store = DatasetStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "INSERT INTO Datasets (CompanyName, ScanDate, TotalAssets, AllServices, RiskLevel, \
                 LastModified, FileNotes, OriginalFiles, CreatedDate) \
                 VALUES ('LEGACY', 'June 5th', NULL, NULL, NULL, 'garbage', NULL, NULL, \
                 '2025-06-05 13:10:00');",
            )
            .unwrap();

        let ds = store.list_datasets().unwrap().remove(0);
        assert_eq!(ds.company_name, "LEGACY");
        assert_eq!(ds.total_assets, 0);
        assert_eq!(ds.all_services, "");
        assert_eq!(ds.risk_level, "");
        assert!(ds.original_files.is_empty());
        assert_eq!(ds.created_date, ts("2025-06-05 13:10:00"));
        // Unreadable dates degrade to the creation time.
        assert_eq!(ds.last_modified, ds.created_date);
        assert_eq!(ds.scan_date, date("2025-06-05"));
    }

    #[test]
    fn pending_risk_roundtrips() {
        let store = DatasetStore::open_in_memory().unwrap();
        let id = store
            .save_dataset(&mock_dataset("CLIENT-A", "2025-06-13 14:30:00"), &[])
            .unwrap();
        let ds = store.get_dataset(id).unwrap().unwrap();
        assert_eq!(ds.risk_level, RISK_NOT_COMPUTED);
        assert!(!ds.risk_computed());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ssh"), "%ssh%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern(""), "%%");
    }
}
