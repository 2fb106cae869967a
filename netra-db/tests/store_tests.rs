// ---------------------------------------------------------------------------
// Integration tests for file-backed dataset libraries
// ---------------------------------------------------------------------------

use chrono::NaiveDate;
use rusqlite::Connection;

use netra_db::DatasetStore;
use netra_types::{Asset, Dataset};

fn sample_dataset(company: &str) -> Dataset {
    let mut ds = Dataset::new(company, NaiveDate::from_ymd_opt(2025, 6, 13).unwrap());
    ds.total_assets = 2;
    ds.active_assets = 1;
    ds.all_services = "http, ssh".into();
    ds.scans_processed = 1;
    ds.original_files = vec!["client-a.nmap".into()];
    ds
}

fn sample_assets() -> Vec<Asset> {
    vec![
        Asset::new("10.0.0.1")
            .with_hostname("web01")
            .with_open_ports(2)
            .with_services("http, ssh"),
        Asset::new("10.0.0.2"),
    ]
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datasets.db");

    let id = {
        let store = DatasetStore::open(&path).unwrap();
        store
            .save_dataset(&sample_dataset("CLIENT-A"), &sample_assets())
            .unwrap()
    };

    let store = DatasetStore::open(&path).unwrap();
    let ds = store.get_dataset(id).unwrap().unwrap();
    assert_eq!(ds.company_name, "CLIENT-A");
    assert_eq!(ds.original_files, vec!["client-a.nmap"]);
    assert_eq!(store.dataset_assets(id).unwrap().len(), 2);
}

#[test]
fn open_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("datasets.db");

    let store = DatasetStore::open(&path).unwrap();
    assert_eq!(store.count_datasets().unwrap(), 0);
    assert!(path.exists());
}

#[test]
fn file_store_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datasets.db");
    drop(DatasetStore::open(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn legacy_library_is_migrated_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Datasets (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                CompanyName TEXT NOT NULL,
                ScanDate TEXT NOT NULL,
                TotalAssets INTEGER DEFAULT 0,
                ActiveAssets INTEGER DEFAULT 0,
                TopServices TEXT DEFAULT '',
                ScansProcessed INTEGER DEFAULT 0,
                RiskLevel TEXT DEFAULT '',
                LastModified TEXT NOT NULL,
                FileNotes TEXT DEFAULT '',
                OriginalFiles TEXT DEFAULT '',
                CreatedDate TEXT NOT NULL
            );
            INSERT INTO Datasets (CompanyName, ScanDate, TotalAssets, ActiveAssets, TopServices,
                ScansProcessed, RiskLevel, LastModified, FileNotes, OriginalFiles, CreatedDate)
            VALUES ('CLIENT-C', '2025-06-10', 8, 7, 'http, ssh, ftp, smtp', 2, 'Medium',
                '2025-06-10 09:15:00', 'legacy row', 'a.txt;b.zip', '2025-06-10 09:00:00');",
        )
        .unwrap();
    }

    let store = DatasetStore::open(&path).unwrap();
    let all = store.list_datasets().unwrap();
    assert_eq!(all.len(), 1);
    let ds = &all[0];
    assert_eq!(ds.all_services, "http, ssh, ftp, smtp");
    assert_eq!(ds.total_assets, 8);
    assert_eq!(ds.active_assets, 7);
    assert_eq!(ds.risk_level, "Medium");
    assert_eq!(ds.original_files, vec!["a.txt", "b.zip"]);

    // The migrated library accepts new datasets and finds them by service.
    store
        .save_dataset(&sample_dataset("CLIENT-D"), &sample_assets())
        .unwrap();
    assert_eq!(store.search_datasets("smtp").unwrap().len(), 1);
    assert_eq!(store.search_datasets("ssh").unwrap().len(), 2);
}

#[test]
fn delete_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datasets.db");

    let (keep, gone) = {
        let store = DatasetStore::open(&path).unwrap();
        let keep = store
            .save_dataset(&sample_dataset("KEEP"), &sample_assets())
            .unwrap();
        let gone = store
            .save_dataset(&sample_dataset("GONE"), &sample_assets())
            .unwrap();
        assert!(store.delete_dataset(gone).unwrap());
        (keep, gone)
    };

    let store = DatasetStore::open(&path).unwrap();
    assert!(store.get_dataset(gone).unwrap().is_none());
    assert!(store.dataset_assets(gone).unwrap().is_empty());
    assert_eq!(store.dataset_assets(keep).unwrap().len(), 2);
}
