use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use netra_db::{DatasetStore, DbError};
use netra_parser::{FileSelection, ParseError, ParseReport, ParserRunner};
use netra_types::{Asset, Dataset, DatasetId};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::summary::build_dataset;

/// Dataset store shared between async callers and blocking workers.
pub type SharedStore = Arc<Mutex<DatasetStore>>;

pub fn shared_store(store: DatasetStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid import: {0}")]
    Invalid(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("parser found no assets in the selected files")]
    NoAssets,
    #[error("background task failed: {0}")]
    Task(String),
}

/// One scan batch to import.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub company_name: String,
    pub scan_date: NaiveDate,
    pub files: Vec<PathBuf>,
    pub notes: String,
    /// Save a dataset even when the parser reports no assets.
    pub allow_empty: bool,
}

impl ImportRequest {
    pub fn new(company_name: impl Into<String>, scan_date: NaiveDate, files: Vec<PathBuf>) -> Self {
        Self {
            company_name: company_name.into(),
            scan_date,
            files,
            notes: String::new(),
            allow_empty: false,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

/// What an import produced.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The saved dataset, with its assigned id.
    pub dataset: Dataset,
    pub selection: FileSelection,
    /// Non-fatal decode problems reported by the parser step.
    pub warnings: Vec<String>,
}

/// Run the external parser on a blocking worker thread.
pub async fn parse_files_async(
    runner: ParserRunner,
    files: Vec<PathBuf>,
) -> Result<ParseReport, IngestError> {
    let report = tokio::task::spawn_blocking(move || runner.parse_files(&files))
        .await
        .map_err(|e| IngestError::Task(e.to_string()))??;
    Ok(report)
}

/// Save a dataset and its assets on a blocking worker thread.
pub async fn save_dataset_async(
    store: SharedStore,
    dataset: Dataset,
    assets: Vec<Asset>,
) -> Result<DatasetId, IngestError> {
    let id = tokio::task::spawn_blocking(move || {
        let store = store.blocking_lock();
        store.save_dataset(&dataset, &assets)
    })
    .await
    .map_err(|e| IngestError::Task(e.to_string()))??;
    Ok(id)
}

/// Select files, parse them, derive the summary and save the batch.
///
/// Nothing is written unless the parser step succeeds.
pub async fn import_scan(
    request: ImportRequest,
    runner: &ParserRunner,
    store: SharedStore,
) -> Result<ImportOutcome, IngestError> {
    if request.company_name.trim().is_empty() {
        return Err(IngestError::Invalid("company name is required".into()));
    }

    let selection = runner.select_files(&request.files);
    info!(status = %selection.status_line(), "scan files selected");
    for ignored in &selection.ignored {
        warn!(file = %ignored.display(), "ignoring unsupported scan file");
    }
    if selection.is_empty() {
        return Err(ParseError::NoInput.into());
    }

    let report = parse_files_async(runner.clone(), selection.accepted.clone()).await?;
    if report.assets.is_empty() && !request.allow_empty {
        return Err(IngestError::NoAssets);
    }

    let mut dataset = build_dataset(
        &request.company_name,
        request.scan_date,
        &report.assets,
        &selection.accepted,
    );
    dataset.file_notes = request.notes;

    let id = save_dataset_async(store, dataset.clone(), report.assets).await?;
    dataset.id = Some(id);
    info!(
        dataset_id = id,
        company = %dataset.company_name,
        assets = dataset.total_assets,
        active = dataset.active_assets,
        "scan batch imported"
    );

    Ok(ImportOutcome {
        dataset,
        selection,
        warnings: report.warnings,
    })
}
