//! Scan-batch ingestion: summary derivation, library filtering and the
//! parse-then-save pipeline.

mod ingest;
mod library;
mod summary;

pub use ingest::{
    ImportOutcome, ImportRequest, IngestError, SharedStore, import_scan, parse_files_async,
    save_dataset_async, shared_store,
};
pub use library::filter_datasets;
pub use summary::{TOP_SERVICES, active_count, build_dataset, services_summary};
